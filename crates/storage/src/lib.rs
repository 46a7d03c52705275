//! Tilawah storage
//!
//! Record accessors for bookmarks, tafseer and custom audio URLs on top of
//! an authoritative [`DocumentStore`] and a [`LocalStorage`] mirror.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tilawah_core::VerseIdentity;
//! use tilawah_storage::{MemoryDocumentStore, MemoryLocalStorage, Stores};
//!
//! let remote = Arc::new(MemoryDocumentStore::new());
//! let local = Arc::new(MemoryLocalStorage::default());
//! let stores = Stores::open(remote, local, &Default::default());
//!
//! let verse = VerseIdentity::new(2, 255).unwrap();
//! let written = stores.bookmarks.create(verse, None).unwrap();
//! assert!(!written.outcome.is_local_only());
//! ```

mod audio_urls;
mod bookmarks;
pub mod breaker;
mod cache;
pub mod document;
mod error;
pub mod local;
mod memory;
mod repository;
mod tafseer;

pub use audio_urls::{AudioUrlStore, AUDIO_MAPPINGS, CUSTOM_URLS};
pub use bookmarks::{BookmarkStore, BOOKMARKS};
pub use breaker::{BreakerState, RemoteBreaker};
pub use cache::AudioUrlCache;
pub use document::{
    encode, ChangeKind, Document, DocumentChange, DocumentStore, Fields, Filter, Subscription,
};
pub use error::{StoreError, StoreResult};
pub use local::{FileLocalStorage, LocalStorage, MemoryLocalStorage};
pub use memory::MemoryDocumentStore;
pub use repository::{
    DataSource, FallbackRepository, QueryResult, WriteOutcome, Written, MIRROR_NAMESPACE,
};
pub use tafseer::{TafseerStore, TAFSEER};

use std::sync::Arc;
use tilawah_config::StorageConfig;

/// Every accessor wired to one repository and one URL cache
pub struct Stores {
    pub repository: Arc<FallbackRepository>,
    pub audio_urls: AudioUrlStore,
    pub bookmarks: BookmarkStore,
    pub tafseer: TafseerStore,
}

impl Stores {
    pub fn open(
        remote: Arc<dyn DocumentStore>,
        local: Arc<dyn LocalStorage>,
        config: &StorageConfig,
    ) -> Self {
        let repository = Arc::new(FallbackRepository::from_config(remote, local, config));
        Self {
            audio_urls: AudioUrlStore::new(Arc::clone(&repository), AudioUrlCache::new()),
            bookmarks: BookmarkStore::new(Arc::clone(&repository)),
            tafseer: TafseerStore::new(Arc::clone(&repository)),
            repository,
        }
    }

    /// The cache shared with the URL resolver
    pub fn url_cache(&self) -> AudioUrlCache {
        self.audio_urls.cache().clone()
    }
}
