//! Tilawah core
//!
//! Domain types shared by every other crate in the workspace: verse
//! addressing, chapter metadata, bookmarks, custom audio URLs, tafseer and the
//! persisted reading position, plus the application-wide error taxonomy.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use types::{
    AudioUrlMapping, Bookmark, BookmarkId, ChapterMeta, CustomUrl, CustomUrlId,
    ReadingPosition, Revelation, Tafseer, Timestamp, Validator, Verse, VerseIdentity,
    CHAPTER_COUNT,
};
