//! Domain types for Tilawah
//!
//! - `verse`: verse addressing and chapter metadata
//! - `bookmark`: user bookmarks
//! - `audio_url`: custom URLs and per-verse URL mappings
//! - `tafseer`: commentary text
//! - `position`: persisted reading position
//! - `common`: timestamps and the `Validator` trait

mod audio_url;
mod bookmark;
mod common;
mod position;
mod tafseer;
mod verse;

// Re-export all public types
pub use audio_url::{AudioUrlMapping, CustomUrl, CustomUrlId};
pub use bookmark::{Bookmark, BookmarkId};
pub use common::{Timestamp, Validator};
pub use position::ReadingPosition;
pub use tafseer::Tafseer;
pub use verse::{ChapterMeta, Revelation, Verse, VerseIdentity, CHAPTER_COUNT};
