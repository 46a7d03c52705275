//! Tilawah verse data
//!
//! Chapter metadata is compiled in. Verse text (Arabic and translation) is
//! read lazily from a bundle directory and cached per chapter.

pub mod bundle;
pub mod chapters;
mod error;
mod traits;

pub use bundle::{BundleChapter, BundleVerse, BundledVerseProvider};
pub use chapters::{all_chapters, chapter_meta, next_in_chapter, verse_count, TOTAL_VERSES};
pub use error::{VerseDataError, VerseDataResult};
pub use traits::{MatchField, SearchHit, SearchQuery, VerseProvider};
