//! Last reading position, persisted for the resume affordance

use crate::types::{Timestamp, Validator, VerseIdentity, CHAPTER_COUNT};
use serde::{Deserialize, Serialize};

/// Where the reader was when the app last saved state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingPosition {
    pub chapter: u16,
    pub verse: u16,
    pub scroll_offset: f64,
    pub paused: bool,
    pub timestamp: Timestamp,
}

impl ReadingPosition {
    pub fn new(identity: VerseIdentity, scroll_offset: f64, paused: bool) -> Self {
        Self {
            chapter: identity.chapter,
            verse: identity.verse,
            scroll_offset,
            paused,
            timestamp: Timestamp::now(),
        }
    }

    pub fn identity(&self) -> VerseIdentity {
        VerseIdentity::new_unchecked(self.chapter, self.verse)
    }
}

impl Validator for ReadingPosition {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.chapter == 0 || self.chapter > CHAPTER_COUNT {
            errors.push(format!("chapter out of range: {}", self.chapter));
        }
        if self.verse == 0 {
            errors.push("verse must be positive".to_string());
        }
        if !self.scroll_offset.is_finite() || self.scroll_offset < 0.0 {
            errors.push(format!("invalid scroll offset: {}", self.scroll_offset));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
