//! Verse addressing and chapter metadata

use crate::types::Validator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of chapters in the mushaf
pub const CHAPTER_COUNT: u16 = 114;

/// Composite `(chapter, verse)` key used to address audio, tafseer and bookmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerseIdentity {
    pub chapter: u16,
    pub verse: u16,
}

impl VerseIdentity {
    /// Creates a verse identity, rejecting zero components and unknown chapters
    ///
    /// The verse upper bound depends on the chapter and is checked by the
    /// verse data provider, not here.
    pub fn new(chapter: u16, verse: u16) -> Result<Self, String> {
        let identity = Self { chapter, verse };
        identity.validate().map_err(|errors| errors.join("; "))?;
        Ok(identity)
    }

    /// Creates a verse identity without validation (for deserialization and tests)
    pub const fn new_unchecked(chapter: u16, verse: u16) -> Self {
        Self { chapter, verse }
    }

    /// Returns the identity of the following verse in the same chapter
    ///
    /// Does not know chapter lengths; callers must check the bound.
    pub fn next(&self) -> Self {
        Self {
            chapter: self.chapter,
            verse: self.verse.saturating_add(1),
        }
    }

    /// Key used for documents in the backing store, e.g. `2_255`
    pub fn document_key(&self) -> String {
        format!("{}_{}", self.chapter, self.verse)
    }

    /// Parses a document key produced by [`VerseIdentity::document_key`]
    pub fn from_document_key(key: &str) -> Option<Self> {
        let (chapter, verse) = key.split_once('_')?;
        Self::new(chapter.parse().ok()?, verse.parse().ok()?).ok()
    }
}

impl Validator for VerseIdentity {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.chapter == 0 || self.chapter > CHAPTER_COUNT {
            errors.push(format!("Chapter must be between 1 and {}", CHAPTER_COUNT));
        }

        if self.verse == 0 {
            errors.push("Verse number must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Display for VerseIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

impl FromStr for VerseIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chapter, verse) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("Expected CHAPTER:VERSE, got '{}'", s))?;
        let chapter = chapter
            .parse::<u16>()
            .map_err(|e| format!("Invalid chapter '{}': {}", chapter, e))?;
        let verse = verse
            .parse::<u16>()
            .map_err(|e| format!("Invalid verse '{}': {}", verse, e))?;
        Self::new(chapter, verse)
    }
}

/// Place of revelation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revelation {
    Meccan,
    Medinan,
}

impl fmt::Display for Revelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revelation::Meccan => write!(f, "Meccan"),
            Revelation::Medinan => write!(f, "Medinan"),
        }
    }
}

/// Static metadata for one chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterMeta {
    pub id: u16,
    pub name: String,
    pub english_name: String,
    pub verse_count: u16,
    pub revelation: Revelation,
}

impl ChapterMeta {
    /// Returns true if `verse` lies within this chapter
    pub fn contains(&self, verse: u16) -> bool {
        verse >= 1 && verse <= self.verse_count
    }

    /// Returns true if a verse after `verse` exists in this chapter
    pub fn has_next(&self, verse: u16) -> bool {
        verse < self.verse_count
    }
}

/// One verse of text with its translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub identity: VerseIdentity,
    pub arabic: String,
    pub translation: String,
}
