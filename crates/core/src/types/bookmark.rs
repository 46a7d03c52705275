//! Bookmark domain model

use crate::types::{Timestamp, Validator, VerseIdentity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a bookmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookmarkId(Uuid);

impl BookmarkId {
    /// Creates a new random BookmarkId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a BookmarkId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Returns the BookmarkId as a string
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for BookmarkId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user bookmark on a verse
///
/// Bookmarks live independently of any playback session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub identity: VerseIdentity,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Bookmark {
    /// Creates a new bookmark on the given verse
    pub fn new(identity: VerseIdentity) -> Self {
        let now = Timestamp::now();
        Self {
            id: BookmarkId::new(),
            identity,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a bookmark with a note
    pub fn with_note(identity: VerseIdentity, note: String) -> Self {
        let mut bookmark = Self::new(identity);
        bookmark.note = Some(note);
        bookmark
    }

    /// Updates the bookmark's note; an empty note clears it
    pub fn set_note(&mut self, note: String) {
        self.note = if note.trim().is_empty() {
            None
        } else {
            Some(note)
        };
        self.updated_at = Timestamp::now();
    }

    /// Returns true if this bookmark has a note
    pub fn has_note(&self) -> bool {
        self.note.as_ref().is_some_and(|n| !n.trim().is_empty())
    }
}

impl Validator for Bookmark {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(identity_errors) = self.identity.validate() {
            errors.extend(identity_errors);
        }

        if let Some(note) = &self.note {
            if note.trim().is_empty() {
                errors.push("Bookmark note cannot be empty if set".to_string());
            }
        }

        if self.updated_at < self.created_at {
            errors.push("Bookmark updated_at precedes created_at".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
