//! Tafseer (commentary) attached to a verse

use crate::types::{Timestamp, Validator, VerseIdentity};
use serde::{Deserialize, Serialize};

/// Explanatory commentary for one verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tafseer {
    pub identity: VerseIdentity,
    pub text: String,
    pub author: Option<String>,
    pub updated_at: Timestamp,
}

impl Tafseer {
    pub fn new(identity: VerseIdentity, text: impl Into<String>) -> Self {
        Self {
            identity,
            text: text.into(),
            author: None,
            updated_at: Timestamp::now(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

impl Validator for Tafseer {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = self.identity.validate().err().unwrap_or_default();

        if self.text.trim().is_empty() {
            errors.push("Tafseer text cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tafseer_validation() {
        let verse = VerseIdentity::new_unchecked(112, 1);
        assert!(Tafseer::new(verse, "Say: He is Allah, the One").is_valid());
        assert!(!Tafseer::new(verse, "  ").is_valid());
    }

    #[test]
    fn test_with_author() {
        let t = Tafseer::new(VerseIdentity::new_unchecked(1, 1), "text").with_author("Ibn Kathir");
        assert_eq!(t.author.as_deref(), Some("Ibn Kathir"));
    }
}
