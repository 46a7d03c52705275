//! Operator-assigned audio URLs

use crate::types::{Timestamp, Validator, VerseIdentity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a custom URL record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomUrlId(Uuid);

impl CustomUrlId {
    /// Creates a new random CustomUrlId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a CustomUrlId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Returns the CustomUrlId as a string
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for CustomUrlId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CustomUrlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An operator-supplied audio location that overrides the default pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomUrl {
    pub id: CustomUrlId,
    pub url: String,
    pub label: Option<String>,
    pub created_at: Timestamp,
}

impl CustomUrl {
    /// Creates a new custom URL record
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: CustomUrlId::new(),
            url: url.into().trim().to_string(),
            label: None,
            created_at: Timestamp::now(),
        }
    }

    /// Sets a human-readable label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Validator for CustomUrl {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.url.is_empty() {
            errors.push("URL cannot be empty".to_string());
        } else if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            errors.push(format!("URL must use http or https: {}", self.url));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Assignment of a verse to a custom URL
///
/// `custom_url_id == None` means the verse uses the default URL pattern. The
/// URL itself is denormalized so the resolver never needs a second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioUrlMapping {
    pub identity: VerseIdentity,
    pub custom_url_id: Option<CustomUrlId>,
    pub url: Option<String>,
    pub updated_at: Timestamp,
}

impl AudioUrlMapping {
    /// Creates a mapping pointing at a custom URL
    pub fn assigned(identity: VerseIdentity, custom_url: &CustomUrl) -> Self {
        Self {
            identity,
            custom_url_id: Some(custom_url.id),
            url: Some(custom_url.url.clone()),
            updated_at: Timestamp::now(),
        }
    }

    /// Creates a mapping that falls back to the default pattern
    pub fn cleared(identity: VerseIdentity) -> Self {
        Self {
            identity,
            custom_url_id: None,
            url: None,
            updated_at: Timestamp::now(),
        }
    }

    /// Returns true if this mapping references the given custom URL
    pub fn references(&self, id: CustomUrlId) -> bool {
        self.custom_url_id == Some(id)
    }

    /// Returns the override URL, if any
    pub fn override_url(&self) -> Option<&str> {
        self.custom_url_id.and(self.url.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_url_trims_and_validates() {
        let url = CustomUrl::new("  https://cdn.example.org/1.mp3 ");
        assert_eq!(url.url, "https://cdn.example.org/1.mp3");
        assert!(url.is_valid());
    }

    #[test]
    fn test_custom_url_rejects_other_schemes() {
        assert!(!CustomUrl::new("ftp://example.org/a.mp3").is_valid());
        assert!(!CustomUrl::new("").is_valid());
    }

    #[test]
    fn test_mapping_references() {
        let url = CustomUrl::new("https://cdn.example.org/a.mp3").with_label("Minshawi");
        let verse = VerseIdentity::new_unchecked(1, 1);
        let mapping = AudioUrlMapping::assigned(verse, &url);
        assert!(mapping.references(url.id));
        assert_eq!(mapping.override_url(), Some("https://cdn.example.org/a.mp3"));

        let cleared = AudioUrlMapping::cleared(verse);
        assert!(!cleared.references(url.id));
        assert_eq!(cleared.override_url(), None);
    }

    #[test]
    fn test_custom_url_id_roundtrip() {
        let id = CustomUrlId::new();
        assert_eq!(CustomUrlId::from_string(&id.as_string()).unwrap(), id);
        assert!(CustomUrlId::from_string("nope").is_err());
    }
}
