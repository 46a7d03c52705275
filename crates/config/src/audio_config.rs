//! Audio URL configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Built-in default recitation URL pattern
///
/// `{chapter}` and `{verse}` are replaced with three-digit zero-padded numbers.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://everyayah.com/data/Alafasy_128kbps/{chapter}{verse}.mp3";

/// How verse audio URLs are computed when no override is assigned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AudioConfig {
    /// URL pattern with `{chapter}` and `{verse}` placeholders
    pub default_url_template: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            default_url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

impl ConfigSection for AudioConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let field = "audio.default_url_template";
        let template = self.default_url_template.as_str();

        if let Err(e) = Validator::not_empty(template, field) {
            return Err(vec![e]);
        }

        Validator::collect_errors(vec![
            Validator::http_url(template, field),
            Validator::has_placeholders(template, &["{chapter}", "{verse}"], field),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.default_url_template = other.default_url_template;
    }

    fn section_name(&self) -> &'static str {
        "audio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AudioConfig::default().validate().is_ok());
    }

    #[test]
    fn test_missing_placeholder() {
        let config = AudioConfig {
            default_url_template: "https://example.org/{chapter}.mp3".to_string(),
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("{verse}"));
    }

    #[test]
    fn test_empty_template_reports_once() {
        let config = AudioConfig {
            default_url_template: String::new(),
        };
        assert_eq!(config.validate().unwrap_err().len(), 1);
    }
}
