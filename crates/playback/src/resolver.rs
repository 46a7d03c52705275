//! Audio URL resolution
//!
//! An operator-assigned override wins; otherwise the default template is
//! rendered with three-digit zero-padded chapter and verse numbers.

use tilawah_config::{AudioConfig, ConfigSection, DEFAULT_URL_TEMPLATE};
use tilawah_core::VerseIdentity;
use tilawah_storage::AudioUrlCache;

#[derive(Debug, Clone)]
pub struct AudioUrlResolver {
    cache: AudioUrlCache,
    template: String,
}

impl AudioUrlResolver {
    /// Creates a resolver over the shared override cache
    ///
    /// An invalid `template` is logged and replaced by the built-in one.
    pub fn new(cache: AudioUrlCache, template: &str) -> Self {
        let candidate = AudioConfig {
            default_url_template: template.to_string(),
        };

        let template = match candidate.validate() {
            Ok(()) => candidate.default_url_template,
            Err(errors) => {
                log::warn!(
                    "Ignoring audio URL template '{}' ({}), using built-in default",
                    template,
                    errors
                        .iter()
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join("; ")
                );
                DEFAULT_URL_TEMPLATE.to_string()
            }
        };

        Self { cache, template }
    }

    pub fn from_config(cache: AudioUrlCache, config: &AudioConfig) -> Self {
        Self::new(cache, &config.default_url_template)
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// URL to play for `identity`. Never fails and has no side effects.
    pub fn resolve(&self, identity: VerseIdentity) -> String {
        self.cache
            .override_url(identity)
            .unwrap_or_else(|| render(&self.template, identity))
    }

    /// URL from the template alone, ignoring overrides
    pub fn default_url(&self, identity: VerseIdentity) -> String {
        render(&self.template, identity)
    }
}

fn render(template: &str, identity: VerseIdentity) -> String {
    template
        .replace("{chapter}", &format!("{:03}", identity.chapter))
        .replace("{verse}", &format!("{:03}", identity.verse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilawah_core::{AudioUrlMapping, CustomUrl};

    fn verse(chapter: u16, verse: u16) -> VerseIdentity {
        VerseIdentity::new_unchecked(chapter, verse)
    }

    #[test]
    fn test_default_url_is_zero_padded() {
        let resolver = AudioUrlResolver::new(AudioUrlCache::new(), DEFAULT_URL_TEMPLATE);

        assert_eq!(
            resolver.resolve(verse(1, 1)),
            "https://everyayah.com/data/Alafasy_128kbps/001001.mp3"
        );
        assert_eq!(
            resolver.resolve(verse(2, 255)),
            "https://everyayah.com/data/Alafasy_128kbps/002255.mp3"
        );
        assert_eq!(
            resolver.resolve(verse(114, 6)),
            "https://everyayah.com/data/Alafasy_128kbps/114006.mp3"
        );
    }

    #[test]
    fn test_override_wins() {
        let cache = AudioUrlCache::new();
        let custom = CustomUrl::new("https://cdn.example.com/kursi.mp3");
        cache.set_mapping(AudioUrlMapping::assigned(verse(2, 255), &custom));

        let resolver = AudioUrlResolver::new(cache, DEFAULT_URL_TEMPLATE);
        assert_eq!(
            resolver.resolve(verse(2, 255)),
            "https://cdn.example.com/kursi.mp3"
        );
        assert_eq!(
            resolver.resolve(verse(2, 256)),
            "https://everyayah.com/data/Alafasy_128kbps/002256.mp3"
        );
    }

    #[test]
    fn test_cleared_mapping_uses_default() {
        let cache = AudioUrlCache::new();
        cache.set_mapping(AudioUrlMapping::cleared(verse(36, 1)));

        let resolver = AudioUrlResolver::new(cache, DEFAULT_URL_TEMPLATE);
        assert_eq!(resolver.resolve(verse(36, 1)), resolver.default_url(verse(36, 1)));
    }

    #[test]
    fn test_custom_template() {
        let resolver = AudioUrlResolver::new(
            AudioUrlCache::new(),
            "https://mirror.example.org/husary/{chapter}/{verse}.ogg",
        );
        assert_eq!(
            resolver.resolve(verse(18, 10)),
            "https://mirror.example.org/husary/018/010.ogg"
        );
    }

    #[test]
    fn test_invalid_template_falls_back() {
        let resolver = AudioUrlResolver::new(AudioUrlCache::new(), "ftp://x/{chapter}.mp3");
        assert_eq!(resolver.template(), DEFAULT_URL_TEMPLATE);
    }
}
