//! Shared in-memory view of custom URLs and verse mappings
//!
//! Written by the audio URL store and by real-time deltas, read by the URL
//! resolver. Last write wins.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tilawah_core::{AudioUrlMapping, CustomUrl, CustomUrlId, VerseIdentity};

#[derive(Debug, Default)]
struct CacheInner {
    urls: BTreeMap<CustomUrlId, CustomUrl>,
    mappings: HashMap<VerseIdentity, AudioUrlMapping>,
}

/// Cloneable handle to the shared cache
#[derive(Debug, Clone, Default)]
pub struct AudioUrlCache {
    inner: Arc<RwLock<CacheInner>>,
}

impl AudioUrlCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The operator-assigned URL for a verse, if any
    pub fn override_url(&self, identity: VerseIdentity) -> Option<String> {
        self.read()
            .mappings
            .get(&identity)
            .and_then(|m| m.override_url())
            .map(str::to_string)
    }

    pub fn mapping(&self, identity: VerseIdentity) -> Option<AudioUrlMapping> {
        self.read().mappings.get(&identity).cloned()
    }

    /// Every mapping that currently points at a custom URL, ordered by verse
    pub fn assigned_mappings(&self) -> Vec<AudioUrlMapping> {
        let mut mappings: Vec<AudioUrlMapping> = self
            .read()
            .mappings
            .values()
            .filter(|m| m.custom_url_id.is_some())
            .cloned()
            .collect();
        mappings.sort_by_key(|m| m.identity);
        mappings
    }

    pub fn set_mapping(&self, mapping: AudioUrlMapping) {
        self.write().mappings.insert(mapping.identity, mapping);
    }

    pub fn remove_mapping(&self, identity: VerseIdentity) {
        self.write().mappings.remove(&identity);
    }

    pub fn custom_url(&self, id: CustomUrlId) -> Option<CustomUrl> {
        self.read().urls.get(&id).cloned()
    }

    /// Looks up a custom URL by its address
    pub fn find_by_url(&self, url: &str) -> Option<CustomUrl> {
        self.read().urls.values().find(|u| u.url == url).cloned()
    }

    pub fn custom_urls(&self) -> Vec<CustomUrl> {
        self.read().urls.values().cloned().collect()
    }

    pub fn put_custom_url(&self, url: CustomUrl) {
        self.write().urls.insert(url.id, url);
    }

    pub fn remove_custom_url(&self, id: CustomUrlId) {
        self.write().urls.remove(&id);
    }

    /// Verses whose mapping references `id`
    pub fn references(&self, id: CustomUrlId) -> Vec<VerseIdentity> {
        let mut refs: Vec<VerseIdentity> = self
            .read()
            .mappings
            .values()
            .filter(|m| m.references(id))
            .map(|m| m.identity)
            .collect();
        refs.sort();
        refs
    }

    /// Replaces the whole cache with a fresh snapshot
    pub fn replace_all(&self, urls: Vec<CustomUrl>, mappings: Vec<AudioUrlMapping>) {
        let mut inner = self.write();
        inner.urls = urls.into_iter().map(|u| (u.id, u)).collect();
        inner.mappings = mappings.into_iter().map(|m| (m.identity, m)).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_lookup() {
        let cache = AudioUrlCache::new();
        let url = CustomUrl::new("https://cdn.example.org/baqarah-255.mp3");
        let verse = VerseIdentity::new_unchecked(2, 255);

        assert_eq!(cache.override_url(verse), None);

        cache.put_custom_url(url.clone());
        cache.set_mapping(AudioUrlMapping::assigned(verse, &url));
        assert_eq!(cache.override_url(verse).as_deref(), Some(url.url.as_str()));
        assert_eq!(cache.references(url.id), vec![verse]);

        cache.set_mapping(AudioUrlMapping::cleared(verse));
        assert_eq!(cache.override_url(verse), None);
        assert!(cache.references(url.id).is_empty());
        assert!(cache.assigned_mappings().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let cache = AudioUrlCache::new();
        let reader = cache.clone();
        let url = CustomUrl::new("https://cdn.example.org/a.mp3");

        cache.put_custom_url(url.clone());
        assert_eq!(reader.find_by_url("https://cdn.example.org/a.mp3"), Some(url));
    }

    #[test]
    fn test_replace_all() {
        let cache = AudioUrlCache::new();
        cache.put_custom_url(CustomUrl::new("https://old.example.org/x.mp3"));

        let fresh = CustomUrl::new("https://new.example.org/y.mp3");
        let verse = VerseIdentity::new_unchecked(1, 1);
        cache.replace_all(
            vec![fresh.clone()],
            vec![AudioUrlMapping::assigned(verse, &fresh)],
        );

        assert_eq!(cache.custom_urls(), vec![fresh]);
        assert!(cache.mapping(verse).is_some());
    }
}
