//! Custom audio URLs and their verse assignments
//!
//! Both collections are held in the shared [`AudioUrlCache`] so the resolver
//! can answer without touching the store.

use crate::cache::AudioUrlCache;
use crate::document::{decode_all, encode, ChangeKind, DocumentChange, Filter, Subscription};
use crate::error::{StoreError, StoreResult};
use crate::repository::{DataSource, FallbackRepository, WriteOutcome, Written};
use std::sync::Arc;
use tilawah_core::{AudioUrlMapping, CustomUrl, CustomUrlId, Validator, VerseIdentity};

pub const CUSTOM_URLS: &str = "custom_urls";
pub const AUDIO_MAPPINGS: &str = "audio_mappings";

pub struct AudioUrlStore {
    repo: Arc<FallbackRepository>,
    cache: AudioUrlCache,
}

impl AudioUrlStore {
    pub fn new(repo: Arc<FallbackRepository>, cache: AudioUrlCache) -> Self {
        Self { repo, cache }
    }

    pub fn cache(&self) -> &AudioUrlCache {
        &self.cache
    }

    /// Fills the cache from the store (or the local mirror when offline)
    pub fn load(&self) -> StoreResult<DataSource> {
        let urls = self.repo.query(CUSTOM_URLS, &Filter::All)?;
        let mappings = self.repo.query(AUDIO_MAPPINGS, &Filter::All)?;

        let source = if urls.source == DataSource::Remote && mappings.source == DataSource::Remote {
            DataSource::Remote
        } else {
            DataSource::LocalMirror
        };

        let urls: Vec<CustomUrl> = decode_all(CUSTOM_URLS, &urls.documents);
        let mappings: Vec<AudioUrlMapping> = decode_all(AUDIO_MAPPINGS, &mappings.documents);
        log::info!(
            "Loaded {} custom URLs and {} verse mappings from {:?}",
            urls.len(),
            mappings.len(),
            source
        );
        self.cache.replace_all(urls, mappings);

        Ok(source)
    }

    pub fn custom_urls(&self) -> Vec<CustomUrl> {
        self.cache.custom_urls()
    }

    /// Verses currently pointing at a custom URL
    pub fn mappings(&self) -> Vec<AudioUrlMapping> {
        self.cache.assigned_mappings()
    }

    pub fn create_custom_url(&self, url: &str, label: Option<&str>) -> StoreResult<Written<CustomUrl>> {
        let mut custom = CustomUrl::new(url);
        custom.label = clean_label(label);
        self.save_url(custom)
    }

    /// Changes a custom URL and rewrites the mappings that point at it
    pub fn update_custom_url(
        &self,
        id: CustomUrlId,
        url: &str,
        label: Option<&str>,
    ) -> StoreResult<Written<CustomUrl>> {
        let existing = self.require_url(id)?;
        let updated = CustomUrl {
            url: url.trim().to_string(),
            label: clean_label(label),
            ..existing
        };

        let mut written = self.save_url(updated)?;
        for identity in self.cache.references(id) {
            let mapping = AudioUrlMapping::assigned(identity, &written.record);
            let outcome = self.save_mapping(mapping)?;
            written.outcome = written.outcome.combine(outcome);
        }
        Ok(written)
    }

    /// Deletes a custom URL that no verse references
    ///
    /// Rejected with [`StoreError::UrlInUse`] before any write otherwise.
    pub fn delete_custom_url(&self, id: CustomUrlId) -> StoreResult<WriteOutcome> {
        let existing = self.require_url(id)?;

        let references = self.cache.references(id);
        if !references.is_empty() {
            return Err(StoreError::UrlInUse {
                url: existing.url,
                references: references.len(),
            });
        }

        let outcome = self.repo.delete(CUSTOM_URLS, &id.as_string())?;
        self.cache.remove_custom_url(id);
        Ok(outcome)
    }

    /// Returns the custom URL with this address, creating it if needed
    pub fn upsert_by_url(&self, url: &str, label: Option<&str>) -> StoreResult<Written<CustomUrl>> {
        match self.cache.find_by_url(url.trim()) {
            Some(existing) => Ok(Written {
                record: existing,
                outcome: WriteOutcome::Unchanged,
            }),
            None => self.create_custom_url(url, label),
        }
    }

    /// Points a verse at a custom URL
    pub fn assign(&self, identity: VerseIdentity, url_id: CustomUrlId) -> StoreResult<Written<AudioUrlMapping>> {
        check_identity(identity)?;
        let url = self.require_url(url_id)?;

        let mapping = AudioUrlMapping::assigned(identity, &url);
        let outcome = self.save_mapping(mapping.clone())?;
        Ok(Written {
            record: mapping,
            outcome,
        })
    }

    /// Returns a verse to the default URL pattern
    pub fn clear(&self, identity: VerseIdentity) -> StoreResult<Written<AudioUrlMapping>> {
        check_identity(identity)?;

        let mapping = AudioUrlMapping::cleared(identity);
        let outcome = self.save_mapping(mapping.clone())?;
        Ok(Written {
            record: mapping,
            outcome,
        })
    }

    /// Subscribes to both collections
    pub fn subscribe(&self) -> StoreResult<Vec<Subscription>> {
        Ok(vec![
            self.repo.subscribe(CUSTOM_URLS)?,
            self.repo.subscribe(AUDIO_MAPPINGS)?,
        ])
    }

    /// Applies a real-time delta to the cache and mirror
    ///
    /// Returns false for deltas of other collections or undecodable documents.
    pub fn apply_change(&self, change: &DocumentChange) -> bool {
        let applied = match change.collection.as_str() {
            CUSTOM_URLS => self.apply_url_change(change),
            AUDIO_MAPPINGS => self.apply_mapping_change(change),
            _ => false,
        };
        if applied {
            self.repo.apply_remote_change(change);
        }
        applied
    }

    fn apply_url_change(&self, change: &DocumentChange) -> bool {
        match change.kind {
            ChangeKind::Removed => match CustomUrlId::from_string(&change.document.id) {
                Ok(id) => {
                    self.cache.remove_custom_url(id);
                    true
                }
                Err(e) => {
                    log::debug!("Ignoring removal of custom URL '{}': {}", change.document.id, e);
                    false
                }
            },
            ChangeKind::Added | ChangeKind::Modified => match change.document.decode::<CustomUrl>() {
                Ok(url) => {
                    self.cache.put_custom_url(url);
                    true
                }
                Err(e) => {
                    log::debug!("Ignoring malformed custom URL delta: {}", e);
                    false
                }
            },
        }
    }

    fn apply_mapping_change(&self, change: &DocumentChange) -> bool {
        match change.kind {
            ChangeKind::Removed => match VerseIdentity::from_document_key(&change.document.id) {
                Some(identity) => {
                    self.cache.remove_mapping(identity);
                    true
                }
                None => false,
            },
            ChangeKind::Added | ChangeKind::Modified => {
                match change.document.decode::<AudioUrlMapping>() {
                    Ok(mapping) => {
                        self.cache.set_mapping(mapping);
                        true
                    }
                    Err(e) => {
                        log::debug!("Ignoring malformed mapping delta: {}", e);
                        false
                    }
                }
            }
        }
    }

    fn require_url(&self, id: CustomUrlId) -> StoreResult<CustomUrl> {
        self.cache.custom_url(id).ok_or_else(|| StoreError::NotFound {
            collection: CUSTOM_URLS.to_string(),
            id: id.to_string(),
        })
    }

    fn save_url(&self, url: CustomUrl) -> StoreResult<Written<CustomUrl>> {
        url.validate()
            .map_err(|errors| StoreError::InvalidRecord(errors.join("; ")))?;

        let outcome = self.repo.write(CUSTOM_URLS, &url.id.as_string(), encode(&url)?)?;
        self.cache.put_custom_url(url.clone());
        Ok(Written {
            record: url,
            outcome,
        })
    }

    fn save_mapping(&self, mapping: AudioUrlMapping) -> StoreResult<WriteOutcome> {
        let outcome = self.repo.write(
            AUDIO_MAPPINGS,
            &mapping.identity.document_key(),
            encode(&mapping)?,
        )?;
        self.cache.set_mapping(mapping);
        Ok(outcome)
    }
}

fn clean_label(label: Option<&str>) -> Option<String> {
    label
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

fn check_identity(identity: VerseIdentity) -> StoreResult<()> {
    identity
        .validate()
        .map_err(|errors| StoreError::InvalidRecord(errors.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::local::MemoryLocalStorage;
    use crate::memory::MemoryDocumentStore;

    fn setup() -> (Arc<MemoryDocumentStore>, AudioUrlStore) {
        let remote = Arc::new(MemoryDocumentStore::new());
        let local = Arc::new(MemoryLocalStorage::default());
        let repo = Arc::new(FallbackRepository::new(remote.clone(), local));
        (remote, AudioUrlStore::new(repo, AudioUrlCache::new()))
    }

    #[test]
    fn test_assign_sets_override() {
        let (_remote, store) = setup();
        let verse = VerseIdentity::new_unchecked(1, 1);

        let url = store
            .create_custom_url(" https://cdn.example.org/fatiha-1.mp3 ", Some("Husary"))
            .unwrap()
            .record;
        assert_eq!(url.url, "https://cdn.example.org/fatiha-1.mp3");

        store.assign(verse, url.id).unwrap();
        assert_eq!(
            store.cache().override_url(verse).as_deref(),
            Some("https://cdn.example.org/fatiha-1.mp3")
        );
        assert_eq!(store.mappings().len(), 1);
    }

    #[test]
    fn test_delete_referenced_url_rejected_without_write() {
        let (remote, store) = setup();
        let verse = VerseIdentity::new_unchecked(2, 255);
        let url = store
            .create_custom_url("https://cdn.example.org/kursi.mp3", None)
            .unwrap()
            .record;
        store.assign(verse, url.id).unwrap();

        let attempts = remote.write_attempts();
        let err = store.delete_custom_url(url.id).unwrap_err();
        assert!(matches!(err, StoreError::UrlInUse { references: 1, .. }));
        assert_eq!(remote.write_attempts(), attempts);
        assert_eq!(remote.len(CUSTOM_URLS), 1);

        store.clear(verse).unwrap();
        store.delete_custom_url(url.id).unwrap();
        assert!(store.custom_urls().is_empty());
        assert_eq!(remote.len(CUSTOM_URLS), 0);
    }

    #[test]
    fn test_delete_after_repoint() {
        let (_remote, store) = setup();
        let verse = VerseIdentity::new_unchecked(3, 1);
        let old = store.create_custom_url("https://a.example.org/1.mp3", None).unwrap().record;
        let new = store.create_custom_url("https://b.example.org/1.mp3", None).unwrap().record;

        store.assign(verse, old.id).unwrap();
        store.assign(verse, new.id).unwrap();
        assert!(store.delete_custom_url(old.id).is_ok());
    }

    #[test]
    fn test_upsert_by_url_reuses_existing() {
        let (remote, store) = setup();
        let first = store.upsert_by_url("https://a.example.org/x.mp3", None).unwrap();
        let second = store.upsert_by_url("https://a.example.org/x.mp3 ", Some("dup")).unwrap();

        assert_eq!(first.record.id, second.record.id);
        assert_eq!(second.outcome, WriteOutcome::Unchanged);
        assert_eq!(remote.len(CUSTOM_URLS), 1);
    }

    #[test]
    fn test_update_rewrites_mappings() {
        let (_remote, store) = setup();
        let verse = VerseIdentity::new_unchecked(36, 1);
        let url = store.create_custom_url("https://a.example.org/old.mp3", None).unwrap().record;
        store.assign(verse, url.id).unwrap();

        store
            .update_custom_url(url.id, "https://a.example.org/new.mp3", Some("Sudais"))
            .unwrap();
        assert_eq!(
            store.cache().override_url(verse).as_deref(),
            Some("https://a.example.org/new.mp3")
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        let (_remote, store) = setup();
        let err = store.create_custom_url("ftp://x/y.mp3", None).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));

        let err = store.assign(VerseIdentity::new_unchecked(1, 1), CustomUrlId::new()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_load_falls_back_to_mirror() {
        let (remote, store) = setup();
        let verse = VerseIdentity::new_unchecked(1, 2);
        let url = store.create_custom_url("https://a.example.org/2.mp3", None).unwrap().record;
        store.assign(verse, url.id).unwrap();

        remote.set_offline(true);
        store.cache().replace_all(Vec::new(), Vec::new());

        assert_eq!(store.load().unwrap(), DataSource::LocalMirror);
        assert!(store.cache().override_url(verse).is_some());
    }

    #[test]
    fn test_apply_change_updates_cache() {
        let (_remote, store) = setup();
        let url = CustomUrl::new("https://remote.example.org/9.mp3");
        let verse = VerseIdentity::new_unchecked(9, 1);
        let mapping = AudioUrlMapping::assigned(verse, &url);

        let add = |collection: &str, id: String, fields| DocumentChange {
            collection: collection.to_string(),
            kind: ChangeKind::Added,
            document: Document::new(id, fields),
        };

        assert!(store.apply_change(&add(CUSTOM_URLS, url.id.as_string(), encode(&url).unwrap())));
        assert!(store.apply_change(&add(
            AUDIO_MAPPINGS,
            verse.document_key(),
            encode(&mapping).unwrap()
        )));
        assert_eq!(store.cache().override_url(verse).as_deref(), Some(url.url.as_str()));

        let removed = DocumentChange {
            collection: AUDIO_MAPPINGS.to_string(),
            kind: ChangeKind::Removed,
            document: Document::new(verse.document_key(), Default::default()),
        };
        assert!(store.apply_change(&removed));
        assert_eq!(store.cache().override_url(verse), None);

        let unrelated = add("bookmarks", "x".to_string(), Default::default());
        assert!(!store.apply_change(&unrelated));
    }

    #[test]
    fn test_offline_assign_saved_locally() {
        let (remote, store) = setup();
        let url = store.create_custom_url("https://a.example.org/3.mp3", None).unwrap().record;
        remote.set_offline(true);

        let written = store.assign(VerseIdentity::new_unchecked(1, 3), url.id).unwrap();
        assert!(written.outcome.is_local_only());
        assert!(store
            .cache()
            .override_url(VerseIdentity::new_unchecked(1, 3))
            .is_some());
    }
}
