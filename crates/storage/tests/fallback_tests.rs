//! Store accessors over a flaky remote

use std::sync::Arc;
use tempfile::TempDir;
use tilawah_config::StorageConfig;
use tilawah_core::{AppError, ErrorSeverity, VerseIdentity};
use tilawah_storage::{
    DataSource, FileLocalStorage, LocalStorage, MemoryDocumentStore, MemoryLocalStorage,
    StoreError, Stores, AUDIO_MAPPINGS,
};

fn verse(chapter: u16, verse: u16) -> VerseIdentity {
    VerseIdentity::new_unchecked(chapter, verse)
}

#[test]
fn test_offline_writes_survive_restart_on_disk() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MemoryDocumentStore::new());
    remote.set_offline(true);

    {
        let local = Arc::new(FileLocalStorage::open(dir.path()).unwrap());
        let stores = Stores::open(remote.clone(), local, &StorageConfig::default());
        let written = stores
            .bookmarks
            .create(verse(67, 1), Some("Blessed is He".to_string()))
            .unwrap();
        assert!(written.outcome.is_local_only());
    }

    let local = Arc::new(FileLocalStorage::open(dir.path()).unwrap());
    let stores = Stores::open(remote, local, &StorageConfig::default());
    let bookmarks = stores.bookmarks.list().unwrap();
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0].note.as_deref(), Some("Blessed is He"));
}

#[test]
fn test_realtime_delta_reaches_second_client() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let admin = Stores::open(
        remote.clone(),
        Arc::new(MemoryLocalStorage::default()),
        &StorageConfig::default(),
    );
    let reader = Stores::open(
        remote.clone(),
        Arc::new(MemoryLocalStorage::default()),
        &StorageConfig::default(),
    );
    let subscriptions = reader.audio_urls.subscribe().unwrap();

    let url = admin
        .audio_urls
        .create_custom_url("https://cdn.example.org/55-13.mp3", None)
        .unwrap()
        .record;
    admin.audio_urls.assign(verse(55, 13), url.id).unwrap();

    for subscription in &subscriptions {
        for change in subscription.drain() {
            reader.audio_urls.apply_change(&change);
        }
    }

    assert_eq!(
        reader.url_cache().override_url(verse(55, 13)).as_deref(),
        Some("https://cdn.example.org/55-13.mp3")
    );
    assert_eq!(subscriptions[1].collection(), AUDIO_MAPPINGS);
}

#[test]
fn test_url_in_use_is_user_facing() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let stores = Stores::open(
        remote,
        Arc::new(MemoryLocalStorage::default()),
        &StorageConfig::default(),
    );
    let url = stores
        .audio_urls
        .create_custom_url("https://cdn.example.org/a.mp3", None)
        .unwrap()
        .record;
    stores.audio_urls.assign(verse(1, 1), url.id).unwrap();
    stores.audio_urls.assign(verse(1, 2), url.id).unwrap();

    let err = stores.audio_urls.delete_custom_url(url.id).unwrap_err();
    assert!(matches!(err, StoreError::UrlInUse { references: 2, .. }));

    let app: AppError = err.into();
    assert_eq!(app.severity(), ErrorSeverity::Rejected);
    assert!(!app.user_message().is_empty());
}

#[test]
fn test_mirror_quota_clears_namespace_only() {
    let remote = Arc::new(MemoryDocumentStore::new());
    remote.set_offline(true);
    let local = Arc::new(MemoryLocalStorage::new(2048));
    local
        .set("tilawah.reading_position", "{\"chapter\":1,\"verse\":1}")
        .unwrap();
    local
        .set("tilawah.mirror.bookmarks", &"x".repeat(1900))
        .unwrap();

    let stores = Stores::open(remote, local.clone(), &StorageConfig::default());
    let written = stores.tafseer.set(verse(1, 1), "Opening", None).unwrap();
    assert!(written.outcome.is_local_only());

    assert!(local.get("tilawah.reading_position").unwrap().is_some());
    assert!(local.get("tilawah.mirror.bookmarks").unwrap().is_none());
    assert_eq!(stores.tafseer.list_for_chapter(1).unwrap().len(), 1);
}

#[test]
fn test_load_reports_source() {
    let remote = Arc::new(MemoryDocumentStore::new());
    let stores = Stores::open(
        remote.clone(),
        Arc::new(MemoryLocalStorage::default()),
        &StorageConfig::default(),
    );
    assert_eq!(stores.audio_urls.load().unwrap(), DataSource::Remote);

    remote.set_permission_denied(true);
    assert_eq!(stores.audio_urls.load().unwrap(), DataSource::LocalMirror);
}
