//! Storage wiring for commands that touch user data
//!
//! The command line has no server to talk to. It runs an in-process document
//! store and refills it from the on-disk mirror at startup, so the mirror in
//! the data directory is what carries data between runs.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tilawah_config::{Config, ConfigManager};
use tilawah_playback::AudioUrlResolver;
use tilawah_storage::{
    DataSource, DocumentStore, FallbackRepository, FileLocalStorage, MemoryDocumentStore, Stores,
    AUDIO_MAPPINGS, BOOKMARKS, CUSTOM_URLS, TAFSEER,
};
use tilawah_verse_data::BundledVerseProvider;

const COLLECTIONS: [&str; 4] = [CUSTOM_URLS, AUDIO_MAPPINGS, BOOKMARKS, TAFSEER];

pub struct AppContext {
    pub config: Config,
    pub local: Arc<FileLocalStorage>,
    pub stores: Stores,
}

impl AppContext {
    pub fn open(config: Config, offline: bool) -> Result<Self> {
        let data_dir =
            ConfigManager::data_dir(&config).context("Failed to resolve data directory")?;
        let local = Arc::new(FileLocalStorage::open(&data_dir).with_context(|| {
            format!("Failed to open local storage at {}", data_dir.display())
        })?);

        let remote = Arc::new(MemoryDocumentStore::new());
        let stores = Stores::open(remote.clone(), local.clone(), &config.storage);

        let restored = hydrate(remote.as_ref(), &stores.repository)?;
        log::debug!("Loaded {} documents from {}", restored, data_dir.display());
        remote.set_offline(offline);

        if stores
            .audio_urls
            .load()
            .context("Failed to load audio URL overrides")?
            == DataSource::LocalMirror
        {
            log::info!("Audio URL overrides read from the local mirror");
        }

        Ok(Self {
            config,
            local,
            stores,
        })
    }

    pub fn resolver(&self) -> AudioUrlResolver {
        AudioUrlResolver::from_config(self.stores.url_cache(), &self.config.audio)
    }

    pub fn verses(&self) -> Result<BundledVerseProvider> {
        verse_provider(&self.config)
    }
}

/// Copies every mirrored document into `remote`
fn hydrate(remote: &dyn DocumentStore, repository: &FallbackRepository) -> Result<usize> {
    let mut restored = 0;
    for collection in COLLECTIONS {
        for doc in repository.mirrored(collection) {
            remote
                .write(collection, Some(doc.id.as_str()), doc.fields)
                .with_context(|| format!("Failed to restore {}/{}", collection, doc.id))?;
            restored += 1;
        }
    }
    Ok(restored)
}

/// Verse text provider for the configured bundle directory
///
/// Defaults to `bundle/` inside the data directory.
pub fn verse_provider(config: &Config) -> Result<BundledVerseProvider> {
    let dir: PathBuf = match &config.app.bundle_dir {
        Some(dir) => dir.clone(),
        None => ConfigManager::data_dir(config)
            .context("Failed to resolve data directory")?
            .join("bundle"),
    };
    Ok(BundledVerseProvider::new(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tilawah_core::VerseIdentity;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.app.data_dir = Some(dir.path().to_path_buf());
        config
    }

    #[test]
    fn test_data_survives_between_runs() {
        let temp_dir = TempDir::new().unwrap();
        let kursi = VerseIdentity::new(2, 255).unwrap();

        {
            let ctx = AppContext::open(config_in(&temp_dir), false).unwrap();
            ctx.stores.bookmarks.create(kursi, Some("daily".to_string())).unwrap();
            let url = ctx
                .stores
                .audio_urls
                .create_custom_url("https://cdn.example.com/kursi.mp3", None)
                .unwrap();
            ctx.stores.audio_urls.assign(kursi, url.record.id).unwrap();
        }

        let ctx = AppContext::open(config_in(&temp_dir), false).unwrap();
        assert_eq!(ctx.stores.bookmarks.list().unwrap().len(), 1);
        assert_eq!(
            ctx.resolver().resolve(kursi),
            "https://cdn.example.com/kursi.mp3"
        );
    }

    #[test]
    fn test_offline_changes_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let verse = VerseIdentity::new(112, 1).unwrap();

        {
            let ctx = AppContext::open(config_in(&temp_dir), true).unwrap();
            let written = ctx.stores.tafseer.set(verse, "Sincerity", None).unwrap();
            assert!(written.outcome.is_local_only());
        }

        let ctx = AppContext::open(config_in(&temp_dir), false).unwrap();
        let tafseer = ctx.stores.tafseer.get(verse).unwrap().unwrap();
        assert_eq!(tafseer.text, "Sincerity");
    }

    #[test]
    fn test_bundle_defaults_inside_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let provider = verse_provider(&config_in(&temp_dir)).unwrap();
        assert_eq!(provider.bundle_dir(), temp_dir.path().join("bundle"));
    }
}
