//! Durable local key-value storage
//!
//! Synchronous and capacity-bounded. Callers that hit the quota clear their
//! key namespace and retry once, see [`set_or_clear_namespace`].

use crate::error::{StoreError, StoreResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::NamedTempFile;

/// String key-value storage local to this device
pub trait LocalStorage: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value`, replacing any previous value
    ///
    /// Fails with [`StoreError::QuotaExceeded`] when the value does not fit.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    fn remove(&self, key: &str) -> StoreResult<()>;

    fn keys(&self) -> StoreResult<Vec<String>>;
}

/// Writes `key`, clearing every key under `namespace` and retrying once when
/// the quota is exceeded
pub fn set_or_clear_namespace(
    storage: &dyn LocalStorage,
    namespace: &str,
    key: &str,
    value: &str,
) -> StoreResult<()> {
    match storage.set(key, value) {
        Err(StoreError::QuotaExceeded { bytes, .. }) => {
            log::warn!(
                "Local storage full writing {} ({} bytes), clearing '{}' and retrying",
                key,
                bytes,
                namespace
            );
            clear_namespace(storage, namespace)?;
            storage.set(key, value)
        }
        other => other,
    }
}

/// Removes every key starting with `namespace`
pub fn clear_namespace(storage: &dyn LocalStorage, namespace: &str) -> StoreResult<usize> {
    let mut removed = 0;
    for key in storage.keys()? {
        if key.starts_with(namespace) {
            storage.remove(&key)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Local storage held in memory, with a byte quota over keys and values
pub struct MemoryLocalStorage {
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: usize,
}

impl MemoryLocalStorage {
    pub fn new(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota_bytes,
        }
    }

    /// Bytes currently used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.lock().iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryLocalStorage {
    fn default() -> Self {
        Self::new(5 * 1024 * 1024)
    }
}

impl LocalStorage for MemoryLocalStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.lock();
        let used: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        let needed = key.len() + value.len();

        if used + needed > self.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                bytes: needed,
            });
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }
}

/// Local storage with one file per key under a directory
///
/// Values are written through a temp file and renamed into place.
pub struct FileLocalStorage {
    dir: PathBuf,
}

const FILE_SUFFIX: &str = ".value";

impl FileLocalStorage {
    /// Opens (and creates if needed) a storage directory
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}{}", key, FILE_SUFFIX)))
    }
}

impl LocalStorage for FileLocalStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        let written = temp
            .write_all(value.as_bytes())
            .and_then(|_| temp.flush());
        if let Err(e) = written {
            if e.kind() == std::io::ErrorKind::StorageFull {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    bytes: value.len(),
                });
            }
            return Err(StoreError::io(&path, e));
        }

        temp.persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.dir, e))?;
            if let Some(key) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(FILE_SUFFIX))
            {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_quota() {
        let storage = MemoryLocalStorage::new(16);
        storage.set("a", "0123456789").unwrap();
        let err = storage.set("b", "0123456789").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));

        // Replacing a value only counts the new size
        storage.set("a", "9876543210").unwrap();
        assert_eq!(storage.used_bytes(), 11);
    }

    #[test]
    fn test_clear_and_retry_once() {
        let storage = MemoryLocalStorage::new(40);
        storage.set("tilawah.mirror.a", "xxxxxxxxxx").unwrap();
        storage.set("other", "keep").unwrap();

        set_or_clear_namespace(&storage, "tilawah.mirror.", "tilawah.mirror.b", "yyyyyyyyyy")
            .unwrap();

        assert_eq!(storage.get("tilawah.mirror.a").unwrap(), None);
        assert_eq!(storage.get("other").unwrap().as_deref(), Some("keep"));
        assert!(storage.get("tilawah.mirror.b").unwrap().is_some());
    }

    #[test]
    fn test_retry_gives_up_after_one_attempt() {
        let storage = MemoryLocalStorage::new(8);
        let err = set_or_clear_namespace(&storage, "ns.", "ns.big", "far too large").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = FileLocalStorage::open(dir.path().join("local")).unwrap();

        assert_eq!(storage.get("tilawah.reading_position").unwrap(), None);
        storage.set("tilawah.reading_position", "{\"chapter\":2}").unwrap();
        storage.set("tilawah.mirror.bookmarks", "{}").unwrap();

        assert_eq!(
            storage.get("tilawah.reading_position").unwrap().as_deref(),
            Some("{\"chapter\":2}")
        );
        assert_eq!(
            storage.keys().unwrap(),
            vec!["tilawah.mirror.bookmarks", "tilawah.reading_position"]
        );

        storage.remove("tilawah.reading_position").unwrap();
        storage.remove("tilawah.reading_position").unwrap();
        assert_eq!(storage.keys().unwrap().len(), 1);
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileLocalStorage::open(dir.path()).unwrap();
        assert!(matches!(
            storage.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(storage.get("").is_err());
    }
}
