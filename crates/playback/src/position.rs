//! Debounced persistence of the last reading position
//!
//! Saves are coalesced: only the newest position is written, once no new save
//! has arrived for the debounce window. Restoring never fails; anything that
//! is missing or unreadable is treated as "no saved position".

use crate::clock::Clock;
use std::sync::Arc;
use std::time::Duration;
use tilawah_config::PlayerConfig;
use tilawah_core::{ReadingPosition, Validator, VerseIdentity};
use tilawah_storage::local::set_or_clear_namespace;
use tilawah_storage::{LocalStorage, StoreResult};

/// Local storage key of the reading position record
pub const READING_POSITION_KEY: &str = "tilawah.reading_position";

pub struct PositionSaver {
    storage: Arc<dyn LocalStorage>,
    clock: Arc<dyn Clock>,
    debounce: Duration,
    pending: Option<(ReadingPosition, Duration)>,
}

impl PositionSaver {
    pub fn new(storage: Arc<dyn LocalStorage>, clock: Arc<dyn Clock>, debounce: Duration) -> Self {
        Self {
            storage,
            clock,
            debounce,
            pending: None,
        }
    }

    pub fn from_config(
        storage: Arc<dyn LocalStorage>,
        clock: Arc<dyn Clock>,
        config: &PlayerConfig,
    ) -> Self {
        Self::new(
            storage,
            clock,
            Duration::from_millis(config.position_save_debounce_ms),
        )
    }

    /// Queues a save; the write happens `debounce` after the last call
    pub fn save_reading_position(&mut self, identity: VerseIdentity, scroll_offset: f64, paused: bool) {
        let position = ReadingPosition::new(identity, scroll_offset.max(0.0), paused);
        let due = self.clock.now() + self.debounce;
        self.pending = Some((position, due));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Writes the queued position if its quiet period has passed
    ///
    /// Returns true if something was written.
    pub fn flush_due(&mut self) -> StoreResult<bool> {
        match &self.pending {
            Some((_, due)) if self.clock.now() >= *due => self.flush(),
            _ => Ok(false),
        }
    }

    /// Writes the queued position now
    ///
    /// A failed write keeps the position queued for the next flush.
    pub fn flush(&mut self) -> StoreResult<bool> {
        let Some((position, _)) = &self.pending else {
            return Ok(false);
        };

        let json = serde_json::to_string(position)?;
        set_or_clear_namespace(
            self.storage.as_ref(),
            READING_POSITION_KEY,
            READING_POSITION_KEY,
            &json,
        )?;
        log::debug!("Saved reading position {}", position.identity());
        self.pending = None;
        Ok(true)
    }

    /// The last saved position, if one exists and is well formed
    pub fn restore_reading_position(&self) -> Option<ReadingPosition> {
        let raw = match self.storage.get(READING_POSITION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::debug!("Could not read saved position: {}", e);
                return None;
            }
        };

        let position: ReadingPosition = match serde_json::from_str(&raw) {
            Ok(position) => position,
            Err(e) => {
                log::debug!("Discarding malformed saved position: {}", e);
                return None;
            }
        };

        if let Err(errors) = position.validate() {
            log::debug!("Discarding invalid saved position: {}", errors.join("; "));
            return None;
        }

        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use tilawah_storage::MemoryLocalStorage;

    fn setup() -> (PositionSaver, Arc<MemoryLocalStorage>, ManualClock) {
        let storage = Arc::new(MemoryLocalStorage::default());
        let clock = ManualClock::new();
        let saver = PositionSaver::new(
            storage.clone(),
            Arc::new(clock.clone()),
            Duration::from_millis(1000),
        );
        (saver, storage, clock)
    }

    #[test]
    fn test_save_then_restore() {
        let (mut saver, _storage, _clock) = setup();

        saver.save_reading_position(VerseIdentity::new_unchecked(18, 10), 2400.0, true);
        assert!(saver.flush().unwrap());

        let restored = saver.restore_reading_position().unwrap();
        assert_eq!(restored.identity(), VerseIdentity::new_unchecked(18, 10));
        assert_eq!(restored.scroll_offset, 2400.0);
        assert!(restored.paused);
    }

    #[test]
    fn test_debounce_keeps_latest() {
        let (mut saver, storage, clock) = setup();

        saver.save_reading_position(VerseIdentity::new_unchecked(2, 1), 0.0, false);
        clock.advance(Duration::from_millis(600));
        saver.save_reading_position(VerseIdentity::new_unchecked(2, 2), 80.0, false);
        clock.advance(Duration::from_millis(600));

        assert!(!saver.flush_due().unwrap());
        assert!(storage.get(READING_POSITION_KEY).unwrap().is_none());

        clock.advance(Duration::from_millis(400));
        assert!(saver.flush_due().unwrap());
        assert!(!saver.has_pending());
        assert_eq!(
            saver.restore_reading_position().unwrap().identity(),
            VerseIdentity::new_unchecked(2, 2)
        );
    }

    #[test]
    fn test_malformed_json_is_none() {
        let (saver, storage, _clock) = setup();
        storage.set(READING_POSITION_KEY, "{\"chapter\": ").unwrap();
        assert!(saver.restore_reading_position().is_none());
    }

    #[test]
    fn test_out_of_range_chapter_is_none() {
        let (saver, storage, _clock) = setup();
        storage
            .set(
                READING_POSITION_KEY,
                r#"{"chapter":200,"verse":1,"scroll_offset":0.0,"paused":false,"timestamp":0}"#,
            )
            .unwrap();
        assert!(saver.restore_reading_position().is_none());
    }

    #[test]
    fn test_nothing_saved_is_none() {
        let (saver, _storage, _clock) = setup();
        assert!(saver.restore_reading_position().is_none());
    }

    struct FailingWrites {
        inner: MemoryLocalStorage,
        failing: std::sync::atomic::AtomicBool,
    }

    impl LocalStorage for FailingWrites {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(tilawah_storage::StoreError::Unavailable {
                    operation: "set".to_string(),
                    reason: "disk detached".to_string(),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            self.inner.remove(key)
        }

        fn keys(&self) -> StoreResult<Vec<String>> {
            self.inner.keys()
        }
    }

    #[test]
    fn test_failed_write_stays_queued() {
        let storage = Arc::new(FailingWrites {
            inner: MemoryLocalStorage::default(),
            failing: std::sync::atomic::AtomicBool::new(true),
        });
        let clock = ManualClock::new();
        let mut saver = PositionSaver::new(
            storage.clone(),
            Arc::new(clock.clone()),
            Duration::from_millis(1000),
        );

        saver.save_reading_position(VerseIdentity::new_unchecked(55, 13), 300.0, false);
        clock.advance(Duration::from_millis(1000));
        assert!(saver.flush_due().is_err());
        assert!(saver.has_pending());

        storage
            .failing
            .store(false, std::sync::atomic::Ordering::SeqCst);
        assert!(saver.flush_due().unwrap());
        assert!(!saver.has_pending());
        assert_eq!(
            saver.restore_reading_position().unwrap().identity(),
            VerseIdentity::new_unchecked(55, 13)
        );
    }
}
