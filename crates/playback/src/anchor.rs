//! Viewport anchor
//!
//! Holds the reader's scroll offset steady for a short window after a
//! playback action, so that content reflowing around the highlighted verse
//! does not move the page under the user. The host asks for a correction from
//! its own scroll callback; nothing here polls.

use crate::clock::Clock;
use std::sync::Arc;
use std::time::Duration;
use tilawah_config::PlayerConfig;

#[derive(Debug, Clone, Copy)]
struct Lock {
    target: f64,
    until: Duration,
}

pub struct ViewportAnchor {
    clock: Arc<dyn Clock>,
    window: Duration,
    tolerance: f64,
    lock: Option<Lock>,
}

impl ViewportAnchor {
    pub fn new(clock: Arc<dyn Clock>, window: Duration, tolerance: f64) -> Self {
        Self {
            clock,
            window,
            tolerance: tolerance.max(0.0),
            lock: None,
        }
    }

    pub fn from_config(clock: Arc<dyn Clock>, config: &PlayerConfig) -> Self {
        Self::new(
            clock,
            Duration::from_millis(config.scroll_lock_window_ms),
            config.scroll_tolerance_px,
        )
    }

    /// Pins `target_offset` for the lock window, replacing any earlier lock
    pub fn lock(&mut self, target_offset: f64) {
        self.lock = Some(Lock {
            target: target_offset,
            until: self.clock.now() + self.window,
        });
    }

    pub fn unlock(&mut self) {
        self.lock = None;
    }

    pub fn is_locked(&self) -> bool {
        self.live_lock().is_some()
    }

    pub fn target(&self) -> Option<f64> {
        self.live_lock().map(|lock| lock.target)
    }

    /// Offset to scroll back to, if `observed` drifted while locked
    pub fn correction(&mut self, observed: f64) -> Option<f64> {
        let Some(lock) = self.live_lock() else {
            self.lock = None;
            return None;
        };

        if (observed - lock.target).abs() > self.tolerance {
            Some(lock.target)
        } else {
            None
        }
    }

    fn live_lock(&self) -> Option<Lock> {
        self.lock.filter(|lock| self.clock.now() < lock.until)
    }
}
