//! Consecutive-failure breaker for the remote store
//!
//! After `failure_threshold` remote failures in a row the remote is skipped
//! for `cooldown`, then a single trial call is let through.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Remote calls flow normally
    Closed,
    /// Remote calls are skipped
    Open,
    /// Cooldown elapsed, next call decides
    HalfOpen,
}

#[derive(Debug)]
struct State {
    state: BreakerState,
    failures: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct RemoteBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    state: Mutex<State>,
}

impl RemoteBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            cooldown,
            state: Mutex::new(State {
                state: BreakerState::Closed,
                failures: 0,
                opened_at: None,
            }),
        }
    }

    /// Builds a breaker from the `[storage]` config section
    pub fn from_config(config: &tilawah_config::StorageConfig) -> Self {
        Self::new(
            config.remote_failure_threshold,
            Duration::from_secs(config.remote_cooldown_secs),
        )
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    /// Returns true if a remote call should be attempted now
    pub fn allow(&self) -> bool {
        let mut state = self.lock();
        match state.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let elapsed = state.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= self.cooldown {
                    state.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut state = self.lock();
        state.state = BreakerState::Closed;
        state.failures = 0;
        state.opened_at = None;
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.failures = state.failures.saturating_add(1);

        let trip = state.state == BreakerState::HalfOpen || state.failures >= self.failure_threshold;
        if trip {
            if state.state != BreakerState::Open {
                log::warn!(
                    "Remote store skipped for {:?} after {} consecutive failures",
                    self.cooldown,
                    state.failures
                );
            }
            state.state = BreakerState::Open;
            state.opened_at = Some(Instant::now());
        }
    }

    pub fn reset(&self) {
        self.record_success();
    }
}
