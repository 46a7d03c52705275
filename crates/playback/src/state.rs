//! Session state shared by the coordinator and its observers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the current playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackStatus {
    Idle,
    Loading,
    Playing,
    Paused,
    Ended,
    Failed,
}

impl PlaybackStatus {
    /// True while a media handle is held (Loading, Playing or Paused)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Loading | Self::Playing | Self::Paused)
    }
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Identifies one media handle
///
/// Tokens increase monotonically. A media event whose token is not the
/// current session's token belongs to a torn-down handle and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The token following this one
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position within the current verse's audio, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Progress {
    pub position: f64,
    /// Unknown until the media primitive has read the stream header
    pub duration: Option<f64>,
}

impl Progress {
    pub fn percentage(&self) -> f32 {
        match self.duration {
            Some(duration) if duration > 0.0 => {
                ((self.position / duration).clamp(0.0, 1.0) * 100.0) as f32
            }
            _ => 0.0,
        }
    }
}
