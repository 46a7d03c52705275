//! Player configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Playback coordinator and reader behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Continue with the next verse when one finishes
    pub auto_advance: bool,

    /// Delay before auto-advancing to the next verse, in milliseconds
    pub advance_delay_ms: u64,

    /// Quiet period before the reading position is written, in milliseconds
    pub position_save_debounce_ms: u64,

    /// Delay before restoring the saved scroll offset on start, in milliseconds
    pub resume_scroll_delay_ms: u64,

    /// How long the viewport anchor holds after a playback action, in milliseconds
    pub scroll_lock_window_ms: u64,

    /// Drift in pixels tolerated before the viewport anchor corrects
    pub scroll_tolerance_px: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            auto_advance: true,
            advance_delay_ms: 300,
            position_save_debounce_ms: 1000,
            resume_scroll_delay_ms: 500,
            scroll_lock_window_ms: 1500,
            scroll_tolerance_px: 4.0,
        }
    }
}

impl ConfigSection for PlayerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(self.advance_delay_ms, 0, 5000, "player.advance_delay_ms"),
            Validator::in_range(
                self.position_save_debounce_ms,
                100,
                10_000,
                "player.position_save_debounce_ms",
            ),
            Validator::in_range(
                self.resume_scroll_delay_ms,
                0,
                5000,
                "player.resume_scroll_delay_ms",
            ),
            Validator::in_range(
                self.scroll_lock_window_ms,
                100,
                10_000,
                "player.scroll_lock_window_ms",
            ),
            Validator::in_range(self.scroll_tolerance_px, 0.0, 200.0, "player.scroll_tolerance_px"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.auto_advance = other.auto_advance;
        self.advance_delay_ms = other.advance_delay_ms;
        self.position_save_debounce_ms = other.position_save_debounce_ms;
        self.resume_scroll_delay_ms = other.resume_scroll_delay_ms;
        self.scroll_lock_window_ms = other.scroll_lock_window_ms;
        self.scroll_tolerance_px = other.scroll_tolerance_px;
    }

    fn section_name(&self) -> &'static str {
        "player"
    }
}
