//! Reader session facade
//!
//! Ties the coordinator, the viewport anchor and the position saver together
//! the way a reading screen uses them: playback actions lock the viewport
//! first, every status change is remembered as the reading position, and a
//! saved position is restored after the page has had time to render.

use crate::anchor::ViewportAnchor;
use crate::clock::Clock;
use crate::coordinator::PlaybackCoordinator;
use crate::error::PlaybackResult;
use crate::events::PlaybackEvent;
use crate::position::PositionSaver;
use crate::state::PlaybackStatus;
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::time::Duration;
use tilawah_config::PlayerConfig;
use tilawah_core::{ReadingPosition, VerseIdentity};

/// What happened during one [`ReaderSession::tick`]
#[derive(Debug, Default)]
pub struct ReaderTick {
    pub events: Vec<PlaybackEvent>,
    /// Offset the host should scroll to now
    pub scroll_to: Option<f64>,
}

pub struct ReaderSession {
    coordinator: PlaybackCoordinator,
    anchor: ViewportAnchor,
    positions: PositionSaver,
    events: Receiver<PlaybackEvent>,
    clock: Arc<dyn Clock>,
    auto_advance: bool,
    resume_delay: Duration,
    scroll_offset: f64,
    last_verse: Option<VerseIdentity>,
    pending_scroll: Option<(f64, Duration)>,
}

impl ReaderSession {
    pub fn new(
        mut coordinator: PlaybackCoordinator,
        anchor: ViewportAnchor,
        positions: PositionSaver,
        clock: Arc<dyn Clock>,
        config: &PlayerConfig,
    ) -> Self {
        let events = coordinator.subscribe();
        Self {
            coordinator,
            anchor,
            positions,
            events,
            clock,
            auto_advance: config.auto_advance,
            resume_delay: Duration::from_millis(config.resume_scroll_delay_ms),
            scroll_offset: 0.0,
            last_verse: None,
            pending_scroll: None,
        }
    }

    pub fn coordinator(&self) -> &PlaybackCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut PlaybackCoordinator {
        &mut self.coordinator
    }

    pub fn anchor(&self) -> &ViewportAnchor {
        &self.anchor
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn play(&mut self, identity: VerseIdentity) -> PlaybackResult<()> {
        self.anchor.lock(self.scroll_offset);
        self.coordinator.play_audio(identity, self.auto_advance)
    }

    pub fn pause(&mut self) {
        self.anchor.lock(self.scroll_offset);
        self.coordinator.pause_audio();
    }

    pub fn resume(&mut self) {
        self.anchor.lock(self.scroll_offset);
        self.coordinator.resume_audio();
    }

    pub fn stop(&mut self) {
        self.anchor.lock(self.scroll_offset);
        self.coordinator.stop_audio();
    }

    /// Reports a scroll from the host
    ///
    /// Returns the offset to jump back to while the anchor is holding.
    pub fn on_scroll(&mut self, observed: f64) -> Option<f64> {
        if let Some(target) = self.anchor.correction(observed) {
            return Some(target);
        }
        self.scroll_offset = observed;
        None
    }

    /// Reads the saved position and schedules the scroll restore
    pub fn restore(&mut self) -> Option<ReadingPosition> {
        let position = self.positions.restore_reading_position()?;
        self.last_verse = Some(position.identity());
        self.scroll_offset = position.scroll_offset;
        self.pending_scroll = Some((position.scroll_offset, self.clock.now() + self.resume_delay));
        log::info!("Restored reading position {}", position.identity());
        Some(position)
    }

    /// Drives media events, auto-advance and due position writes
    pub fn tick(&mut self) -> ReaderTick {
        self.coordinator.pump_media_events();
        self.coordinator.run_due_tasks();

        let events: Vec<PlaybackEvent> = self.events.try_iter().collect();
        for event in &events {
            match event {
                PlaybackEvent::VerseChanged(verse) => self.last_verse = Some(*verse),
                PlaybackEvent::StateChanged { status, verse } => {
                    if let Some(verse) = verse.or(self.last_verse) {
                        let paused = !matches!(status, PlaybackStatus::Playing | PlaybackStatus::Loading);
                        self.positions
                            .save_reading_position(verse, self.scroll_offset, paused);
                    }
                }
                PlaybackEvent::AdvanceScheduled { .. } | PlaybackEvent::Error { .. } => {}
            }
        }

        if let Err(e) = self.positions.flush_due() {
            log::warn!("Could not save reading position: {}", e);
        }

        let scroll_to = match self.pending_scroll {
            Some((offset, due)) if self.clock.now() >= due => {
                self.pending_scroll = None;
                self.anchor.lock(offset);
                Some(offset)
            }
            _ => None,
        };

        ReaderTick { events, scroll_to }
    }

    /// Writes any queued position immediately, e.g. before exit
    pub fn flush_position(&mut self) {
        if let Err(e) = self.positions.flush() {
            log::warn!("Could not save reading position: {}", e);
        }
    }
}
