//! Verse-by-verse playback coordinator
//!
//! Owns at most one media handle at a time. Starting a different verse pauses
//! and drops the current handle before the next one is created, and every
//! media event is checked against the token of the handle that is current
//! when it is applied, so late callbacks from a torn-down handle cannot touch
//! the new session.
//!
//! The coordinator never blocks and never spawns. The host drives it:
//! - [`PlaybackCoordinator::pump_media_events`] applies queued media events
//! - [`PlaybackCoordinator::run_due_tasks`] fires a scheduled auto-advance

use crate::clock::Clock;
use crate::error::{MediaError, PlaybackError, PlaybackResult};
use crate::events::{EventBus, PlaybackEvent};
use crate::media::{MediaEvent, MediaEventKind, MediaEventSink, MediaFactory, MediaHandle};
use crate::resolver::AudioUrlResolver;
use crate::state::{PlaybackStatus, Progress, SessionToken};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tilawah_config::PlayerConfig;
use tilawah_core::{AppError, VerseIdentity};
use tilawah_verse_data::VerseProvider;

/// Delay between the end of one verse and the start of the next
pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(300);

struct Session {
    identity: VerseIdentity,
    token: SessionToken,
    url: String,
    media: Box<dyn MediaHandle>,
    auto_advance: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    next: VerseIdentity,
    due: Duration,
    /// Token of the session that ended
    token: SessionToken,
}

pub struct PlaybackCoordinator {
    factory: Box<dyn MediaFactory>,
    resolver: AudioUrlResolver,
    verses: Arc<dyn VerseProvider>,
    clock: Arc<dyn Clock>,
    advance_delay: Duration,

    status: PlaybackStatus,
    session: Option<Session>,
    playing_verse: Option<VerseIdentity>,
    last_token: SessionToken,
    pending_advance: Option<PendingAdvance>,

    media_tx: Sender<MediaEvent>,
    media_rx: Receiver<MediaEvent>,
    events: EventBus,
}

impl PlaybackCoordinator {
    pub fn new(
        factory: Box<dyn MediaFactory>,
        resolver: AudioUrlResolver,
        verses: Arc<dyn VerseProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (media_tx, media_rx) = unbounded();
        Self {
            factory,
            resolver,
            verses,
            clock,
            advance_delay: DEFAULT_ADVANCE_DELAY,
            status: PlaybackStatus::Idle,
            session: None,
            playing_verse: None,
            last_token: SessionToken::new(0),
            pending_advance: None,
            media_tx,
            media_rx,
            events: EventBus::new(),
        }
    }

    pub fn with_config(mut self, config: &PlayerConfig) -> Self {
        self.advance_delay = Duration::from_millis(config.advance_delay_ms);
        self
    }

    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// The verse whose audio started playing, kept while paused
    pub fn playing_verse(&self) -> Option<VerseIdentity> {
        self.playing_verse
    }

    /// The verse of the live session, including while it is still loading
    pub fn session_verse(&self) -> Option<VerseIdentity> {
        self.session.as_ref().map(|s| s.identity)
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// The verse an auto-advance is waiting to start, if any
    pub fn pending_advance(&self) -> Option<VerseIdentity> {
        self.pending_advance.map(|p| p.next)
    }

    pub fn resolver(&self) -> &AudioUrlResolver {
        &self.resolver
    }

    /// Plays `identity`, or toggles it if it is already the session verse
    ///
    /// Toggling pauses a playing verse, resumes a paused one and does
    /// nothing while loading. Any other verse replaces the current session.
    /// Only an unknown verse is an error; media failures are published as
    /// [`PlaybackEvent::Error`] and leave the status at `Failed`.
    pub fn play_audio(&mut self, identity: VerseIdentity, auto_advance: bool) -> PlaybackResult<()> {
        let known = self
            .verses
            .chapter(identity.chapter)
            .is_some_and(|meta| meta.contains(identity.verse));
        if !known {
            return Err(PlaybackError::InvalidVerse {
                chapter: identity.chapter,
                verse: identity.verse,
            });
        }

        if self.session_verse() == Some(identity) {
            match self.status {
                PlaybackStatus::Playing => self.pause_audio(),
                PlaybackStatus::Paused => self.resume_audio(),
                _ => log::debug!("{} is still loading, ignoring repeated play", identity),
            }
            return Ok(());
        }

        self.teardown();
        self.pending_advance = None;
        self.playing_verse = None;

        let token = self.last_token.next();
        self.last_token = token;

        let url = self.resolver.resolve(identity);
        let sink = MediaEventSink::new(token, self.media_tx.clone());

        match self.factory.create(&url, sink) {
            Ok(media) => {
                log::info!("Loading {} from {} (session {})", identity, url, token);
                self.session = Some(Session {
                    identity,
                    token,
                    url,
                    media,
                    auto_advance,
                });
                self.events.publish(PlaybackEvent::VerseChanged(identity));
                self.set_status(PlaybackStatus::Loading);
            }
            Err(e) => {
                log::warn!("Could not create media for {}: {}", identity, e);
                self.report_failure(Some(identity), e.to_app_error());
            }
        }

        Ok(())
    }

    /// Pauses the current verse; no-op unless playing
    pub fn pause_audio(&mut self) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.media.pause();
            self.set_status(PlaybackStatus::Paused);
        }
    }

    /// Resumes a paused verse; no-op unless paused
    ///
    /// A refused resume is published as an error and the session stays paused.
    pub fn resume_audio(&mut self) {
        if self.status != PlaybackStatus::Paused {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match session.media.play() {
            Ok(()) => self.set_status(PlaybackStatus::Playing),
            Err(e) => {
                let verse = Some(session.identity);
                log::warn!("Resume of {} refused: {}", session.identity, e);
                self.events.publish(PlaybackEvent::Error {
                    verse,
                    message: e.to_app_error().user_message(),
                });
            }
        }
    }

    /// Stops everything and cancels a pending auto-advance
    pub fn stop_audio(&mut self) {
        self.teardown();
        self.pending_advance = None;
        self.playing_verse = None;
        if self.status != PlaybackStatus::Idle {
            self.set_status(PlaybackStatus::Idle);
        }
    }

    /// Turns auto-advance on or off for the current session only
    ///
    /// Turning it off also drops an advance that is already waiting, and the
    /// status goes from `Ended` to `Idle`.
    pub fn set_auto_advance(&mut self, auto_advance: bool) {
        if let Some(session) = self.session.as_mut() {
            session.auto_advance = auto_advance;
        }
        if !auto_advance && self.pending_advance.take().is_some() {
            self.set_status(PlaybackStatus::Idle);
        }
    }

    pub fn seek(&mut self, seconds: f64) -> PlaybackResult<()> {
        let session = self.session.as_mut().ok_or(PlaybackError::NoActiveSession)?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(MediaError::SeekFailed(format!("invalid position {}", seconds)).into());
        }
        session.media.seek(seconds)?;
        Ok(())
    }

    pub fn progress(&self) -> Option<Progress> {
        self.session.as_ref().map(|s| Progress {
            position: s.media.current_time(),
            duration: s.media.duration(),
        })
    }

    /// Applies every queued media event in arrival order
    ///
    /// Returns how many events belonged to the current session.
    pub fn pump_media_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.media_rx.try_recv() {
            if self.apply_media_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Starts a scheduled auto-advance whose deadline has passed
    ///
    /// Returns true if a new verse was started.
    pub fn run_due_tasks(&mut self) -> bool {
        let Some(pending) = self.pending_advance else {
            return false;
        };
        if self.clock.now() < pending.due {
            return false;
        }
        self.pending_advance = None;

        if pending.token != self.last_token {
            log::debug!(
                "Dropping auto-advance to {} from superseded session {}",
                pending.next,
                pending.token
            );
            return false;
        }

        match self.play_audio(pending.next, true) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Auto-advance to {} failed: {}", pending.next, e);
                false
            }
        }
    }

    fn apply_media_event(&mut self, event: MediaEvent) -> bool {
        let current = self.session.as_ref().map(|s| s.token);
        if current != Some(event.token) {
            log::debug!(
                "Dropping stale {:?} from session {} (current {:?})",
                event.kind,
                event.token,
                current.map(|t| t.value())
            );
            return false;
        }

        match event.kind {
            MediaEventKind::Ready => self.on_ready(),
            MediaEventKind::Playing => {
                if self.status == PlaybackStatus::Paused {
                    self.set_status(PlaybackStatus::Playing);
                }
            }
            MediaEventKind::Paused => {
                if self.status == PlaybackStatus::Playing {
                    self.set_status(PlaybackStatus::Paused);
                }
            }
            MediaEventKind::Ended => self.on_ended(),
            MediaEventKind::Error(reason) => {
                let Some(session) = self.session.take() else {
                    return true;
                };
                log::warn!("Media error for {}: {}", session.identity, reason);
                let error = AppError::AudioLoadFailed {
                    url: session.url,
                    reason,
                };
                self.report_failure(Some(session.identity), error);
            }
        }
        true
    }

    fn on_ready(&mut self) {
        if self.status != PlaybackStatus::Loading {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match session.media.play() {
            Ok(()) => {
                self.playing_verse = Some(session.identity);
                self.set_status(PlaybackStatus::Playing);
            }
            Err(e) => {
                let identity = session.identity;
                log::warn!("Playback of {} rejected: {}", identity, e);
                self.teardown();
                self.report_failure(Some(identity), e.to_app_error());
            }
        }
    }

    fn on_ended(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let identity = session.identity;
        let auto_advance = session.auto_advance;
        drop(session);

        self.playing_verse = None;
        self.status = PlaybackStatus::Ended;
        self.events.publish(PlaybackEvent::StateChanged {
            status: PlaybackStatus::Ended,
            verse: Some(identity),
        });

        let has_next = self
            .verses
            .chapter(identity.chapter)
            .is_some_and(|meta| meta.has_next(identity.verse));

        if auto_advance && has_next {
            let next = identity.next();
            self.pending_advance = Some(PendingAdvance {
                next,
                due: self.clock.now() + self.advance_delay,
                token: self.last_token,
            });
            self.events.publish(PlaybackEvent::AdvanceScheduled {
                next,
                delay: self.advance_delay,
            });
        } else {
            if auto_advance {
                log::info!("Reached the end of chapter {}", identity.chapter);
            }
            self.set_status(PlaybackStatus::Idle);
        }
    }

    /// Pauses and releases the current handle, invalidating its token
    fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.media.pause();
            log::debug!("Released media for {} (session {})", session.identity, session.token);
        }
    }

    fn report_failure(&mut self, verse: Option<VerseIdentity>, error: AppError) {
        self.session = None;
        self.playing_verse = None;
        self.events.publish(PlaybackEvent::Error {
            verse,
            message: error.user_message(),
        });
        self.set_status(PlaybackStatus::Failed);
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        self.status = status;
        let verse = self.playing_verse.or_else(|| self.session_verse());
        self.events
            .publish(PlaybackEvent::StateChanged { status, verse });
    }
}

impl Drop for PlaybackCoordinator {
    fn drop(&mut self) {
        self.teardown();
    }
}
