//! Tilawah playback
//!
//! Plays a chapter one verse at a time. The [`PlaybackCoordinator`] owns the
//! single live media handle and its session token, the [`AudioUrlResolver`]
//! picks the URL for each verse, and the [`ReaderSession`] adds viewport
//! anchoring and reading-position persistence on top.
//!
//! Everything here is synchronous. The host calls
//! [`PlaybackCoordinator::pump_media_events`] and
//! [`PlaybackCoordinator::run_due_tasks`] (or [`ReaderSession::tick`]) from
//! its own loop.

pub mod anchor;
pub mod clock;
pub mod coordinator;
mod error;
pub mod events;
pub mod media;
pub mod playback_thread;
pub mod position;
pub mod reader;
pub mod resolver;
mod state;

pub use anchor::ViewportAnchor;
pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{PlaybackCoordinator, DEFAULT_ADVANCE_DELAY};
pub use error::{MediaError, PlaybackError, PlaybackResult};
pub use events::{EventBus, PlaybackEvent};
pub use media::{MediaEvent, MediaEventKind, MediaEventSink, MediaFactory, MediaHandle};
pub use playback_thread::SimulatedMediaFactory;
pub use position::{PositionSaver, READING_POSITION_KEY};
pub use reader::{ReaderSession, ReaderTick};
pub use resolver::AudioUrlResolver;
pub use state::{PlaybackStatus, Progress, SessionToken};
