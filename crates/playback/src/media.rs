//! Seam between the coordinator and whatever actually renders audio
//!
//! A [`MediaFactory`] turns a URL into a [`MediaHandle`]. The handle reports
//! asynchronous progress through the [`MediaEventSink`] it was created with;
//! every event carries the session token of that handle.

use crate::error::MediaError;
use crate::state::SessionToken;
use crossbeam_channel::Sender;

/// What the media primitive observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEventKind {
    /// Enough data is buffered to start playback
    Ready,
    Playing,
    Paused,
    Ended,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEvent {
    pub token: SessionToken,
    pub kind: MediaEventKind,
}

/// Sending half handed to a media handle at creation
#[derive(Debug, Clone)]
pub struct MediaEventSink {
    token: SessionToken,
    tx: Sender<MediaEvent>,
}

impl MediaEventSink {
    pub fn new(token: SessionToken, tx: Sender<MediaEvent>) -> Self {
        Self { token, tx }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// Delivers an event tagged with this sink's token
    ///
    /// Returns false once the coordinator has gone away.
    pub fn send(&self, kind: MediaEventKind) -> bool {
        self.tx
            .send(MediaEvent {
                token: self.token,
                kind,
            })
            .is_ok()
    }
}

/// One loaded audio resource
///
/// Dropping the handle releases it.
pub trait MediaHandle: Send {
    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    /// Seconds from the start of the resource
    fn current_time(&self) -> f64;

    /// Total length in seconds, if known yet
    fn duration(&self) -> Option<f64>;

    fn seek(&mut self, seconds: f64) -> Result<(), MediaError>;
}

pub trait MediaFactory: Send {
    /// Starts loading `url`
    ///
    /// Loading is asynchronous: the handle reports `Ready` (or `Error`)
    /// through `sink` once it can play.
    fn create(&mut self, url: &str, sink: MediaEventSink)
        -> Result<Box<dyn MediaHandle>, MediaError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_sink_tags_events() {
        let (tx, rx) = unbounded();
        let sink = MediaEventSink::new(SessionToken::new(7), tx);

        assert!(sink.send(MediaEventKind::Ready));
        let event = rx.try_recv().expect("event delivered");
        assert_eq!(event.token, SessionToken::new(7));
        assert_eq!(event.kind, MediaEventKind::Ready);
    }

    #[test]
    fn test_sink_reports_closed_channel() {
        let (tx, rx) = unbounded();
        let sink = MediaEventSink::new(SessionToken::new(1), tx);
        drop(rx);
        assert!(!sink.send(MediaEventKind::Ended));
    }
}
