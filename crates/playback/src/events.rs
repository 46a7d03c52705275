//! Notifications published by the coordinator

use crate::state::PlaybackStatus;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::Duration;
use tilawah_core::VerseIdentity;

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    StateChanged {
        status: PlaybackStatus,
        verse: Option<VerseIdentity>,
    },
    /// A new verse became the session verse
    VerseChanged(VerseIdentity),
    AdvanceScheduled {
        next: VerseIdentity,
        delay: Duration,
    },
    /// Something the user should hear about; `message` is display-ready
    Error {
        verse: Option<VerseIdentity>,
        message: String,
    },
}

/// Fan-out of playback events to any number of receivers
///
/// Receivers that have been dropped are pruned on the next publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<PlaybackEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: PlaybackEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
