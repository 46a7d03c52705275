//! Simulated media backend
//!
//! Each handle owns a thread that pretends to stream a clip of fixed length:
//! it reports `Ready` after a load delay, advances its position while playing
//! and reports `Ended` when the clip runs out. Used by the command line
//! player and by tests that want real asynchrony.

use crate::error::MediaError;
use crate::media::{MediaEventKind, MediaEventSink, MediaFactory, MediaHandle};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(10);

/// Commands sent to the playback thread
#[derive(Debug, Clone, Copy, PartialEq)]
enum PlaybackCommand {
    Play,
    Pause,
    Seek(f64),
    Stop,
}

/// Creates [`PlaybackThread`] handles for http(s) URLs
#[derive(Debug, Clone)]
pub struct SimulatedMediaFactory {
    clip_length: Duration,
    load_delay: Duration,
}

impl SimulatedMediaFactory {
    pub fn new(clip_length: Duration) -> Self {
        Self {
            clip_length,
            load_delay: Duration::from_millis(20),
        }
    }

    pub fn with_load_delay(mut self, load_delay: Duration) -> Self {
        self.load_delay = load_delay;
        self
    }
}

impl MediaFactory for SimulatedMediaFactory {
    fn create(
        &mut self,
        url: &str,
        sink: MediaEventSink,
    ) -> Result<Box<dyn MediaHandle>, MediaError> {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(MediaError::LoadFailed {
                url: url.to_string(),
                reason: "unsupported scheme".to_string(),
            });
        }

        let thread = PlaybackThread::start(sink, self.clip_length, self.load_delay)?;
        Ok(Box::new(thread))
    }
}

/// Playback thread handle
pub struct PlaybackThread {
    handle: Option<thread::JoinHandle<()>>,
    command_tx: Sender<PlaybackCommand>,
    running: Arc<AtomicBool>,
    position: Arc<AtomicU64>,
    length: f64,
}

impl PlaybackThread {
    fn start(
        sink: MediaEventSink,
        clip_length: Duration,
        load_delay: Duration,
    ) -> Result<Self, MediaError> {
        let running = Arc::new(AtomicBool::new(true));
        let position = Arc::new(AtomicU64::new(0.0_f64.to_bits()));
        let (command_tx, command_rx) = bounded(10);

        let running_clone = Arc::clone(&running);
        let position_clone = Arc::clone(&position);
        let length = clip_length.as_secs_f64();

        let handle = thread::Builder::new()
            .name(format!("tilawah-media-{}", sink.token().value()))
            .spawn(move || {
                playback_loop(&sink, &command_rx, load_delay, length, &position_clone);
                running_clone.store(false, Ordering::Relaxed);
            })
            .map_err(|e| MediaError::LoadFailed {
                url: String::new(),
                reason: format!("could not start playback thread: {}", e),
            })?;

        Ok(Self {
            handle: Some(handle),
            command_tx,
            running,
            position,
            length,
        })
    }

    fn send_command(&self, cmd: PlaybackCommand) -> bool {
        self.command_tx.send(cmd).is_ok()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn stop(&mut self) {
        self.send_command(PlaybackCommand::Stop);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Playback thread panicked");
            }
        }
    }
}

impl MediaHandle for PlaybackThread {
    fn play(&mut self) -> Result<(), MediaError> {
        if self.is_running() && self.send_command(PlaybackCommand::Play) {
            Ok(())
        } else {
            Err(MediaError::PlayRejected("playback thread has stopped".to_string()))
        }
    }

    fn pause(&mut self) {
        self.send_command(PlaybackCommand::Pause);
    }

    fn current_time(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::Relaxed))
    }

    fn duration(&self) -> Option<f64> {
        Some(self.length)
    }

    fn seek(&mut self, seconds: f64) -> Result<(), MediaError> {
        if seconds > self.length {
            return Err(MediaError::SeekFailed(format!(
                "{:.2}s is past the end ({:.2}s)",
                seconds, self.length
            )));
        }
        if self.send_command(PlaybackCommand::Seek(seconds)) {
            Ok(())
        } else {
            Err(MediaError::SeekFailed("playback thread has stopped".to_string()))
        }
    }
}

impl Drop for PlaybackThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn playback_loop(
    sink: &MediaEventSink,
    command_rx: &Receiver<PlaybackCommand>,
    load_delay: Duration,
    length: f64,
    position: &AtomicU64,
) {
    match command_rx.recv_timeout(load_delay) {
        Ok(PlaybackCommand::Stop) | Err(RecvTimeoutError::Disconnected) => return,
        // Commands before Ready are dropped, as a loading element would
        Ok(_) | Err(RecvTimeoutError::Timeout) => {}
    }
    if !sink.send(MediaEventKind::Ready) {
        return;
    }

    let mut playing = false;
    let mut current = 0.0_f64;
    let mut last_tick = Instant::now();

    loop {
        match command_rx.recv_timeout(TICK) {
            Ok(PlaybackCommand::Play) => {
                if !playing {
                    playing = true;
                    sink.send(MediaEventKind::Playing);
                }
            }
            Ok(PlaybackCommand::Pause) => {
                if playing {
                    playing = false;
                    sink.send(MediaEventKind::Paused);
                }
            }
            Ok(PlaybackCommand::Seek(to)) => {
                current = to.clamp(0.0, length);
                position.store(current.to_bits(), Ordering::Relaxed);
            }
            Ok(PlaybackCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = Instant::now();
        if playing {
            current += now.duration_since(last_tick).as_secs_f64();
            position.store(current.min(length).to_bits(), Ordering::Relaxed);
            if current >= length {
                log::debug!("Simulated clip finished for session {}", sink.token());
                sink.send(MediaEventKind::Ended);
                break;
            }
        }
        last_tick = now;
    }
}
