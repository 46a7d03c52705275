//! Errors raised by the playback crate

use thiserror::Error;
use tilawah_core::AppError;
use tilawah_storage::StoreError;

/// Failures reported by a media primitive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Failed to load {url}: {reason}")]
    LoadFailed { url: String, reason: String },

    /// `play()` was refused (autoplay policy, decode failure)
    #[error("Play rejected: {0}")]
    PlayRejected(String),

    #[error("Seek failed: {0}")]
    SeekFailed(String),
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Chapter unknown or verse outside the chapter
    #[error("Invalid verse: {chapter}:{verse}")]
    InvalidVerse { chapter: u16, verse: u16 },

    #[error("No active session")]
    NoActiveSession,

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;

impl MediaError {
    /// Maps the failure onto the shared taxonomy for user messaging
    pub fn to_app_error(&self) -> AppError {
        match self {
            Self::LoadFailed { url, reason } => AppError::AudioLoadFailed {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::PlayRejected(reason) => AppError::PlaybackRejected {
                reason: reason.clone(),
            },
            Self::SeekFailed(reason) => AppError::InvalidArgument {
                argument: "seek".to_string(),
                reason: reason.clone(),
            },
        }
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        err.to_app_error()
    }
}

impl From<PlaybackError> for AppError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::InvalidVerse { chapter, verse } => {
                AppError::InvalidVerse { chapter, verse }
            }
            PlaybackError::NoActiveSession => AppError::InvalidArgument {
                argument: "session".to_string(),
                reason: "nothing is playing".to_string(),
            },
            PlaybackError::Media(e) => e.into(),
            PlaybackError::Store(e) => e.into(),
        }
    }
}
