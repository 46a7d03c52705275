//! Error types for verse data loading

use std::path::PathBuf;
use thiserror::Error;
use tilawah_core::AppError;

/// Errors raised while reading the verse bundle
#[derive(Error, Debug)]
pub enum VerseDataError {
    #[error("Unknown chapter {0}")]
    UnknownChapter(u16),

    #[error("Bundle file not found: {}", path.display())]
    BundleMissing { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed bundle file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bundle for chapter {chapter} is inconsistent: {reason}")]
    Inconsistent { chapter: u16, reason: String },
}

pub type VerseDataResult<T> = std::result::Result<T, VerseDataError>;

impl From<VerseDataError> for AppError {
    fn from(err: VerseDataError) -> Self {
        match err {
            VerseDataError::UnknownChapter(chapter) => AppError::InvalidVerse { chapter, verse: 0 },
            VerseDataError::BundleMissing { path } => AppError::RecordNotFound {
                entity: "Verse bundle".to_string(),
                identifier: path.display().to_string(),
            },
            VerseDataError::Io { path, source } => AppError::IoError {
                message: format!("Failed to read {}", path.display()),
                source,
            },
            other => AppError::CorruptedState {
                key: "verse bundle".to_string(),
                reason: other.to_string(),
            },
        }
    }
}
