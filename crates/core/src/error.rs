//! Error taxonomy for Tilawah
//!
//! Nothing in the playback core is fatal. Every failure maps to one of four
//! handling tiers:
//! - **Silent**: malformed persisted state, discarded and treated as absent
//! - **Warning**: remote store unavailable, data saved locally instead
//! - **Notify**: audio failed to load or play, user sees a non-blocking notice
//! - **Rejected**: the request conflicts with existing data and no write happens
//!
//! Each error also carries the recovery action the caller should take.

use std::fmt;
use std::io;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Persist to the in-memory cache and local storage only
    FallBackToLocal,
    /// Drop the offending state and continue as if it never existed
    DiscardState,
    /// Surface the problem and wait for the user to try again
    ReportToUser,
    /// Clear the local namespace and retry the write once
    ClearAndRetry,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FallBackToLocal => write!(f, "Saving locally instead"),
            Self::DiscardState => write!(f, "Discarding stored state"),
            Self::ReportToUser => write!(f, "Reporting to user"),
            Self::ClearAndRetry => write!(f, "Clearing local storage and retrying"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Never shown to the user
    Silent,
    /// Shown as a dismissible warning, the operation still took effect
    Warning,
    /// Shown as a non-blocking notification, the operation did not take effect
    Notify,
    /// Rejected up front with an explicit message
    Rejected,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => write!(f, "Silent"),
            Self::Warning => write!(f, "Warning"),
            Self::Notify => write!(f, "Notify"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Main error type for Tilawah
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Remote store =====
    /// The backing document store could not be reached
    #[error("Store unavailable during {operation}: {reason}")]
    StoreUnavailable { operation: String, reason: String },

    /// The backing document store refused the operation
    #[error("Permission denied: {operation} on {collection}")]
    PermissionDenied {
        operation: String,
        collection: String,
    },

    /// Record not found in the store
    #[error("Record not found: {entity} with {identifier}")]
    RecordNotFound { entity: String, identifier: String },

    /// Record is still referenced and cannot be removed
    #[error("{entity} {identifier} is still used by {references} verse mapping(s)")]
    ResourceInUse {
        entity: String,
        identifier: String,
        references: usize,
    },

    // ===== Audio =====
    /// Audio resource failed to load or decode
    #[error("Audio failed to load from {url}: {reason}")]
    AudioLoadFailed { url: String, reason: String },

    /// Playback start was refused (autoplay policy, decode failure)
    #[error("Playback rejected: {reason}")]
    PlaybackRejected { reason: String },

    /// Verse address outside the bundled chapter table
    #[error("Invalid verse: {chapter}:{verse}")]
    InvalidVerse { chapter: u16, verse: u16 },

    // ===== Local persistence =====
    /// Persisted state could not be parsed
    #[error("Corrupted state under '{key}': {reason}")]
    CorruptedState { key: String, reason: String },

    /// Local storage refused the write for lack of space
    #[error("Local storage quota exceeded writing '{key}' ({bytes} bytes)")]
    QuotaExceeded { key: String, bytes: usize },

    /// Invalid configuration
    #[error("Invalid configuration: {setting} = '{value}' ({reason})")]
    InvalidConfiguration {
        setting: String,
        value: String,
        reason: String,
    },

    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    /// Invalid argument provided
    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CorruptedState { .. } => ErrorSeverity::Silent,

            Self::StoreUnavailable { .. }
            | Self::PermissionDenied { .. }
            | Self::QuotaExceeded { .. } => ErrorSeverity::Warning,

            Self::AudioLoadFailed { .. }
            | Self::PlaybackRejected { .. }
            | Self::IoError { .. } => ErrorSeverity::Notify,

            Self::ResourceInUse { .. }
            | Self::RecordNotFound { .. }
            | Self::InvalidVerse { .. }
            | Self::InvalidConfiguration { .. }
            | Self::InvalidArgument { .. } => ErrorSeverity::Rejected,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            // Permission problems degrade exactly like connectivity problems
            Self::StoreUnavailable { .. } | Self::PermissionDenied { .. } => {
                RecoveryAction::FallBackToLocal
            }
            Self::CorruptedState { .. } => RecoveryAction::DiscardState,
            Self::QuotaExceeded { .. } => RecoveryAction::ClearAndRetry,
            _ => RecoveryAction::ReportToUser,
        }
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            Self::StoreUnavailable { .. } | Self::PermissionDenied { .. } => {
                "Could not reach the server. Your change was saved on this device instead."
                    .to_string()
            }
            Self::RecordNotFound { entity, .. } => format!("That {} no longer exists.", entity),
            Self::ResourceInUse { references, .. } => format!(
                "This audio URL is assigned to {} verse(s). Clear or reassign them first.",
                references
            ),
            Self::AudioLoadFailed { .. } => {
                "Could not load the recitation audio. Check your connection and try again."
                    .to_string()
            }
            Self::PlaybackRejected { .. } => {
                "Playback was blocked. Tap play to start the recitation.".to_string()
            }
            Self::InvalidVerse { chapter, verse } => {
                format!("Verse {}:{} does not exist.", chapter, verse)
            }
            Self::CorruptedState { .. } => String::new(),
            Self::QuotaExceeded { .. } => {
                "Device storage is full. Some offline data was cleared.".to_string()
            }
            Self::InvalidConfiguration { setting, .. } => {
                format!("Invalid setting: {}. Please check your configuration.", setting)
            }
            Self::IoError { .. } => "A file operation failed. Please try again.".to_string(),
            Self::InvalidArgument { .. } => "Invalid input provided.".to_string(),
        }
    }

    /// Returns true if the user should see this error at all
    pub fn is_user_visible(&self) -> bool {
        self.severity() != ErrorSeverity::Silent
    }

    /// Returns true if the operation still took effect locally
    pub fn is_saved_locally(&self) -> bool {
        self.recovery_action() == RecoveryAction::FallBackToLocal
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        Self::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::CorruptedState {
            key: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_action_display() {
        assert_eq!(
            RecoveryAction::FallBackToLocal.to_string(),
            "Saving locally instead"
        );
        assert_eq!(
            RecoveryAction::DiscardState.to_string(),
            "Discarding stored state"
        );
        assert_eq!(RecoveryAction::ReportToUser.to_string(), "Reporting to user");
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Silent < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning < ErrorSeverity::Notify);
        assert!(ErrorSeverity::Notify < ErrorSeverity::Rejected);
    }

    #[test]
    fn test_permission_degrades_like_connectivity() {
        let offline = AppError::StoreUnavailable {
            operation: "write".to_string(),
            reason: "offline".to_string(),
        };
        let denied = AppError::PermissionDenied {
            operation: "write".to_string(),
            collection: "audio_urls".to_string(),
        };
        assert_eq!(offline.recovery_action(), denied.recovery_action());
        assert_eq!(offline.user_message(), denied.user_message());
        assert!(denied.is_saved_locally());
    }

    #[test]
    fn test_corrupted_state_is_silent() {
        let err = AppError::CorruptedState {
            key: "tilawah.reading_position".to_string(),
            reason: "expected value".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Silent);
        assert!(!err.is_user_visible());
        assert_eq!(err.recovery_action(), RecoveryAction::DiscardState);
    }

    #[test]
    fn test_resource_in_use_message() {
        let err = AppError::ResourceInUse {
            entity: "CustomUrl".to_string(),
            identifier: "abc".to_string(),
            references: 2,
        };
        assert_eq!(err.severity(), ErrorSeverity::Rejected);
        assert!(err.user_message().contains("2 verse(s)"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_playback_errors_notify() {
        let err = AppError::PlaybackRejected {
            reason: "NotAllowedError".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Notify);
        assert_eq!(err.recovery_action(), RecoveryAction::ReportToUser);
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::Other, "disk");
        let err: AppError = io_err.into();
        assert!(matches!(err, AppError::IoError { .. }));
    }

    #[test]
    fn test_json_conversion_is_corrupted_state() {
        let parse_err = serde_json::from_str::<u32>("{").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::CorruptedState { .. }));
    }
}
