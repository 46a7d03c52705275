//! Error types for store operations

use std::path::PathBuf;
use thiserror::Error;
use tilawah_core::AppError;

/// Errors from the document store, local storage and the record accessors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable during {operation}: {reason}")]
    Unavailable { operation: String, reason: String },

    #[error("Permission denied: {operation} on {collection}")]
    PermissionDenied {
        operation: String,
        collection: String,
    },

    #[error("{collection} record not found: {id}")]
    NotFound { collection: String, id: String },

    #[error("Audio URL {url} is still assigned to {references} verse(s)")]
    UrlInUse { url: String, references: usize },

    #[error("Local storage quota exceeded writing '{key}' ({bytes} bytes)")]
    QuotaExceeded { key: String, bytes: usize },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Errors that mean the remote store did not take the write
    ///
    /// Permission failures degrade exactly like connectivity failures.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable { .. } | StoreError::PermissionDenied { .. }
        )
    }

    pub(crate) fn unavailable(operation: &str, reason: impl Into<String>) -> Self {
        StoreError::Unavailable {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable { operation, reason } => {
                AppError::StoreUnavailable { operation, reason }
            }
            StoreError::PermissionDenied {
                operation,
                collection,
            } => AppError::PermissionDenied {
                operation,
                collection,
            },
            StoreError::NotFound { collection, id } => AppError::RecordNotFound {
                entity: collection,
                identifier: id,
            },
            StoreError::UrlInUse { url, references } => AppError::ResourceInUse {
                entity: "Custom URL".to_string(),
                identifier: url,
                references,
            },
            StoreError::QuotaExceeded { key, bytes } => AppError::QuotaExceeded { key, bytes },
            StoreError::InvalidKey(key) => AppError::InvalidArgument {
                argument: "key".to_string(),
                reason: format!("'{}' is not a valid storage key", key),
            },
            StoreError::InvalidRecord(reason) => AppError::InvalidArgument {
                argument: "record".to_string(),
                reason,
            },
            StoreError::Serialization(e) => AppError::CorruptedState {
                key: "document".to_string(),
                reason: e.to_string(),
            },
            StoreError::Io { path, source } => AppError::IoError {
                message: format!("Storage I/O failed at {}", path.display()),
                source,
            },
        }
    }
}
