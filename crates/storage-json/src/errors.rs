//! Storage-specific error types for JSON file operations.
//!
//! These errors are internal to the storage layer and are converted to
//! `quotekeeper_core::quotes::QuoteSyncError` before being returned to callers.

use std::path::PathBuf;

use quotekeeper_core::quotes::QuoteSyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt data in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

impl From<StorageError> for QuoteSyncError {
    fn from(err: StorageError) -> Self {
        QuoteSyncError::Storage(err.to_string())
    }
}
