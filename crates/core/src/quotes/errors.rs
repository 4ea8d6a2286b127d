//! Quote sync error types.

use thiserror::Error;

use crate::errors::ValidationError;

/// Errors produced while syncing, importing or resolving quotes.
///
/// Every variant is recovered at the operation that produced it; none of them
/// leaves a caller's collection partially mutated.
#[derive(Error, Debug)]
pub enum QuoteSyncError {
    /// Fetching the remote snapshot failed; the whole cycle is aborted.
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    /// Creating a single quote on the remote failed; the quote stays pending.
    #[error("Remote push failed: {0}")]
    RemotePush(String),

    /// Updating a quote on the remote failed.
    #[error("Remote update failed: {0}")]
    RemoteUpdate(String),

    /// Imported data is not an array of valid quotes.
    #[error("Import format error: {0}")]
    ImportFormat(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A conflict index that does not exist in the pending queue.
    #[error("No pending conflict at index {0}")]
    ConflictIndex(usize),
}

impl QuoteSyncError {
    /// Returns true if the error aborts a sync cycle as a whole.
    pub fn aborts_cycle(&self) -> bool {
        matches!(self, QuoteSyncError::RemoteFetch(_))
    }

    /// Returns true if the error concerns a single quote and may be retried on
    /// the next cycle.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            QuoteSyncError::RemotePush(_) | QuoteSyncError::RemoteUpdate(_)
        )
    }
}

impl From<serde_json::Error> for QuoteSyncError {
    fn from(error: serde_json::Error) -> Self {
        QuoteSyncError::ImportFormat(error.to_string())
    }
}

/// Result type alias for quote sync operations.
pub type Result<T> = std::result::Result<T, QuoteSyncError>;
