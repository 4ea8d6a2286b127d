//! Error types for the remote quote client.

use quotekeeper_core::quotes::QuoteSyncError;
use thiserror::Error;

/// Result type alias for remote client operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Errors that can occur while talking to the remote quote API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API error response from the remote
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid request (bad token, missing id, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RemoteError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns true if the remote answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::Api { status: 404, .. })
    }
}

/// Maps a client error onto the sync error kind of the operation that raised it.
pub(crate) fn into_sync_error(
    kind: fn(String) -> QuoteSyncError,
) -> impl Fn(RemoteError) -> QuoteSyncError {
    move |err| kind(err.to_string())
}
