//! Core error types for the Quotekeeper application.
//!
//! This module defines transport- and storage-agnostic error types. Errors
//! raised by the HTTP remote or the JSON store are converted into these types
//! at the port boundary.

use thiserror::Error;

use crate::quotes::QuoteSyncError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the quote application.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Quote sync failed: {0}")]
    Sync(#[from] QuoteSyncError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// A malformed quote rejected at the input boundary.
///
/// Quotes failing validation never enter a collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Quote text must not be empty")]
    EmptyText,

    #[error("Quote category must not be empty")]
    EmptyCategory,

    #[error("Invalid quote at position {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Wrap this error with the position of the offending element.
    pub fn at(self, index: usize) -> Self {
        ValidationError::AtIndex {
            index,
            source: Box::new(self),
        }
    }
}
