//! Quotekeeper Remote - REST implementation of the remote quote source.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quotekeeper_core::quotes::QuoteSyncEngine;
//! use quotekeeper_remote::HttpQuoteSource;
//!
//! let remote = HttpQuoteSource::new("https://quotes.example.com/api")?.with_token("secret");
//! let engine = QuoteSyncEngine::new(Arc::new(remote));
//! ```

mod client;
mod error;
mod types;

pub use client::HttpQuoteSource;
pub use error::{RemoteError, Result};
pub use types::ApiErrorResponse;
