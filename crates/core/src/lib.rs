//! Quotekeeper Core - Quote model, validation and the sync engine.
//!
//! This crate contains the reusable logic behind the quote widget. It is
//! storage- and transport-agnostic: persistence and the remote quote source are
//! reached through the traits in [`quotes::ports`], implemented by the
//! `storage-json` and `remote` crates.

pub mod errors;
pub mod quotes;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
