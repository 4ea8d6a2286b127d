//! Quote management module.
//!
//! This module provides the core types and operations for the quote
//! collection:
//!
//! - [`model`] - Quotes, conflicts and sync results
//! - [`types`] - Strong identifier types
//! - [`ports`] - Remote source, local store and notifier traits
//! - [`merge`] - Pure server-wins reconciliation
//! - [`sync`] - The single-flight sync engine
//! - [`resolution`] - User-choice conflict queue
//! - [`import`] - JSON import validation and export
//! - [`selection`] - Category filters and random selection
//! - [`notify`] - Sync outcome notifications
//! - [`constants`] - Defaults
//!
//! # Architecture
//!
//! ```text
//! embedding app ──► QuoteSyncEngine ──► RemoteQuoteSource
//!       │                  │
//!       ├─► LocalStore     └─► merge (pure)
//!       └─► Notifier
//! ```
//!
//! The engine never touches the store or the notifier: the caller loads the
//! collection, hands it to the engine, persists what comes back and reports
//! the [`SyncResult`].

pub mod constants;
pub mod errors;
pub mod import;
pub mod merge;
pub mod model;
pub mod notify;
pub mod ports;
pub mod resolution;
pub mod selection;
pub mod sync;
pub mod types;

#[cfg(test)]
mod sync_tests;

// Re-export commonly used types for convenience
pub use model::{ConflictRecord, FailedPush, MergeOutcome, NewQuote, Quote, SyncResult};
pub use ports::{LocalStore, Notifier, RemoteQuoteSource};
pub use types::QuoteId;

// Re-export engine types
pub use merge::{apply_pushed, dedupe, identify_local_only, merge};
pub use sync::{
    push, validate_remote, EngineState, MergedHook, PushOutcome, QuoteSyncEngine,
    QuoteSyncEngineTrait, SyncCycle,
};

pub use import::{export_quotes, import_quotes, merge_imported};
pub use notify::{report_sync_failure, report_sync_result, sync_result_messages};
pub use resolution::{ConflictQueue, Resolution};
pub use selection::{categories, default_quotes, filter_by_category, random_quote};

// Re-export constants
pub use constants::*;

// Re-export error types
pub use errors::QuoteSyncError;
