//! JSON file storage implementation for Quotekeeper.
//!
//! This crate implements the `LocalStore` trait from `quotekeeper-core` on top
//! of a data directory:
//!
//! ```text
//! <data dir>/
//!   quotes.json          JSON array of quotes
//!   last_quote.json      last viewed quote
//!   selected_category    category filter, plain text
//! ```

pub mod errors;
pub mod store;

pub use errors::StorageError;
pub use store::JsonFileStore;
