//! Collaborators consumed by the quote core.
//!
//! These traits are implemented by the embedding application (or by the
//! `storage-json` and `remote` crates) and injected into the engine and the
//! application layer. The engine only ever talks to [`RemoteQuoteSource`];
//! [`LocalStore`] and [`Notifier`] are used by the caller around engine
//! invocations.

use async_trait::async_trait;

use super::errors::Result;
use super::model::{NewQuote, Quote};

// =============================================================================
// Remote Quote Source
// =============================================================================

/// The remote side of a sync: a server holding the shared quote list.
#[async_trait]
pub trait RemoteQuoteSource: Send + Sync {
    /// Fetches the full remote snapshot.
    ///
    /// Errors are reported as [`QuoteSyncError::RemoteFetch`](super::QuoteSyncError::RemoteFetch).
    async fn fetch_all(&self) -> Result<Vec<Quote>>;

    /// Creates a quote remotely and returns the stored copy with its assigned id.
    async fn create(&self, quote: &NewQuote) -> Result<Quote>;

    /// Replaces a quote remotely. Returns false if the remote has no quote with
    /// that id.
    async fn update(&self, quote: &Quote) -> Result<bool>;
}

// =============================================================================
// Local Store
// =============================================================================

/// Local persistence for the quote collection and the small bits of UI state
/// that live next to it.
pub trait LocalStore: Send + Sync {
    /// Loads the persisted collection; an empty vector if nothing was saved.
    fn load(&self) -> Result<Vec<Quote>>;

    /// Replaces the persisted collection.
    fn save(&self, quotes: &[Quote]) -> Result<()>;

    /// The quote shown most recently, if any.
    fn load_last_viewed(&self) -> Result<Option<Quote>>;

    fn save_last_viewed(&self, quote: &Quote) -> Result<()>;

    /// The category filter chosen by the user, if any.
    fn load_selected_category(&self) -> Result<Option<String>>;

    fn save_selected_category(&self, category: &str) -> Result<()>;

    /// Removes every persisted quote and the last viewed quote.
    fn clear(&self) -> Result<()>;
}

// =============================================================================
// Notifier
// =============================================================================

/// User-facing notification surface. The engine never calls this directly.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, is_error: bool);
}
