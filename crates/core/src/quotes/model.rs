//! Quote domain models.
//!
//! This module contains the data structures shared by the sync engine, the
//! store and the embedding application: quotes, conflicts and the summary of a
//! synchronization pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::QuoteId;
use crate::errors::ValidationError;

// =============================================================================
// Quote
// =============================================================================

/// A quote with its category.
///
/// # Fields
///
/// * `id` - Identifier assigned by the remote source; `None` until first synced
/// * `text` - The quote itself, non-empty after trimming
/// * `category` - Free-form category, non-empty after trimming
/// * `updated_at` - When the quote was last changed, if known
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuoteId>,
    pub text: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Quote {
    /// A quote that has not been accepted by the remote source yet.
    pub fn pending(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            category: category.into(),
            updated_at: None,
        }
    }

    /// A quote carrying a remote identifier.
    pub fn with_id(
        id: impl Into<QuoteId>,
        text: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
            category: category.into(),
            updated_at: None,
        }
    }

    /// Returns true if the quote still awaits creation on the remote.
    pub fn is_pending(&self) -> bool {
        self.id.is_none()
    }

    /// Checks the text/category invariant without modifying the quote.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        Ok(())
    }

    /// Validates and trims `text` and `category`.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        self.validate()?;
        self.text = self.text.trim().to_string();
        self.category = self.category.trim().to_string();
        Ok(self)
    }
}

// =============================================================================
// New Quote
// =============================================================================

/// Payload for creating a quote, locally or on the remote source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewQuote {
    pub text: String,
    pub category: String,
}

impl NewQuote {
    /// Trims and validates user input.
    pub fn new(text: &str, category: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        Ok(Self {
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// Turns the payload into a local pending quote stamped with the current time.
    pub fn into_pending(self) -> Quote {
        Quote {
            id: None,
            text: self.text,
            category: self.category,
            updated_at: Some(Utc::now()),
        }
    }
}

impl From<&Quote> for NewQuote {
    fn from(quote: &Quote) -> Self {
        Self {
            text: quote.text.clone(),
            category: quote.category.clone(),
        }
    }
}

// =============================================================================
// Conflicts
// =============================================================================

/// The same logical quote differing between the local and the remote copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    pub local: Quote,
    pub remote: Quote,
}

// =============================================================================
// Sync Result Types
// =============================================================================

/// A local quote the remote source refused or failed to create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailedPush {
    pub quote: Quote,
    pub message: String,
}

/// Outcome of one synchronization pass.
///
/// Returned to the caller so it can notify the user; nothing here is applied
/// implicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// Remote quotes added to or replacing entries of the local collection.
    pub applied_remote_updates: Vec<Quote>,
    /// Matched pairs that differed; each was resolved server-wins.
    pub conflicts: Vec<ConflictRecord>,
    /// Server-assigned copies of local quotes created on the remote.
    pub pushed_local: Vec<Quote>,
    /// Local quotes that stay pending until the next cycle.
    pub failed_pushes: Vec<FailedPush>,
    /// Remote quotes left out of the collection because they failed validation.
    #[serde(default)]
    pub rejected_remote: Vec<Quote>,
    /// True when the cycle was rejected because another one was running.
    #[serde(default)]
    pub skipped: bool,
}

impl SyncResult {
    /// Empty result for a cycle rejected by the single-flight guard.
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// Returns true if the pass changed nothing and reported nothing.
    pub fn is_empty(&self) -> bool {
        self.applied_remote_updates.is_empty()
            && self.conflicts.is_empty()
            && self.pushed_local.is_empty()
            && self.failed_pushes.is_empty()
    }

    /// Returns true if every push succeeded.
    pub fn is_success(&self) -> bool {
        self.failed_pushes.is_empty()
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        if self.skipped {
            return "Sync already in progress".to_string();
        }
        let mut summary = format!(
            "{} remote updates, {} conflicts, {} pushed",
            self.applied_remote_updates.len(),
            self.conflicts.len(),
            self.pushed_local.len()
        );
        if !self.is_success() {
            summary.push_str(&format!(", {} failed", self.failed_pushes.len()));
        }
        if !self.rejected_remote.is_empty() {
            summary.push_str(&format!(", {} ignored", self.rejected_remote.len()));
        }
        summary
    }
}

/// Result of [`merge`](super::merge::merge): the reconciled collection plus
/// what changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: Vec<Quote>,
    pub result: SyncResult,
}
