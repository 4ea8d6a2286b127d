//! User-choice conflict resolution layered on top of server-wins.
//!
//! A sync cycle always resolves conflicts server-wins. When the user should
//! get the final say, the caller keeps the reported [`ConflictRecord`]s in a
//! [`ConflictQueue`] and drains it with [`ConflictQueue::resolve`]. Keeping the
//! local version writes it back into the collection and queues it for a remote
//! update.

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::errors::{QuoteSyncError, Result};
use super::model::{ConflictRecord, FailedPush, Quote};
use super::ports::RemoteQuoteSource;

/// Which side of a conflict to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolution {
    #[serde(alias = "local")]
    KeepLocal,
    #[serde(alias = "server", alias = "remote")]
    KeepRemote,
}

/// Pending conflicts awaiting a user decision.
#[derive(Debug, Clone, Default)]
pub struct ConflictQueue {
    pending: Vec<ConflictRecord>,
    kept_local: Vec<Quote>,
}

impl ConflictQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_conflicts(conflicts: Vec<ConflictRecord>) -> Self {
        let mut queue = Self::new();
        queue.extend(conflicts);
        queue
    }

    /// Adds conflicts from a later cycle. A record for a quote that is already
    /// pending replaces the older record, keeping the original local version.
    pub fn extend(&mut self, conflicts: Vec<ConflictRecord>) {
        for conflict in conflicts {
            match self
                .pending
                .iter_mut()
                .find(|existing| same_quote(&existing.remote, &conflict.remote))
            {
                Some(existing) => existing.remote = conflict.remote,
                None => self.pending.push(conflict),
            }
        }
    }

    pub fn pending(&self) -> &[ConflictRecord] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Local versions chosen by the user that still need a remote update.
    pub fn kept_local(&self) -> &[Quote] {
        &self.kept_local
    }

    /// Resolves the conflict at `index` and returns the updated collection.
    ///
    /// `collection` is the collection after the server-wins merge, so keeping
    /// the remote version leaves it unchanged.
    pub fn resolve(
        &mut self,
        collection: &[Quote],
        index: usize,
        choice: Resolution,
    ) -> Result<Vec<Quote>> {
        if index >= self.pending.len() {
            return Err(QuoteSyncError::ConflictIndex(index));
        }
        let conflict = self.pending.remove(index);
        let mut updated = collection.to_vec();

        if choice == Resolution::KeepRemote {
            debug!("Conflict {} resolved with the remote version", index);
            return Ok(updated);
        }

        let mut kept = conflict.local;
        if kept.id.is_none() {
            kept.id = conflict.remote.id.clone();
        }
        kept.updated_at = Some(Utc::now());

        match updated
            .iter()
            .position(|quote| same_quote(quote, &conflict.remote))
        {
            Some(position) => updated[position] = kept.clone(),
            None => {
                warn!("Conflicting quote no longer in collection, restoring local copy");
                updated.push(kept.clone());
            }
        }

        debug!("Conflict {} resolved with the local version", index);
        self.kept_local.retain(|quote| !same_quote(quote, &kept));
        self.kept_local.push(kept);
        Ok(updated)
    }

    /// Resolves every pending conflict the same way.
    pub fn resolve_all(&mut self, collection: &[Quote], choice: Resolution) -> Vec<Quote> {
        let mut updated = collection.to_vec();
        while !self.pending.is_empty() {
            // Index 0 always exists here.
            if let Ok(next) = self.resolve(&updated, 0, choice) {
                updated = next;
            }
        }
        updated
    }

    /// Sends the kept local versions to the remote. Quotes that fail stay
    /// queued for the next call.
    pub async fn push_kept_local(&mut self, remote: &dyn RemoteQuoteSource) -> Vec<FailedPush> {
        let mut failed = Vec::new();
        let mut retry = Vec::new();

        for quote in std::mem::take(&mut self.kept_local) {
            if quote.id.is_none() {
                // Pending quotes are created by the next sync cycle.
                continue;
            }
            match remote.update(&quote).await {
                Ok(true) => debug!("Pushed kept local version of quote {:?}", quote.id),
                Ok(false) => failed.push(FailedPush {
                    message: QuoteSyncError::RemoteUpdate("quote not found on remote".into())
                        .to_string(),
                    quote,
                }),
                Err(e) => {
                    warn!("Failed to update quote {:?}: {}", quote.id, e);
                    failed.push(FailedPush {
                        quote: quote.clone(),
                        message: e.to_string(),
                    });
                    retry.push(quote);
                }
            }
        }

        self.kept_local = retry;
        failed
    }
}

fn same_quote(a: &Quote, b: &Quote) -> bool {
    match (&a.id, &b.id) {
        (Some(left), Some(right)) => left == right,
        _ => a.text == b.text,
    }
}
