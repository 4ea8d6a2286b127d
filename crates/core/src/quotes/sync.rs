//! Quote synchronization engine.
//!
//! This module provides the `QuoteSyncEngine` which reconciles a caller-owned
//! quote collection with a remote snapshot and pushes local-only quotes.
//!
//! # Architecture
//!
//! ```text
//! caller (owns Vec<Quote>, persists, notifies)
//!       │  run_sync_cycle(local)
//!       ▼
//! QuoteSyncEngine ──► RemoteQuoteSource (fetch_all / create)
//!       │
//!       └─► merge / identify_local_only / apply_pushed (pure)
//! ```
//!
//! # Key Design Principles
//!
//! - **No owned collection**: collections go in by value and new ones come out
//! - **Single-flight**: one cycle per engine at a time; overlapping calls are
//!   rejected with an empty, skipped result
//! - **No timers**: periodic triggering belongs to the caller

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::errors::{QuoteSyncError, Result};
use super::merge::{apply_pushed, identify_local_only, merge};
use super::model::{FailedPush, MergeOutcome, NewQuote, Quote, SyncResult};
use super::ports::RemoteQuoteSource;

// =============================================================================
// Engine State
// =============================================================================

/// Lifecycle of one engine instance: `Idle -> Syncing -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EngineState {
    Idle,
    Syncing,
}

/// RAII guard that returns the engine to `Idle` when dropped.
struct SyncFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SyncFlightGuard<'a> {
    /// Try to enter `Syncing`. Returns None if a cycle is already running.
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SyncFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// =============================================================================
// Cycle Result Types
// =============================================================================

/// Outcome of pushing local-only quotes.
#[derive(Debug, Clone, Default)]
pub struct PushOutcome {
    /// Pairs of (quote as sent, copy returned by the remote).
    pub pushed: Vec<(Quote, Quote)>,
    /// Quotes that remain pending.
    pub failed: Vec<FailedPush>,
}

/// A finished sync cycle: the collection the caller should adopt and what
/// happened on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncCycle {
    pub quotes: Vec<Quote>,
    pub result: SyncResult,
}

/// Receives the merged collection before any push is attempted.
///
/// Plain closures `Fn(&[Quote]) -> Result<()>` implement this trait.
#[async_trait]
pub trait MergedHook: Send + Sync {
    async fn on_merged(&self, merged: &[Quote]) -> Result<()>;
}

#[async_trait]
impl<F> MergedHook for F
where
    F: Fn(&[Quote]) -> Result<()> + Send + Sync,
{
    async fn on_merged(&self, merged: &[Quote]) -> Result<()> {
        self(merged)
    }
}

// =============================================================================
// Engine Trait
// =============================================================================

/// Trait for the quote sync engine.
#[async_trait]
pub trait QuoteSyncEngineTrait: Send + Sync {
    /// Current lifecycle state.
    fn state(&self) -> EngineState;

    /// Returns true while a cycle is running.
    fn is_syncing(&self) -> bool {
        self.state() == EngineState::Syncing
    }

    /// When the last cycle completed successfully.
    fn last_sync_at(&self) -> Option<DateTime<Utc>>;

    /// Runs one full cycle: fetch, merge, identify local-only, push.
    ///
    /// Returns `Ok` with a skipped, empty result (and `local` unchanged) if a
    /// cycle is already running. Fetch failures return
    /// [`QuoteSyncError::RemoteFetch`]; push failures are reported per quote.
    async fn run_sync_cycle(&self, local: Vec<Quote>) -> Result<SyncCycle>;

    /// Same as [`run_sync_cycle`](Self::run_sync_cycle), but hands the merged
    /// collection to `on_merged` before pushing so the caller can persist it.
    /// An error from the hook aborts the cycle before any push.
    async fn run_sync_cycle_staged(
        &self,
        local: Vec<Quote>,
        on_merged: &dyn MergedHook,
    ) -> Result<SyncCycle>;
}

// =============================================================================
// Quote Sync Engine
// =============================================================================

/// Server-wins quote synchronization engine.
pub struct QuoteSyncEngine {
    /// Remote quote source.
    remote: Arc<dyn RemoteQuoteSource>,
    /// Single-flight flag; true while a cycle runs.
    syncing: AtomicBool,
    /// Completion time of the last successful cycle.
    last_sync_at: RwLock<Option<DateTime<Utc>>>,
}

impl QuoteSyncEngine {
    /// Create a new engine talking to `remote`.
    pub fn new(remote: Arc<dyn RemoteQuoteSource>) -> Self {
        Self {
            remote,
            syncing: AtomicBool::new(false),
            last_sync_at: RwLock::new(None),
        }
    }

    /// Merges `remote` into `local`. See [`merge`](super::merge::merge).
    pub fn merge(&self, local: &[Quote], remote: &[Quote]) -> MergeOutcome {
        merge(local, remote)
    }

    /// See [`identify_local_only`](super::merge::identify_local_only).
    pub fn identify_local_only(&self, local: &[Quote], remote: &[Quote]) -> Vec<Quote> {
        identify_local_only(local, remote)
    }

    /// Creates each candidate on the remote.
    pub async fn push(&self, local_only: &[Quote]) -> PushOutcome {
        push(local_only, self.remote.as_ref()).await
    }

    async fn run_cycle(
        &self,
        local: Vec<Quote>,
        on_merged: Option<&dyn MergedHook>,
    ) -> Result<SyncCycle> {
        let Some(_guard) = SyncFlightGuard::try_acquire(&self.syncing) else {
            debug!("Sync cycle requested while another is running, skipping");
            return Ok(SyncCycle {
                quotes: local,
                result: SyncResult::skipped(),
            });
        };

        info!("Starting quote sync cycle ({} local quotes)", local.len());

        let fetched = self.remote.fetch_all().await.map_err(|e| {
            error!("Quote sync failed while fetching remote snapshot: {}", e);
            match e {
                QuoteSyncError::RemoteFetch(_) => e,
                other => QuoteSyncError::RemoteFetch(other.to_string()),
            }
        })?;
        let (remote_quotes, rejected) = validate_remote(&fetched);

        let MergeOutcome { merged, mut result } = merge(&local, &remote_quotes);
        result.rejected_remote = rejected;
        debug!(
            "Merged {} remote quotes: {} applied, {} conflicts",
            remote_quotes.len(),
            result.applied_remote_updates.len(),
            result.conflicts.len()
        );

        if let Some(hook) = on_merged {
            hook.on_merged(&merged).await?;
        }

        // Rejected remote quotes still exist upstream; their ids must not be
        // pushed again.
        let candidates = identify_local_only(&merged, &fetched);
        let outcome = push(&candidates, self.remote.as_ref()).await;
        let quotes = apply_pushed(&merged, &outcome.pushed);

        result.pushed_local = outcome
            .pushed
            .into_iter()
            .map(|(_, created)| created)
            .collect();
        result.failed_pushes = outcome.failed;

        if let Ok(mut last) = self.last_sync_at.write() {
            *last = Some(Utc::now());
        }

        info!("Quote sync cycle finished: {}", result.summary());
        Ok(SyncCycle { quotes, result })
    }
}

#[async_trait]
impl QuoteSyncEngineTrait for QuoteSyncEngine {
    fn state(&self) -> EngineState {
        if self.syncing.load(Ordering::Acquire) {
            EngineState::Syncing
        } else {
            EngineState::Idle
        }
    }

    fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        self.last_sync_at.read().map(|last| *last).unwrap_or(None)
    }

    async fn run_sync_cycle(&self, local: Vec<Quote>) -> Result<SyncCycle> {
        self.run_cycle(local, None).await
    }

    async fn run_sync_cycle_staged(
        &self,
        local: Vec<Quote>,
        on_merged: &dyn MergedHook,
    ) -> Result<SyncCycle> {
        self.run_cycle(local, Some(on_merged)).await
    }
}

/// Creates every candidate on `remote`, independently of each other.
///
/// Results keep the order of `local_only`. A failed create never aborts the
/// remaining ones; the quote is reported in [`PushOutcome::failed`].
pub async fn push(local_only: &[Quote], remote: &dyn RemoteQuoteSource) -> PushOutcome {
    let attempts = local_only.iter().map(|quote| async move {
        let payload = NewQuote::from(quote);
        (quote, remote.create(&payload).await)
    });

    let mut outcome = PushOutcome::default();
    for (quote, attempt) in join_all(attempts).await {
        match attempt {
            Ok(created) => {
                let created = accept_created(quote, created);
                outcome.pushed.push((quote.clone(), created));
            }
            Err(e) => {
                warn!("Failed to push quote {:?}: {}", quote.text, e);
                outcome.failed.push(FailedPush {
                    quote: quote.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    outcome
}

/// Splits a fetched snapshot into normalized quotes and quotes that fail
/// validation.
pub fn validate_remote(fetched: &[Quote]) -> (Vec<Quote>, Vec<Quote>) {
    let mut valid = Vec::with_capacity(fetched.len());
    let mut rejected = Vec::new();

    for quote in fetched {
        match quote.clone().normalized() {
            Ok(normalized) => valid.push(normalized),
            Err(e) => {
                warn!("Ignoring invalid remote quote {:?}: {}", quote.id, e);
                rejected.push(quote.clone());
            }
        }
    }
    (valid, rejected)
}

/// The copy a create call returned, falling back to the sent content when the
/// remote echoes back something invalid.
fn accept_created(sent: &Quote, created: Quote) -> Quote {
    let id = created.id.clone();
    match created.normalized() {
        Ok(created) => created,
        Err(e) => {
            warn!("Remote returned an invalid copy of {:?}: {}", sent.text, e);
            Quote {
                id,
                updated_at: None,
                ..sent.clone()
            }
        }
    }
}
