use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use quotekeeper_core::quotes::{
    dedupe, report_sync_failure, report_sync_result, EngineState, MergedHook, Quote,
    QuoteSyncError, SyncResult,
};
use serde::Serialize;
use serde_json::json;

use crate::config::ConflictPolicy;
use crate::error::{ApiError, ApiResult};
use crate::events::{ServerEvent, SYNC_COMPLETE, SYNC_ERROR, SYNC_START};
use crate::main_lib::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncStatusResponse {
    enabled: bool,
    state: EngineState,
    last_sync_at: Option<DateTime<Utc>>,
    pending_conflicts: usize,
}

/// Stages the merged collection before the engine pushes anything.
///
/// Quotes changed locally since `snapshot` are carried into the staged copy.
/// The merged collection is remembered as the baseline for the final commit.
struct StageMerged<'a> {
    state: &'a AppState,
    snapshot: &'a [Quote],
    merged: StdMutex<Vec<Quote>>,
}

#[async_trait]
impl<'a> MergedHook for StageMerged<'a> {
    async fn on_merged(&self, merged: &[Quote]) -> Result<(), QuoteSyncError> {
        let mut quotes = self.state.quotes.write().await;
        let staged = keep_local_changes(merged.to_vec(), self.snapshot, &quotes);
        self.state.commit(&mut quotes, staged)?;
        if let Ok(mut baseline) = self.merged.lock() {
            *baseline = merged.to_vec();
        }
        Ok(())
    }
}

/// Applies the entries of `current` that are not in `baseline` on top of
/// `synced`.
///
/// A changed entry replaces the synced copy of the same quote only when its
/// `updated_at` is newer; anything else that is new is appended.
fn keep_local_changes(
    mut synced: Vec<Quote>,
    baseline: &[Quote],
    current: &[Quote],
) -> Vec<Quote> {
    for candidate in current.iter().filter(|q| !baseline.contains(q)) {
        match synced.iter().position(|q| same_identity(q, candidate)) {
            Some(position) => {
                if candidate.updated_at > synced[position].updated_at {
                    synced[position] = candidate.clone();
                }
            }
            None => synced.push(candidate.clone()),
        }
    }
    dedupe(&synced)
}

fn same_identity(a: &Quote, b: &Quote) -> bool {
    match (&a.id, &b.id) {
        (Some(x), Some(y)) => x == y,
        (None, None) => a.text == b.text,
        _ => false,
    }
}

/// Runs one sync cycle against the live collection and reports the outcome
/// through the notification log.
///
/// The merged collection is persisted before any local quote is pushed. Quotes
/// added or resolved while the cycle was in flight are kept.
pub async fn perform_quote_sync(state: &AppState) -> Result<SyncResult, ApiError> {
    let engine = state
        .sync_engine
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Sync is not configured".into()))?;

    let snapshot = state.quotes.read().await.clone();
    state.event_bus.publish(ServerEvent::new(SYNC_START));

    let stage = StageMerged {
        state,
        snapshot: &snapshot,
        merged: StdMutex::new(snapshot.clone()),
    };

    let cycle = match engine.run_sync_cycle_staged(snapshot.clone(), &stage).await {
        Ok(cycle) => cycle,
        Err(err) => {
            report_sync_failure(&err, state.notifications.as_ref());
            state.event_bus.publish(ServerEvent::with_payload(
                SYNC_ERROR,
                json!({ "message": err.to_string() }),
            ));
            return Err(err.into());
        }
    };

    let mut result = cycle.result;
    if result.skipped {
        tracing::debug!("Sync skipped, another cycle is running");
        return Ok(result);
    }

    {
        let baseline = stage
            .merged
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut quotes = state.quotes.write().await;
        let updated = keep_local_changes(cycle.quotes, &baseline, &quotes);
        state.commit(&mut quotes, updated)?;
    }

    if state.conflict_policy == ConflictPolicy::Manual {
        let mut conflicts = state.conflicts.lock().await;
        conflicts.extend(result.conflicts.clone());
        if let Some(remote) = &state.remote {
            let failed = conflicts.push_kept_local(remote.as_ref()).await;
            result.failed_pushes.extend(failed);
        }
    }

    report_sync_result(&result, state.notifications.as_ref());
    state.event_bus.publish(ServerEvent::with_payload(
        SYNC_COMPLETE,
        json!({ "summary": result.summary() }),
    ));
    tracing::info!("Sync completed: {}", result.summary());
    Ok(result)
}

async fn sync_now(State(state): State<Arc<AppState>>) -> ApiResult<Json<SyncResult>> {
    let result = perform_quote_sync(&state).await?;
    Ok(Json(result))
}

async fn sync_status(State(state): State<Arc<AppState>>) -> Json<SyncStatusResponse> {
    let pending_conflicts = state.conflicts.lock().await.len();
    let response = match &state.sync_engine {
        Some(engine) => SyncStatusResponse {
            enabled: true,
            state: engine.state(),
            last_sync_at: engine.last_sync_at(),
            pending_conflicts,
        },
        None => SyncStatusResponse {
            enabled: false,
            state: EngineState::Idle,
            last_sync_at: None,
            pending_conflicts,
        },
    };
    Json(response)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(sync_now))
        .route("/sync/status", get(sync_status))
}
