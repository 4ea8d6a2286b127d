use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use quotekeeper_core::quotes::{ConflictRecord, Notifier, Resolution};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::main_lib::AppState;

#[derive(Deserialize)]
struct ResolveBody {
    choice: Resolution,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveResponse {
    remaining: usize,
}

async fn list_conflicts(State(state): State<Arc<AppState>>) -> Json<Vec<ConflictRecord>> {
    Json(state.conflicts.lock().await.pending().to_vec())
}

async fn resolve_conflict(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(body): Json<ResolveBody>,
) -> ApiResult<Json<ResolveResponse>> {
    let remaining = {
        let mut quotes = state.quotes.write().await;
        let mut conflicts = state.conflicts.lock().await;
        let updated = conflicts.resolve(&quotes, index, body.choice)?;
        state.commit(&mut quotes, updated)?;
        conflicts.len()
    };

    if body.choice == Resolution::KeepLocal {
        push_kept_local(&state).await;
    }
    Ok(Json(ResolveResponse { remaining }))
}

async fn resolve_all_conflicts(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResolveBody>,
) -> ApiResult<Json<ResolveResponse>> {
    {
        let mut quotes = state.quotes.write().await;
        let mut conflicts = state.conflicts.lock().await;
        let updated = conflicts.resolve_all(&quotes, body.choice);
        state.commit(&mut quotes, updated)?;
    }

    if body.choice == Resolution::KeepLocal {
        push_kept_local(&state).await;
    }
    Ok(Json(ResolveResponse { remaining: 0 }))
}

/// Sends restored local versions upstream right away; anything that fails
/// stays queued for the next sync cycle.
async fn push_kept_local(state: &AppState) {
    let Some(remote) = &state.remote else {
        return;
    };
    let failed = state
        .conflicts
        .lock()
        .await
        .push_kept_local(remote.as_ref())
        .await;
    for failure in failed {
        state.notifications.notify(
            &format!(
                "Failed to push quote \"{}\": {}",
                failure.quote.text, failure.message
            ),
            true,
        );
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/conflicts", get(list_conflicts))
        .route("/conflicts/resolve-all", post(resolve_all_conflicts))
        .route("/conflicts/{index}/resolve", post(resolve_conflict))
}
