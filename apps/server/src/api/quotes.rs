use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use quotekeeper_core::quotes::{
    categories, export_quotes, filter_by_category, import_quotes, merge_imported, random_quote,
    ConflictQueue, NewQuote, Notifier, Quote, ALL_CATEGORIES,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::events::{ServerEvent, QUOTES_CHANGED};
use crate::main_lib::AppState;

#[derive(Deserialize)]
struct CategoryQuery {
    category: Option<String>,
}

#[derive(Deserialize)]
struct AddQuoteBody {
    text: String,
    category: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoriesResponse {
    categories: Vec<String>,
    selected: String,
}

#[derive(Deserialize)]
struct SelectedCategoryBody {
    category: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportResponse {
    imported: usize,
    total: usize,
}

async fn list_quotes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoryQuery>,
) -> Json<Vec<Quote>> {
    let quotes = state.quotes.read().await;
    Json(
        filter_by_category(&quotes, query.category.as_deref())
            .into_iter()
            .cloned()
            .collect(),
    )
}

async fn add_quote(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddQuoteBody>,
) -> ApiResult<(StatusCode, Json<Quote>)> {
    let quote = NewQuote::new(&body.text, &body.category)?.into_pending();

    let mut quotes = state.quotes.write().await;
    let mut updated = quotes.clone();
    updated.push(quote.clone());
    state.commit(&mut quotes, updated)?;

    tracing::debug!("Added quote in category '{}'", quote.category);
    Ok((StatusCode::CREATED, Json(quote)))
}

async fn clear_quotes(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    let mut quotes = state.quotes.write().await;
    state.store.clear()?;
    quotes.clear();
    *state.conflicts.lock().await = ConflictQueue::new();
    state.event_bus.publish(ServerEvent::new(QUOTES_CHANGED));

    tracing::info!("Cleared all quotes");
    Ok(StatusCode::NO_CONTENT)
}

/// Picks a random quote from the requested category, falling back to the
/// saved selection, and remembers it as the last viewed quote.
async fn get_random_quote(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Json<Quote>> {
    let category = match query.category {
        Some(category) => Some(category),
        None => state.store.load_selected_category()?,
    };

    let picked = {
        let quotes = state.quotes.read().await;
        random_quote(&quotes, category.as_deref(), &mut rand::thread_rng()).cloned()
    };
    let quote = picked.ok_or_else(|| ApiError::NotFound("No quotes in this category.".into()))?;

    state.store.save_last_viewed(&quote)?;
    Ok(Json(quote))
}

async fn get_last_quote(State(state): State<Arc<AppState>>) -> ApiResult<Json<Option<Quote>>> {
    Ok(Json(state.store.load_last_viewed()?))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CategoriesResponse>> {
    let selected = state
        .store
        .load_selected_category()?
        .unwrap_or_else(|| ALL_CATEGORIES.to_string());
    let quotes = state.quotes.read().await;
    Ok(Json(CategoriesResponse {
        categories: categories(&quotes),
        selected,
    }))
}

async fn set_selected_category(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SelectedCategoryBody>,
) -> ApiResult<StatusCode> {
    let category = body.category.trim();
    if category.is_empty() {
        return Err(ApiError::BadRequest("Category must not be empty".into()));
    }
    state.store.save_selected_category(category)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Accepts a JSON array of quotes. Any invalid element rejects the whole file.
async fn import_quotes_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    let imported = import_quotes(&body)?;
    let count = imported.len();

    let mut quotes = state.quotes.write().await;
    let merged = merge_imported(&quotes, imported);
    let total = merged.len();
    state.commit(&mut quotes, merged)?;

    state
        .notifications
        .notify("Quotes imported successfully!", false);
    Ok(Json(ImportResponse {
        imported: count,
        total,
    }))
}

async fn export_quotes_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let json = {
        let quotes = state.quotes.read().await;
        export_quotes(&quotes)?
    };
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"quotes.json\"",
            ),
        ],
        json,
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/quotes",
            get(list_quotes).post(add_quote).delete(clear_quotes),
        )
        .route("/quotes/random", get(get_random_quote))
        .route("/quotes/last", get(get_last_quote))
        .route("/quotes/import", post(import_quotes_handler))
        .route("/quotes/export", get(export_quotes_handler))
        .route("/categories", get(list_categories))
        .route("/categories/selected", put(set_selected_category))
}
