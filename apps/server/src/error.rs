use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quotekeeper_core::errors::{Error as CoreError, ValidationError};
use quotekeeper_core::quotes::QuoteSyncError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Sync(#[from] QuoteSyncError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn sync_status(error: &QuoteSyncError) -> StatusCode {
    match error {
        QuoteSyncError::Validation(_) | QuoteSyncError::ImportFormat(_) => StatusCode::BAD_REQUEST,
        QuoteSyncError::ConflictIndex(_) => StatusCode::NOT_FOUND,
        QuoteSyncError::RemoteFetch(_)
        | QuoteSyncError::RemotePush(_)
        | QuoteSyncError::RemoteUpdate(_) => StatusCode::BAD_GATEWAY,
        QuoteSyncError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Sync(e) => sync_status(e),
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e {
                CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                CoreError::Sync(inner) => sync_status(inner),
                CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
