//! REST client for a remote quote service.
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `GET  /quotes`       full snapshot (bare array or `{"quotes": [...]}`)
//! - `POST /quotes`       create, returns the stored quote with its id
//! - `PUT  /quotes/{id}`  replace, 404 when the id is unknown

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

use quotekeeper_core::quotes::errors::Result as SyncResult;
use quotekeeper_core::quotes::{NewQuote, Quote, QuoteSyncError, RemoteQuoteSource};

use crate::error::{into_sync_error, RemoteError, Result};
use crate::types::{ApiErrorResponse, QuoteListResponse, RemoteQuoteRecord};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for a remote quote API.
#[derive(Debug, Clone)]
pub struct HttpQuoteSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpQuoteSource {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the quote API (e.g., "https://quotes.example.com/api")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create headers for an API request.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RemoteError::invalid_request("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("Quote API response ({}): {}", status, body);

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                let message = match error.code {
                    Some(code) => format!("{}: {}", code, error.message),
                    None => error.message,
                };
                return Err(RemoteError::api(status.as_u16(), message));
            }
            return Err(RemoteError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!("Failed to deserialize response. Body: {}, Error: {}", body, e);
            RemoteError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    /// Fetch every quote. Elements that are not quote objects are skipped.
    ///
    /// GET /quotes
    pub async fn list_quotes(&self) -> Result<Vec<Quote>> {
        let url = format!("{}/quotes", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await?;

        let list: QuoteListResponse<serde_json::Value> = Self::parse_response(response).await?;
        let quotes = list
            .into_vec()
            .into_iter()
            .enumerate()
            .filter_map(|(index, element)| {
                match serde_json::from_value::<RemoteQuoteRecord>(element) {
                    Ok(record) => record.into_quote().or_else(|| {
                        warn!("Skipping remote quote {} without text", index);
                        None
                    }),
                    Err(e) => {
                        warn!("Skipping malformed remote quote {}: {}", index, e);
                        None
                    }
                }
            })
            .collect();
        Ok(quotes)
    }

    /// Create a quote.
    ///
    /// POST /quotes
    pub async fn create_quote(&self, quote: &NewQuote) -> Result<Quote> {
        let url = format!("{}/quotes", self.base_url);
        debug!("Creating remote quote: {:?}", quote.text);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(quote)
            .send()
            .await?;

        let created: Quote = Self::parse_response(response).await?;
        if created.id.is_none() {
            return Err(RemoteError::invalid_request(
                "Remote accepted the quote without assigning an id",
            ));
        }
        Ok(created)
    }

    /// Replace a quote. Returns false if the remote does not know the id.
    ///
    /// PUT /quotes/{id}
    pub async fn update_quote(&self, quote: &Quote) -> Result<bool> {
        let id = quote
            .id
            .as_ref()
            .ok_or_else(|| RemoteError::invalid_request("Cannot update a quote without id"))?;
        let url = format!(
            "{}/quotes/{}",
            self.base_url,
            urlencoding::encode(id.as_str())
        );

        let response = self
            .client
            .put(&url)
            .headers(self.headers()?)
            .json(quote)
            .send()
            .await?;

        match Self::parse_response::<serde_json::Value>(response).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl RemoteQuoteSource for HttpQuoteSource {
    async fn fetch_all(&self) -> SyncResult<Vec<Quote>> {
        self.list_quotes()
            .await
            .map_err(into_sync_error(QuoteSyncError::RemoteFetch))
    }

    async fn create(&self, quote: &NewQuote) -> SyncResult<Quote> {
        self.create_quote(quote)
            .await
            .map_err(into_sync_error(QuoteSyncError::RemotePush))
    }

    async fn update(&self, quote: &Quote) -> SyncResult<bool> {
        self.update_quote(quote)
            .await
            .map_err(into_sync_error(QuoteSyncError::RemoteUpdate))
    }
}
