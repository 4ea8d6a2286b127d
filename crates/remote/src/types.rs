//! Wire types for the remote quote API.

use chrono::{DateTime, Utc};
use quotekeeper_core::quotes::{Quote, QuoteId, UNCATEGORIZED};
use serde::{Deserialize, Serialize};

/// Error body returned by the remote on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

/// Some deployments wrap the quote list in an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum QuoteListResponse<T> {
    Bare(Vec<T>),
    Wrapped { quotes: Vec<T> },
}

impl<T> QuoteListResponse<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            QuoteListResponse::Bare(items) => items,
            QuoteListResponse::Wrapped { quotes } => quotes,
        }
    }
}

/// One element of the quote list. Every field is optional so a single odd
/// record cannot fail the whole snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemoteQuoteRecord {
    #[serde(default)]
    id: Option<QuoteId>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl RemoteQuoteRecord {
    /// `None` when the record has no text at all. Blank text is passed through
    /// and left to quote validation.
    pub(crate) fn into_quote(self) -> Option<Quote> {
        let text = self.text?;
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        Some(Quote {
            id: self.id,
            text,
            category,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_list_accepts_bare_and_wrapped() {
        let bare: QuoteListResponse<Quote> =
            serde_json::from_str(r#"[{"id":1,"text":"A","category":"X"}]"#).unwrap();
        let wrapped: QuoteListResponse<Quote> =
            serde_json::from_str(r#"{"quotes":[{"id":1,"text":"A","category":"X"}]}"#).unwrap();
        assert_eq!(bare.into_vec(), wrapped.into_vec());
    }

    #[test]
    fn test_record_without_category_is_uncategorized() {
        let record: RemoteQuoteRecord =
            serde_json::from_str(r#"{"id":1,"text":"A","author":"Someone"}"#).unwrap();
        assert_eq!(
            record.into_quote(),
            Some(Quote::with_id(1, "A", UNCATEGORIZED))
        );

        let untitled: RemoteQuoteRecord = serde_json::from_str(r#"{"id":2}"#).unwrap();
        assert_eq!(untitled.into_quote(), None);
    }
}
