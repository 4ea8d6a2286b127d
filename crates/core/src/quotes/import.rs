//! Quote import and export.
//!
//! # Key Invariants
//!
//! - An import is all-or-nothing: one invalid element rejects the whole file
//! - Imported quotes are trimmed before they enter a collection
//! - Merging an import never duplicates an `id` or a pending `text`

use serde::Deserialize;
use serde_json::Value;

use super::errors::{QuoteSyncError, Result};
use super::merge::dedupe;
use super::model::Quote;
use super::types::QuoteId;
use crate::errors::ValidationError;

/// An element of an imported file before validation. Missing fields are
/// reported as validation errors rather than parse errors.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct QuoteImport {
    #[serde(default)]
    id: Option<QuoteId>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl QuoteImport {
    fn into_quote(self) -> std::result::Result<Quote, ValidationError> {
        Quote {
            id: self.id,
            text: self.text.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            updated_at: self.updated_at,
        }
        .normalized()
    }
}

/// Parses and validates an exported quote file.
///
/// Fails with [`QuoteSyncError::ImportFormat`] if the data is not a JSON array
/// or any element is not a valid quote.
pub fn import_quotes(json: &str) -> Result<Vec<Quote>> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(elements) = value else {
        return Err(QuoteSyncError::ImportFormat(
            "expected a JSON array of quotes".to_string(),
        ));
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            let raw: QuoteImport = serde_json::from_value(element).map_err(|e| {
                QuoteSyncError::ImportFormat(format!("element {}: {}", index, e))
            })?;
            raw.into_quote()
                .map_err(|e| QuoteSyncError::ImportFormat(e.at(index).to_string()))
        })
        .collect()
}

/// Appends imported quotes to `collection`, skipping any that repeat an
/// existing `id` or pending `text`.
pub fn merge_imported(collection: &[Quote], imported: Vec<Quote>) -> Vec<Quote> {
    let mut combined = collection.to_vec();
    combined.extend(imported);
    dedupe(&combined)
}

/// Serializes the collection as pretty-printed JSON.
pub fn export_quotes(quotes: &[Quote]) -> Result<String> {
    serde_json::to_string_pretty(quotes)
        .map_err(|e| QuoteSyncError::ImportFormat(format!("failed to export quotes: {}", e)))
}
