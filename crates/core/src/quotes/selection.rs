//! Category filtering and random quote selection.

use rand::seq::SliceRandom;
use rand::Rng;

use super::constants::{ALL_CATEGORIES, DEFAULT_QUOTES};
use super::model::Quote;

/// The starter collection for an empty store.
pub fn default_quotes() -> Vec<Quote> {
    DEFAULT_QUOTES
        .iter()
        .map(|(text, category)| Quote::pending(*text, *category))
        .collect()
}

/// Returns true if `category` is missing, empty or the "all" sentinel.
pub fn is_all_categories(category: Option<&str>) -> bool {
    match category.map(str::trim) {
        None => true,
        Some(c) => c.is_empty() || c.eq_ignore_ascii_case(ALL_CATEGORIES),
    }
}

/// The category filter options: `"all"` first, then each category once, in
/// first-seen order.
pub fn categories(quotes: &[Quote]) -> Vec<String> {
    let mut result = vec![ALL_CATEGORIES.to_string()];
    for quote in quotes {
        if !result.iter().any(|c| c == &quote.category) {
            result.push(quote.category.clone());
        }
    }
    result
}

/// Quotes in `category`; every quote for the "all" filter.
pub fn filter_by_category<'a>(quotes: &'a [Quote], category: Option<&str>) -> Vec<&'a Quote> {
    if is_all_categories(category) {
        return quotes.iter().collect();
    }
    let wanted = category.map(str::trim).unwrap_or_default();
    quotes.iter().filter(|q| q.category == wanted).collect()
}

/// Picks a random quote from `category`, or None if the filter matches nothing.
pub fn random_quote<'a, R: Rng + ?Sized>(
    quotes: &'a [Quote],
    category: Option<&str>,
    rng: &mut R,
) -> Option<&'a Quote> {
    filter_by_category(quotes, category).choose(rng).copied()
}
