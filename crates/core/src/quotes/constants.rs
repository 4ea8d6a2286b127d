//! Quote constants.

/// Category filter value meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// Category given to remote quotes that arrive without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Default interval between periodic sync cycles.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

/// Starter quotes used when the store holds nothing.
pub const DEFAULT_QUOTES: [(&str, &str); 3] = [
    (
        "The best way to predict the future is to create it.",
        "Motivation",
    ),
    (
        "Life is what happens when you’re busy making other plans.",
        "Life",
    ),
    ("Success is not final, failure is not fatal.", "Success"),
];
