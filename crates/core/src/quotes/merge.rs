//! Pure reconciliation of a local quote collection against a remote snapshot.
//!
//! # Matching
//!
//! A remote quote matches a local quote when:
//! - both carry the same `id`, or
//! - the remote quote has no `id` and the texts are equal (only local entries
//!   present before the pass are candidates), or
//! - the remote quote has an `id`, no local quote carries it, and a pending
//!   local quote has the same text. This is how a quote created during an
//!   earlier cycle is recognised when the caller did not persist the
//!   server-assigned copy.
//!
//! A remote quote without an `id` whose text also appears on a remote quote
//! with an `id` is dropped from the snapshot first. Matched pairs that differ
//! are resolved server-wins. None of the functions here mutate their inputs.

use std::collections::HashSet;

use log::debug;

use super::model::{ConflictRecord, MergeOutcome, Quote, SyncResult};
use super::types::QuoteId;

/// Merges `remote` into `local`.
///
/// Remote quotes are the source of truth for every matched pair. New remote
/// quotes are appended in remote order. The merged collection holds at most one
/// entry per `id` and at most one pending entry per `text`.
pub fn merge(local: &[Quote], remote: &[Quote]) -> MergeOutcome {
    let mut merged = dedupe(local);
    let mut result = SyncResult::default();
    let local_len = merged.len();

    for remote_quote in collapse_snapshot(remote) {
        match find_match(&merged, local_len, &remote_quote) {
            None => {
                debug!("New remote quote: {:?}", remote_quote.id);
                merged.push(remote_quote.clone());
                result.applied_remote_updates.push(remote_quote);
            }
            Some(index) => {
                let local_quote = &merged[index];
                let resolved = resolve_server_wins(local_quote, &remote_quote);
                if resolved == *local_quote {
                    continue;
                }
                if is_adoption(local_quote, &resolved) {
                    debug!("Adopting remote id {:?} for pending quote", resolved.id);
                } else {
                    result.conflicts.push(ConflictRecord {
                        local: local_quote.clone(),
                        remote: resolved.clone(),
                    });
                }
                result.applied_remote_updates.push(resolved.clone());
                merged[index] = resolved;
            }
        }
    }

    MergeOutcome { merged, result }
}

/// Returns every local quote that the remote does not know about: quotes
/// without an `id`, and quotes whose `id` is absent from `remote`.
pub fn identify_local_only(local: &[Quote], remote: &[Quote]) -> Vec<Quote> {
    let remote_ids: HashSet<&QuoteId> = remote.iter().filter_map(|q| q.id.as_ref()).collect();

    local
        .iter()
        .filter(|quote| match &quote.id {
            None => true,
            Some(id) => !remote_ids.contains(id),
        })
        .cloned()
        .collect()
}

/// Replaces each pushed local quote with the copy the remote returned.
///
/// `pushed` pairs the local quote that was sent with the server-assigned copy.
/// If the server-assigned id is already present elsewhere in the collection the
/// local entry is dropped instead, so the result never holds duplicates.
pub fn apply_pushed(collection: &[Quote], pushed: &[(Quote, Quote)]) -> Vec<Quote> {
    let mut updated = collection.to_vec();

    for (sent, created) in pushed {
        let Some(position) = updated.iter().position(|q| q == sent) else {
            debug!("Pushed quote no longer in collection, skipping replacement");
            continue;
        };

        let already_present = created.id.is_some()
            && updated
                .iter()
                .enumerate()
                .any(|(i, q)| i != position && q.id == created.id);

        if already_present {
            updated.remove(position);
        } else {
            updated[position] = created.clone();
        }
    }

    dedupe(&updated)
}

/// Drops later duplicates: entries repeating an earlier `id`, and pending
/// entries repeating an earlier pending `text`.
pub fn dedupe(quotes: &[Quote]) -> Vec<Quote> {
    let mut seen_ids: HashSet<&QuoteId> = HashSet::new();
    let mut seen_pending_texts: HashSet<&str> = HashSet::new();
    let mut unique = Vec::with_capacity(quotes.len());

    for quote in quotes {
        let first = match &quote.id {
            Some(id) => seen_ids.insert(id),
            None => seen_pending_texts.insert(quote.text.as_str()),
        };
        if first {
            unique.push(quote.clone());
        }
    }

    unique
}

/// Deduplicated snapshot without id-less quotes shadowed by an identified
/// quote of the same text.
fn collapse_snapshot(remote: &[Quote]) -> Vec<Quote> {
    let unique = dedupe(remote);
    let identified: HashSet<&str> = unique
        .iter()
        .filter(|q| q.id.is_some())
        .map(|q| q.text.as_str())
        .collect();

    unique
        .iter()
        .filter(|q| q.id.is_some() || !identified.contains(q.text.as_str()))
        .cloned()
        .collect()
}

/// `local_len` bounds text-only matching to entries that existed before the
/// current pass started appending remote quotes.
fn find_match(merged: &[Quote], local_len: usize, remote: &Quote) -> Option<usize> {
    let local = &merged[..local_len];
    match &remote.id {
        Some(id) => merged
            .iter()
            .position(|q| q.id.as_ref() == Some(id))
            .or_else(|| {
                local
                    .iter()
                    .position(|q| q.is_pending() && q.text == remote.text)
            }),
        None => local.iter().position(|q| q.text == remote.text),
    }
}

/// The copy that ends up in the merged collection. A remote quote without an
/// `id` cannot tell us anything about identity, so the local `id` is kept.
fn resolve_server_wins(local: &Quote, remote: &Quote) -> Quote {
    let mut resolved = remote.clone();
    if resolved.id.is_none() {
        resolved.id = local.id.clone();
    }
    resolved
}

/// A pending local quote receiving its remote id with unchanged content.
fn is_adoption(local: &Quote, resolved: &Quote) -> bool {
    local.is_pending()
        && resolved.id.is_some()
        && local.text == resolved.text
        && local.category == resolved.category
}
