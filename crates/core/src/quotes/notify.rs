//! Turning sync outcomes into user-facing notifications.

use super::errors::QuoteSyncError;
use super::model::SyncResult;
use super::ports::Notifier;

/// Messages describing a finished cycle, as `(message, is_error)` pairs.
///
/// A skipped or empty cycle yields no messages.
pub fn sync_result_messages(result: &SyncResult) -> Vec<(String, bool)> {
    let mut messages = Vec::new();
    if result.skipped {
        return messages;
    }

    if !result.conflicts.is_empty() {
        messages.push((
            format!(
                "Resolved {} conflicts with server data",
                result.conflicts.len()
            ),
            false,
        ));
    }
    if !result.applied_remote_updates.is_empty() {
        messages.push((
            format!(
                "Updated {} quotes from server",
                result.applied_remote_updates.len()
            ),
            false,
        ));
    }
    if !result.pushed_local.is_empty() {
        messages.push((
            format!("Pushed {} local quotes to server", result.pushed_local.len()),
            false,
        ));
    }
    if !result.rejected_remote.is_empty() {
        messages.push((
            format!(
                "Ignored {} invalid quotes from server",
                result.rejected_remote.len()
            ),
            true,
        ));
    }
    for failed in &result.failed_pushes {
        messages.push((
            format!("Failed to push quote \"{}\": {}", failed.quote.text, failed.message),
            true,
        ));
    }
    messages
}

/// Sends every message for `result` to `notifier`.
pub fn report_sync_result(result: &SyncResult, notifier: &dyn Notifier) {
    for (message, is_error) in sync_result_messages(result) {
        notifier.notify(&message, is_error);
    }
}

/// Reports an aborted cycle with exactly one error notification.
pub fn report_sync_failure(error: &QuoteSyncError, notifier: &dyn Notifier) {
    notifier.notify(&format!("Sync failed: {}", error), true);
}
