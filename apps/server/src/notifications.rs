//! In-memory notification log backing `GET /notifications`.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use quotekeeper_core::quotes::Notifier;
use serde::Serialize;
use serde_json::json;

use crate::events::{EventBus, ServerEvent, NOTIFICATION};

/// How many notifications are kept before the oldest are dropped.
pub const NOTIFICATION_CAPACITY: usize = 50;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub message: String,
    pub is_error: bool,
    pub created_at: DateTime<Utc>,
}

/// Bounded, newest-last buffer of user-facing messages. Every message is also
/// logged and broadcast on the event bus.
pub struct NotificationLog {
    entries: Mutex<VecDeque<Notification>>,
    capacity: usize,
    events: EventBus,
}

impl NotificationLog {
    pub fn new(events: EventBus) -> Self {
        Self::with_capacity(events, NOTIFICATION_CAPACITY)
    }

    pub fn with_capacity(events: EventBus, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
            events,
        }
    }

    /// Snapshot of the buffered notifications, oldest first.
    pub fn recent(&self) -> Vec<Notification> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, message: &str, is_error: bool) {
        if is_error {
            tracing::warn!("{}", message);
        } else {
            tracing::info!("{}", message);
        }

        let notification = Notification {
            message: message.to_string(),
            is_error,
            created_at: Utc::now(),
        };

        {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            while entries.len() >= self.capacity {
                entries.pop_front();
            }
            entries.push_back(notification);
        }

        self.events.publish(ServerEvent::with_payload(
            NOTIFICATION,
            json!({ "message": message, "isError": is_error }),
        ));
    }
}
