use serde_json::Value;
use tokio::sync::broadcast;

/// Event names pushed to `/events/stream` subscribers.
pub const SYNC_START: &str = "quotes:sync-start";
pub const SYNC_COMPLETE: &str = "quotes:sync-complete";
pub const SYNC_ERROR: &str = "quotes:sync-error";
pub const QUOTES_CHANGED: &str = "quotes:changed";
pub const NOTIFICATION: &str = "notification";

#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub name: &'static str,
    pub payload: Option<Value>,
}

impl ServerEvent {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            payload: None,
        }
    }

    pub fn with_payload(name: &'static str, payload: Value) -> Self {
        Self {
            name,
            payload: Some(payload),
        }
    }
}

/// Broadcast bus fanning events out to every connected stream.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ServerEvent) {
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }
}
