use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures_core::stream::Stream;
use tokio_stream::wrappers::BroadcastStream;

use crate::main_lib::AppState;
use crate::notifications::Notification;

const KEEP_ALIVE: Duration = Duration::from_secs(15);

async fn list_notifications(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    Json(state.notifications.recent())
}

/// Server-sent stream of [`ServerEvent`](crate::events::ServerEvent)s. A
/// subscriber that falls behind misses events rather than blocking the bus.
async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = BroadcastStream::new(state.event_bus.subscribe());
    let stream = tokio_stream::StreamExt::filter_map(receiver, |received| {
        let event = received.ok()?;
        let frame = SseEvent::default().event(event.name);
        let frame = match event.payload {
            Some(payload) => frame.json_data(payload).ok()?,
            None => frame.data("null"),
        };
        Some(Ok(frame))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/events/stream", get(stream_events))
}
