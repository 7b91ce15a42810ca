//! Server-Sent Events stream
//!
//! Bridges the in-process event bus to connected dashboards. Each bus event
//! becomes one SSE message named after its type with the JSON body as data.
//! Lagged subscribers skip the overwritten events and keep streaming.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::AppState;

/// GET /api/events
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.bus.subscribe();
    debug!("SSE client connected, {} subscribers", state.bus.subscriber_count());

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let name = event.event_type().to_string();
            match Event::default().event(name).json_data(&event) {
                Ok(sse_event) => Some(Ok(sse_event)),
                Err(e) => {
                    warn!("failed to serialize SSE event: {}", e);
                    None
                }
            }
        }
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            // Slow client; drop the overwritten events and continue
            warn!("SSE subscriber lagged, skipped {} events", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
