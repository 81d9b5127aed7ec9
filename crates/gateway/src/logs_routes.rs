//! Journal snapshot and live SSE stream.

use std::convert::Infallible;

use {
    axum::{
        Json,
        extract::State,
        response::sse::{Event, KeepAlive, Sse},
    },
    tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream},
};

use promptloop_engine::JournalEntry;

use crate::state::AppState;

/// Recent entries from the in-memory ring, oldest first.
pub async fn snapshot(State(state): State<AppState>) -> Json<Vec<JournalEntry>> {
    Json(state.journal.snapshot())
}

/// Live journal feed. Emission order is preserved; a subscriber that lags far
/// enough to be dropped by the broadcast channel just misses entries and the
/// control panel reconnects.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.journal.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|entry| {
        entry
            .ok()
            .and_then(|e| Event::default().json_data(&e).ok())
            .map(Ok)
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
