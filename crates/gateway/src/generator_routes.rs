//! Run-loop control: status, start, stop.

use {
    axum::{Json, extract::State},
    serde_json::{Value, json},
};

use crate::{error::ApiError, state::AppState};

use promptloop_engine::RunState;

pub async fn status(State(state): State<AppState>) -> Json<RunState> {
    Json(state.generator.status().await)
}

/// Idempotent-rejecting: a second start while running is a 409, and a start
/// without a locatable target page is a 404 — the generator stays idle.
pub async fn start(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.generator.start().await?;
    Ok(Json(json!({ "running": true })))
}

pub async fn stop(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.generator.stop().await?;
    Ok(Json(json!({ "running": false })))
}
