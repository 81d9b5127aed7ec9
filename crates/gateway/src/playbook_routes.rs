//! Playbook CRUD: the current document plus the named archive.

use {
    axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
    },
    serde_json::{Value, json},
    tracing::info,
};

use promptloop_playbook::{CURRENT_PLAYBOOK, Playbook, parse_playbook};

use crate::{error::ApiError, state::AppState};

pub async fn get_current(State(state): State<AppState>) -> Result<Json<Playbook>, ApiError> {
    Ok(Json(state.store.load(CURRENT_PLAYBOOK).await?))
}

pub async fn save_current(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    save_as(&state, CURRENT_PLAYBOOK, body).await
}

pub async fn list_named(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let names = state.store.list().await?;
    Ok(Json(json!({ "playbooks": names })))
}

pub async fn get_named(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Playbook>, ApiError> {
    Ok(Json(state.store.load(&name).await?))
}

pub async fn save_named(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    save_as(&state, &name, body).await
}

pub async fn delete_named(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete(&name).await?;
    state.journal.info(format!("playbook \"{name}\" deleted"));
    Ok(Json(json!({ "deleted": name })))
}

/// Validate (collecting every violation) and persist in one step, so the
/// caller can fix a rejected document in a single round trip.
async fn save_as(state: &AppState, name: &str, body: Value) -> Result<Json<Value>, ApiError> {
    let playbook = parse_playbook(body).map_err(|result| {
        ApiError::with_details(
            StatusCode::BAD_REQUEST,
            "invalid playbook",
            result.error_messages(),
        )
    })?;
    state.store.save(name, &playbook).await?;
    info!(name, prompts = playbook.prompts.len(), "playbook saved");
    state.journal.success(format!("playbook \"{name}\" saved"));
    Ok(Json(json!({ "saved": name })))
}
