//! Router construction and server startup.

use std::net::SocketAddr;

use {
    axum::{
        Json, Router,
        routing::{get, post},
    },
    serde_json::{Value, json},
    tower_http::cors::CorsLayer,
    tracing::info,
};

use crate::{assets, generator_routes, logs_routes, playbook_routes, state::AppState};

/// Build the control-surface router (shared between startup and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/playbook",
            get(playbook_routes::get_current).post(playbook_routes::save_current),
        )
        .route("/api/playbooks", get(playbook_routes::list_named))
        .route(
            "/api/playbooks/{name}",
            get(playbook_routes::get_named)
                .post(playbook_routes::save_named)
                .delete(playbook_routes::delete_named),
        )
        .route("/api/generator/status", get(generator_routes::status))
        .route("/api/generator/start", post(generator_routes::start))
        .route("/api/generator/stop", post(generator_routes::stop))
        .route("/api/logs", get(logs_routes::snapshot))
        .route("/api/logs/stream", get(logs_routes::stream))
        .route("/", get(assets::index))
        .route("/assets/{*path}", get(assets::asset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the control-panel HTTP server; returns when ctrl-c arrives.
pub async fn start_server(bind: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "control panel listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ── Tests ───────────────────────────────────────────────────────────────────
