//! Control surface: JSON API, SSE log stream, and the embedded control panel.
//!
//! Handlers run concurrently with the run loop but only touch shared state
//! through the store, the generator's start/stop/status, and journal
//! snapshots/subscriptions — no handler ever reaches into run internals.

pub mod assets;
pub mod error;
pub mod generator_routes;
pub mod logs_routes;
pub mod playbook_routes;
pub mod server;
pub mod state;

pub use {
    error::ApiError,
    server::{build_app, start_server},
    state::AppState,
};
