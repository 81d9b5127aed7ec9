use std::sync::Arc;

use {
    promptloop_engine::{Generator, Journal},
    promptloop_playbook::PlaybookStore,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PlaybookStore>,
    pub generator: Arc<Generator>,
    pub journal: Arc<Journal>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PlaybookStore>,
        generator: Arc<Generator>,
        journal: Arc<Journal>,
    ) -> Self {
        Self {
            store,
            generator,
            journal,
        }
    }
}
