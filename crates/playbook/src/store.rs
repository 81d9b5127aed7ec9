//! Persistence trait for playbooks.

use {async_trait::async_trait, thiserror::Error};

use crate::types::Playbook;

/// Reserved name of the default playbook the run loop reads each iteration.
pub const CURRENT_PLAYBOOK: &str = "current";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("playbook not found: {name}")]
    NotFound { name: String },

    #[error("invalid playbook name: {name:?} (use 1-64 of [A-Za-z0-9_-])")]
    InvalidName { name: String },

    #[error("the default playbook cannot be deleted")]
    Reserved,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    #[must_use]
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Names double as file stems, so they are restricted to a safe charset.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Persistence backend for the default and named playbooks.
///
/// The store owns the on-disk representation; callers get whole-document
/// snapshots and replace documents wholesale.
#[async_trait]
pub trait PlaybookStore: Send + Sync {
    /// Load a playbook by name. The reserved [`CURRENT_PLAYBOOK`] falls back
    /// to [`Playbook::default`] when nothing has been saved yet.
    async fn load(&self, name: &str) -> Result<Playbook>;

    /// Save (create or replace) a playbook under `name`.
    async fn save(&self, name: &str, playbook: &Playbook) -> Result<()>;

    /// Names of the archived playbooks, sorted. The reserved default is
    /// implicit and never listed.
    async fn list(&self) -> Result<Vec<String>>;

    /// Delete a named playbook. Deleting the reserved default is rejected.
    async fn delete(&self, name: &str) -> Result<()>;
}
