//! Seam between the run loop and the page being automated.
//!
//! The generator consumes these traits; the `promptloop-browser` crate
//! implements them over CDP, and tests substitute stubs. The page handle is
//! acquired at run start, exclusively owned by the run loop for the run's
//! duration, and released on every exit path.

use std::time::Duration;

use {async_trait::async_trait, thiserror::Error};

#[derive(Debug, Error)]
pub enum TargetError {
    /// The remote-debugging endpoint itself is unreachable or the connection
    /// died. Unrecoverable for the current run.
    #[error("automation endpoint unavailable: {0}")]
    Endpoint(String),

    #[error("no open page matches {fragment:?}")]
    PageNotFound { fragment: String },

    #[error("submit control not ready within {timeout:?}")]
    ReadyTimeout { timeout: Duration },

    /// Any other per-attempt failure; the run loop treats these uniformly.
    #[error("page action failed: {0}")]
    Action(String),
}

/// Factory side of the seam: find the page and hand over an owned handle.
#[async_trait]
pub trait AutomationTarget: Send + Sync {
    async fn locate(&self) -> Result<Box<dyn TargetPage>, TargetError>;
}

/// One located page, driven through a full submit cycle per attempt.
#[async_trait]
pub trait TargetPage: Send + Sync {
    async fn open_editor(&self) -> Result<(), TargetError>;

    async fn clear_and_type(&self, text: &str) -> Result<(), TargetError>;

    /// Wait until the submit control reports ready, bounded by `timeout`.
    async fn wait_until_ready(&self, timeout: Duration) -> Result<(), TargetError>;

    async fn submit(&self) -> Result<(), TargetError>;

    /// Drop the connection. Best-effort; called exactly once per run.
    async fn release(&self);
}
