//! The generator run loop: start/stop/status over a single cooperative task.
//!
//! Exactly one run loop is active process-wide, enforced by the `running`
//! flag rather than locking. The loop re-reads the current playbook every
//! outer iteration, so edits made while running apply to the next prompt
//! pick, never the in-flight one.

use std::{sync::Arc, time::Duration};

use {
    rand::Rng,
    serde::Serialize,
    thiserror::Error,
    tokio::{
        sync::{Mutex, RwLock},
        task::JoinHandle,
    },
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
};

use promptloop_playbook::{CURRENT_PLAYBOOK, PlaybookStore, StoreError};

use crate::{
    error::GeneratorError,
    journal::Journal,
    pacing::Pacing,
    target::{AutomationTarget, TargetError, TargetPage},
    template::{self, ExpandError},
};

/// Bound on the wait for the submit control to become ready, per attempt.
pub const READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only view of the run loop's state.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub running: bool,
    pub stop_requested: bool,
    pub current_prompt_index: Option<usize>,
    pub current_attempt: Option<u32>,
}

/// Failures absorbed by the outer loop. Everything lands in the journal and a
/// cooldown; only a dead endpoint ends the run.
#[derive(Debug, Error)]
enum IterationError {
    #[error(transparent)]
    Expand(#[from] ExpandError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("playbook load failed: {0}")]
    Store(#[from] StoreError),
}

impl IterationError {
    fn is_fatal(&self) -> bool {
        matches!(self, Self::Target(TargetError::Endpoint(_)))
    }
}

pub struct Generator {
    store: Arc<dyn PlaybookStore>,
    target: Arc<dyn AutomationTarget>,
    journal: Arc<Journal>,
    pacing: Pacing,
    state: RwLock<RunState>,
    cancel: Mutex<Option<CancellationToken>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Generator {
    pub fn new(
        store: Arc<dyn PlaybookStore>,
        target: Arc<dyn AutomationTarget>,
        journal: Arc<Journal>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            target,
            pacing: Pacing::new(Arc::clone(&journal)),
            journal,
            state: RwLock::new(RunState::default()),
            cancel: Mutex::new(None),
            task: Mutex::new(None),
        })
    }

    /// Locate the target page and spawn the run loop.
    ///
    /// Fails with [`GeneratorError::AlreadyRunning`] outside `Idle`, and with
    /// the underlying [`TargetError`] when the page cannot be located — in
    /// that case the generator stays idle.
    pub async fn start(self: &Arc<Self>) -> Result<(), GeneratorError> {
        {
            // Claim the running slot before the slow connect so a concurrent
            // start is rejected instead of racing.
            let mut state = self.state.write().await;
            if state.running {
                return Err(GeneratorError::AlreadyRunning);
            }
            *state = RunState {
                running: true,
                ..RunState::default()
            };
        }

        let page = match self.target.locate().await {
            Ok(page) => page,
            Err(e) => {
                self.journal.error(format!("cannot start: {e}"));
                warn!(error = %e, "generator start aborted");
                *self.state.write().await = RunState::default();
                return Err(e.into());
            },
        };

        self.journal.success("generator started");
        info!("generator started");

        let cancel = CancellationToken::new();
        *self.cancel.lock().await = Some(cancel.clone());

        let svc = Arc::clone(self);
        let handle = tokio::spawn(async move {
            svc.run_loop(page, cancel).await;
        });
        *self.task.lock().await = Some(handle);
        Ok(())
    }

    /// Request a cooperative stop. The in-flight attempt or delay finishes at
    /// its next checkpoint; this call returns immediately.
    pub async fn stop(&self) -> Result<(), GeneratorError> {
        {
            let mut state = self.state.write().await;
            if !state.running {
                return Err(GeneratorError::NotRunning);
            }
            state.stop_requested = true;
        }
        if let Some(cancel) = self.cancel.lock().await.as_ref() {
            cancel.cancel();
        }
        self.journal.info("stop requested; finishing the current step");
        info!("generator stop requested");
        Ok(())
    }

    pub async fn status(&self) -> RunState {
        *self.state.read().await
    }

    // ── Internal ────────────────────────────────────────────────────────

    async fn run_loop(self: Arc<Self>, page: Box<dyn TargetPage>, cancel: CancellationToken) {
        while !cancel.is_cancelled() {
            match self.run_iteration(page.as_ref(), &cancel).await {
                Ok(()) => {},
                Err(e) if e.is_fatal() => {
                    self.journal.error(format!("fatal: {e}; stopping the run"));
                    warn!(error = %e, "generator run aborted");
                    break;
                },
                Err(e) => {
                    // A single failure abandons the remaining retries of this
                    // pick; the outer loop continues after the cooldown.
                    self.journal.error(format!("attempt failed: {e}"));
                    warn!(error = %e, "attempt failed, cooling down");
                    self.set_progress(None, None).await;
                    self.pacing.cooldown(&cancel).await;
                },
            }
        }

        page.release().await;
        *self.state.write().await = RunState::default();
        self.journal.info("generator stopped");
        info!("generator stopped");
    }

    async fn run_iteration(
        &self,
        page: &dyn TargetPage,
        cancel: &CancellationToken,
    ) -> Result<(), IterationError> {
        let playbook = self.store.load(CURRENT_PLAYBOOK).await?;

        let enabled = playbook.enabled_prompts();
        if enabled.is_empty() {
            // An empty playbook never ends the run; it idles until the next
            // check picks up an edit.
            self.journal
                .warning("no enabled prompts; idling until the next check");
            self.pacing.long_delay(&playbook.params, cancel).await;
            return Ok(());
        }

        let (index, prompt) = {
            let pick = rand::rng().random_range(0..enabled.len());
            let (i, p) = enabled[pick];
            (i, p.clone())
        };

        if prompt.retries == 0 {
            self.journal.warning(format!(
                "prompt {} has a zero retry budget; nothing to submit",
                index + 1
            ));
            self.pacing.long_delay(&playbook.params, cancel).await;
            return Ok(());
        }

        // One random choice per variable, fixed for every attempt of this pick.
        let text = template::expand(&prompt.text, &playbook.vars)?;

        for attempt in 1..=prompt.retries {
            if cancel.is_cancelled() {
                return Ok(());
            }
            self.set_progress(Some(index), Some(attempt)).await;
            self.journal.info(format!(
                "prompt {}/{} attempt {}/{}: {}",
                index + 1,
                playbook.prompts.len(),
                attempt,
                prompt.retries,
                text
            ));

            self.drive_attempt(page, &text, cancel).await?;
            self.journal.success("prompt submitted");
            self.pacing.long_delay(&playbook.params, cancel).await;
        }

        self.set_progress(None, None).await;
        Ok(())
    }

    /// One full submit cycle: open editor → type → await ready → submit.
    async fn drive_attempt(
        &self,
        page: &dyn TargetPage,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<(), TargetError> {
        page.open_editor().await?;
        self.pacing.short_delay(cancel).await;
        page.clear_and_type(text).await?;
        self.pacing.short_delay(cancel).await;
        page.wait_until_ready(READY_TIMEOUT).await?;
        page.submit().await?;
        Ok(())
    }

    async fn set_progress(&self, index: Option<usize>, attempt: Option<u32>) {
        let mut state = self.state.write().await;
        state.current_prompt_index = index;
        state.current_attempt = attempt;
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
