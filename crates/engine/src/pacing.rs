//! Randomized, cancellable delays between automation steps.
//!
//! Every delay is a single timed wait raced against the cancellation token,
//! so a stop request abandons the wait immediately rather than polling ticks.

use std::{sync::Arc, time::Duration};

use {
    rand::Rng,
    tokio::time::Instant,
    tokio_util::sync::CancellationToken,
};

use {crate::journal::Journal, promptloop_playbook::PacingParams};

/// Short pause between UI-affecting sub-steps, seconds (inclusive).
const SHORT_DELAY_SECS: std::ops::RangeInclusive<u64> = 1..=3;

/// Fixed wait after a failed attempt before the loop continues.
pub const FAILURE_COOLDOWN: Duration = Duration::from_secs(60);

/// How often long waits report percentage progress to the journal.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(60);

pub struct Pacing {
    journal: Arc<Journal>,
}

impl Pacing {
    pub fn new(journal: Arc<Journal>) -> Self {
        Self { journal }
    }

    /// 1–3 s pause letting the target page settle between sub-steps.
    pub async fn short_delay(&self, cancel: &CancellationToken) -> Duration {
        let secs = rand::rng().random_range(SHORT_DELAY_SECS);
        sleep_cancellable(Duration::from_secs(secs), cancel).await
    }

    /// Uniform wait in `[wait_min, wait_max]` minutes between full prompt
    /// submissions, with periodic percentage progress in the journal.
    pub async fn long_delay(&self, params: &PacingParams, cancel: &CancellationToken) -> Duration {
        let total = draw_wait(params);
        self.journal.info(format!(
            "waiting {:.1} minutes before the next submission",
            total.as_secs_f64() / 60.0
        ));

        let started = Instant::now();
        let deadline = started + total;
        let mut ticker = tokio::time::interval_at(started + PROGRESS_INTERVAL, PROGRESS_INTERVAL);

        loop {
            tokio::select! {
                () = tokio::time::sleep_until(deadline) => break,
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let pct = (started.elapsed().as_secs_f64() / total.as_secs_f64() * 100.0)
                        .min(100.0);
                    self.journal.info(format!("wait progress: {pct:.0}%"));
                },
            }
        }
        started.elapsed()
    }

    /// Fixed cool-down after an attempt failure.
    pub async fn cooldown(&self, cancel: &CancellationToken) -> Duration {
        sleep_cancellable(FAILURE_COOLDOWN, cancel).await
    }
}

fn draw_wait(params: &PacingParams) -> Duration {
    let min_secs = params.wait_min.max(0.0) * 60.0;
    let max_secs = (params.wait_max * 60.0).max(min_secs);
    let secs = if max_secs > min_secs {
        rand::rng().random_range(min_secs..=max_secs)
    } else {
        min_secs
    };
    Duration::from_secs_f64(secs)
}

async fn sleep_cancellable(duration: Duration, cancel: &CancellationToken) -> Duration {
    let started = Instant::now();
    tokio::select! {
        () = tokio::time::sleep(duration) => {},
        () = cancel.cancelled() => {},
    }
    started.elapsed()
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn pacing() -> Pacing {
        Pacing::new(Arc::new(Journal::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn short_delay_stays_in_range() {
        let cancel = CancellationToken::new();
        for _ in 0..10 {
            let elapsed = pacing().short_delay(&cancel).await;
            assert!(elapsed >= Duration::from_secs(1), "too short: {elapsed:?}");
            assert!(elapsed <= Duration::from_secs(3), "too long: {elapsed:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn long_delay_respects_the_window() {
        let params = PacingParams {
            wait_min: 2.0,
            wait_max: 4.0,
        };
        let cancel = CancellationToken::new();
        let elapsed = pacing().long_delay(&params, &cancel).await;
        assert!(elapsed >= Duration::from_secs(120), "got {elapsed:?}");
        // interval ticks can push completion slightly past the deadline
        assert!(elapsed <= Duration::from_secs(241), "got {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn degenerate_window_waits_the_minimum() {
        let params = PacingParams {
            wait_min: 1.0,
            wait_max: 1.0,
        };
        let cancel = CancellationToken::new();
        let elapsed = pacing().long_delay(&params, &cancel).await;
        assert!(elapsed >= Duration::from_secs(60));
        assert!(elapsed < Duration::from_secs(62));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_the_wait() {
        let pacing = pacing();
        let params = PacingParams {
            wait_min: 10.0,
            wait_max: 10.0,
        };
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let waiter = tokio::spawn(async move { pacing.long_delay(&params, &token).await });

        tokio::time::sleep(Duration::from_secs(5)).await;
        cancel.cancel();

        let elapsed = waiter.await.unwrap();
        assert!(elapsed < Duration::from_secs(30), "got {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_cooldown_returns_early() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let elapsed = pacing().cooldown(&cancel).await;
        assert!(elapsed < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn long_delay_emits_progress() {
        let journal = Arc::new(Journal::default());
        let pacing = Pacing::new(Arc::clone(&journal));
        let params = PacingParams {
            wait_min: 5.0,
            wait_max: 5.0,
        };
        pacing.long_delay(&params, &CancellationToken::new()).await;

        let progress: Vec<_> = journal
            .snapshot()
            .into_iter()
            .filter(|e| e.message.starts_with("wait progress"))
            .collect();
        assert!(!progress.is_empty());
    }
}
