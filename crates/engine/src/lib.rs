//! The promptloop core: template expansion, pacing, the run journal, and the
//! generator run loop.
//!
//! The generator is a single long-lived cooperative task. It re-reads the
//! current playbook every outer iteration, picks an enabled prompt at random,
//! expands its template, and drives the automation target through a bounded
//! number of submit cycles with randomized pacing in between. Stopping is
//! cooperative: the cancellation token is checked at iteration and delay
//! boundaries, never preemptively.

pub mod error;
pub mod generator;
pub mod journal;
pub mod pacing;
pub mod target;
pub mod template;

pub use {
    error::GeneratorError,
    generator::{Generator, READY_TIMEOUT, RunState},
    journal::{Journal, JournalEntry, Severity},
    pacing::Pacing,
    target::{AutomationTarget, TargetError, TargetPage},
    template::{ExpandError, expand},
};
