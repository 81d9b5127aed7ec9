use thiserror::Error;

use crate::target::TargetError;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator is already running")]
    AlreadyRunning,

    #[error("generator is not running")]
    NotRunning,

    #[error(transparent)]
    Target(#[from] TargetError),
}
