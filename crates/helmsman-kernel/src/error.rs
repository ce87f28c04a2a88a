//! Layered error taxonomy (§7). Narrow enums per concern, composed with `#[from]` into an
//! umbrella `SchedulerError` at the seams that can fail for more than one reason, mirroring the
//! teacher's `KernelError`-over-narrower-errors style.

use thiserror::Error;

use crate::step::StepState;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepError {
    #[error("invalid step transition from {from:?} to {to:?}")]
    InvalidTransition { from: StepState, to: StepState },

    #[error("task status config target does not match step target")]
    TargetMismatch,

    #[error("a step entering STARTING must have a non-empty task-id set")]
    EmptyTaskIds,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DriverError {
    #[error("driver is unavailable")]
    Unavailable,

    #[error("driver rejected the call: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("store is unavailable")]
    Unavailable,

    #[error("key not found")]
    NotFound,

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("a timed failure monitor requires a non-zero timeout")]
    InvalidTimeout,

    #[error("could not deserialize configuration: {0}")]
    Deserialize(String),

    #[cfg(feature = "config")]
    #[error("io error loading configuration: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config")]
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[cfg(feature = "config")]
    #[error("configuration parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecorderError {
    #[error("operation recorder failed: {0}")]
    Failed(String),
}

/// Umbrella error for seams (PlanScheduler, PlanCoordinator::process_offers) that can fail for
/// more than one underlying reason.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchedulerError {
    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
