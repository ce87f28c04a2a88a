//! Exit codes (§6) and the fatal-error channel that replaces a direct process exit (§9).
//!
//! Per the REDESIGN FLAGS, the engine never calls `std::process::exit`; it only ever constructs
//! a `FatalError` and sends it over an `mpsc::UnboundedSender<FatalError>` that the bin crate's
//! supervisor owns. The supervisor is the sole place that maps a `FatalError` to an `ExitCode`
//! and terminates the process.

use tokio::sync::mpsc;

/// Declaration order matches §6 exactly; `code()` assigns non-zero codes in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Normal,
    InitializationFailure,
    RegistrationFailure,
    ReRegistration,
    OfferRescinded,
    Disconnected,
    Error,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Normal => 0,
            ExitCode::InitializationFailure => 1,
            ExitCode::RegistrationFailure => 2,
            ExitCode::ReRegistration => 3,
            ExitCode::OfferRescinded => 4,
            ExitCode::Disconnected => 5,
            ExitCode::Error => 6,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FatalError {
    InitializationFailure(String),
    RegistrationFailure(String),
    ReRegistration,
    OfferRescinded,
    Disconnected,
    Error(String),
}

impl FatalError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            FatalError::InitializationFailure(_) => ExitCode::InitializationFailure,
            FatalError::RegistrationFailure(_) => ExitCode::RegistrationFailure,
            FatalError::ReRegistration => ExitCode::ReRegistration,
            FatalError::OfferRescinded => ExitCode::OfferRescinded,
            FatalError::Disconnected => ExitCode::Disconnected,
            FatalError::Error(_) => ExitCode::Error,
        }
    }

    /// `error()` callbacks carrying this substring get printed recovery instructions (§6).
    pub fn is_framework_removed(&self) -> bool {
        matches!(self, FatalError::Error(msg) if msg.contains("framework removed"))
    }
}

pub type FatalErrorSender = mpsc::UnboundedSender<FatalError>;
pub type FatalErrorReceiver = mpsc::UnboundedReceiver<FatalError>;

pub fn fatal_error_channel() -> (FatalErrorSender, FatalErrorReceiver) {
    mpsc::unbounded_channel()
}
