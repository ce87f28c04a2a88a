//! The Step state machine (§3) and the derived `Status` join rule shared by Phase and Plan.

use serde::{Deserialize, Serialize};

/// (pod type, index) identity used to exclude in-flight assets across plan managers in one
/// offer cycle (§4.g, §4.h).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId {
    pub pod_type: String,
    pub index: u32,
}

impl AssetId {
    pub fn new(pod_type: impl Into<String>, index: u32) -> Self {
        Self { pod_type: pod_type.into(), index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
    Pending,
    Prepared,
    Starting,
    Complete,
    Error,
}

impl StepState {
    /// Valid direct transitions, excluding the admin escapes (`restart`, `forceComplete`) which
    /// bypass this table deliberately.
    pub fn can_transition_to(self, next: StepState) -> bool {
        use StepState::*;
        match (self, next) {
            (Pending, Prepared) => true,
            (Prepared, Starting) => true,
            (Starting, Complete) => true,
            (Complete, Pending) => true,
            (_, Error) => true,
            _ => false,
        }
    }
}

/// Derived status of a Step, Phase, or Plan. `Waiting` is an orthogonal sub-state (§3): it is
/// reported instead of the underlying state while the owning strategy is interrupted, and does
/// not itself appear in `StepState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pending,
    Prepared,
    InProgress,
    Complete,
    Waiting,
    Error,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Complete | Status::Error)
    }

    pub fn from_step_state(state: StepState) -> Status {
        match state {
            StepState::Pending => Status::Pending,
            StepState::Prepared => Status::Prepared,
            StepState::Starting => Status::InProgress,
            StepState::Complete => Status::Complete,
            StepState::Error => Status::Error,
        }
    }

    /// Join rule from §3: ERROR dominates; else COMPLETE if all children COMPLETE; IN_PROGRESS
    /// if any child is non-terminal and non-PREPARED-only; PREPARED if any child is PREPARED and
    /// none IN_PROGRESS; otherwise PENDING. WAITING is applied by the caller when the container's
    /// strategy is interrupted, overriding whatever this function returns.
    pub fn join(children: &[Status]) -> Status {
        if children.is_empty() {
            return Status::Complete;
        }
        if children.iter().any(|s| *s == Status::Error) {
            return Status::Error;
        }
        if children.iter().all(|s| *s == Status::Complete) {
            return Status::Complete;
        }
        if children.iter().any(|s| *s == Status::InProgress) {
            return Status::InProgress;
        }
        if children.iter().any(|s| *s == Status::Prepared) {
            return Status::Prepared;
        }
        Status::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_dominates_join() {
        let children = [Status::Complete, Status::Error, Status::Pending];
        assert_eq!(Status::join(&children), Status::Error);
    }

    #[test]
    fn all_complete_joins_complete() {
        let children = [Status::Complete, Status::Complete];
        assert_eq!(Status::join(&children), Status::Complete);
    }

    #[test]
    fn any_in_progress_joins_in_progress() {
        let children = [Status::Complete, Status::InProgress, Status::Pending];
        assert_eq!(Status::join(&children), Status::InProgress);
    }

    #[test]
    fn prepared_without_in_progress_joins_prepared() {
        let children = [Status::Pending, Status::Prepared];
        assert_eq!(Status::join(&children), Status::Prepared);
    }

    #[test]
    fn empty_container_joins_complete() {
        assert_eq!(Status::join(&[]), Status::Complete);
    }

    #[test]
    fn step_state_transition_table() {
        assert!(StepState::Pending.can_transition_to(StepState::Prepared));
        assert!(!StepState::Pending.can_transition_to(StepState::Starting));
        assert!(StepState::Complete.can_transition_to(StepState::Pending));
        assert!(StepState::Starting.can_transition_to(StepState::Error));
    }
}
