//! Asynchronous status updates delivered by the cluster manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ConfigTarget;
use crate::offer::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Staging,
    Starting,
    Running,
    Finished,
    Failed,
    Killed,
    Lost,
    Error,
    Dropped,
    Gone,
    Unreachable,
}

impl TaskState {
    /// States from which no further status update for this launch is expected.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Finished
                | TaskState::Failed
                | TaskState::Killed
                | TaskState::Error
                | TaskState::Dropped
                | TaskState::Gone
        )
    }

    /// A running task or one that finished cleanly (the two states a Step considers COMPLETE).
    pub fn is_running_or_finished(self) -> bool {
        matches!(self, TaskState::Running | TaskState::Finished)
    }

    /// A task the reconciler should stop waiting on, either because it is confirmed running or
    /// because it is confirmed gone. `Lost`/`Unreachable` are deliberately excluded: the cluster
    /// manager may still resolve them to a terminal state later.
    pub fn is_confirmed(self) -> bool {
        self.is_terminal() || self == TaskState::Running
    }

    /// Recovery-relevant: states that mark a task as unhealthy and worth scanning for recovery.
    pub fn is_unhealthy(self) -> bool {
        matches!(
            self,
            TaskState::Failed
                | TaskState::Killed
                | TaskState::Lost
                | TaskState::Error
                | TaskState::Dropped
                | TaskState::Gone
                | TaskState::Unreachable
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task_id: TaskId,
    pub state: TaskState,
    pub config_target: Option<ConfigTarget>,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TaskStatus {
    pub fn new(task_id: TaskId, state: TaskState) -> Self {
        Self { task_id, state, config_target: None, reason: None, timestamp: Utc::now() }
    }

    pub fn with_target(mut self, target: ConfigTarget) -> Self {
        self.config_target = Some(target);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
