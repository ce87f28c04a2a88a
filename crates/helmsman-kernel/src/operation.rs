//! Offer requirements and the recommendations the evaluator derives from them.

use serde::{Deserialize, Serialize};

use crate::model::{ConfigTarget, PlacementRule, ResourceSet};
use crate::offer::{ExecutorInfo, OfferId, TaskId, TaskInfo};

/// One of the five operation kinds a cluster manager understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Reserve { resources: ResourceSet },
    Create { volume_bytes: u64 },
    Launch { task: TaskInfo },
    Unreserve { resources: ResourceSet },
    Destroy { volume_bytes: u64 },
}

impl Operation {
    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            Operation::Launch { task } => Some(&task.task_id),
            _ => None,
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, Operation::Unreserve { .. } | Operation::Destroy { .. })
    }
}

/// An operation bundled with the offer it targets; the unit the accepter groups by offer id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecommendation {
    pub offer_id: OfferId,
    pub operation: Operation,
}

/// A per-task resource ask, derived from a `PodSpec`'s tasks, describing what a single offer
/// must satisfy to fulfill one Step. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequirement {
    pub task_id: TaskId,
    pub name: String,
    pub resources: ResourceSet,
    pub executor: Option<ExecutorInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRequirement {
    pub tasks: Vec<TaskRequirement>,
    pub placement: Option<PlacementRule>,
    pub target: ConfigTarget,
    /// Present when a previously reserved/destroyed resource set for this pod should be torn
    /// down before a fresh reservation is made (permanent-failure recovery, §4.j).
    pub teardown: Option<ResourceSet>,
}

impl OfferRequirement {
    pub fn total_cpus(&self) -> f64 {
        self.tasks.iter().map(|t| t.resources.cpus).sum()
    }

    pub fn total_mem(&self) -> f64 {
        self.tasks.iter().map(|t| t.resources.mem).sum()
    }

    pub fn needs_persistent_volume(&self) -> bool {
        self.tasks.iter().any(|t| t.resources.needs_persistent_volume())
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.task_id.clone()).collect()
    }
}
