//! The concrete `Step`: smallest unit of work, owning its own lifecycle state machine (§4.c).
//!
//! State lives behind `parking_lot::RwLock`/`Mutex`, never held across an `.await` — every
//! operation here is a short synchronous transition; the surrounding `PlanScheduler` is where the
//! actual driver I/O (async) happens, exactly as in the teacher's own scheduler-contract style.

use std::collections::HashSet;

use parking_lot::RwLock;

use helmsman_kernel::model::{ConfigTarget, PlacementRule, ResourceSet};
use helmsman_kernel::offer::TaskId;
use helmsman_kernel::operation::{OfferRequirement, TaskRequirement};
use helmsman_kernel::status::TaskStatus;
use helmsman_kernel::step::{AssetId, Status, StepState};

pub struct Step {
    id: String,
    name: String,
    pod_type: String,
    index: u32,
    tasks: Vec<TaskRequirement>,
    placement: Option<PlacementRule>,
    target: ConfigTarget,
    /// Present for recovery steps that must tear down a stale reservation before relaunching.
    teardown: Option<ResourceSet>,
    state: RwLock<StepState>,
    task_ids: RwLock<HashSet<TaskId>>,
}

impl Step {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        pod_type: impl Into<String>,
        index: u32,
        tasks: Vec<TaskRequirement>,
        placement: Option<PlacementRule>,
        target: ConfigTarget,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pod_type: pod_type.into(),
            index,
            tasks,
            placement,
            target,
            teardown: None,
            state: RwLock::new(StepState::Pending),
            task_ids: RwLock::new(HashSet::new()),
        }
    }

    /// Constructs a recovery step; `teardown` is set when the task's failure has been declared
    /// permanent and a fresh reservation must replace the stale one (§4.j).
    pub fn new_recovery(
        id: impl Into<String>,
        name: impl Into<String>,
        pod_type: impl Into<String>,
        index: u32,
        tasks: Vec<TaskRequirement>,
        placement: Option<PlacementRule>,
        target: ConfigTarget,
        teardown: Option<ResourceSet>,
    ) -> Self {
        let mut step = Self::new(id, name, pod_type, index, tasks, placement, target);
        step.teardown = teardown;
        step
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> ConfigTarget {
        self.target
    }

    pub fn asset(&self) -> AssetId {
        AssetId::new(self.pod_type.clone(), self.index)
    }

    pub fn state(&self) -> StepState {
        *self.state.read()
    }

    /// Step never itself reports WAITING: that sub-state is applied by the owning container when
    /// its strategy is interrupted (§3), so this is always `Status::from_step_state`.
    pub fn status(&self) -> Status {
        Status::from_step_state(self.state())
    }

    pub fn task_ids(&self) -> HashSet<TaskId> {
        self.task_ids.read().clone()
    }

    fn build_requirement(&self) -> OfferRequirement {
        OfferRequirement {
            tasks: self.tasks.clone(),
            placement: self.placement.clone(),
            target: self.target,
            teardown: self.teardown.clone(),
        }
    }

    /// Idempotent: re-invoking after a PENDING→PREPARED transition already happened, or after
    /// the step left PENDING for any other reason, returns `None` rather than erroring.
    pub fn start(&self) -> Option<OfferRequirement> {
        let mut state = self.state.write();
        if *state != StepState::Pending {
            return None;
        }
        let requirement = self.build_requirement();
        *state = StepState::Prepared;
        Some(requirement)
    }

    /// `accepted = None` or empty leaves the step PREPARED; a non-empty set transitions to
    /// STARTING and remembers the ids (§4.c; an empty id set must never reach STARTING).
    pub fn update_offer_status(&self, accepted: Option<HashSet<TaskId>>) {
        let mut state = self.state.write();
        if *state != StepState::Prepared {
            return;
        }
        if let Some(ids) = accepted {
            if !ids.is_empty() {
                *self.task_ids.write() = ids;
                *state = StepState::Starting;
            }
        }
    }

    /// Applies a `TaskStatus`. Unknown task-ids are ignored. A config-target mismatch is a
    /// rollout trigger (PENDING), not an error, per §4.c's edge case. Terminal "running" states
    /// complete the step.
    pub fn update(&self, status: &TaskStatus) {
        if !self.task_ids.read().contains(&status.task_id) {
            return;
        }
        if let Some(target) = status.config_target {
            if target != self.target {
                let mut state = self.state.write();
                *state = StepState::Pending;
                self.task_ids.write().clear();
                return;
            }
        }
        if status.state.is_running_or_finished() {
            *self.state.write() = StepState::Complete;
        }
    }

    pub fn restart(&self) {
        *self.state.write() = StepState::Pending;
        self.task_ids.write().clear();
    }

    pub fn force_complete(&self) {
        *self.state.write() = StepState::Complete;
    }

    pub fn mark_error(&self) {
        *self.state.write() = StepState::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helmsman_kernel::offer::TaskId;
    use helmsman_kernel::status::TaskState;

    fn task_req(name: &str) -> TaskRequirement {
        TaskRequirement {
            task_id: TaskId::new(name),
            name: name.to_string(),
            resources: ResourceSet { cpus: 1.0, mem: 128.0, ports: vec![], disk: None, persistent_volume_bytes: None },
            executor: None,
        }
    }

    fn new_step() -> Step {
        Step::new("step-a", "a", "pod-a", 0, vec![task_req("t1")], None, ConfigTarget::new())
    }

    #[test]
    fn only_pending_step_can_start() {
        let step = new_step();
        assert!(step.start().is_some());
        assert_eq!(step.state(), StepState::Prepared);
        assert!(step.start().is_none(), "start is idempotent once no longer PENDING");
    }

    #[test]
    fn empty_accepted_ids_keep_step_prepared() {
        let step = new_step();
        step.start();
        step.update_offer_status(None);
        assert_eq!(step.state(), StepState::Prepared);
        step.update_offer_status(Some(HashSet::new()));
        assert_eq!(step.state(), StepState::Prepared);
    }

    #[test]
    fn accepted_ids_transition_to_starting() {
        let step = new_step();
        step.start();
        let mut ids = HashSet::new();
        ids.insert(TaskId::new("t1"));
        step.update_offer_status(Some(ids));
        assert_eq!(step.state(), StepState::Starting);
    }

    #[test]
    fn running_status_completes_step() {
        let step = new_step();
        step.start();
        let mut ids = HashSet::new();
        ids.insert(TaskId::new("t1"));
        step.update_offer_status(Some(ids));
        let status = TaskStatus::new(TaskId::new("t1"), TaskState::Running).with_target(step.target());
        step.update(&status);
        assert_eq!(step.state(), StepState::Complete);
    }

    #[test]
    fn unknown_task_id_is_ignored() {
        let step = new_step();
        step.start();
        let mut ids = HashSet::new();
        ids.insert(TaskId::new("t1"));
        step.update_offer_status(Some(ids));
        let status = TaskStatus::new(TaskId::new("unknown"), TaskState::Running);
        step.update(&status);
        assert_eq!(step.state(), StepState::Starting);
    }

    #[test]
    fn mismatched_target_resets_to_pending() {
        let step = new_step();
        step.start();
        let mut ids = HashSet::new();
        ids.insert(TaskId::new("t1"));
        step.update_offer_status(Some(ids));
        let status = TaskStatus::new(TaskId::new("t1"), TaskState::Running).with_target(ConfigTarget::new());
        step.update(&status);
        assert_eq!(step.state(), StepState::Pending);
    }

    #[test]
    fn force_complete_and_restart_are_explicit_admin_transitions() {
        let step = new_step();
        step.force_complete();
        assert_eq!(step.state(), StepState::Complete);
        step.restart();
        assert_eq!(step.state(), StepState::Pending);
    }
}
