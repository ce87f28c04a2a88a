//! Owns one Plan: routes `TaskStatus` updates into it, exposes candidate Steps minus dirty
//! assets, and notifies subscribers of status changes via an internal `mpsc` channel (§4.g).

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedSender;

use helmsman_kernel::status::TaskStatus;
use helmsman_kernel::step::{AssetId, Status};

use crate::plan::Plan;
use crate::step::Step;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanChangeEvent {
    pub plan_name: String,
    pub status: Status,
}

pub struct PlanManager {
    plan: RwLock<Plan>,
    last_status: RwLock<Status>,
    notify: UnboundedSender<PlanChangeEvent>,
}

impl PlanManager {
    pub fn new(plan: Plan, notify: UnboundedSender<PlanChangeEvent>) -> Arc<Self> {
        let initial_status = plan.status();
        let manager = Arc::new(Self { plan: RwLock::new(plan), last_status: RwLock::new(initial_status), notify });
        manager.maybe_notify(initial_status);
        manager
    }

    pub fn plan_name(&self) -> String {
        self.plan.read().name().to_string()
    }

    pub fn status(&self) -> Status {
        self.plan.read().status()
    }

    /// Candidate Steps for this plan, excluding any whose asset is in `dirty` (owned by another
    /// plan manager already acting in this offer cycle, §4.g/§4.h).
    pub fn get_candidates(&self, dirty: &HashSet<AssetId>) -> Vec<Arc<Step>> {
        self.plan.read().candidate_steps().into_iter().filter(|s| !dirty.contains(&s.asset())).collect()
    }

    pub fn update(&self, status: &TaskStatus) {
        let plan = self.plan.read();
        for phase in plan.phases() {
            for step in phase.steps() {
                step.update(status);
            }
        }
        drop(plan);
        self.maybe_notify(self.status());
    }

    pub fn restart(&self, phase_id: &str, step_id: &str) {
        if let Some(phase) = self.plan.read().phase(phase_id) {
            if let Some(step) = phase.step(step_id) {
                step.restart();
            }
        }
        self.maybe_notify(self.status());
    }

    pub fn force_complete(&self, phase_id: &str, step_id: &str) {
        if let Some(phase) = self.plan.read().phase(phase_id) {
            if let Some(step) = phase.step(step_id) {
                step.force_complete();
            }
        }
        self.maybe_notify(self.status());
    }

    pub fn interrupt(&self) {
        self.plan.read().interrupt();
        self.maybe_notify(self.status());
    }

    pub fn proceed(&self) {
        self.plan.read().proceed();
        self.maybe_notify(self.status());
    }

    pub fn is_interrupted(&self) -> bool {
        self.plan.read().is_interrupted()
    }

    /// Swaps in a freshly synthesized plan (e.g. recovery regeneration, §4.j), replacing rather
    /// than mutating the one in place.
    pub fn replace_plan(&self, new_plan: Plan) {
        let status = new_plan.status();
        *self.plan.write() = new_plan;
        self.maybe_notify(status);
    }

    fn maybe_notify(&self, status: Status) {
        let mut last = self.last_status.write();
        if *last != status {
            *last = status;
            let _ = self.notify.send(PlanChangeEvent { plan_name: self.plan.read().name().to_string(), status });
        }
    }
}
