//! Synthesizes a recovery `Plan` from the set of currently-failing pods (§4.j). Regenerated (not
//! mutated) whenever that set changes; in-flight steps are preserved by id across regenerations.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use helmsman_kernel::model::{ConfigTarget, PodSpec};
use helmsman_kernel::offer::TaskId;
use helmsman_kernel::operation::TaskRequirement;
use helmsman_kernel::step::StepState;

use crate::phase::Phase;
use crate::plan::Plan;
use crate::recovery::failure_monitor::FailureMonitor;
use crate::recovery::launch_constrainer::TimedLaunchConstrainer;
use crate::step::Step;
use crate::strategy::ParallelWithErrorsStrategy;

/// A pod observed unhealthy, together with the task-ids the state store reports for it.
pub struct FailingPod<'a> {
    pub pod: &'a PodSpec,
    pub task_ids: Vec<TaskId>,
}

pub struct RecoveryPlanManager {
    failure_monitor: Arc<dyn FailureMonitor>,
    constrainer: Arc<TimedLaunchConstrainer>,
    known_failing: Mutex<HashMap<TaskId, Arc<Step>>>,
}

impl RecoveryPlanManager {
    pub fn new(failure_monitor: Arc<dyn FailureMonitor>, constrainer: Arc<TimedLaunchConstrainer>) -> Self {
        Self { failure_monitor, constrainer, known_failing: Mutex::new(HashMap::new()) }
    }

    /// Rebuilds the recovery plan from the currently-failing pods. Steps already in flight
    /// (STARTING or beyond) for a task-id that is still failing are reused as-is; everything
    /// else is constructed fresh, flavored Transient or Permanent per the failure monitor.
    pub fn rebuild(&self, target: ConfigTarget, failing: &[FailingPod<'_>]) -> Plan {
        let mut known = self.known_failing.lock();
        let mut still_failing: HashMap<TaskId, Arc<Step>> = HashMap::new();
        let mut steps = Vec::new();

        for entry in failing {
            for task_id in &entry.task_ids {
                self.failure_monitor.observe_failure(task_id);
            }

            let reusable = entry
                .task_ids
                .iter()
                .find_map(|id| known.get(id).filter(|s| matches!(s.state(), StepState::Starting)).cloned());

            let step = match reusable {
                Some(step) => step,
                None => Arc::new(self.build_step(target, entry)),
            };

            for task_id in &entry.task_ids {
                still_failing.insert(task_id.clone(), step.clone());
            }
            steps.push(step);
        }

        // Any task-id that was failing last rebuild but isn't anymore has recovered (a fresh
        // launch succeeded); clear its failure window so an unrelated later failure doesn't
        // inherit a stale first-failure timestamp.
        for task_id in known.keys() {
            if !still_failing.contains_key(task_id) {
                self.failure_monitor.clear(task_id);
            }
        }

        *known = still_failing;

        let phase = Arc::new(Phase::new("recovery", "recovery", steps, Box::new(ParallelWithErrorsStrategy::new())));
        Plan::new("recovery", vec![phase], Box::new(ParallelWithErrorsStrategy::new()))
    }

    fn build_step(&self, target: ConfigTarget, entry: &FailingPod<'_>) -> Step {
        let pod = entry.pod;
        let tasks: Vec<TaskRequirement> = pod
            .tasks
            .iter()
            .zip(entry.task_ids.iter())
            .map(|(spec, task_id)| TaskRequirement {
                task_id: task_id.clone(),
                name: spec.name.clone(),
                resources: spec.resources.clone(),
                executor: None,
            })
            .collect();

        let permanent = entry.task_ids.iter().any(|id| self.failure_monitor.is_permanent(id));
        let id = format!("recovery-{}-{}", pod.pod_type, pod.index);

        if permanent && self.constrainer.can_launch() {
            self.constrainer.record_launch();
            let teardown = tasks.first().map(|t| t.resources.clone());
            Step::new_recovery(id, pod.pod_type.clone(), pod.pod_type.clone(), pod.index, tasks, pod.placement.clone(), target, teardown)
        } else {
            Step::new(id, pod.pod_type.clone(), pod.pod_type.clone(), pod.index, tasks, pod.placement.clone(), target)
        }
    }
}
