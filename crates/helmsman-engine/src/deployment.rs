//! Builds the deployment `Plan` for a `ServiceSpecification` generation: one Step per pod,
//! grouped into a single Phase driven by a `ParallelStrategy` (pods deploy independently of one
//! another; ordering within a pod's own tasks is the evaluator's concern, not the plan's).

use std::sync::Arc;

use helmsman_kernel::model::{ConfigTarget, ServiceSpecification};
use helmsman_kernel::offer::TaskId;
use helmsman_kernel::operation::TaskRequirement;

use crate::phase::Phase;
use crate::plan::Plan;
use crate::step::Step;
use crate::strategy::ParallelStrategy;

/// The task-id a deployed task is given: `"{service}-{pod index}-{task name}"`. Shared with the
/// recovery scan so it can recognize which task-ids in the state store belong to which pod
/// without re-deriving the format.
pub fn deployed_task_id(service_name: &str, pod_index: u32, task_name: &str) -> TaskId {
    TaskId::new(format!("{}-{}-{}", service_name, pod_index, task_name))
}

pub fn build_deployment_plan(spec: &ServiceSpecification, target: ConfigTarget) -> Plan {
    let steps: Vec<Arc<Step>> = spec
        .pods
        .iter()
        .map(|pod| {
            let tasks: Vec<TaskRequirement> = pod
                .tasks
                .iter()
                .map(|t| TaskRequirement {
                    task_id: deployed_task_id(&spec.name, pod.index, &t.name),
                    name: t.name.clone(),
                    resources: t.resources.clone(),
                    executor: None,
                })
                .collect();
            Arc::new(Step::new(
                format!("{}-{}", pod.pod_type, pod.index),
                pod.pod_type.clone(),
                pod.pod_type.clone(),
                pod.index,
                tasks,
                pod.placement.clone(),
                target,
            ))
        })
        .collect();

    let phase = Arc::new(Phase::new("deploy", "deploy", steps, Box::new(ParallelStrategy::new())));
    Plan::new(spec.name.clone(), vec![phase], Box::new(ParallelStrategy::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use helmsman_kernel::model::{HealthCheck, PodSpec, ResourceSet, TaskSpecification};

    fn spec() -> ServiceSpecification {
        ServiceSpecification {
            name: "svc".to_string(),
            principal: "svc-principal".to_string(),
            role: "svc-role".to_string(),
            pods: vec![PodSpec {
                pod_type: "worker".to_string(),
                user: None,
                index: 0,
                tasks: vec![TaskSpecification {
                    name: "main".to_string(),
                    pod_type: "worker".to_string(),
                    command: "run".to_string(),
                    resources: ResourceSet { cpus: 1.0, mem: 256.0, ports: vec![], disk: None, persistent_volume_bytes: None },
                    placement: None,
                    health_check: Some(HealthCheck { command: "check".to_string(), interval_secs: 10, grace_period_secs: 30 }),
                }],
                placement: None,
            }],
        }
    }

    #[test]
    fn one_step_per_pod() {
        let plan = build_deployment_plan(&spec(), ConfigTarget::new());
        assert_eq!(plan.phases().len(), 1);
        assert_eq!(plan.phases()[0].steps().len(), 1);
        assert_eq!(plan.phases()[0].steps()[0].id(), "worker-0");
    }
}
