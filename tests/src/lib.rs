//! Shared fixtures for the end-to-end scenario tests: a small `ServiceSpecification` builder and
//! thin helpers around the in-memory store/driver doubles, kept here so every scenario test
//! starts from the same known-good spec instead of repeating fixture boilerplate.

use helmsman_kernel::model::{HealthCheck, PodSpec, ResourceSet, ServiceSpecification, TaskSpecification};

pub fn single_pod_spec(name: &str, pod_type: &str) -> ServiceSpecification {
    ServiceSpecification {
        name: name.to_string(),
        principal: format!("{name}-principal"),
        role: format!("{name}-role"),
        pods: vec![PodSpec {
            pod_type: pod_type.to_string(),
            user: None,
            index: 0,
            tasks: vec![TaskSpecification {
                name: "main".to_string(),
                pod_type: pod_type.to_string(),
                command: "run".to_string(),
                resources: ResourceSet { cpus: 1.0, mem: 256.0, ports: vec![], disk: None, persistent_volume_bytes: None },
                placement: None,
                health_check: Some(HealthCheck { command: "check".to_string(), interval_secs: 10, grace_period_secs: 30 }),
            }],
            placement: None,
        }],
    }
}

pub fn generous_offer(id: &str) -> helmsman_kernel::offer::Offer {
    helmsman_kernel::offer::Offer {
        id: helmsman_kernel::offer::OfferId::new(id),
        agent_id: helmsman_kernel::offer::AgentId::new(format!("agent-{id}")),
        resources: vec![
            helmsman_kernel::offer::Resource::scalar("cpus", 8.0),
            helmsman_kernel::offer::Resource::scalar("mem", 8192.0),
        ],
        attributes: vec![],
    }
}
