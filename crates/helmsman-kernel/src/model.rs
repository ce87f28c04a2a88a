//! The input data model: `ServiceSpecification` and the pods/tasks it describes.
//!
//! Immutable per generation. A new generation is targeted by publishing a new `ConfigTarget` to
//! the config store; the engine never mutates a `ServiceSpecification` in place.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque pointer at a targeted `ServiceSpecification` generation, produced by the config store.
/// Steps carry the target they were created against so a later status update can detect a
/// rollout (target mismatch) versus steady state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigTarget(pub Uuid);

impl ConfigTarget {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConfigTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConfigTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSet {
    pub cpus: f64,
    pub mem: f64,
    pub ports: Vec<(u32, u32)>,
    pub disk: Option<f64>,
    pub persistent_volume_bytes: Option<u64>,
}

impl ResourceSet {
    pub fn needs_persistent_volume(&self) -> bool {
        self.persistent_volume_bytes.is_some()
    }
}

/// A constraint on which agents a pod may be placed on. Kept intentionally small: a predicate
/// over an attribute name/value rather than a general expression language, since the evaluator
/// only needs to answer "does this offer satisfy the rule", not parse operator syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlacementRule {
    AttributeEquals { name: String, value: String },
    AnyOf(Vec<PlacementRule>),
    AllOf(Vec<PlacementRule>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub command: String,
    pub interval_secs: u32,
    pub grace_period_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpecification {
    pub name: String,
    pub pod_type: String,
    pub command: String,
    pub resources: ResourceSet,
    pub placement: Option<PlacementRule>,
    pub health_check: Option<HealthCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodSpec {
    pub pod_type: String,
    pub user: Option<String>,
    pub index: u32,
    pub tasks: Vec<TaskSpecification>,
    pub placement: Option<PlacementRule>,
}

impl PodSpec {
    /// The (type, index) identity used as a dirty-asset key (§3, §4.g).
    pub fn asset_key(&self) -> (String, u32) {
        (self.pod_type.clone(), self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpecification {
    pub name: String,
    pub principal: String,
    pub role: String,
    pub pods: Vec<PodSpec>,
}
