//! Plain, wire-format-free records for offers and the task descriptions carried in them.
//!
//! The underlying resource manager's RPC is protobuf-heavy; per the redesign guidance, none of
//! that is modeled here. A driver implementation does the protobuf conversion at its own
//! boundary and hands these plain records to the rest of the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_newtype!(OfferId);
string_newtype!(AgentId);
string_newtype!(TaskId);

/// A reservation belonging to some (principal, role) pair, present on a resource that this
/// framework has already reserved in a prior cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationInfo {
    pub principal: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResourceKind {
    Scalar(f64),
    Ranges(Vec<(u64, u64)>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
    pub reservation: Option<ReservationInfo>,
}

impl Resource {
    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), kind: ResourceKind::Scalar(value), reservation: None }
    }

    pub fn reserved_scalar(name: impl Into<String>, value: f64, reservation: ReservationInfo) -> Self {
        Self { name: name.into(), kind: ResourceKind::Scalar(value), reservation: Some(reservation) }
    }

    pub fn is_reserved(&self) -> bool {
        self.reservation.is_some()
    }

    pub fn scalar_value(&self) -> Option<f64> {
        match self.kind {
            ResourceKind::Scalar(v) => Some(v),
            ResourceKind::Ranges(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A time-bounded promise of resources on a specific agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub agent_id: AgentId,
    pub resources: Vec<Resource>,
    pub attributes: Vec<Attribute>,
}

impl Offer {
    /// Sum of scalar resources by name across all resources carrying that name, reserved or not.
    pub fn scalar_total(&self, name: &str) -> f64 {
        self.resources
            .iter()
            .filter(|r| r.name == name)
            .filter_map(|r| r.scalar_value())
            .sum()
    }

    pub fn reserved_scalar_total(&self, name: &str) -> f64 {
        self.resources
            .iter()
            .filter(|r| r.name == name && r.is_reserved())
            .filter_map(|r| r.scalar_value())
            .sum()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInfo {
    pub value: String,
    pub arguments: Vec<String>,
    pub env: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorInfo {
    pub id: String,
    pub command: CommandInfo,
}

/// A task-info skeleton produced by the evaluator; not yet confirmed to have launched until a
/// `TaskStatus` arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task_id: TaskId,
    pub name: String,
    pub agent_id: AgentId,
    pub resources: Vec<Resource>,
    pub command: CommandInfo,
    pub executor: Option<ExecutorInfo>,
}
