//! Plain data model, traits, and error taxonomy for the offer dispatch engine.
//!
//! This crate holds no tokio runtime logic beyond the trait signatures themselves: it is the
//! contract layer that `helmsman-engine` implements against. Keeping it separate means the data
//! model and the traits it exposes (`SchedulerDriver`, `StateStore`, `ConfigStore`, `Clock`) can
//! be depended on by test doubles and alternate backends without pulling in the full engine.

pub mod clock;
#[cfg(feature = "config")]
pub mod config;
pub mod driver;
pub mod error;
pub mod exit;
pub mod model;
pub mod offer;
pub mod operation;
pub mod status;
pub mod step;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use error::{ConfigError, DriverError, RecorderError, SchedulerError, StepError, StoreError};
pub use exit::{ExitCode, FatalError};
pub use model::{ConfigTarget, PlacementRule, PodSpec, ResourceSet, ServiceSpecification, TaskSpecification};
pub use offer::{AgentId, Attribute, CommandInfo, ExecutorInfo, Offer, OfferId, ReservationInfo, Resource, ResourceKind, TaskId, TaskInfo};
pub use operation::{Operation, OfferRecommendation, OfferRequirement};
pub use status::{TaskState, TaskStatus};
pub use step::{AssetId, Status, StepState};

#[cfg(feature = "config")]
pub use config::{EngineConfig, ExitPolicy};
