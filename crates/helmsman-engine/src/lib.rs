//! Concrete, tokio-based implementations of the plan-driven offer dispatch engine described in
//! `helmsman-kernel`. Every component in the engine's component-design table lives here: offer
//! evaluation/acceptance, the step/phase/plan graph, interruptible strategies, the plan
//! scheduler/manager/coordinator, the reconciler, and the recovery subsystem, plus in-memory
//! implementations of the store/driver traits for standalone operation and tests.

pub mod accepter;
pub mod coordinator;
pub mod deployment;
pub mod driver;
pub mod evaluator;
pub mod phase;
pub mod plan;
pub mod plan_manager;
pub mod plan_scheduler;
pub mod reconciler;
pub mod recovery;
pub mod step;
pub mod store;
pub mod strategy;

pub use accepter::{NoopRecorder, OfferAccepter, OperationRecorder, StateStoreRecorder};
pub use coordinator::PlanCoordinator;
pub use deployment::{build_deployment_plan, deployed_task_id};
pub use driver::RecordingDriver;
pub use evaluator::OfferEvaluator;
pub use phase::Phase;
pub use plan::Plan;
pub use plan_manager::{PlanChangeEvent, PlanManager};
pub use plan_scheduler::PlanScheduler;
pub use reconciler::Reconciler;
pub use recovery::{FailingPod, FailureMonitor, NeverFailureMonitor, RecoveryPlanManager, TimedFailureMonitor, TimedLaunchConstrainer};
pub use step::Step;
pub use store::{InMemoryConfigStore, InMemoryStateStore};
