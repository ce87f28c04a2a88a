//! Recovery subsystem: rate-limited transient relaunches and permanence-gated destructive
//! recovery, synthesized into a regenerable recovery `Plan` (§4.j).

pub mod failure_monitor;
pub mod launch_constrainer;
pub mod recovery_plan_manager;

pub use failure_monitor::{FailureMonitor, NeverFailureMonitor, TimedFailureMonitor};
pub use launch_constrainer::TimedLaunchConstrainer;
pub use recovery_plan_manager::{FailingPod, RecoveryPlanManager};
