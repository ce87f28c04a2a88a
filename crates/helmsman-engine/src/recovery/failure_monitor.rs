//! Declares a failing task permanently lost, or never does (§4.j). Grounded on the teacher's
//! `CircuitBreaker` state machine, narrowed to a one-way Closed→Open transition: a permanently
//! failed task is only cleared by a fresh successful launch, never by a half-open probe.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use helmsman_kernel::clock::Clock;
use helmsman_kernel::error::ConfigError;
use helmsman_kernel::offer::TaskId;

pub trait FailureMonitor: Send + Sync {
    /// Records a failure observation for `task_id`, first-failure time tracked internally.
    fn observe_failure(&self, task_id: &TaskId);
    /// Clears any failure history for `task_id` (a fresh launch succeeded).
    fn clear(&self, task_id: &TaskId);
    fn is_permanent(&self, task_id: &TaskId) -> bool;
}

/// Declares a task permanently failed once it has been observed failing continuously for
/// `timeout` (measured from the first observed failure, not the most recent one).
pub struct TimedFailureMonitor {
    timeout: Duration,
    clock: std::sync::Arc<dyn Clock>,
    first_failure_at: Mutex<HashMap<TaskId, Instant>>,
}

impl TimedFailureMonitor {
    pub fn new(clock: std::sync::Arc<dyn Clock>, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(Self { timeout, clock, first_failure_at: Mutex::new(HashMap::new()) })
    }
}

impl FailureMonitor for TimedFailureMonitor {
    fn observe_failure(&self, task_id: &TaskId) {
        self.first_failure_at.lock().entry(task_id.clone()).or_insert_with(|| self.clock.now());
    }

    fn clear(&self, task_id: &TaskId) {
        self.first_failure_at.lock().remove(task_id);
    }

    fn is_permanent(&self, task_id: &TaskId) -> bool {
        match self.first_failure_at.lock().get(task_id) {
            Some(first) => self.clock.now().duration_since(*first) >= self.timeout,
            None => false,
        }
    }
}

/// A task observed failing is always treated as transient; used when an operator wants only
/// rate-limited relaunches, never destructive recovery.
#[derive(Debug, Default)]
pub struct NeverFailureMonitor;

impl FailureMonitor for NeverFailureMonitor {
    fn observe_failure(&self, _task_id: &TaskId) {}
    fn clear(&self, _task_id: &TaskId) {}
    fn is_permanent(&self, _task_id: &TaskId) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helmsman_kernel::clock::test_support::SteppableClock;

    #[test]
    fn zero_timeout_is_rejected_at_construction() {
        let clock = std::sync::Arc::new(SteppableClock::new());
        assert!(matches!(TimedFailureMonitor::new(clock, Duration::ZERO), Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn task_becomes_permanent_after_timeout_from_first_failure() {
        let clock = std::sync::Arc::new(SteppableClock::new());
        let monitor = TimedFailureMonitor::new(clock.clone(), Duration::from_secs(60)).unwrap();
        let task = TaskId::new("t1");

        monitor.observe_failure(&task);
        assert!(!monitor.is_permanent(&task));

        clock.advance(Duration::from_secs(30));
        monitor.observe_failure(&task);
        assert!(!monitor.is_permanent(&task), "first-failure time anchors the timeout, not the latest observation");

        clock.advance(Duration::from_secs(31));
        assert!(monitor.is_permanent(&task));
    }

    #[test]
    fn clearing_resets_the_failure_window() {
        let clock = std::sync::Arc::new(SteppableClock::new());
        let monitor = TimedFailureMonitor::new(clock.clone(), Duration::from_secs(60)).unwrap();
        let task = TaskId::new("t1");
        monitor.observe_failure(&task);
        clock.advance(Duration::from_secs(61));
        assert!(monitor.is_permanent(&task));
        monitor.clear(&task);
        assert!(!monitor.is_permanent(&task));
    }

    #[test]
    fn never_failure_monitor_never_declares_permanence() {
        let monitor = NeverFailureMonitor;
        let task = TaskId::new("t1");
        monitor.observe_failure(&task);
        assert!(!monitor.is_permanent(&task));
    }
}
