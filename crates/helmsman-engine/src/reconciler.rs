//! Tracks task-ids not yet confirmed by the cluster and gates launches until reconciled (§4.i).

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use helmsman_kernel::clock::Clock;
use helmsman_kernel::driver::SchedulerDriver;
use helmsman_kernel::error::{DriverError, StoreError};
use helmsman_kernel::offer::TaskId;
use helmsman_kernel::status::TaskStatus;
use helmsman_kernel::store::StateStore;

pub struct Reconciler {
    clock: Arc<dyn Clock>,
    backoff: Duration,
    remaining: Mutex<HashSet<TaskId>>,
    implicit_done: AtomicBool,
    last_explicit_request_at: Mutex<Option<Instant>>,
}

impl Reconciler {
    pub fn new(clock: Arc<dyn Clock>, backoff: Duration) -> Self {
        Self {
            clock,
            backoff,
            remaining: Mutex::new(HashSet::new()),
            implicit_done: AtomicBool::new(false),
            last_explicit_request_at: Mutex::new(None),
        }
    }

    /// Loads every task-id known to the state store into `remaining`.
    pub async fn start(&self, store: &dyn StateStore) -> Result<(), StoreError> {
        let tasks = store.list_tasks().await?;
        let mut remaining = self.remaining.lock();
        remaining.clear();
        remaining.extend(tasks.into_iter().map(|(info, _)| info.task_id));
        self.implicit_done.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Explicit reconciliation (listed ids) once `backoff` has elapsed since the last explicit
    /// request; a single implicit (empty-list) request once `remaining` first empties out.
    pub async fn reconcile(&self, driver: &dyn SchedulerDriver) -> Result<(), DriverError> {
        let ids: Vec<TaskId> = self.remaining.lock().iter().cloned().collect();

        if !ids.is_empty() {
            let elapsed_enough = {
                let mut last = self.last_explicit_request_at.lock();
                let now = self.clock.now();
                let due = last.map(|at| now.duration_since(at) >= self.backoff).unwrap_or(true);
                if due {
                    *last = Some(now);
                }
                due
            };
            if elapsed_enough {
                driver.reconcile_tasks(&ids).await?;
            }
            return Ok(());
        }

        if !self.implicit_done.load(Ordering::SeqCst) {
            driver.reconcile_tasks(&[]).await?;
            self.implicit_done.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    pub fn update(&self, status: &TaskStatus) {
        if status.state.is_terminal() || status.state.is_running_or_finished() {
            self.remaining.lock().remove(&status.task_id);
        }
    }

    pub fn is_reconciled(&self) -> bool {
        self.implicit_done.load(Ordering::SeqCst) && self.remaining.lock().is_empty()
    }

    pub fn force_complete(&self) {
        self.remaining.lock().clear();
        self.implicit_done.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use helmsman_kernel::clock::test_support::SteppableClock;
    use helmsman_kernel::offer::{AgentId, TaskInfo};
    use helmsman_kernel::offer::CommandInfo;
    use helmsman_kernel::operation::Operation;
    use helmsman_kernel::offer::OfferId;
    use helmsman_kernel::status::TaskState;
    use std::sync::Mutex as StdMutex;

    struct FakeStore {
        tasks: Vec<TaskId>,
    }

    #[async_trait]
    impl StateStore for FakeStore {
        async fn get_framework_id(&self) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
        async fn put_framework_id(&self, _framework_id: &str) -> Result<(), StoreError> {
            Ok(())
        }
        async fn put_task(&self, _info: TaskInfo, _status: Option<TaskStatus>) -> Result<(), StoreError> {
            Ok(())
        }
        async fn get_task(&self, _task_id: &TaskId) -> Result<Option<(TaskInfo, Option<TaskStatus>)>, StoreError> {
            Ok(None)
        }
        async fn list_tasks(&self) -> Result<Vec<(TaskInfo, Option<TaskStatus>)>, StoreError> {
            Ok(self
                .tasks
                .iter()
                .map(|id| {
                    (
                        TaskInfo {
                            task_id: id.clone(),
                            name: id.as_str().to_string(),
                            agent_id: AgentId::new("agent"),
                            resources: vec![],
                            command: CommandInfo { value: String::new(), arguments: vec![], env: vec![] },
                            executor: None,
                        },
                        None,
                    )
                })
                .collect())
        }
        async fn put_last_status(&self, _status: TaskStatus) -> Result<(), StoreError> {
            Ok(())
        }
        async fn get_suppressed(&self) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn put_suppressed(&self, _suppressed: bool) -> Result<(), StoreError> {
            Ok(())
        }
    }

    struct RecordingDriver {
        reconcile_calls: StdMutex<Vec<Vec<TaskId>>>,
    }

    #[async_trait]
    impl SchedulerDriver for RecordingDriver {
        async fn accept_offers(&self, _offer_id: &OfferId, _operations: &[Operation]) -> Result<(), DriverError> {
            Ok(())
        }
        async fn decline_offer(&self, _offer_id: &OfferId) -> Result<(), DriverError> {
            Ok(())
        }
        async fn kill_task(&self, _task_id: &TaskId) -> Result<(), DriverError> {
            Ok(())
        }
        async fn reconcile_tasks(&self, task_ids: &[TaskId]) -> Result<(), DriverError> {
            self.reconcile_calls.lock().unwrap().push(task_ids.to_vec());
            Ok(())
        }
        async fn suppress_offers(&self) -> Result<(), DriverError> {
            Ok(())
        }
        async fn revive_offers(&self) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn not_reconciled_until_remaining_confirmed_and_implicit_request_sent() {
        let clock = Arc::new(SteppableClock::new());
        let reconciler = Reconciler::new(clock, Duration::from_secs(30));
        let store = FakeStore { tasks: vec![TaskId::new("t1")] };
        reconciler.start(&store).await.unwrap();
        assert!(!reconciler.is_reconciled());

        let driver = RecordingDriver { reconcile_calls: StdMutex::new(Vec::new()) };
        reconciler.reconcile(&driver).await.unwrap();
        assert_eq!(driver.reconcile_calls.lock().unwrap().len(), 1);
        assert!(!reconciler.is_reconciled(), "explicit request alone does not confirm the task");

        reconciler.update(&TaskStatus::new(TaskId::new("t1"), TaskState::Running));
        reconciler.reconcile(&driver).await.unwrap();
        assert!(reconciler.is_reconciled());
        assert_eq!(driver.reconcile_calls.lock().unwrap().len(), 2, "the implicit empty request follows");
    }

    #[tokio::test]
    async fn explicit_reconcile_respects_backoff() {
        let clock = Arc::new(SteppableClock::new());
        let reconciler = Reconciler::new(clock.clone(), Duration::from_secs(30));
        let store = FakeStore { tasks: vec![TaskId::new("t1")] };
        reconciler.start(&store).await.unwrap();

        let driver = RecordingDriver { reconcile_calls: StdMutex::new(Vec::new()) };
        reconciler.reconcile(&driver).await.unwrap();
        reconciler.reconcile(&driver).await.unwrap();
        assert_eq!(driver.reconcile_calls.lock().unwrap().len(), 1, "second call within backoff is suppressed");

        clock.advance(Duration::from_secs(31));
        reconciler.reconcile(&driver).await.unwrap();
        assert_eq!(driver.reconcile_calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn force_complete_marks_reconciled_immediately() {
        let clock = Arc::new(SteppableClock::new());
        let reconciler = Reconciler::new(clock, Duration::from_secs(30));
        reconciler.force_complete();
        assert!(reconciler.is_reconciled());
    }
}
