//! End-to-end scenario tests against the in-memory store/driver doubles.

use std::sync::Arc;
use std::time::Duration;

use helmsman_engine::{
    build_deployment_plan, recovery::FailingPod, FailureMonitor, NeverFailureMonitor, OfferAccepter, OfferEvaluator,
    PlanCoordinator, Reconciler, RecoveryPlanManager, TimedFailureMonitor, TimedLaunchConstrainer,
};
use helmsman_kernel::clock::{Clock, SystemClock};
use helmsman_kernel::model::ConfigTarget;
use helmsman_kernel::offer::{Offer, TaskId};
use helmsman_kernel::status::{TaskState, TaskStatus};
use helmsman_kernel::step::Status;
use helmsman_kernel::store::StateStore;

use helmsman_integration_tests::{generous_offer, single_pod_spec};

/// A clock that only advances when told to; `helmsman_kernel`'s own equivalent is
/// `#[cfg(test)]`-gated to that crate's unit tests, so integration tests need their own.
#[derive(Clone)]
struct ManualClock {
    now: Arc<parking_lot::Mutex<std::time::Instant>>,
}

impl ManualClock {
    fn new() -> Self {
        Self { now: Arc::new(parking_lot::Mutex::new(std::time::Instant::now())) }
    }

    fn advance(&self, duration: Duration) {
        *self.now.lock() += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> std::time::Instant {
        *self.now.lock()
    }
}

struct NoopDriver;

#[async_trait::async_trait]
impl helmsman_kernel::driver::SchedulerDriver for NoopDriver {
    async fn accept_offers(&self, _offer_id: &helmsman_kernel::offer::OfferId, _operations: &[helmsman_kernel::operation::Operation]) -> Result<(), helmsman_kernel::error::DriverError> {
        Ok(())
    }
    async fn decline_offer(&self, _offer_id: &helmsman_kernel::offer::OfferId) -> Result<(), helmsman_kernel::error::DriverError> {
        Ok(())
    }
    async fn kill_task(&self, _task_id: &TaskId) -> Result<(), helmsman_kernel::error::DriverError> {
        Ok(())
    }
    async fn reconcile_tasks(&self, _task_ids: &[TaskId]) -> Result<(), helmsman_kernel::error::DriverError> {
        Ok(())
    }
    async fn suppress_offers(&self) -> Result<(), helmsman_kernel::error::DriverError> {
        Ok(())
    }
    async fn revive_offers(&self) -> Result<(), helmsman_kernel::error::DriverError> {
        Ok(())
    }
}

#[tokio::test]
async fn fresh_deployment_single_pod_two_tasks_completes_and_has_no_more_operations() {
    let spec = single_pod_spec("svc", "worker");
    let target = ConfigTarget::new();
    let plan = build_deployment_plan(&spec, target);
    let coordinator = PlanCoordinator::new(vec![plan]);

    let driver = NoopDriver;
    let evaluator = OfferEvaluator::new();
    let accepter = OfferAccepter::new(vec![]);
    let offers = vec![generous_offer("O1")];

    let accepted = coordinator.process_offers(&driver, &offers, &evaluator, &accepter).await;
    assert_eq!(accepted, vec![helmsman_kernel::offer::OfferId::new("O1")]);

    coordinator.managers()[0].update(&TaskStatus::new(TaskId::new("svc-0-main"), TaskState::Running).with_target(target));
    assert!(!coordinator.has_operations());
}

#[tokio::test]
async fn interrupted_rollout_blocks_the_next_step_until_proceed() {
    use helmsman_engine::{Phase, Plan, Step};
    use helmsman_kernel::operation::TaskRequirement;
    use helmsman_kernel::model::ResourceSet;
    use helmsman_engine::strategy::SerialStrategy;

    let target = ConfigTarget::new();
    let task = |name: &str| TaskRequirement {
        task_id: TaskId::new(name),
        name: name.to_string(),
        resources: ResourceSet { cpus: 1.0, mem: 100.0, ports: vec![], disk: None, persistent_volume_bytes: None },
        executor: None,
    };
    let step = |id: &str| Arc::new(Step::new(id, id, "pod", 0, vec![task(id)], None, target));

    let s1 = step("s1");
    let s2 = step("s2");
    let s3 = step("s3");
    let phase = Arc::new(Phase::new("ph", "ph", vec![s1.clone(), s2.clone(), s3.clone()], Box::new(SerialStrategy::new())));
    let plan = Plan::new("rollout", vec![phase.clone()], Box::new(SerialStrategy::new()));
    let coordinator = PlanCoordinator::new(vec![plan]);

    let driver = NoopDriver;
    let evaluator = OfferEvaluator::new();
    let accepter = OfferAccepter::new(vec![]);

    coordinator.process_offers(&driver, &[generous_offer("O1")], &evaluator, &accepter).await;
    coordinator.managers()[0].update(&TaskStatus::new(TaskId::new("s1"), TaskState::Running).with_target(target));
    assert_eq!(s1.status(), Status::Complete);

    phase.interrupt();
    let accepted = coordinator.process_offers(&driver, &[generous_offer("O2")], &evaluator, &accepter).await;
    assert!(accepted.is_empty());
    assert_eq!(s2.status(), Status::Pending, "step-2 never started while interrupted");

    phase.proceed();
    let accepted = coordinator.process_offers(&driver, &[generous_offer("O3")], &evaluator, &accepter).await;
    assert_eq!(accepted, vec![helmsman_kernel::offer::OfferId::new("O3")]);
}

#[tokio::test]
async fn reconciliation_gate_blocks_launches_until_confirmed() {
    let reconciler = Reconciler::new(Arc::new(SystemClock), Duration::from_secs(30));
    let store = helmsman_engine::InMemoryStateStore::new();
    store
        .put_task(
            helmsman_kernel::offer::TaskInfo {
                task_id: TaskId::new("taskX"),
                name: "taskX".to_string(),
                agent_id: helmsman_kernel::offer::AgentId::new("agent"),
                resources: vec![],
                command: helmsman_kernel::offer::CommandInfo { value: String::new(), arguments: vec![], env: vec![] },
                executor: None,
            },
            None,
        )
        .await
        .unwrap();

    reconciler.start(&store).await.unwrap();
    assert!(!reconciler.is_reconciled(), "a freshly started reconciler with known tasks is not yet reconciled");

    reconciler.update(&TaskStatus::new(TaskId::new("taskX"), TaskState::Running));
    let driver = NoopDriver;
    reconciler.reconcile(&driver).await.unwrap();
    assert!(reconciler.is_reconciled(), "the implicit request follows once remaining is empty");
}

#[tokio::test]
async fn recovery_preempts_deployment_for_the_same_pod_via_dirty_assets() {
    let spec = single_pod_spec("svc", "worker");
    let target = ConfigTarget::new();
    let deployment = build_deployment_plan(&spec, target);

    let monitor: Arc<dyn FailureMonitor> = Arc::new(NeverFailureMonitor);
    let constrainer = Arc::new(TimedLaunchConstrainer::new(Arc::new(SystemClock), Duration::from_secs(1)));
    let recovery_manager = RecoveryPlanManager::new(monitor, constrainer);
    let pod = &spec.pods[0];
    let failing = vec![FailingPod { pod, task_ids: vec![TaskId::new("svc-0-main")] }];
    let recovery_plan = recovery_manager.rebuild(target, &failing);

    let coordinator = PlanCoordinator::new(vec![deployment, recovery_plan]);
    let driver = NoopDriver;
    let evaluator = OfferEvaluator::new();
    let accepter = OfferAccepter::new(vec![]);

    let accepted = coordinator.process_offers(&driver, &[generous_offer("O1")], &evaluator, &accepter).await;
    assert_eq!(accepted.len(), 1, "only one plan's step for pod worker/0 may claim the offer this cycle");
}

#[tokio::test]
async fn permanent_failure_emits_teardown_before_relaunch() {
    let clock = ManualClock::new();
    let monitor = Arc::new(TimedFailureMonitor::new(Arc::new(clock.clone()), Duration::from_secs(60)).unwrap());
    let constrainer = Arc::new(TimedLaunchConstrainer::new(Arc::new(clock.clone()), Duration::from_secs(1)));

    let spec = single_pod_spec("svc", "worker");
    let pod = &spec.pods[0];
    let task_id = TaskId::new("t1");
    monitor.observe_failure(&task_id);
    clock.advance(Duration::from_secs(61));
    assert!(monitor.is_permanent(&task_id));

    let recovery_manager = RecoveryPlanManager::new(monitor, constrainer);
    let failing = vec![FailingPod { pod, task_ids: vec![task_id] }];
    let plan = recovery_manager.rebuild(ConfigTarget::new(), &failing);

    let driver = NoopDriver;
    let evaluator = OfferEvaluator::new();
    let accepter = OfferAccepter::new(vec![]);
    let step = plan.phases()[0].steps()[0].clone();
    let requirement = step.start().expect("a freshly built permanent-recovery step starts from PENDING");
    assert!(requirement.teardown.is_some(), "a permanent failure must carry a teardown requirement");

    let recs = evaluator.evaluate(&requirement, &[generous_offer("O1")]);
    assert!(matches!(recs[0].operation, helmsman_kernel::operation::Operation::Destroy { .. }));
    assert!(matches!(recs[1].operation, helmsman_kernel::operation::Operation::Unreserve { .. }));
    let _ = accepter.accept(&driver, &recs).await;
}

#[tokio::test]
async fn config_change_mid_flight_resets_the_affected_step_to_pending() {
    use helmsman_engine::Step;
    use helmsman_kernel::model::ResourceSet;
    use helmsman_kernel::operation::TaskRequirement;

    let target_a = ConfigTarget::new();
    let target_b = ConfigTarget::new();
    let low_cpu_task = TaskRequirement {
        task_id: TaskId::new("t1"),
        name: "t1".to_string(),
        resources: ResourceSet { cpus: 1.0, mem: 100.0, ports: vec![], disk: None, persistent_volume_bytes: None },
        executor: None,
    };
    let step = Step::new("s1", "s1", "pod", 0, vec![low_cpu_task], None, target_a);
    step.start();
    let mut ids = std::collections::HashSet::new();
    ids.insert(TaskId::new("t1"));
    step.update_offer_status(Some(ids));
    step.update(&TaskStatus::new(TaskId::new("t1"), TaskState::Running).with_target(target_a));
    assert_eq!(step.status(), Status::Complete);

    // A status for the same known task-id but a different generation is a rollout trigger, not
    // an error: the step resets and must be relaunched under the new generation.
    step.update(&TaskStatus::new(TaskId::new("t1"), TaskState::Running).with_target(target_b));
    assert_eq!(step.status(), Status::Pending);

    // The rebuilt plan targets configB with t1.cpu raised to 2.0; a 1-cpu offer no longer suffices.
    let high_cpu_task = TaskRequirement {
        task_id: TaskId::new("t1"),
        name: "t1".to_string(),
        resources: ResourceSet { cpus: 2.0, mem: 100.0, ports: vec![], disk: None, persistent_volume_bytes: None },
        executor: None,
    };
    let rebuilt = Step::new("s1", "s1", "pod", 0, vec![high_cpu_task], None, target_b);
    let requirement = rebuilt.start().unwrap();
    let evaluator = OfferEvaluator::new();
    let scant_offer = Offer {
        id: helmsman_kernel::offer::OfferId::new("scant"),
        agent_id: helmsman_kernel::offer::AgentId::new("agent"),
        resources: vec![helmsman_kernel::offer::Resource::scalar("cpus", 1.0), helmsman_kernel::offer::Resource::scalar("mem", 1000.0)],
        attributes: vec![],
    };
    assert!(evaluator.evaluate(&requirement, &[scant_offer]).is_empty(), "a 1-cpu offer cannot satisfy the raised requirement");

    let recs = evaluator.evaluate(&requirement, &[generous_offer("O1")]);
    assert!(!recs.is_empty());
    let mut accepted_ids = std::collections::HashSet::new();
    accepted_ids.insert(TaskId::new("t1"));
    rebuilt.update_offer_status(Some(accepted_ids));
    rebuilt.update(&TaskStatus::new(TaskId::new("t1"), TaskState::Running).with_target(target_b));
    assert_eq!(rebuilt.status(), Status::Complete);
}
