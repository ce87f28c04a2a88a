//! Wires the inbound cluster-manager callback surface (§6) onto the engine's components. The
//! driver's own callback thread only ever constructs a `DriverEvent` and sends it; everything
//! that follows executes on one serial `tokio` task, matching §5's single-writer discipline.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use helmsman_engine::{
    build_deployment_plan, deployed_task_id, FailingPod, OfferAccepter, OfferEvaluator, PlanCoordinator, Reconciler, RecoveryPlanManager,
    StateStoreRecorder, TimedFailureMonitor, TimedLaunchConstrainer,
};
use helmsman_kernel::config::EngineConfig;
use helmsman_kernel::driver::SchedulerDriver;
use helmsman_kernel::error::ConfigError;
use helmsman_kernel::exit::{FatalError, FatalErrorSender};
use helmsman_kernel::model::{ConfigTarget, ServiceSpecification};
use helmsman_kernel::offer::{AgentId, Offer};
use helmsman_kernel::status::TaskStatus;
use helmsman_kernel::store::{ConfigStore, StateStore};

#[derive(Debug, Clone)]
pub enum DriverEvent {
    Registered { framework_id: String },
    ReRegistered,
    ResourceOffers { offers: Vec<Offer> },
    OfferRescinded,
    StatusUpdate { status: TaskStatus },
    Disconnected,
    Error { message: String },
    SlaveLost { agent_id: AgentId },
    ExecutorLost { executor_id: String, agent_id: AgentId },
    FrameworkMessage { executor_id: String, agent_id: AgentId },
}

/// What the driver's own callback thread holds; every method only constructs and sends.
#[derive(Clone)]
pub struct DriverCallbacks {
    tx: mpsc::UnboundedSender<DriverEvent>,
}

impl DriverCallbacks {
    pub fn new(tx: mpsc::UnboundedSender<DriverEvent>) -> Self {
        Self { tx }
    }

    pub fn registered(&self, framework_id: String) {
        let _ = self.tx.send(DriverEvent::Registered { framework_id });
    }

    pub fn reregistered(&self) {
        let _ = self.tx.send(DriverEvent::ReRegistered);
    }

    pub fn resource_offers(&self, offers: Vec<Offer>) {
        let _ = self.tx.send(DriverEvent::ResourceOffers { offers });
    }

    pub fn offer_rescinded(&self) {
        let _ = self.tx.send(DriverEvent::OfferRescinded);
    }

    pub fn status_update(&self, status: TaskStatus) {
        let _ = self.tx.send(DriverEvent::StatusUpdate { status });
    }

    pub fn disconnected(&self) {
        let _ = self.tx.send(DriverEvent::Disconnected);
    }

    pub fn error(&self, message: String) {
        let _ = self.tx.send(DriverEvent::Error { message });
    }

    pub fn slave_lost(&self, agent_id: AgentId) {
        let _ = self.tx.send(DriverEvent::SlaveLost { agent_id });
    }

    pub fn executor_lost(&self, executor_id: String, agent_id: AgentId) {
        let _ = self.tx.send(DriverEvent::ExecutorLost { executor_id, agent_id });
    }

    pub fn framework_message(&self, executor_id: String, agent_id: AgentId) {
        let _ = self.tx.send(DriverEvent::FrameworkMessage { executor_id, agent_id });
    }
}

pub struct Supervisor {
    driver: Arc<dyn SchedulerDriver>,
    state_store: Arc<dyn StateStore>,
    config_store: Arc<dyn ConfigStore>,
    config: EngineConfig,
    reconciler: Reconciler,
    evaluator: OfferEvaluator,
    accepter: OfferAccepter,
    recovery: RecoveryPlanManager,
    coordinator: Option<Arc<PlanCoordinator>>,
}

impl Supervisor {
    pub fn new(
        driver: Arc<dyn SchedulerDriver>,
        state_store: Arc<dyn StateStore>,
        config_store: Arc<dyn ConfigStore>,
        config: EngineConfig,
        clock: Arc<dyn helmsman_kernel::clock::Clock>,
    ) -> Result<Self, ConfigError> {
        let failure_monitor = Arc::new(TimedFailureMonitor::new(clock.clone(), config.permanent_failure_timeout)?);
        let constrainer = Arc::new(TimedLaunchConstrainer::new(clock.clone(), config.min_launch_interval));
        Ok(Self {
            driver,
            state_store: state_store.clone(),
            config_store,
            reconciler: Reconciler::new(clock, config.reconciliation_backoff),
            evaluator: OfferEvaluator::new(),
            accepter: OfferAccepter::new(vec![Arc::new(StateStoreRecorder::new(state_store))]),
            recovery: RecoveryPlanManager::new(failure_monitor, constrainer),
            config,
            coordinator: None,
        })
    }

    /// Drains `rx` until the driver's callback sender is dropped, handing every `FatalError` to
    /// `fatal_tx`; the caller's supervisor loop maps that to an `ExitCode` and exits.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<DriverEvent>, fatal_tx: FatalErrorSender) {
        while let Some(event) = rx.recv().await {
            if let Err(fatal) = self.handle(event).await {
                let _ = fatal_tx.send(fatal);
            }
            self.reconcile_suppression().await;
        }
    }

    async fn handle(&mut self, event: DriverEvent) -> Result<(), FatalError> {
        match event {
            DriverEvent::Registered { framework_id } => {
                info!(framework_id = %framework_id, "registered");
                self.state_store
                    .put_framework_id(&framework_id)
                    .await
                    .map_err(|e| FatalError::InitializationFailure(e.to_string()))?;
                self.reconciler.start(self.state_store.as_ref()).await.map_err(|e| FatalError::InitializationFailure(e.to_string()))?;
                self.rebuild_coordinator().await?;
                Ok(())
            }
            DriverEvent::ReRegistered => {
                if self.config.exit_policy.exit_on_reregistered {
                    Err(FatalError::ReRegistration)
                } else {
                    warn!("re-registered; exit_on_reregistered is disabled, continuing");
                    Ok(())
                }
            }
            DriverEvent::ResourceOffers { offers } => {
                self.handle_offers(offers).await;
                Ok(())
            }
            DriverEvent::OfferRescinded => {
                if self.config.exit_policy.exit_on_offer_rescinded {
                    Err(FatalError::OfferRescinded)
                } else {
                    warn!("offer rescinded; exit_on_offer_rescinded is disabled, continuing");
                    Ok(())
                }
            }
            DriverEvent::StatusUpdate { status } => {
                self.reconciler.update(&status);
                if let Some(coordinator) = &self.coordinator {
                    for manager in coordinator.managers() {
                        manager.update(&status);
                    }
                }
                if let Err(e) = self.state_store.put_last_status(status).await {
                    warn!(error = %e, "failed to persist task status; will be reissued");
                }
                self.refresh_recovery().await;
                Ok(())
            }
            DriverEvent::Disconnected => Err(FatalError::Disconnected),
            DriverEvent::Error { message } => {
                let fatal = FatalError::Error(message);
                if fatal.is_framework_removed() {
                    error!("framework removed: reinstall the framework before restarting");
                }
                Err(fatal)
            }
            DriverEvent::SlaveLost { agent_id } => {
                debug!(agent = %agent_id, "slave lost");
                Ok(())
            }
            DriverEvent::ExecutorLost { executor_id, agent_id } => {
                debug!(executor = %executor_id, agent = %agent_id, "executor lost");
                Ok(())
            }
            DriverEvent::FrameworkMessage { executor_id, agent_id } => {
                debug!(executor = %executor_id, agent = %agent_id, "framework message received");
                Ok(())
            }
        }
    }

    async fn rebuild_coordinator(&mut self) -> Result<(), FatalError> {
        let target = self
            .config_store
            .get_target()
            .await
            .map_err(|e| FatalError::InitializationFailure(e.to_string()))?
            .unwrap_or_else(ConfigTarget::new);
        let spec = self
            .config_store
            .get_spec(target)
            .await
            .map_err(|e| FatalError::InitializationFailure(e.to_string()))?
            .ok_or_else(|| FatalError::InitializationFailure("no service specification for current target".to_string()))?;

        let deployment = build_deployment_plan(&spec, target);
        let failing = self.scan_failing_pods(&spec).await;
        let recovery = self.recovery.rebuild(target, &failing);
        self.coordinator = Some(Arc::new(PlanCoordinator::new(vec![deployment, recovery])));
        Ok(())
    }

    /// Re-derives the recovery plan from the state store's current task statuses and swaps it into
    /// the coordinator's recovery `PlanManager` in place (§4.j), leaving the deployment manager's
    /// Step states untouched. A no-op before the coordinator exists.
    async fn refresh_recovery(&self) {
        let Some(coordinator) = &self.coordinator else { return };
        let target = match self.config_store.get_target().await {
            Ok(t) => t.unwrap_or_else(ConfigTarget::new),
            Err(e) => {
                warn!(error = %e, "failed to read config target during recovery refresh");
                return;
            }
        };
        let spec = match self.config_store.get_spec(target).await {
            Ok(Some(spec)) => spec,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "failed to read service specification during recovery refresh");
                return;
            }
        };

        let failing = self.scan_failing_pods(&spec).await;
        let recovery = self.recovery.rebuild(target, &failing);
        if let Some(manager) = coordinator.managers().iter().find(|m| m.plan_name() == "recovery") {
            manager.replace_plan(recovery);
        }
    }

    /// Scans every pod's tasks in the state store for an unhealthy last status (§4.j).
    async fn scan_failing_pods<'a>(&self, spec: &'a ServiceSpecification) -> Vec<FailingPod<'a>> {
        let mut failing = Vec::new();
        for pod in &spec.pods {
            let mut unhealthy = Vec::new();
            for task in &pod.tasks {
                let task_id = deployed_task_id(&spec.name, pod.index, &task.name);
                match self.state_store.get_task(&task_id).await {
                    Ok(Some((_, Some(status)))) if status.state.is_unhealthy() => unhealthy.push(task_id),
                    Ok(_) => {}
                    Err(e) => warn!(task = %task_id, error = %e, "failed to read task status during recovery scan"),
                }
            }
            if !unhealthy.is_empty() {
                failing.push(FailingPod { pod, task_ids: unhealthy });
            }
        }
        failing
    }

    async fn handle_offers(&self, offers: Vec<Offer>) {
        if !self.reconciler.is_reconciled() {
            if let Err(e) = self.reconciler.reconcile(self.driver.as_ref()).await {
                warn!(error = %e, "reconciliation request failed");
            }
            for offer in &offers {
                let _ = self.driver.decline_offer(&offer.id).await;
            }
            return;
        }

        let Some(coordinator) = &self.coordinator else {
            for offer in &offers {
                let _ = self.driver.decline_offer(&offer.id).await;
            }
            return;
        };

        let accepted = coordinator.process_offers(self.driver.as_ref(), &offers, &self.evaluator, &self.accepter).await;
        for offer in &offers {
            if !accepted.contains(&offer.id) {
                let _ = self.driver.decline_offer(&offer.id).await;
            }
        }
    }

    async fn reconcile_suppression(&self) {
        let Some(coordinator) = &self.coordinator else { return };
        let should_be_suppressed = !coordinator.has_operations();
        let result = if should_be_suppressed { self.driver.suppress_offers().await } else { self.driver.revive_offers().await };
        if let Err(e) = result {
            warn!(error = %e, "suppress/revive call failed");
            return;
        }
        if let Err(e) = self.state_store.put_suppressed(should_be_suppressed).await {
            warn!(error = %e, "failed to persist suppressed flag");
        }
    }
}
