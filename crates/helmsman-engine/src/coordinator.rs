//! Multiplexes several `PlanManager`s in priority order across one offer batch (§4.h). Owns a
//! `broadcast::Sender<PlanChangeEvent>` fed by draining an internal `mpsc` that every
//! `PlanManager` shares a clone of.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use helmsman_kernel::driver::SchedulerDriver;
use helmsman_kernel::offer::{Offer, OfferId};
use helmsman_kernel::step::{AssetId, Status};

use crate::accepter::OfferAccepter;
use crate::evaluator::OfferEvaluator;
use crate::plan::Plan;
use crate::plan_manager::{PlanChangeEvent, PlanManager};
use crate::plan_scheduler::PlanScheduler;

pub struct PlanCoordinator {
    managers: Vec<Arc<PlanManager>>,
    broadcast_tx: broadcast::Sender<PlanChangeEvent>,
    _drain_task: JoinHandle<()>,
}

impl PlanCoordinator {
    /// `plans` are given in priority order; the same order governs offer-batch scheduling in
    /// `process_offers`.
    pub fn new(plans: Vec<Plan>) -> Self {
        let (mpsc_tx, mut mpsc_rx) = mpsc::unbounded_channel();
        let (broadcast_tx, _) = broadcast::channel(256);

        let managers: Vec<Arc<PlanManager>> =
            plans.into_iter().map(|plan| PlanManager::new(plan, mpsc_tx.clone())).collect();

        let forward_tx = broadcast_tx.clone();
        let drain_task = tokio::spawn(async move {
            while let Some(event) = mpsc_rx.recv().await {
                let _ = forward_tx.send(event);
            }
        });

        Self { managers, broadcast_tx, _drain_task: drain_task }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlanChangeEvent> {
        self.broadcast_tx.subscribe()
    }

    pub fn managers(&self) -> &[Arc<PlanManager>] {
        &self.managers
    }

    /// Whether any managed plan still has work to do; drives suppress/revive offers (§4.h).
    pub fn has_operations(&self) -> bool {
        self.managers.iter().any(|m| !matches!(m.status(), Status::Complete | Status::Waiting))
    }

    /// Threads a `HashSet<AssetId>` dirty set across all managers for exactly one offer batch;
    /// never persisted beyond this call.
    pub async fn process_offers(
        &self,
        driver: &dyn SchedulerDriver,
        offers: &[Offer],
        evaluator: &OfferEvaluator,
        accepter: &OfferAccepter,
    ) -> Vec<OfferId> {
        let mut remaining: Vec<Offer> = offers.to_vec();
        let mut dirty: HashSet<AssetId> = HashSet::new();
        let mut accepted_total = Vec::new();

        for manager in &self.managers {
            for step in manager.get_candidates(&dirty) {
                dirty.insert(step.asset());
                if remaining.is_empty() {
                    continue;
                }
                let accepted = PlanScheduler::schedule(driver, &remaining, &step, evaluator, accepter).await;
                if !accepted.is_empty() {
                    remaining.retain(|o| !accepted.contains(&o.id));
                    accepted_total.extend(accepted);
                }
            }
        }

        accepted_total
    }
}
