//! Drives the evaluator and accepter for one candidate Step against one batch of offers (§4.f).

use tracing::info;

use helmsman_kernel::driver::SchedulerDriver;
use helmsman_kernel::offer::{Offer, OfferId, TaskId};
use helmsman_kernel::step::StepState;

use crate::accepter::OfferAccepter;
use crate::evaluator::OfferEvaluator;
use crate::step::Step;

pub struct PlanScheduler;

impl PlanScheduler {
    /// Returns the offer ids consumed. A non-PENDING step, or one for which no offer satisfies
    /// its requirement, consumes nothing and leaves `offers` untouched.
    pub async fn schedule(
        driver: &dyn SchedulerDriver,
        offers: &[Offer],
        step: &Step,
        evaluator: &OfferEvaluator,
        accepter: &OfferAccepter,
    ) -> Vec<OfferId> {
        if step.state() != StepState::Pending {
            info!(step = step.id(), state = ?step.state(), "skipping non-pending step");
            return Vec::new();
        }
        let Some(requirement) = step.start() else {
            info!(step = step.id(), "step.start() returned nothing, skipping");
            return Vec::new();
        };

        let recommendations = evaluator.evaluate(&requirement, offers);
        if recommendations.is_empty() {
            info!(step = step.id(), "no offer satisfied the step's requirement");
            return Vec::new();
        }

        let accepted_offers = accepter.accept(driver, &recommendations).await;
        if accepted_offers.is_empty() {
            return Vec::new();
        }

        let launched_task_ids: std::collections::HashSet<TaskId> =
            recommendations.iter().filter_map(|r| r.operation.task_id().cloned()).collect();
        step.update_offer_status(Some(launched_task_ids));

        accepted_offers
    }
}
