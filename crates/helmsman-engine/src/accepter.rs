//! Submits recommendations to the driver as accept operations and invokes operation recorders
//! (§4.b). Grouping-by-offer-id, single-accept-per-offer, log-but-don't-roll-back-on-recorder-
//! failure, all per the spec's explicit contract.

use std::sync::Arc;

use async_trait::async_trait;

use helmsman_kernel::driver::SchedulerDriver;
use helmsman_kernel::error::RecorderError;
use helmsman_kernel::offer::OfferId;
use helmsman_kernel::operation::{OfferRecommendation, Operation};
use helmsman_kernel::store::StateStore;

/// A recorder may persist launched `TaskInfo`s (or any other side effect); failures are logged,
/// never retried, since the accept has already happened and is authoritative.
#[async_trait]
pub trait OperationRecorder: Send + Sync {
    async fn record(&self, offer_id: &OfferId, operation: &Operation) -> Result<(), RecorderError>;
}

#[derive(Debug, Default)]
pub struct NoopRecorder;

#[async_trait]
impl OperationRecorder for NoopRecorder {
    async fn record(&self, _offer_id: &OfferId, _operation: &Operation) -> Result<(), RecorderError> {
        Ok(())
    }
}

/// Persists every launched `TaskInfo` to the `StateStore` (`/tasks/<name>`, §6) so the Reconciler
/// has something to seed `remaining` from and later status updates have a task to attach to.
/// Ignores every other operation kind.
pub struct StateStoreRecorder {
    store: Arc<dyn StateStore>,
}

impl StateStoreRecorder {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OperationRecorder for StateStoreRecorder {
    async fn record(&self, _offer_id: &OfferId, operation: &Operation) -> Result<(), RecorderError> {
        if let Operation::Launch { task } = operation {
            self.store
                .put_task(task.clone(), None)
                .await
                .map_err(|e| RecorderError::Failed(e.to_string()))?;
        }
        Ok(())
    }
}

pub struct OfferAccepter {
    recorders: Vec<Arc<dyn OperationRecorder>>,
}

impl OfferAccepter {
    pub fn new(recorders: Vec<Arc<dyn OperationRecorder>>) -> Self {
        Self { recorders }
    }

    /// Groups `recommendations` by offer id (preserving first-seen order), issues one
    /// `accept_offers` call per offer, and returns the ids actually accepted.
    pub async fn accept(&self, driver: &dyn SchedulerDriver, recommendations: &[OfferRecommendation]) -> Vec<OfferId> {
        let mut grouped: Vec<(OfferId, Vec<Operation>)> = Vec::new();
        for rec in recommendations {
            match grouped.iter_mut().find(|(id, _)| *id == rec.offer_id) {
                Some((_, ops)) => ops.push(rec.operation.clone()),
                None => grouped.push((rec.offer_id.clone(), vec![rec.operation.clone()])),
            }
        }

        let mut accepted = Vec::new();
        for (offer_id, operations) in grouped {
            match driver.accept_offers(&offer_id, &operations).await {
                Ok(()) => {
                    for operation in &operations {
                        for recorder in &self.recorders {
                            if let Err(err) = recorder.record(&offer_id, operation).await {
                                tracing::warn!(offer = %offer_id, error = %err, "operation recorder failed");
                            }
                        }
                    }
                    accepted.push(offer_id);
                }
                Err(err) => {
                    tracing::warn!(offer = %offer_id, error = %err, "accept_offers failed");
                }
            }
        }
        accepted
    }
}
