//! A `SchedulerDriver` test double that records every call instead of talking to a real cluster
//! manager; used by integration tests and the bin crate's dry-run mode.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use helmsman_kernel::error::DriverError;
use helmsman_kernel::offer::{OfferId, TaskId};
use helmsman_kernel::operation::Operation;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    AcceptOffers { offer_id: OfferId, operations: Vec<Operation> },
    DeclineOffer { offer_id: OfferId },
    KillTask { task_id: TaskId },
    ReconcileTasks { task_ids: Vec<TaskId> },
    SuppressOffers,
    ReviveOffers,
}

#[derive(Default)]
pub struct RecordingDriver {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl helmsman_kernel::driver::SchedulerDriver for RecordingDriver {
    async fn accept_offers(&self, offer_id: &OfferId, operations: &[Operation]) -> Result<(), DriverError> {
        self.calls.lock().push(RecordedCall::AcceptOffers { offer_id: offer_id.clone(), operations: operations.to_vec() });
        Ok(())
    }

    async fn decline_offer(&self, offer_id: &OfferId) -> Result<(), DriverError> {
        self.calls.lock().push(RecordedCall::DeclineOffer { offer_id: offer_id.clone() });
        Ok(())
    }

    async fn kill_task(&self, task_id: &TaskId) -> Result<(), DriverError> {
        self.calls.lock().push(RecordedCall::KillTask { task_id: task_id.clone() });
        Ok(())
    }

    async fn reconcile_tasks(&self, task_ids: &[TaskId]) -> Result<(), DriverError> {
        self.calls.lock().push(RecordedCall::ReconcileTasks { task_ids: task_ids.to_vec() });
        Ok(())
    }

    async fn suppress_offers(&self) -> Result<(), DriverError> {
        self.calls.lock().push(RecordedCall::SuppressOffers);
        Ok(())
    }

    async fn revive_offers(&self) -> Result<(), DriverError> {
        self.calls.lock().push(RecordedCall::ReviveOffers);
        Ok(())
    }
}
