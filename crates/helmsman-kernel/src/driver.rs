//! The semantic surface of the cluster-manager RPC (§6), deliberately not its wire encoding.

use async_trait::async_trait;

use crate::error::DriverError;
use crate::offer::{OfferId, TaskId};
use crate::operation::Operation;

#[async_trait]
pub trait SchedulerDriver: Send + Sync {
    async fn accept_offers(&self, offer_id: &OfferId, operations: &[Operation]) -> Result<(), DriverError>;
    async fn decline_offer(&self, offer_id: &OfferId) -> Result<(), DriverError>;
    async fn kill_task(&self, task_id: &TaskId) -> Result<(), DriverError>;
    async fn reconcile_tasks(&self, task_ids: &[TaskId]) -> Result<(), DriverError>;
    async fn suppress_offers(&self) -> Result<(), DriverError>;
    async fn revive_offers(&self) -> Result<(), DriverError>;
}
