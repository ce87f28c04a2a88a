//! The key/value abstractions assumed by §1: `StateStore` for framework/task state, `ConfigStore`
//! for service-specification generations. Treated as external collaborators — only their trait
//! shape lives here; `helmsman-engine::store::memory` ships the in-memory implementation this
//! crate assumes exists somewhere.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{ConfigTarget, ServiceSpecification};
use crate::offer::TaskId;
use crate::offer::TaskInfo;
use crate::status::TaskStatus;

/// Backs `/frameworkId`, `/tasks/<name>`, `/suppressed`.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get_framework_id(&self) -> Result<Option<String>, StoreError>;
    async fn put_framework_id(&self, framework_id: &str) -> Result<(), StoreError>;

    async fn put_task(&self, info: TaskInfo, status: Option<TaskStatus>) -> Result<(), StoreError>;
    async fn get_task(&self, task_id: &TaskId) -> Result<Option<(TaskInfo, Option<TaskStatus>)>, StoreError>;
    async fn list_tasks(&self) -> Result<Vec<(TaskInfo, Option<TaskStatus>)>, StoreError>;
    async fn put_last_status(&self, status: TaskStatus) -> Result<(), StoreError>;

    async fn get_suppressed(&self) -> Result<bool, StoreError>;
    async fn put_suppressed(&self, suppressed: bool) -> Result<(), StoreError>;
}

/// Backs `/config/target`, `/config/<id>`.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_target(&self) -> Result<Option<ConfigTarget>, StoreError>;
    async fn put_target(&self, target: ConfigTarget) -> Result<(), StoreError>;

    async fn get_spec(&self, target: ConfigTarget) -> Result<Option<ServiceSpecification>, StoreError>;
    async fn put_spec(&self, target: ConfigTarget, spec: ServiceSpecification) -> Result<(), StoreError>;
}
