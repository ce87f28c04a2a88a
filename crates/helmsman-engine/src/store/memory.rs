//! In-memory `StateStore`/`ConfigStore` implementations for standalone operation and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use helmsman_kernel::error::StoreError;
use helmsman_kernel::model::{ConfigTarget, ServiceSpecification};
use helmsman_kernel::offer::{TaskId, TaskInfo};
use helmsman_kernel::status::TaskStatus;
use helmsman_kernel::store::{ConfigStore, StateStore};

#[derive(Default)]
pub struct InMemoryStateStore {
    framework_id: RwLock<Option<String>>,
    tasks: RwLock<HashMap<TaskId, (TaskInfo, Option<TaskStatus>)>>,
    suppressed: RwLock<bool>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get_framework_id(&self) -> Result<Option<String>, StoreError> {
        Ok(self.framework_id.read().await.clone())
    }

    async fn put_framework_id(&self, framework_id: &str) -> Result<(), StoreError> {
        *self.framework_id.write().await = Some(framework_id.to_string());
        Ok(())
    }

    async fn put_task(&self, info: TaskInfo, status: Option<TaskStatus>) -> Result<(), StoreError> {
        self.tasks.write().await.insert(info.task_id.clone(), (info, status));
        Ok(())
    }

    async fn get_task(&self, task_id: &TaskId) -> Result<Option<(TaskInfo, Option<TaskStatus>)>, StoreError> {
        Ok(self.tasks.read().await.get(task_id).cloned())
    }

    async fn list_tasks(&self) -> Result<Vec<(TaskInfo, Option<TaskStatus>)>, StoreError> {
        Ok(self.tasks.read().await.values().cloned().collect())
    }

    async fn put_last_status(&self, status: TaskStatus) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&status.task_id) {
            Some((_, existing)) => *existing = Some(status),
            None => return Err(StoreError::NotFound),
        }
        Ok(())
    }

    async fn get_suppressed(&self) -> Result<bool, StoreError> {
        Ok(*self.suppressed.read().await)
    }

    async fn put_suppressed(&self, suppressed: bool) -> Result<(), StoreError> {
        *self.suppressed.write().await = suppressed;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryConfigStore {
    target: RwLock<Option<ConfigTarget>>,
    specs: RwLock<HashMap<ConfigTarget, ServiceSpecification>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get_target(&self) -> Result<Option<ConfigTarget>, StoreError> {
        Ok(*self.target.read().await)
    }

    async fn put_target(&self, target: ConfigTarget) -> Result<(), StoreError> {
        *self.target.write().await = Some(target);
        Ok(())
    }

    async fn get_spec(&self, target: ConfigTarget) -> Result<Option<ServiceSpecification>, StoreError> {
        Ok(self.specs.read().await.get(&target).cloned())
    }

    async fn put_spec(&self, target: ConfigTarget, spec: ServiceSpecification) -> Result<(), StoreError> {
        self.specs.write().await.insert(target, spec);
        Ok(())
    }
}

pub fn shared_state_store() -> Arc<dyn StateStore> {
    Arc::new(InMemoryStateStore::new())
}

pub fn shared_config_store() -> Arc<dyn ConfigStore> {
    Arc::new(InMemoryConfigStore::new())
}
