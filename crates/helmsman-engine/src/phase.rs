//! Phase: an ordered group of Steps driven by one `Strategy<Arc<Step>>` (§4.e).

use std::sync::Arc;

use helmsman_kernel::step::Status;

use crate::step::Step;
use crate::strategy::{Strategy, StatusProvider};

impl StatusProvider for Arc<Step> {
    fn element_id(&self) -> &str {
        self.id()
    }

    fn element_status(&self) -> Status {
        self.status()
    }
}

pub struct Phase {
    id: String,
    name: String,
    steps: Vec<Arc<Step>>,
    strategy: Box<dyn Strategy<Arc<Step>>>,
}

impl Phase {
    pub fn new(id: impl Into<String>, name: impl Into<String>, steps: Vec<Arc<Step>>, strategy: Box<dyn Strategy<Arc<Step>>>) -> Self {
        Self { id: id.into(), name: name.into(), steps, strategy }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Arc<Step>] {
        &self.steps
    }

    /// WAITING overrides the joined status whenever this phase's strategy is interrupted (§3).
    pub fn status(&self) -> Status {
        if self.strategy.is_interrupted() {
            return Status::Waiting;
        }
        let statuses: Vec<Status> = self.steps.iter().map(|s| s.status()).collect();
        Status::join(&statuses)
    }

    pub fn candidates(&self) -> Vec<Arc<Step>> {
        self.strategy.get_candidates(&self.steps).into_iter().map(|i| self.steps[i].clone()).collect()
    }

    pub fn interrupt(&self) {
        self.strategy.interrupt();
    }

    pub fn proceed(&self) {
        self.strategy.proceed();
    }

    pub fn is_interrupted(&self) -> bool {
        self.strategy.is_interrupted()
    }

    pub fn step(&self, step_id: &str) -> Option<&Arc<Step>> {
        self.steps.iter().find(|s| s.id() == step_id)
    }
}
