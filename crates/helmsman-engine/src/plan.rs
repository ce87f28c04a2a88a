//! Plan: an ordered group of Phases driven by one `Strategy<Arc<Phase>>` (§4.e). A Plan's own
//! candidates are the candidate Steps of its candidate Phases, phase order preserved.

use std::sync::Arc;

use helmsman_kernel::step::Status;

use crate::phase::Phase;
use crate::step::Step;
use crate::strategy::{Strategy, StatusProvider};

impl StatusProvider for Arc<Phase> {
    fn element_id(&self) -> &str {
        self.id()
    }

    fn element_status(&self) -> Status {
        self.status()
    }
}

pub struct Plan {
    name: String,
    phases: Vec<Arc<Phase>>,
    strategy: Box<dyn Strategy<Arc<Phase>>>,
}

impl Plan {
    pub fn new(name: impl Into<String>, phases: Vec<Arc<Phase>>, strategy: Box<dyn Strategy<Arc<Phase>>>) -> Self {
        Self { name: name.into(), phases, strategy }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phases(&self) -> &[Arc<Phase>] {
        &self.phases
    }

    pub fn status(&self) -> Status {
        if self.strategy.is_interrupted() {
            return Status::Waiting;
        }
        let statuses: Vec<Status> = self.phases.iter().map(|p| p.status()).collect();
        Status::join(&statuses)
    }

    /// Candidate Phases (per this plan's own strategy) contribute their own candidate Steps, in
    /// phase order; a Phase's own interruption still applies independently within each phase.
    pub fn candidate_steps(&self) -> Vec<Arc<Step>> {
        self.strategy
            .get_candidates(&self.phases)
            .into_iter()
            .flat_map(|i| self.phases[i].candidates())
            .collect()
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

    pub fn phase(&self, phase_id: &str) -> Option<&Arc<Phase>> {
        self.phases.iter().find(|p| p.id() == phase_id)
    }
}
