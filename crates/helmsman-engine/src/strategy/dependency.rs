use std::collections::HashMap;

use helmsman_kernel::step::Status;

use super::{is_open, Interruptible, StatusProvider, Strategy};

/// Candidates = children whose own status is open and whose declared predecessors (by id) are
/// all COMPLETE. A child with no declared predecessors is always eligible once open.
#[derive(Clone)]
pub struct DependencyStrategy {
    predecessors: HashMap<String, Vec<String>>,
    interruptible: Interruptible,
}

impl DependencyStrategy {
    pub fn new(predecessors: HashMap<String, Vec<String>>) -> Self {
        Self { predecessors, interruptible: Interruptible::new() }
    }
}

impl<E: StatusProvider> Strategy<E> for DependencyStrategy {
    fn get_candidates(&self, children: &[E]) -> Vec<usize> {
        if self.interruptible.is_interrupted() {
            return Vec::new();
        }
        let statuses: HashMap<&str, Status> =
            children.iter().map(|c| (c.element_id(), c.element_status())).collect();

        children
            .iter()
            .enumerate()
            .filter(|(_, child)| is_open(child.element_status()))
            .filter(|(_, child)| {
                self.predecessors
                    .get(child.element_id())
                    .map(|preds| preds.iter().all(|p| statuses.get(p.as_str()) == Some(&Status::Complete)))
                    .unwrap_or(true)
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn interrupt(&self) {
        self.interruptible.interrupt();
    }

    fn proceed(&self) {
        self.interruptible.proceed();
    }

    fn is_interrupted(&self) -> bool {
        self.interruptible.is_interrupted()
    }
}
