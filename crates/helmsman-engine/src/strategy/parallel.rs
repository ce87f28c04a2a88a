use helmsman_kernel::step::Status;

use super::{is_open, Interruptible, StatusProvider, Strategy};

/// Candidates = all children whose status is PENDING or PREPARED.
#[derive(Clone, Default)]
pub struct ParallelStrategy {
    interruptible: Interruptible,
}

impl ParallelStrategy {
    pub fn new() -> Self {
        Self { interruptible: Interruptible::new() }
    }
}

impl<E: StatusProvider> Strategy<E> for ParallelStrategy {
    fn get_candidates(&self, children: &[E]) -> Vec<usize> {
        if self.interruptible.is_interrupted() {
            return Vec::new();
        }
        children
            .iter()
            .enumerate()
            .filter(|(_, c)| is_open(c.element_status()))
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

/// Like `ParallelStrategy`; ERROR children simply never become candidates again, which for a
/// parallel strategy is already true of `ParallelStrategy` too — the "WithErrors" variant exists
/// so a Plan/Phase composed of it can still reach COMPLETE with error-tolerant children, via the
/// join rule (§3) treating ERROR specially only at the join, not at candidate selection.
#[derive(Clone, Default)]
pub struct ParallelWithErrorsStrategy {
    interruptible: Interruptible,
}

impl ParallelWithErrorsStrategy {
    pub fn new() -> Self {
        Self { interruptible: Interruptible::new() }
    }
}

impl<E: StatusProvider> Strategy<E> for ParallelWithErrorsStrategy {
    fn get_candidates(&self, children: &[E]) -> Vec<usize> {
        if self.interruptible.is_interrupted() {
            return Vec::new();
        }
        children
            .iter()
            .enumerate()
            .filter(|(_, c)| is_open(c.element_status()))
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
