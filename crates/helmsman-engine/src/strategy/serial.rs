use helmsman_kernel::step::Status;

use super::{is_open, Interruptible, StatusProvider, Strategy};

/// Candidates = the first child whose status is PENDING or PREPARED; once COMPLETE, advance.
/// Blocks at the first ERROR child.
#[derive(Clone, Default)]
pub struct SerialStrategy {
    interruptible: Interruptible,
}

impl SerialStrategy {
    pub fn new() -> Self {
        Self { interruptible: Interruptible::new() }
    }
}

impl<E: StatusProvider> Strategy<E> for SerialStrategy {
    fn get_candidates(&self, children: &[E]) -> Vec<usize> {
        if self.interruptible.is_interrupted() {
            return Vec::new();
        }
        for (i, child) in children.iter().enumerate() {
            let status = child.element_status();
            if status == Status::Error {
                return Vec::new();
            }
            if is_open(status) {
                return vec![i];
            }
            if status != Status::Complete {
                // IN_PROGRESS or WAITING: blocks the serial chain without offering a candidate.
                return Vec::new();
            }
        }
        Vec::new()
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

/// Like `SerialStrategy` but skips ERROR children instead of blocking at them.
#[derive(Clone, Default)]
pub struct SerialWithErrorsStrategy {
    interruptible: Interruptible,
}

impl SerialWithErrorsStrategy {
    pub fn new() -> Self {
        Self { interruptible: Interruptible::new() }
    }
}

impl<E: StatusProvider> Strategy<E> for SerialWithErrorsStrategy {
    fn get_candidates(&self, children: &[E]) -> Vec<usize> {
        if self.interruptible.is_interrupted() {
            return Vec::new();
        }
        for (i, child) in children.iter().enumerate() {
            let status = child.element_status();
            if status == Status::Error {
                continue;
            }
            if is_open(status) {
                return vec![i];
            }
            if status != Status::Complete {
                return Vec::new();
            }
        }
        Vec::new()
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
