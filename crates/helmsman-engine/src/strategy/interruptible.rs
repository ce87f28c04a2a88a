//! The interruptible mixin (§4.e, §9). Composed as a plain field on every strategy struct rather
//! than factored into a base class — directly grounded on the teacher's `AgentInterrupt`
//! (`Arc<AtomicBool>` + notify), minus the `Notify` half since strategy interruption here is
//! polled synchronously from `get_candidates`, never awaited.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Interruptible {
    interrupted: Arc<AtomicBool>,
}

impl Interruptible {
    pub fn new() -> Self {
        Self { interrupted: Arc::new(AtomicBool::new(false)) }
    }

    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn proceed(&self) {
        self.interrupted.store(false, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}
