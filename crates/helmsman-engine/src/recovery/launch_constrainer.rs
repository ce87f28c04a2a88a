//! Rate-limits destructive recovery launches (§4.j). Grounded directly on the teacher's
//! day-bucketed `BudgetEnforcer`, narrowed from a cost budget to a single per-manager minimum
//! interval between destructive launches.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use helmsman_kernel::clock::Clock;

pub struct TimedLaunchConstrainer {
    clock: Arc<dyn Clock>,
    min_interval: Duration,
    last_launch_at: Mutex<Option<Instant>>,
}

impl TimedLaunchConstrainer {
    pub fn new(clock: Arc<dyn Clock>, min_interval: Duration) -> Self {
        Self { clock, min_interval, last_launch_at: Mutex::new(None) }
    }

    pub fn can_launch(&self) -> bool {
        let last = self.last_launch_at.lock();
        match *last {
            Some(at) => self.clock.now().duration_since(at) >= self.min_interval,
            None => true,
        }
    }

    pub fn record_launch(&self) {
        *self.last_launch_at.lock() = Some(self.clock.now());
    }
}
