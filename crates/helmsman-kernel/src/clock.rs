//! An injectable time source so backoff/rate-limiting logic (Reconciler, TimedLaunchConstrainer,
//! TimedFailureMonitor) can be tested without real sleeps, instead of sprinkling `Instant::now()`
//! through business logic.

use std::time::Instant;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Built whenever this crate's own tests run (`cfg(test)`) or whenever a downstream crate's test
/// build enables the `test-util` feature — `cfg(test)` alone is local to this crate and would not
/// be visible to `helmsman-engine`'s or `tests/`'s test builds, which only ever depend on
/// `helmsman-kernel` as an ordinary library.
#[cfg(any(test, feature = "test-util"))]
pub mod test_support {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// A clock that only advances when told to, for deterministic backoff tests.
    #[derive(Clone)]
    pub struct SteppableClock {
        now: Arc<Mutex<Instant>>,
    }

    impl SteppableClock {
        pub fn new() -> Self {
            Self { now: Arc::new(Mutex::new(Instant::now())) }
        }

        pub fn advance(&self, duration: std::time::Duration) {
            let mut now = self.now.lock();
            *now += duration;
        }
    }

    impl Default for SteppableClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for SteppableClock {
        fn now(&self) -> Instant {
            *self.now.lock()
        }
    }
}
