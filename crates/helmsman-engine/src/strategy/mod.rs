//! Strategy: the policy object deciding which children of a container (Phase over Steps, Plan
//! over Phases) are currently candidates for work (§4.e). Generic over any element that can
//! report an id and a derived `Status`, so the same five strategy types serve both Phase and
//! Plan containers.

mod dependency;
mod interruptible;
mod parallel;
mod serial;

pub use dependency::DependencyStrategy;
pub use interruptible::Interruptible;
pub use parallel::{ParallelStrategy, ParallelWithErrorsStrategy};
pub use serial::{SerialStrategy, SerialWithErrorsStrategy};

use helmsman_kernel::step::Status;

pub trait StatusProvider {
    fn element_id(&self) -> &str;
    fn element_status(&self) -> Status;
}

/// `{getCandidates, interrupt, proceed, isInterrupted}` from §4.e.
pub trait Strategy<E: StatusProvider>: Send + Sync {
    /// Indices into `children` that are currently candidates, in child order.
    fn get_candidates(&self, children: &[E]) -> Vec<usize>;
    fn interrupt(&self);
    fn proceed(&self);
    fn is_interrupted(&self) -> bool;
}

fn is_open(status: Status) -> bool {
    matches!(status, Status::Pending | Status::Prepared)
}
