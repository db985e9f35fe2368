//! Upstream stand-in: remembers how many pieces the scheduler asked for.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::handler::SchedulerHandler;

#[derive(Debug, Default)]
pub struct SimSupplier {
    pending: AtomicUsize,
    requests: AtomicUsize,
}

impl SimSupplier {
    /// Take the outstanding requested count, resetting it to 0.
    pub fn take_pending(&self) -> usize {
        self.pending.swap(0, Ordering::AcqRel)
    }

    /// Number of replenishment requests received so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl SchedulerHandler for SimSupplier {
    fn on_request_more_pieces(&self, count: usize) {
        self.pending.fetch_add(count, Ordering::AcqRel);
        self.requests.fetch_add(1, Ordering::Relaxed);
    }
}
