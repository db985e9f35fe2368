//! Upstream piece-supply handler and the weak reference the scheduler holds to it.

use std::fmt;
use std::sync::{Arc, Weak};

/// Upstream collaborator asked for more piece ids when local supply can't
/// saturate the sessions' windows.
///
/// Fire-and-forget: the scheduler never waits for the answer. New ids arrive
/// later through `MultipathScheduler::add_pieces`.
pub trait SchedulerHandler: Send + Sync {
    /// Request `count` (> 0) more piece ids.
    fn on_request_more_pieces(&self, count: usize);
}

/// Non-owning, possibly-expired reference to the upstream handler.
#[derive(Clone, Default)]
pub struct HandlerRef {
    inner: Option<Weak<dyn SchedulerHandler>>,
}

impl HandlerRef {
    /// Reference `handler` without keeping it alive.
    pub fn new<H: SchedulerHandler + 'static>(handler: &Arc<H>) -> Self {
        let strong: Arc<dyn SchedulerHandler> = handler.clone();
        Self {
            inner: Some(Arc::downgrade(&strong)),
        }
    }

    /// No handler attached; every request is dropped.
    pub fn detached() -> Self {
        Self::default()
    }

    /// True while the referenced handler is still alive.
    pub fn is_live(&self) -> bool {
        self.inner
            .as_ref()
            .map(|w| w.strong_count() > 0)
            .unwrap_or(false)
    }

    /// Forward a replenishment request. Returns false when the handler is gone
    /// (or was never attached); that is logged, never an error.
    pub fn request_more_pieces(&self, count: usize) -> bool {
        if count == 0 {
            return false;
        }
        match self.inner.as_ref().and_then(Weak::upgrade) {
            Some(handler) => {
                tracing::debug!(count, "requesting more pieces from upstream");
                handler.on_request_more_pieces(count);
                true
            }
            None => {
                tracing::error!(count, "scheduler handler is gone; replenishment skipped");
                false
            }
        }
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRef")
            .field("live", &self.is_live())
            .finish()
    }
}
