//! Hand assigned pieces to a session's transport.

use crate::session::{Session, SessionTable};
use crate::types::SessionId;

use super::MultipathScheduler;

/// What the send routine did for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing pending, no window, or the session couldn't be resolved.
    Idle,
    /// This many pieces were accepted by the session.
    Sent(usize),
    /// The session refused the batch; this many pieces went back to the free pool.
    Failed(usize),
}

impl MultipathScheduler {
    /// Pull up to the session's current capacity off its assigned queue and
    /// call `request_data`. A refused batch returns to the free pool (a send
    /// failure is not a timeout, so the loss ledger isn't involved).
    pub(super) fn send_assigned<T: SessionTable>(
        &mut self,
        sessions: &mut T,
        id: SessionId,
    ) -> SendOutcome {
        let Some(session) = sessions.session_mut(id) else {
            tracing::warn!(session = %id, "send for unresolvable session; pieces stay queued");
            return SendOutcome::Idle;
        };

        let capacity = session.capacity();
        let batch = self.pieces.take_assigned(id, capacity);
        if batch.is_empty() {
            tracing::trace!(session = %id, capacity, "nothing to send");
            return SendOutcome::Idle;
        }

        let n = batch.len();
        match session.request_data(id, &batch) {
            Ok(()) => {
                tracing::trace!(session = %id, ?batch, "pieces requested");
                self.stats.pieces_sent += n as u64;
                SendOutcome::Sent(n)
            }
            Err(e) => {
                tracing::debug!(session = %id, error = %e, n, "send failed; pieces returned to free pool");
                self.pieces.release_all(batch);
                self.stats.send_failures += 1;
                self.stats.pieces_returned += n as u64;
                SendOutcome::Failed(n)
            }
        }
    }
}
