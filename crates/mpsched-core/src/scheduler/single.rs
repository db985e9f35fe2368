//! Reactive, per-session scheduling.

use crate::session::{Session, SessionTable};
use crate::types::SessionId;

use super::{MultipathScheduler, ScheduleError, SendOutcome};

/// Result of a single-path pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinglePathOutcome {
    /// The session's free window is 0; nothing to do.
    Saturated,
    /// `assigned` pieces moved from the free pool, then the send routine ran.
    Scheduled { assigned: usize, send: SendOutcome },
}

impl MultipathScheduler {
    /// Fill one session's window from the front of the free pool and send.
    ///
    /// Runs whenever a session signals fresh capacity, independent of the
    /// global pass. Asks upstream for the shortfall when the pool is smaller
    /// than the window, then proceeds with whatever is available.
    pub fn run_single_path_pass<T: SessionTable>(
        &mut self,
        sessions: &mut T,
        id: SessionId,
    ) -> Result<SinglePathOutcome, ScheduleError> {
        let capacity = match sessions.session(id) {
            Some(session) if self.pieces.is_tracked(id) => session.capacity(),
            _ => {
                tracing::warn!(session = %id, "single-path pass for unknown session");
                return Err(ScheduleError::UnknownSession(id));
            }
        };
        self.stats.single_passes += 1;
        tracing::debug!(session = %id, capacity, "single-path pass");

        if capacity == 0 {
            tracing::debug!(session = %id, "free window is 0");
            return Ok(SinglePathOutcome::Saturated);
        }

        self.replenish(capacity);

        let taken = self.pieces.assign(id, 0, capacity);
        self.stats.pieces_assigned += taken.len() as u64;

        let send = self.send_assigned(sessions, id);
        Ok(SinglePathOutcome::Scheduled {
            assigned: taken.len(),
            send,
        })
    }
}
