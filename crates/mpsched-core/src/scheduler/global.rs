//! Global RTT-weighted scheduling pass.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::session::{Session, SessionTable};
use crate::types::{PieceId, SessionId};

use super::{proportional_skip, MultipathScheduler, RttRanking, SendOutcome};

/// What one global pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalPassSummary {
    /// Lost pieces moved back into the free pool.
    pub requeued: usize,
    /// Sum of the live sessions' capacities.
    pub required: usize,
    /// Shortfall reported to upstream (0 if the pool covered `required`).
    pub deficit: usize,
    /// Pieces assigned to each ranked session during distribution.
    pub assigned: BTreeMap<SessionId, Vec<PieceId>>,
    /// Send outcome for every session that had queued work.
    pub sends: Vec<(SessionId, SendOutcome)>,
}

impl GlobalPassSummary {
    pub fn total_assigned(&self) -> usize {
        self.assigned.values().map(Vec::len).sum()
    }
}

impl MultipathScheduler {
    /// Requeue lost pieces, survey capacity, and distribute the free pool
    /// across all live sessions in ascending RTT order, then send.
    ///
    /// Slower sessions start further into the (ascending) free pool, in
    /// proportion to how many round trips faster sessions complete in the
    /// meantime, so near-future pieces stay available for fast paths.
    pub fn run_global_pass<T: SessionTable>(&mut self, sessions: &mut T) -> GlobalPassSummary {
        let mut summary = GlobalPassSummary::default();
        if !self.pieces.has_sessions() {
            tracing::debug!("no sessions tracked; global pass skipped");
            return summary;
        }
        self.stats.global_passes += 1;

        let live: Vec<SessionId> = sessions
            .session_ids()
            .into_iter()
            .filter(|id| self.pieces.is_tracked(*id))
            .collect();
        for id in self.pieces.tracked_sessions() {
            if sessions.session(id).is_none() {
                tracing::error!(session = %id, "tracked session missing from session table");
            }
        }
        self.ranking = RttRanking::build(sessions, &live);

        // Requeue lost pieces ahead of the survey so they count as supply.
        for piece in self.loss.drain() {
            if self.pieces.release(piece) {
                tracing::trace!(piece = %piece, "lost piece requeued");
                summary.requeued += 1;
            } else {
                tracing::trace!(piece = %piece, "lost piece already in free pool");
            }
        }

        let windows: BTreeMap<SessionId, usize> = self
            .ranking
            .iter()
            .filter_map(|(_, id)| sessions.session(id).map(|s| (id, s.capacity())))
            .collect();
        summary.required = windows.values().sum();
        summary.deficit = self.replenish(summary.required);
        tracing::trace!(
            free = self.pieces.free_len(),
            required = summary.required,
            "capacity survey done"
        );

        let mut faster: Vec<(Duration, usize)> = Vec::with_capacity(self.ranking.len());
        for (rtt, id) in self.ranking.iter() {
            let wanted = windows.get(&id).copied().unwrap_or(0);
            let skip = if self.config.proportional_skip {
                proportional_skip(rtt, &faster, self.pieces.free_len(), wanted)
            } else {
                0
            };
            let taken = self.pieces.assign(id, skip, wanted);
            self.stats.pieces_assigned += taken.len() as u64;
            tracing::trace!(session = %id, ?rtt, wanted, skip, ?taken, "session filled");
            faster.push((rtt, wanted));
            summary.assigned.insert(id, taken);
        }

        for id in self.pieces.sessions_with_work() {
            let outcome = self.send_assigned(sessions, id);
            summary.sends.push((id, outcome));
        }

        tracing::debug!(
            sessions = self.ranking.len(),
            requeued = summary.requeued,
            assigned = summary.total_assigned(),
            free = self.pieces.free_len(),
            "global pass done"
        );
        summary
    }
}
