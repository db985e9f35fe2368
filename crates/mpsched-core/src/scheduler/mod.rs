//! Multipath piece scheduler.
//!
//! Decides which pieces go to which session (path) and when. Pieces flow from
//! the free pool into per-session assigned queues, either reactively for one
//! session (`run_single_path_pass`) or across all sessions at once
//! (`run_global_pass`, RTT-weighted), and from there into the session's
//! `request_data`. Timed-out pieces wait in the loss ledger until the next
//! global pass puts them back into the free pool.
//!
//! Every entry point takes `&mut self`, so one callback always has exclusive
//! access to the ledgers. Runtimes that drive sessions from several contexts
//! can funnel calls through [`task::spawn_scheduler`].

mod error;
mod global;
mod ranking;
mod send;
mod single;
mod stats;
pub mod task;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SchedulerConfig;
use crate::handler::HandlerRef;
use crate::ledger::{LedgerSnapshot, LossLedger, PieceLedger};
use crate::session::SessionTable;
use crate::types::{PieceId, SeqNumber, SessionId};

pub use error::ScheduleError;
pub use global::GlobalPassSummary;
pub use ranking::{proportional_skip, RttRanking};
pub use send::SendOutcome;
pub use single::SinglePathOutcome;
pub use stats::SchedulerStats;

/// Scheduling flavor implemented by [`MultipathScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    /// Min-RTT-first fill with proportional skip for slower paths.
    MinRttRoundRobin,
}

#[derive(Debug, Default)]
pub struct MultipathScheduler {
    config: SchedulerConfig,
    pieces: PieceLedger,
    loss: LossLedger,
    ranking: RttRanking,
    handler: HandlerRef,
    stats: SchedulerStats,
}

impl MultipathScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        tracing::debug!(?config, "multipath scheduler created");
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> SchedulerKind {
        SchedulerKind::MinRttRoundRobin
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Attach the upstream handler used for replenishment requests.
    pub fn start(&mut self, handler: HandlerRef) {
        tracing::debug!(live = handler.is_live(), "multipath scheduler started");
        self.handler = handler;
    }

    /// Stop scheduling: every pending piece returns to the free pool and all
    /// sessions are forgotten. Pieces already handed to a session are not recalled.
    pub fn stop(&mut self) {
        tracing::debug!("multipath scheduler stopped");
        self.reset();
    }

    /// Start tracking a session. A duplicate create drains the session's
    /// pending pieces back to the free pool before resetting its queue.
    pub fn on_session_created(&mut self, id: SessionId) {
        tracing::debug!(session = %id, "session created");
        if let Some(drained) = self.pieces.open_session(id) {
            tracing::warn!(session = %id, drained, "session already created; queue reset");
        }
    }

    /// Stop tracking a session; its pending pieces go back to the free pool.
    pub fn on_session_destroyed(&mut self, id: SessionId) {
        tracing::debug!(session = %id, "session destroyed");
        match self.pieces.close_session(id) {
            Some(drained) => {
                tracing::debug!(session = %id, drained, "pending pieces returned to free pool")
            }
            None => tracing::warn!(session = %id, "destroyed session isn't tracked"),
        }
    }

    /// Drain every session's pending pieces to the free pool and forget all
    /// sessions. Calling it again is a no-op.
    pub fn reset(&mut self) {
        if !self.pieces.has_sessions() {
            return;
        }
        let drained = self.pieces.close_all();
        tracing::debug!(drained, free = self.pieces.free_len(), "scheduler reset");
    }

    /// Upstream supply: add piece ids to the free pool. Ids the scheduler
    /// already tracks (free, assigned or lost) are ignored. Returns how many were added.
    pub fn add_pieces<I: IntoIterator<Item = PieceId>>(&mut self, pieces: I) -> usize {
        let mut added = 0;
        for piece in pieces {
            if self.loss.contains(piece) || self.pieces.holds(piece) {
                tracing::trace!(piece = %piece, "supplied piece already tracked");
                continue;
            }
            self.pieces.release(piece);
            added += 1;
        }
        tracing::debug!(added, free = self.pieces.free_len(), "pieces supplied");
        added
    }

    /// Record pieces whose delivery timed out on `id`. They are requeued by
    /// the next global pass, not immediately.
    pub fn on_pieces_timed_out(&mut self, id: SessionId, pieces: &[PieceId]) {
        tracing::debug!(session = %id, count = pieces.len(), "pieces timed out");
        for &piece in pieces {
            if self.pieces.holds(piece) {
                tracing::warn!(session = %id, piece = %piece, "timed-out piece is still queued locally; ignored");
                continue;
            }
            if self.loss.record(piece) {
                self.stats.losses_recorded += 1;
            } else {
                tracing::warn!(session = %id, piece = %piece, "piece already marked lost");
                self.stats.duplicate_losses += 1;
            }
        }
    }

    /// A piece arrived on `id`. Treated as a sign of fresh capacity: runs a
    /// single-path pass for that session.
    pub fn on_data_received<T: SessionTable>(
        &mut self,
        sessions: &mut T,
        id: SessionId,
        seq: SeqNumber,
        piece: PieceId,
        recv_time: Duration,
    ) -> Result<SinglePathOutcome, ScheduleError> {
        tracing::debug!(session = %id, seq, piece = %piece, ?recv_time, "data received");
        self.run_single_path_pass(sessions, id)
    }

    pub fn free_pool(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.pieces.free_pool().iter().copied()
    }

    pub fn free_len(&self) -> usize {
        self.pieces.free_len()
    }

    /// Pieces assigned to `id` but not yet sent; None if `id` isn't tracked.
    pub fn assigned(&self, id: SessionId) -> Option<Vec<PieceId>> {
        self.pieces
            .assigned(id)
            .map(|q| q.iter().copied().collect())
    }

    pub fn lost(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.loss.iter()
    }

    pub fn is_tracked(&self, id: SessionId) -> bool {
        self.pieces.is_tracked(id)
    }

    pub fn tracked_sessions(&self) -> Vec<SessionId> {
        self.pieces.tracked_sessions().collect()
    }

    /// True if the piece is free, assigned or lost.
    pub fn contains(&self, piece: PieceId) -> bool {
        self.loss.contains(piece) || self.pieces.holds(piece)
    }

    /// Number of pieces currently in the scheduler's custody.
    pub fn piece_count(&self) -> usize {
        self.pieces.free_len() + self.pieces.assigned_len() + self.loss.len()
    }

    /// RTT ranking built by the most recent global pass.
    pub fn ranking(&self) -> &RttRanking {
        &self.ranking
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::capture(&self.pieces, &self.loss)
    }

    /// Ask upstream for more pieces if the free pool can't cover `required`.
    /// Returns the deficit (0 when supply is sufficient).
    fn replenish(&mut self, required: usize) -> usize {
        let free = self.pieces.free_len();
        if free >= required {
            return 0;
        }
        let deficit = required - free;
        if self.handler.request_more_pieces(deficit) {
            self.stats.replenish_requests += 1;
            self.stats.pieces_requested += deficit as u64;
        }
        deficit
    }
}

#[cfg(test)]
mod tests;
