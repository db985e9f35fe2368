//! Scheduler tests (split by entry point).

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::handler::testing::RecordingHandler;
use crate::handler::HandlerRef;
use crate::session::testing::{table, MockSession};
use crate::session::SessionMap;
use crate::types::{pieces, PieceId, SessionId};

use super::MultipathScheduler;

mod single;

/// Scheduler with `ids` in the free pool and every session in `sessions` created.
pub(super) fn setup(
    sessions: Vec<MockSession>,
    ids: std::ops::Range<u32>,
) -> (MultipathScheduler, SessionMap<MockSession>) {
    let mut sched = MultipathScheduler::new(SchedulerConfig::default());
    let t = table(sessions);
    for s in t.iter() {
        sched.on_session_created(s.id);
    }
    sched.add_pieces(pieces(ids));
    (sched, t)
}

pub(super) fn with_handler(sched: &mut MultipathScheduler) -> Arc<RecordingHandler> {
    let handler = Arc::new(RecordingHandler::default());
    sched.start(HandlerRef::new(&handler));
    handler
}

pub(super) fn free(sched: &MultipathScheduler) -> Vec<PieceId> {
    sched.free_pool().collect()
}

/// Every piece in custody appears exactly once across the three ledgers.
pub(super) fn assert_partition(sched: &MultipathScheduler) {
    let all = sched.snapshot().all_pieces();
    let unique: BTreeSet<PieceId> = all.iter().copied().collect();
    assert_eq!(all.len(), unique.len(), "piece held in two places: {:?}", sched.snapshot());
    assert_eq!(all.len(), sched.piece_count());
}

pub(super) fn sid(v: u64) -> SessionId {
    SessionId(v)
}
