//! Free pool and per-session assigned queues.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{PieceId, SessionId};

/// Unassigned pieces (ascending order) plus the pieces committed to each
/// tracked session but not yet handed to its transport.
#[derive(Debug, Clone, Default)]
pub struct PieceLedger {
    free: BTreeSet<PieceId>,
    assigned: BTreeMap<SessionId, BTreeSet<PieceId>>,
}

impl PieceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn free_pool(&self) -> &BTreeSet<PieceId> {
        &self.free
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Insert into the free pool. Returns false if the id was already free.
    pub fn release(&mut self, piece: PieceId) -> bool {
        self.free.insert(piece)
    }

    pub fn release_all<I: IntoIterator<Item = PieceId>>(&mut self, pieces: I) -> usize {
        let before = self.free.len();
        self.free.extend(pieces);
        self.free.len() - before
    }

    pub fn is_tracked(&self, session: SessionId) -> bool {
        self.assigned.contains_key(&session)
    }

    pub fn tracked_sessions(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.assigned.keys().copied()
    }

    pub fn has_sessions(&self) -> bool {
        !self.assigned.is_empty()
    }

    pub fn assigned(&self, session: SessionId) -> Option<&BTreeSet<PieceId>> {
        self.assigned.get(&session)
    }

    /// Sessions whose assigned queue is non-empty, in id order.
    pub fn sessions_with_work(&self) -> Vec<SessionId> {
        self.assigned
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|(id, _)| *id)
            .collect()
    }

    /// True if the id is in the free pool or in any assigned queue.
    pub fn holds(&self, piece: PieceId) -> bool {
        self.free.contains(&piece) || self.assigned.values().any(|q| q.contains(&piece))
    }

    /// Start tracking `session` with an empty queue.
    ///
    /// If it was already tracked, its pending pieces go back to the free pool
    /// first; the number returned is how many were drained.
    pub fn open_session(&mut self, session: SessionId) -> Option<usize> {
        let previous = self.assigned.insert(session, BTreeSet::new());
        previous.map(|pending| self.release_all(pending))
    }

    /// Stop tracking `session`, draining its queue to the free pool.
    /// Returns None if it wasn't tracked.
    pub fn close_session(&mut self, session: SessionId) -> Option<usize> {
        let pending = self.assigned.remove(&session)?;
        let n = pending.len();
        self.free.extend(pending);
        Some(n)
    }

    /// Drain every assigned queue to the free pool and forget all sessions.
    pub fn close_all(&mut self) -> usize {
        let assigned = std::mem::take(&mut self.assigned);
        let mut moved = 0;
        for (_, pending) in assigned {
            moved += pending.len();
            self.free.extend(pending);
        }
        moved
    }

    /// Move up to `count` pieces, starting `skip` positions into the free
    /// pool's ascending order, into `session`'s queue.
    ///
    /// Returns the moved ids; empty if the session isn't tracked.
    pub fn assign(&mut self, session: SessionId, skip: usize, count: usize) -> Vec<PieceId> {
        let Some(queue) = self.assigned.get_mut(&session) else {
            return Vec::new();
        };
        let taken: Vec<PieceId> = self.free.iter().skip(skip).take(count).copied().collect();
        for piece in &taken {
            self.free.remove(piece);
            queue.insert(*piece);
        }
        taken
    }

    /// Pop up to `count` pieces from the front of `session`'s queue.
    pub fn take_assigned(&mut self, session: SessionId, count: usize) -> Vec<PieceId> {
        let Some(queue) = self.assigned.get_mut(&session) else {
            return Vec::new();
        };
        let mut batch = Vec::with_capacity(count.min(queue.len()));
        while batch.len() < count {
            match queue.pop_first() {
                Some(piece) => batch.push(piece),
                None => break,
            }
        }
        batch
    }

    /// Total pending pieces across all assigned queues.
    pub fn assigned_len(&self) -> usize {
        self.assigned.values().map(BTreeSet::len).sum()
    }

    pub(crate) fn assigned_map(&self) -> &BTreeMap<SessionId, BTreeSet<PieceId>> {
        &self.assigned
    }
}
