//! Session (path) contract consumed by the scheduler, plus an ordered session table.
//!
//! Sessions are owned by the surrounding transport runtime. The scheduler only
//! keeps `SessionId`s and resolves them through a [`SessionTable`] on every
//! call, so a session destroyed between calls simply stops resolving.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::{PieceId, SessionId};

/// Failure reported by a session's `request_data`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The session refused the batch (e.g. its send buffer is full).
    #[error("session rejected request: {reason}")]
    Rejected { reason: String },
    /// The session is closing or closed and accepts nothing.
    #[error("session closed")]
    Closed,
}

/// One path as seen by the scheduler.
pub trait Session {
    /// Identity of this session.
    fn session_id(&self) -> SessionId;

    /// Number of pieces the session can accept right now (free send window).
    fn capacity(&self) -> usize;

    /// Current round-trip-time estimate.
    fn rtt(&self) -> Duration;

    /// Ask the transport to fetch `pieces` over this session.
    ///
    /// On `Ok` the pieces become the transport's responsibility; completion and
    /// timeout come back through the scheduler's receipt/loss callbacks.
    fn request_data(&mut self, session: SessionId, pieces: &[PieceId]) -> Result<(), SendError>;
}

/// Lookup of live sessions by id.
///
/// `session_ids` defines the iteration order the RTT ranking uses to break ties.
pub trait SessionTable {
    type Session: Session;

    fn session(&self, id: SessionId) -> Option<&Self::Session>;

    fn session_mut(&mut self, id: SessionId) -> Option<&mut Self::Session>;

    fn session_ids(&self) -> Vec<SessionId>;
}

/// Session table keyed (and iterated) by `SessionId`.
#[derive(Debug, Clone)]
pub struct SessionMap<S> {
    sessions: BTreeMap<SessionId, S>,
}

impl<S> Default for SessionMap<S> {
    fn default() -> Self {
        Self {
            sessions: BTreeMap::new(),
        }
    }
}

impl<S: Session> SessionMap<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session under its own id, returning any session it replaced.
    pub fn insert(&mut self, session: S) -> Option<S> {
        self.sessions.insert(session.session_id(), session)
    }

    pub fn remove(&mut self, id: SessionId) -> Option<S> {
        self.sessions.remove(&id)
    }

    pub fn get(&self, id: SessionId) -> Option<&S> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut S> {
        self.sessions.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.sessions.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut S> {
        self.sessions.values_mut()
    }
}

impl<S: Session> SessionTable for SessionMap<S> {
    type Session = S;

    fn session(&self, id: SessionId) -> Option<&S> {
        self.sessions.get(&id)
    }

    fn session_mut(&mut self, id: SessionId) -> Option<&mut S> {
        self.sessions.get_mut(&id)
    }

    fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }
}
