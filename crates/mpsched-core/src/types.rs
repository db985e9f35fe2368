//! Identifier types shared by the ledgers, the scheduler and its collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One schedulable unit of data (a subpiece). Unique within a task.
///
/// Ordering is plain numeric ordering; the free pool relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PieceId {
    fn from(v: u32) -> Self {
        PieceId(v)
    }
}

/// Identity of a path/session, stable for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<u64> for SessionId {
    fn from(v: u64) -> Self {
        SessionId(v)
    }
}

/// Transport sequence number carried in receipt notifications.
pub type SeqNumber = u64;

/// Collect plain integers into piece ids (test and simulation helper).
pub fn pieces<I: IntoIterator<Item = u32>>(ids: I) -> Vec<PieceId> {
    ids.into_iter().map(PieceId).collect()
}
