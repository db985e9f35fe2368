//! Scheduler fault type.

use crate::types::SessionId;

/// Logical faults reported by the scheduler. None of them are fatal; callers
/// normally log and carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The id is not tracked by the lifecycle callbacks, or the session table
    /// no longer resolves it.
    #[error("unknown session {0}")]
    UnknownSession(SessionId),
}
