//! Running counters kept by the scheduler.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub global_passes: u64,
    pub single_passes: u64,
    /// Pieces moved from the free pool into an assigned queue.
    pub pieces_assigned: u64,
    /// Pieces handed to a session's transport successfully.
    pub pieces_sent: u64,
    pub send_failures: u64,
    /// Pieces returned to the free pool after a failed send.
    pub pieces_returned: u64,
    pub replenish_requests: u64,
    pub pieces_requested: u64,
    pub losses_recorded: u64,
    pub duplicate_losses: u64,
}
