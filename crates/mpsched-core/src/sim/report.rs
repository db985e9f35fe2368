//! Simulation results.

use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulerStats;

/// Per-path outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub id: u64,
    pub rtt_ms: u64,
    pub window: usize,
    pub delivered: u64,
    pub lost: u64,
    pub failed_sends: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimReport {
    /// Virtual time when the run ended.
    pub elapsed_ms: u64,
    /// True if every piece was delivered before `max_duration_ms`.
    pub completed: bool,
    pub piece_count: u32,
    /// Pieces handed to the scheduler by the simulated upstream.
    pub supplied: u32,
    pub delivered: u64,
    pub sessions: Vec<SessionReport>,
    pub stats: SchedulerStats,
}

impl SimReport {
    /// Share of delivered pieces carried by the session `id` (0.0 if nothing was delivered).
    pub fn share(&self, id: u64) -> f64 {
        if self.delivered == 0 {
            return 0.0;
        }
        self.sessions
            .iter()
            .filter(|s| s.id == id)
            .map(|s| s.delivered)
            .sum::<u64>() as f64
            / self.delivered as f64
    }
}
