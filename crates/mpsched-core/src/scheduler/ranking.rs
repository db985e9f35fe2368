//! RTT ranking and the proportional skip used by the global pass.

use std::time::Duration;

use crate::session::{Session, SessionTable};
use crate::types::SessionId;

/// Live sessions ordered by ascending RTT. Equal RTTs keep the session
/// table's iteration order.
#[derive(Debug, Clone, Default)]
pub struct RttRanking {
    entries: Vec<(Duration, SessionId)>,
}

impl RttRanking {
    /// Rank the given ids by their current RTT. Ids the table can't resolve are skipped.
    pub fn build<T: SessionTable>(sessions: &T, ids: &[SessionId]) -> Self {
        let mut entries: Vec<(Duration, SessionId)> = ids
            .iter()
            .filter_map(|id| sessions.session(*id).map(|s| (s.rtt(), *id)))
            .collect();
        // sort_by_key is stable: ties stay in table order.
        entries.sort_by_key(|(rtt, _)| *rtt);
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Duration, SessionId)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How far into the free pool a session with RTT `current` should start,
/// given the `(rtt, window)` record of faster sessions already filled this pass.
///
/// RTTs are compared in whole milliseconds. For each faster session with
/// `ratio = current / previous - 1 >= 1` the cursor moves `floor(ratio) * window`
/// positions. A 0 ms previous RTT, or a ratio below 1, ends the walk. The
/// result never exceeds `pool_len - wanted`, so the slow session still fills
/// its window from the tail of the pool.
pub fn proportional_skip(
    current: Duration,
    faster: &[(Duration, usize)],
    pool_len: usize,
    wanted: usize,
) -> usize {
    let limit = pool_len.saturating_sub(wanted);
    let current_ms = current.as_millis();
    let mut skip = 0usize;
    for (previous, window) in faster {
        let previous_ms = previous.as_millis();
        if previous_ms == 0 {
            break;
        }
        let ratio = current_ms as f64 / previous_ms as f64 - 1.0;
        if ratio < 1.0 {
            break;
        }
        let step = (ratio.floor() as usize).saturating_mul(*window);
        skip = skip.saturating_add(step);
        if skip >= limit {
            return limit;
        }
    }
    skip
}
