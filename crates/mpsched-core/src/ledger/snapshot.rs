//! Serializable view of the ledgers (for reports and debugging).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{PieceId, SessionId};

use super::{LossLedger, PieceLedger};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub free: Vec<PieceId>,
    pub assigned: BTreeMap<SessionId, Vec<PieceId>>,
    pub lost: Vec<PieceId>,
}

impl LedgerSnapshot {
    pub(crate) fn capture(pieces: &PieceLedger, loss: &LossLedger) -> Self {
        Self {
            free: pieces.free_pool().iter().copied().collect(),
            assigned: pieces
                .assigned_map()
                .iter()
                .map(|(id, q)| (*id, q.iter().copied().collect()))
                .collect(),
            lost: loss.iter().collect(),
        }
    }

    /// Every piece id in the snapshot, duplicates included.
    pub fn all_pieces(&self) -> Vec<PieceId> {
        let mut all = self.free.clone();
        for q in self.assigned.values() {
            all.extend(q.iter().copied());
        }
        all.extend(self.lost.iter().copied());
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::pieces;

    #[test]
    fn capture_lists_all_three_ledgers() {
        let mut p = PieceLedger::new();
        let mut l = LossLedger::new();
        p.release_all(pieces(0..5));
        p.open_session(SessionId(1));
        p.assign(SessionId(1), 0, 2);
        l.record(PieceId(9));
        let snap = LedgerSnapshot::capture(&p, &l);
        assert_eq!(snap.free, pieces([2, 3, 4]));
        assert_eq!(snap.assigned.get(&SessionId(1)), Some(&pieces([0, 1])));
        assert_eq!(snap.lost, pieces([9]));
        assert_eq!(snap.all_pieces().len(), 6);
    }
}
