//! Pieces whose delivery timed out, waiting to be requeued by the next global pass.

use std::collections::BTreeSet;

use crate::types::PieceId;

#[derive(Debug, Clone, Default)]
pub struct LossLedger {
    lost: BTreeSet<PieceId>,
}

impl LossLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a lost piece. Returns false if it was already recorded.
    pub fn record(&mut self, piece: PieceId) -> bool {
        self.lost.insert(piece)
    }

    pub fn contains(&self, piece: PieceId) -> bool {
        self.lost.contains(&piece)
    }

    pub fn len(&self) -> usize {
        self.lost.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lost.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.lost.iter().copied()
    }

    /// Remove and return every recorded piece.
    pub fn drain(&mut self) -> BTreeSet<PieceId> {
        std::mem::take(&mut self.lost)
    }
}
