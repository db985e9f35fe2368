//! Piece bookkeeping: free pool, per-session assigned queues and the loss ledger.
//!
//! A piece id lives in at most one of {free pool, one assigned queue, loss
//! ledger}. The ledgers only move ids around; the scheduler decides when.

mod loss;
mod pieces;
mod snapshot;

pub use loss::LossLedger;
pub use pieces::PieceLedger;
pub use snapshot::LedgerSnapshot;
