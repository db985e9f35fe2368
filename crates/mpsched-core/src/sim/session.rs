//! Virtual path with a fixed RTT and window.

use std::time::Duration;

use crate::config::SimSessionConfig;
use crate::session::{SendError, Session};
use crate::types::{PieceId, SeqNumber, SessionId};

/// Something that happened to an in-flight piece by the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    Delivered { seq: SeqNumber, piece: PieceId },
    TimedOut(PieceId),
}

#[derive(Debug, Clone)]
struct InFlight {
    piece: PieceId,
    seq: SeqNumber,
    due: Duration,
    lost: bool,
}

#[derive(Debug, Clone)]
pub struct SimSession {
    id: SessionId,
    rtt: Duration,
    window: usize,
    fail_every: Option<u32>,
    loss_every: Option<u32>,
    now: Duration,
    in_flight: Vec<InFlight>,
    next_seq: SeqNumber,
    requests: u32,
    accepted: u64,
    pub(super) delivered: u64,
    pub(super) lost: u64,
    pub(super) failed_sends: u64,
}

impl SimSession {
    pub fn new(cfg: &SimSessionConfig) -> Self {
        Self {
            id: SessionId(cfg.id),
            rtt: Duration::from_millis(cfg.rtt_ms),
            window: cfg.window,
            fail_every: cfg.fail_every.filter(|n| *n > 0),
            loss_every: cfg.loss_every.filter(|n| *n > 0),
            now: Duration::ZERO,
            in_flight: Vec::new(),
            next_seq: 0,
            requests: 0,
            accepted: 0,
            delivered: 0,
            lost: 0,
            failed_sends: 0,
        }
    }

    /// Advance this session's view of the virtual clock.
    pub fn set_now(&mut self, now: Duration) {
        self.now = now;
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Remove and return everything due by `now`, in due order.
    pub fn drain_due(&mut self, now: Duration) -> Vec<Arrival> {
        let (mut due, pending): (Vec<InFlight>, Vec<InFlight>) =
            self.in_flight.drain(..).partition(|f| f.due <= now);
        self.in_flight = pending;
        due.sort_by_key(|f| (f.due, f.seq));
        due.into_iter()
            .map(|f| {
                if f.lost {
                    self.lost += 1;
                    Arrival::TimedOut(f.piece)
                } else {
                    self.delivered += 1;
                    Arrival::Delivered {
                        seq: f.seq,
                        piece: f.piece,
                    }
                }
            })
            .collect()
    }

    /// The path went away: everything still in flight is lost.
    pub fn abandon(&mut self) -> Vec<PieceId> {
        let stranded: Vec<PieceId> = self.in_flight.drain(..).map(|f| f.piece).collect();
        self.lost += stranded.len() as u64;
        stranded
    }
}

impl Session for SimSession {
    fn session_id(&self) -> SessionId {
        self.id
    }

    fn capacity(&self) -> usize {
        self.window.saturating_sub(self.in_flight.len())
    }

    fn rtt(&self) -> Duration {
        self.rtt
    }

    fn request_data(&mut self, _session: SessionId, pieces: &[PieceId]) -> Result<(), SendError> {
        self.requests = self.requests.wrapping_add(1);
        if let Some(n) = self.fail_every {
            if self.requests % n == 0 {
                self.failed_sends += 1;
                return Err(SendError::Rejected {
                    reason: format!("scripted failure on request {}", self.requests),
                });
            }
        }
        for &piece in pieces {
            self.accepted += 1;
            let lost = self
                .loss_every
                .map(|n| self.accepted % u64::from(n) == 0)
                .unwrap_or(false);
            // A lost piece is noticed after twice the RTT.
            let due = self.now + if lost { self.rtt * 2 } else { self.rtt };
            self.in_flight.push(InFlight {
                piece,
                seq: self.next_seq,
                due,
                lost,
            });
            self.next_seq += 1;
        }
        Ok(())
    }
}
