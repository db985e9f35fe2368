//! Minimal path implementation for exercising the public scheduler API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mpsched_core::{PieceId, SchedulerHandler, SendError, Session, SessionId};

/// Path whose window is fixed and which accepts or refuses every request.
#[derive(Debug)]
pub struct FixedPath {
    pub id: SessionId,
    pub rtt: Duration,
    pub window: usize,
    pub accept: bool,
    pub requested: Vec<PieceId>,
}

impl FixedPath {
    pub fn new(id: u64, rtt_ms: u64, window: usize) -> Self {
        Self {
            id: SessionId(id),
            rtt: Duration::from_millis(rtt_ms),
            window,
            accept: true,
            requested: Vec::new(),
        }
    }
}

impl Session for FixedPath {
    fn session_id(&self) -> SessionId {
        self.id
    }

    fn capacity(&self) -> usize {
        self.window
    }

    fn rtt(&self) -> Duration {
        self.rtt
    }

    fn request_data(&mut self, _session: SessionId, pieces: &[PieceId]) -> Result<(), SendError> {
        if !self.accept {
            return Err(SendError::Closed);
        }
        self.requested.extend_from_slice(pieces);
        Ok(())
    }
}

/// Upstream that records the counts it was asked for.
#[derive(Debug, Default)]
pub struct CountingUpstream {
    pub asks: Mutex<Vec<usize>>,
}

impl CountingUpstream {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn asks(&self) -> Vec<usize> {
        self.asks.lock().unwrap().clone()
    }
}

impl SchedulerHandler for CountingUpstream {
    fn on_request_more_pieces(&self, count: usize) {
        self.asks.lock().unwrap().push(count);
    }
}
