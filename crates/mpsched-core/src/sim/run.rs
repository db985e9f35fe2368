//! Virtual-time driver standing in for the transport runtime.

use anyhow::{bail, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{SchedulerConfig, SimSessionConfig, SimulationConfig};
use crate::handler::HandlerRef;
use crate::scheduler::MultipathScheduler;
use crate::session::{SessionMap, SessionTable};
use crate::types::{PieceId, SessionId};

use super::report::{SessionReport, SimReport};
use super::session::{Arrival, SimSession};
use super::supplier::SimSupplier;

/// Hands out fresh piece ids in answer to the scheduler's requests.
struct Upstream {
    supplier: Arc<SimSupplier>,
    next: u32,
    total: u32,
    batch: Option<usize>,
}

impl Upstream {
    /// Supply whatever was requested since the last answer. Returns the number of new ids.
    fn answer(&mut self, scheduler: &mut MultipathScheduler) -> usize {
        let wanted = self.supplier.take_pending();
        if wanted == 0 {
            return 0;
        }
        let remaining = (self.total - self.next) as usize;
        let n = wanted.min(self.batch.unwrap_or(usize::MAX)).min(remaining) as u32;
        if n == 0 {
            return 0;
        }
        scheduler.add_pieces((self.next..self.next + n).map(PieceId));
        self.next += n;
        n as usize
    }
}

fn validate(sim: &SimulationConfig) -> Result<()> {
    if sim.sessions.is_empty() {
        bail!("simulation needs at least one session");
    }
    if sim.piece_count == 0 {
        bail!("piece_count must be > 0");
    }
    if sim.global_pass_interval_ms == 0 {
        bail!("global_pass_interval_ms must be > 0");
    }
    let mut seen = BTreeSet::new();
    for s in &sim.sessions {
        if !seen.insert(s.id) {
            bail!("duplicate simulated session id {}", s.id);
        }
        if let (Some(up), Some(down)) = (s.connect_at_ms, s.disconnect_at_ms) {
            if down <= up {
                bail!("session {} disconnects before it connects", s.id);
            }
        }
    }
    Ok(())
}

fn session_report(cfg: &SimSessionConfig, s: &SimSession) -> SessionReport {
    SessionReport {
        id: cfg.id,
        rtt_ms: cfg.rtt_ms,
        window: cfg.window,
        delivered: s.delivered,
        lost: s.lost,
        failed_sends: s.failed_sends,
    }
}

/// Run the simulation described by `sim` with the given scheduler settings.
pub fn run_simulation(scheduler_cfg: &SchedulerConfig, sim: &SimulationConfig) -> Result<SimReport> {
    validate(sim)?;

    let supplier = Arc::new(SimSupplier::default());
    let mut scheduler = MultipathScheduler::new(*scheduler_cfg);
    scheduler.start(HandlerRef::new(&supplier));
    let mut upstream = Upstream {
        supplier: Arc::clone(&supplier),
        next: 0,
        total: sim.piece_count,
        batch: sim.supply_batch.filter(|b| *b > 0),
    };

    let mut table: SessionMap<SimSession> = SessionMap::new();
    let mut finished: BTreeMap<u64, SessionReport> = BTreeMap::new();
    let mut delivered: u64 = 0;
    let mut elapsed_ms = 0;
    let mut completed = false;

    tracing::info!(
        sessions = sim.sessions.len(),
        pieces = sim.piece_count,
        proportional_skip = scheduler_cfg.proportional_skip,
        "simulation started"
    );

    for now_ms in 0..=sim.max_duration_ms {
        elapsed_ms = now_ms;
        let now = Duration::from_millis(now_ms);

        for cfg in &sim.sessions {
            let id = SessionId(cfg.id);
            if cfg.connect_at_ms.unwrap_or(0) == now_ms {
                tracing::debug!(session = %id, now_ms, "path connected");
                table.insert(SimSession::new(cfg));
                scheduler.on_session_created(id);
            }
            if cfg.disconnect_at_ms == Some(now_ms) {
                if let Some(mut s) = table.remove(id) {
                    tracing::debug!(session = %id, now_ms, "path disconnected");
                    let stranded = s.abandon();
                    scheduler.on_pieces_timed_out(id, &stranded);
                    scheduler.on_session_destroyed(id);
                    finished.insert(cfg.id, session_report(cfg, &s));
                }
            }
        }

        for s in table.iter_mut() {
            s.set_now(now);
        }

        for id in table.session_ids() {
            let arrivals = match table.get_mut(id) {
                Some(s) => s.drain_due(now),
                None => continue,
            };
            for arrival in arrivals {
                match arrival {
                    Arrival::Delivered { seq, piece } => {
                        delivered += 1;
                        if let Err(e) = scheduler.on_data_received(&mut table, id, seq, piece, now) {
                            tracing::debug!(error = %e, "receipt scheduling skipped");
                            continue;
                        }
                        // Upstream answers at once; the path gets a second look at the new supply.
                        if upstream.answer(&mut scheduler) > 0 {
                            let _ = scheduler.run_single_path_pass(&mut table, id);
                            upstream.answer(&mut scheduler);
                        }
                    }
                    Arrival::TimedOut(piece) => scheduler.on_pieces_timed_out(id, &[piece]),
                }
            }
        }

        if delivered >= u64::from(sim.piece_count) {
            completed = true;
            break;
        }

        if now_ms % sim.global_pass_interval_ms == 0 {
            scheduler.run_global_pass(&mut table);
            if upstream.answer(&mut scheduler) > 0 {
                scheduler.run_global_pass(&mut table);
                upstream.answer(&mut scheduler);
            }
        }
    }

    for cfg in &sim.sessions {
        if let Some(s) = table.get(SessionId(cfg.id)) {
            finished.insert(cfg.id, session_report(cfg, s));
        }
    }
    scheduler.stop();

    tracing::info!(elapsed_ms, delivered, completed, "simulation finished");

    Ok(SimReport {
        elapsed_ms,
        completed,
        piece_count: sim.piece_count,
        supplied: upstream.next,
        delivered,
        sessions: finished.into_values().collect(),
        stats: scheduler.stats().clone(),
    })
}
