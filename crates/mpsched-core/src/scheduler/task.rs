//! Serializing task: one tokio task owns the scheduler and its session table,
//! and every caller talks to it through a channel.
//!
//! Use this when sessions run on separate execution contexts; the task
//! processes one command at a time, so each callback still has exclusive
//! access to the ledgers.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::ledger::LedgerSnapshot;
use crate::session::{Session, SessionMap};
use crate::types::{PieceId, SeqNumber, SessionId};

use super::{GlobalPassSummary, MultipathScheduler, ScheduleError, SchedulerStats, SinglePathOutcome};

const COMMAND_QUEUE: usize = 256;

/// The scheduler task has exited (shut down or panicked).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("scheduler task closed")]
    Closed,
}

enum Command<S> {
    SessionCreated(S),
    SessionDestroyed(SessionId),
    Reset,
    GlobalPass(oneshot::Sender<GlobalPassSummary>),
    SinglePathPass(SessionId, oneshot::Sender<Result<SinglePathOutcome, ScheduleError>>),
    PiecesTimedOut(SessionId, Vec<PieceId>),
    DataReceived {
        session: SessionId,
        seq: SeqNumber,
        piece: PieceId,
        recv_time: Duration,
    },
    SupplyPieces(Vec<PieceId>, oneshot::Sender<usize>),
    Snapshot(oneshot::Sender<(LedgerSnapshot, SchedulerStats)>),
    Shutdown,
}

/// Cloneable front end of a running scheduler task.
pub struct SchedulerHandle<S> {
    tx: mpsc::Sender<Command<S>>,
}

impl<S> Clone for SchedulerHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Move `scheduler` and `sessions` into a new task on the current tokio runtime.
///
/// The task ends when every handle is dropped or `shutdown` is called, and
/// hands the scheduler and table back through the join handle.
pub fn spawn_scheduler<S>(
    scheduler: MultipathScheduler,
    sessions: SessionMap<S>,
) -> (
    SchedulerHandle<S>,
    tokio::task::JoinHandle<(MultipathScheduler, SessionMap<S>)>,
)
where
    S: Session + Send + 'static,
{
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    let join = tokio::spawn(run_scheduler_task(scheduler, sessions, rx));
    (SchedulerHandle { tx }, join)
}

async fn run_scheduler_task<S: Session>(
    mut scheduler: MultipathScheduler,
    mut sessions: SessionMap<S>,
    mut rx: mpsc::Receiver<Command<S>>,
) -> (MultipathScheduler, SessionMap<S>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::SessionCreated(session) => {
                let id = session.session_id();
                sessions.insert(session);
                scheduler.on_session_created(id);
            }
            Command::SessionDestroyed(id) => {
                scheduler.on_session_destroyed(id);
                sessions.remove(id);
            }
            Command::Reset => scheduler.reset(),
            Command::GlobalPass(reply) => {
                let _ = reply.send(scheduler.run_global_pass(&mut sessions));
            }
            Command::SinglePathPass(id, reply) => {
                let _ = reply.send(scheduler.run_single_path_pass(&mut sessions, id));
            }
            Command::PiecesTimedOut(id, pieces) => scheduler.on_pieces_timed_out(id, &pieces),
            Command::DataReceived {
                session,
                seq,
                piece,
                recv_time,
            } => {
                let _ = scheduler.on_data_received(&mut sessions, session, seq, piece, recv_time);
            }
            Command::SupplyPieces(pieces, reply) => {
                let _ = reply.send(scheduler.add_pieces(pieces));
            }
            Command::Snapshot(reply) => {
                let _ = reply.send((scheduler.snapshot(), scheduler.stats().clone()));
            }
            Command::Shutdown => break,
        }
    }
    tracing::debug!("scheduler task exiting");
    scheduler.stop();
    (scheduler, sessions)
}

impl<S: Send + 'static> SchedulerHandle<S> {
    async fn send(&self, cmd: Command<S>) -> Result<(), TaskError> {
        self.tx.send(cmd).await.map_err(|_| TaskError::Closed)
    }

    async fn call<R>(
        &self,
        make: impl FnOnce(oneshot::Sender<R>) -> Command<S>,
    ) -> Result<R, TaskError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make(reply_tx)).await?;
        reply_rx.await.map_err(|_| TaskError::Closed)
    }

    /// Insert the session into the task's table and start tracking it.
    pub async fn session_created(&self, session: S) -> Result<(), TaskError> {
        self.send(Command::SessionCreated(session)).await
    }

    /// Stop tracking the session and drop it from the table.
    pub async fn session_destroyed(&self, id: SessionId) -> Result<(), TaskError> {
        self.send(Command::SessionDestroyed(id)).await
    }

    pub async fn reset(&self) -> Result<(), TaskError> {
        self.send(Command::Reset).await
    }

    pub async fn global_pass(&self) -> Result<GlobalPassSummary, TaskError> {
        self.call(Command::GlobalPass).await
    }

    pub async fn single_path_pass(
        &self,
        id: SessionId,
    ) -> Result<Result<SinglePathOutcome, ScheduleError>, TaskError> {
        self.call(|reply| Command::SinglePathPass(id, reply)).await
    }

    pub async fn pieces_timed_out(&self, id: SessionId, pieces: Vec<PieceId>) -> Result<(), TaskError> {
        self.send(Command::PiecesTimedOut(id, pieces)).await
    }

    pub async fn data_received(
        &self,
        session: SessionId,
        seq: SeqNumber,
        piece: PieceId,
        recv_time: Duration,
    ) -> Result<(), TaskError> {
        self.send(Command::DataReceived {
            session,
            seq,
            piece,
            recv_time,
        })
        .await
    }

    /// Upstream supply; resolves to the number of pieces actually added.
    pub async fn supply_pieces(&self, pieces: Vec<PieceId>) -> Result<usize, TaskError> {
        self.call(|reply| Command::SupplyPieces(pieces, reply)).await
    }

    pub async fn snapshot(&self) -> Result<(LedgerSnapshot, SchedulerStats), TaskError> {
        self.call(Command::Snapshot).await
    }

    /// Ask the task to stop after the commands already queued.
    pub async fn shutdown(&self) -> Result<(), TaskError> {
        self.send(Command::Shutdown).await
    }
}
