pub mod config;
pub mod logging;

pub mod handler;
pub mod ledger;
pub mod scheduler;
pub mod session;
pub mod sim;
pub mod types;

pub use handler::{HandlerRef, SchedulerHandler};
pub use scheduler::{MultipathScheduler, ScheduleError};
pub use session::{SendError, Session, SessionMap, SessionTable};
pub use types::{PieceId, SeqNumber, SessionId};
