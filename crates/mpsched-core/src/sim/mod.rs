//! Simulation mode: drive the scheduler against virtual paths with fixed
//! RTTs and windows, and report how pieces were spread across them.
//!
//! Runs on a 1 ms virtual clock, deterministic for a given config. Useful to
//! compare proportional skip on/off or to watch recovery from losses and
//! disconnects without a real transport.

mod report;
mod run;
mod session;
mod supplier;

pub use report::{SessionReport, SimReport};
pub use run::run_simulation;
pub use session::{Arrival, SimSession};
pub use supplier::SimSupplier;
