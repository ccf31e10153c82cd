//! The polling monitor: state machine plus the loop that drives it.

mod runner;
mod state;

pub use runner::Monitor;
pub use state::{DegradedReason, ShutdownOutcome};
