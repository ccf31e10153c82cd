//! Rendering of monitor events for the user.

mod console;

use chrono::{DateTime, Utc};

use crate::listing::{ChangeSet, Snapshot};
use crate::monitor::{DegradedReason, ShutdownOutcome};

pub use console::ConsoleReporter;

/// Where the starting listing came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineOrigin {
  /// Restored from the previous run's cache
  Cached { saved_at: DateTime<Utc> },
  /// First fetch of a run without history
  Fresh,
}

/// Receiver of everything the monitor has to tell the user.
pub trait Reporter {
  fn report_baseline(&mut self, snapshot: &Snapshot, origin: BaselineOrigin);

  /// Called only for non-empty change sets. `current` is the listing after the change.
  fn report_changes(&mut self, changes: &ChangeSet, current: &Snapshot);

  fn report_degraded(&mut self, reason: &DegradedReason);

  fn report_shutdown(&mut self, outcome: &ShutdownOutcome);
}
