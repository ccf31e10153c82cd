//! Poll loop state machine.
//!
//! [`MonitorContext`] carries everything that survives between ticks. Each
//! fetch result moves it forward through [`MonitorContext::advance`], which
//! performs no I/O and returns what should be reported.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::cache::CacheRecord;
use crate::error::{CacheError, FetchError, MonitorError, ParseError};
use crate::listing::{build_snapshot, ChangeSet, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  /// Cache not consulted yet
  Init,
  /// Waiting for the first usable listing of this run
  Baseline,
  /// Comparing every tick against the previous listing
  Steady,
  /// Terminal; no further fetches
  ShuttingDown,
}

/// Result of one fetch, already run through the snapshot builder.
#[derive(Debug)]
pub enum FetchOutcome {
  Listing(Snapshot),
  FetchFailed(FetchError),
  Malformed(ParseError),
}

impl FetchOutcome {
  pub fn from_fetch(result: Result<Vec<String>, FetchError>, observed_at: DateTime<Utc>) -> Self {
    match result {
      Err(e) => FetchOutcome::FetchFailed(e),
      Ok(blocks) => match build_snapshot(blocks, observed_at) {
        Ok(snapshot) => FetchOutcome::Listing(snapshot),
        Err(e) => FetchOutcome::Malformed(e),
      },
    }
  }
}

/// Why a tick was skipped without diffing.
#[derive(Debug)]
pub enum DegradedReason {
  /// The page listed no dogs at all, most likely an upstream glitch
  EmptyListing,
  FetchFailed(FetchError),
  Malformed(ParseError),
}

impl fmt::Display for DegradedReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DegradedReason::EmptyListing => f.write_str("page listed no dogs"),
      DegradedReason::FetchFailed(e) => write!(f, "fetch failed: {}", e),
      DegradedReason::Malformed(e) => write!(f, "unparseable listing: {}", e),
    }
  }
}

/// What a tick produced.
#[derive(Debug)]
pub enum Transition {
  /// First listing of a run without history; it is now the baseline
  Established,
  /// First listing after restoring the cache, compared against it
  Resumed(Option<ChangeSet>),
  Changed(ChangeSet),
  Unchanged,
  Degraded(DegradedReason),
}

/// How the final cache flush went.
#[derive(Debug)]
pub enum ShutdownOutcome {
  Saved { entries: usize },
  NothingToSave,
  SaveFailed(CacheError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorContext {
  phase: Phase,
  old_snapshot: Option<Snapshot>,
}

impl Default for MonitorContext {
  fn default() -> Self {
    Self::new()
  }
}

impl MonitorContext {
  pub fn new() -> Self {
    Self {
      phase: Phase::Init,
      old_snapshot: None,
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  /// Last listing that was accepted as current.
  pub fn old_snapshot(&self) -> Option<&Snapshot> {
    self.old_snapshot.as_ref()
  }

  /// Leave `Init`, seeding the baseline from the cache if there is one.
  pub fn start(self, cached: Option<CacheRecord>) -> Self {
    Self {
      phase: Phase::Baseline,
      old_snapshot: cached.map(|record| record.snapshot),
    }
  }

  pub fn shut_down(self) -> Self {
    Self {
      phase: Phase::ShuttingDown,
      ..self
    }
  }

  /// Apply one fetch result.
  ///
  /// Degraded outcomes never touch `old_snapshot`. A malformed listing is
  /// fatal only while there is no baseline at all, neither fetched nor cached.
  pub fn advance(self, outcome: FetchOutcome) -> Result<(Self, Transition), MonitorError> {
    let phase = match self.phase {
      Phase::Init => Phase::Baseline,
      Phase::ShuttingDown => return Ok((self, Transition::Unchanged)),
      phase => phase,
    };

    let snapshot = match outcome {
      FetchOutcome::Malformed(e) if phase == Phase::Baseline && self.old_snapshot.is_none() => {
        return Err(MonitorError::FirstParse(e))
      }
      FetchOutcome::Malformed(e) => return Ok(self.degraded(phase, DegradedReason::Malformed(e))),
      FetchOutcome::FetchFailed(e) => {
        return Ok(self.degraded(phase, DegradedReason::FetchFailed(e)))
      }
      FetchOutcome::Listing(snapshot) if snapshot.is_empty() => {
        return Ok(self.degraded(phase, DegradedReason::EmptyListing))
      }
      FetchOutcome::Listing(snapshot) => snapshot,
    };

    let changes = self
      .old_snapshot
      .as_ref()
      .and_then(|old| snapshot.changes_since(old));
    let transition = match (phase, self.old_snapshot.is_some(), changes) {
      (Phase::Baseline, false, _) => Transition::Established,
      (Phase::Baseline, true, changes) => Transition::Resumed(changes),
      (_, _, Some(changes)) => Transition::Changed(changes),
      (_, _, None) => Transition::Unchanged,
    };

    let next = Self {
      phase: Phase::Steady,
      old_snapshot: Some(snapshot),
    };
    Ok((next, transition))
  }

  fn degraded(self, phase: Phase, reason: DegradedReason) -> (Self, Transition) {
    (Self { phase, ..self }, Transition::Degraded(reason))
  }
}
