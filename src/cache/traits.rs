//! Core traits and types for the snapshot cache.

use chrono::{DateTime, Utc};

use crate::error::CacheError;
use crate::listing::Snapshot;

/// The last known-good snapshot and when it was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
  pub snapshot: Snapshot,
  pub saved_at: DateTime<Utc>,
}

/// Trait for snapshot cache backends.
///
/// A store holds at most one record, replaced as a whole on every save.
pub trait CacheStore {
  /// Read the saved record. `None` means no prior history.
  fn load(&self) -> Result<Option<CacheRecord>, CacheError>;

  /// Replace the saved record. Empty snapshots are rejected.
  fn save(&mut self, snapshot: &Snapshot, saved_at: DateTime<Utc>) -> Result<(), CacheError>;

  /// Release the underlying storage handle.
  fn close(self) -> Result<(), CacheError>
  where
    Self: Sized;
}
