//! SQLite implementation of the snapshot cache.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::CacheError;
use crate::listing::{ListingEntry, Snapshot};

use super::traits::{CacheRecord, CacheStore};

/// Serialized `Snapshot.entries`
const DATA_KEY: &str = "data";
/// When the snapshot was saved
const TIME_KEY: &str = "time";
/// When the snapshot was fetched
const OBSERVED_KEY: &str = "observed_at";

/// Schema for the cache table.
const CACHE_SCHEMA: &str = r#"
-- One row per (target, key); a record is the set of rows of one namespace
CREATE TABLE IF NOT EXISTS snapshot_cache (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (namespace, key)
);
"#;

/// SQLite-based snapshot store.
///
/// The connection is released by [`CacheStore::close`] or, on any other exit
/// path, when the store is dropped.
pub struct SqliteStore {
  conn: Connection,
  namespace: String,
  path: PathBuf,
}

impl SqliteStore {
  /// Open (or create) the cache database at `path`.
  pub fn open(path: &Path, namespace: impl Into<String>) -> Result<Self, CacheError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent).map_err(|source| CacheError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    let conn = Connection::open(path).map_err(|source| CacheError::Open {
      path: path.to_path_buf(),
      source,
    })?;

    let store = Self {
      conn,
      namespace: namespace.into(),
      path: path.to_path_buf(),
    };
    store.run_migrations()?;
    debug!(path = %store.path.display(), namespace = %store.namespace, "opened snapshot cache");

    Ok(store)
  }

  /// Get the default database path.
  pub fn default_path() -> Option<PathBuf> {
    let data_dir = dirs::data_dir().or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))?;
    Some(data_dir.join("doggo-watch").join("cache.db"))
  }

  /// Run database migrations for the cache table.
  fn run_migrations(&self) -> Result<(), CacheError> {
    self
      .conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|source| CacheError::Open {
        path: self.path.clone(),
        source,
      })
  }

  fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
    let value = self
      .conn
      .query_row(
        "SELECT value FROM snapshot_cache WHERE namespace = ? AND key = ?",
        params![self.namespace, key],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value)
  }
}

impl CacheStore for SqliteStore {
  fn load(&self) -> Result<Option<CacheRecord>, CacheError> {
    let Some(data) = self.get(DATA_KEY)? else {
      return Ok(None);
    };

    let entries: BTreeMap<String, ListingEntry> = serde_json::from_str(&data)
      .map_err(|e| CacheError::Corrupt(format!("cannot decode {}: {}", DATA_KEY, e)))?;
    if let Some((key, entry)) = entries.iter().find(|(k, e)| **k != e.identifier) {
      return Err(CacheError::Corrupt(format!(
        "entry {:?} stored under key {:?}",
        entry.identifier, key
      )));
    }

    let saved_at = match self.get(TIME_KEY)? {
      Some(raw) => parse_datetime(&raw)?,
      None => return Err(CacheError::Corrupt(format!("{} is missing", TIME_KEY))),
    };
    let observed_at = match self.get(OBSERVED_KEY)? {
      Some(raw) => parse_datetime(&raw)?,
      None => saved_at,
    };

    Ok(Some(CacheRecord {
      snapshot: Snapshot::new(entries, observed_at),
      saved_at,
    }))
  }

  fn save(&mut self, snapshot: &Snapshot, saved_at: DateTime<Utc>) -> Result<(), CacheError> {
    if snapshot.is_empty() {
      return Err(CacheError::EmptySnapshot);
    }

    let data = serde_json::to_string(snapshot.entries())?;
    let rows = [
      (DATA_KEY, data),
      (OBSERVED_KEY, snapshot.observed_at().to_rfc3339()),
      (TIME_KEY, saved_at.to_rfc3339()),
    ];

    let tx = self.conn.transaction()?;
    for (key, value) in &rows {
      tx.execute(
        "INSERT OR REPLACE INTO snapshot_cache (namespace, key, value) VALUES (?, ?, ?)",
        params![self.namespace, key, value],
      )?;
    }
    tx.commit()?;

    debug!(entries = snapshot.len(), "saved snapshot to cache");
    Ok(())
  }

  fn close(self) -> Result<(), CacheError> {
    self.conn.close().map_err(|(_, e)| CacheError::Sqlite(e))
  }
}

/// Parse an RFC 3339 timestamp as stored by [`SqliteStore::save`].
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, CacheError> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| CacheError::Corrupt(format!("failed to parse datetime '{}': {}", s, e)))
}
