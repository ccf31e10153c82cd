//! Error types for every stage of the monitor.
//!
//! Each stage has its own enum so callers can decide policy per variant:
//! parse and fetch failures are usually transient, cache open failures are not.

use std::path::PathBuf;

/// A raw listing block could not be turned into a [`ListingEntry`](crate::listing::ListingEntry).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
  /// A required line (name, breed or age/sex) is missing from the block.
  #[error("entry {identifier:?} is missing its {field} line")]
  MissingField {
    identifier: String,
    field: &'static str,
  },

  /// The composite "age - sex" line does not split into 2 or 3 parts.
  #[error("cannot split age and sex for {identifier:?} from {raw:?}")]
  MalformedAgeSex { identifier: String, raw: String },

  /// The sex token is neither "Female" nor "Male".
  #[error("cannot parse sex of {identifier:?} from {raw:?}")]
  UnknownSex { identifier: String, raw: String },

  /// Two blocks in one listing carry the same name.
  #[error("entry {identifier:?} appears more than once in the listing")]
  DuplicateIdentifier { identifier: String },
}

impl ParseError {
  /// Identifier of the entry that failed to parse.
  pub fn identifier(&self) -> &str {
    match self {
      Self::MissingField { identifier, .. }
      | Self::MalformedAgeSex { identifier, .. }
      | Self::UnknownSex { identifier, .. }
      | Self::DuplicateIdentifier { identifier } => identifier,
    }
  }
}

/// The listing page could not be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
  #[error("request failed: {0}")]
  Network(#[from] reqwest::Error),

  /// The page loaded but does not contain the listing container.
  #[error("listing container {container:?} not found in page")]
  ListingNotFound { container: String },
}

/// Failures of the persisted snapshot cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
  #[error("failed to create cache directory {}: {source}", .path.display())]
  CreateDir {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("failed to open cache database at {}: {source}", .path.display())]
  Open {
    path: PathBuf,
    source: rusqlite::Error,
  },

  #[error("cache database error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("failed to serialize snapshot: {0}")]
  Serialize(#[from] serde_json::Error),

  /// A record exists but cannot be read back.
  #[error("cached record is unreadable: {0}")]
  Corrupt(String),

  /// Refused to overwrite the cache with an empty listing.
  #[error("refusing to cache an empty snapshot")]
  EmptySnapshot,
}

/// Fatal errors of the poll loop.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
  /// The very first listing could not be parsed, so no baseline exists.
  #[error("first listing could not be parsed: {0}")]
  FirstParse(#[source] ParseError),

  #[error(transparent)]
  Cache(#[from] CacheError),
}
