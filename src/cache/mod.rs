//! Persisted cache of the last known-good snapshot.
//!
//! The cache is read once at startup and written once at graceful shutdown,
//! so a crash loses at most the progress of the current run.

mod namespace;
mod storage;
mod traits;

pub use namespace::cache_namespace;
pub use storage::SqliteStore;
pub use traits::{CacheRecord, CacheStore};
