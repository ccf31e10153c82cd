//! Listing data model, parsing and differencing.

mod builder;
mod diff;
mod types;

pub use builder::build_snapshot;
pub use types::{ChangeSet, ListingEntry, Sex, Snapshot};
