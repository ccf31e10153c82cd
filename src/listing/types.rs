use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sex category of a listed dog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
  #[serde(rename = "F")]
  Female,
  #[serde(rename = "M")]
  Male,
}

impl Sex {
  /// One-letter code shown in reports
  pub fn code(self) -> &'static str {
    match self {
      Sex::Female => "F",
      Sex::Male => "M",
    }
  }
}

impl fmt::Display for Sex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

/// One dog in the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
  pub identifier: String,
  pub breed: String,
  pub age: String,
  pub sex: Sex,
}

impl ListingEntry {
  /// Attributes in display order, keyed by field name.
  pub fn attributes(&self) -> [(&'static str, &str); 3] {
    [
      ("breed", self.breed.as_str()),
      ("age", self.age.as_str()),
      ("sex", self.sex.code()),
    ]
  }
}

/// A full observation of the listing at one instant.
///
/// Entries are keyed by identifier and iterate in identifier order. An empty
/// snapshot is ambiguous (nothing listed, or a degraded page); callers decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
  entries: BTreeMap<String, ListingEntry>,
  observed_at: DateTime<Utc>,
}

impl Snapshot {
  pub fn new(entries: BTreeMap<String, ListingEntry>, observed_at: DateTime<Utc>) -> Self {
    Self {
      entries,
      observed_at,
    }
  }

  pub fn entries(&self) -> &BTreeMap<String, ListingEntry> {
    &self.entries
  }

  pub fn contains(&self, identifier: &str) -> bool {
    self.entries.contains_key(identifier)
  }

  pub fn iter(&self) -> impl Iterator<Item = &ListingEntry> {
    self.entries.values()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn observed_at(&self) -> DateTime<Utc> {
    self.observed_at
  }
}

/// Entries added and removed between two snapshots.
///
/// Both lists are sorted by identifier and never share one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
  pub added: Vec<ListingEntry>,
  pub removed: Vec<ListingEntry>,
}

impl ChangeSet {
  pub fn is_empty(&self) -> bool {
    self.added.is_empty() && self.removed.is_empty()
  }
}
