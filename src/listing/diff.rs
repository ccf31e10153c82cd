use super::types::{ChangeSet, Snapshot};

impl ChangeSet {
  /// Entries added to and removed from `old` to obtain `new`.
  ///
  /// Membership is decided by identifier only; an entry whose attributes
  /// changed under the same name is neither added nor removed.
  pub fn between(old: &Snapshot, new: &Snapshot) -> Self {
    let added = new
      .iter()
      .filter(|entry| !old.contains(&entry.identifier))
      .cloned()
      .collect();
    let removed = old
      .iter()
      .filter(|entry| !new.contains(&entry.identifier))
      .cloned()
      .collect();

    Self { added, removed }
  }
}

impl Snapshot {
  /// Changes since an earlier snapshot, or `None` if the listing is the same.
  pub fn changes_since(&self, old: &Snapshot) -> Option<ChangeSet> {
    let changes = ChangeSet::between(old, self);
    (!changes.is_empty()).then_some(changes)
  }
}
