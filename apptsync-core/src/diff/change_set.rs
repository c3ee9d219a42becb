use super::{ChangeKind, Keyed};

/// Added and deleted events on one side since the previous snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet<T> {
    pub added: Vec<T>,
    pub deleted: Vec<T>,
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        ChangeSet {
            added: Vec::new(),
            deleted: Vec::new(),
        }
    }
}

impl<T: Keyed> ChangeSet<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty()
    }

    /// Drop the deletions, keeping only additions.
    pub fn additions_only(mut self) -> Self {
        self.deleted.clear();
        self
    }

    /// Titles tagged with the kind of change, additions first.
    pub fn entries(&self) -> impl Iterator<Item = (ChangeKind, &str)> {
        let added = self.added.iter().map(|e| (ChangeKind::Added, e.key()));
        let deleted = self.deleted.iter().map(|e| (ChangeKind::Deleted, e.key()));
        added.chain(deleted)
    }
}
