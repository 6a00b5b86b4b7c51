//! Snapshot data structures

use crate::change::{changes_between, Change};
use crate::revision::ContentRevision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a committed snapshot
///
/// Issued in commit order and never reused by an engine, so it stays a valid
/// handle after newer snapshots are pushed or popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotId(u64);

impl SnapshotId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id following this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// The full tracked state recorded by one commit
///
/// Revisions keep the order in which their entries were first added.
/// A snapshot is never mutated after it is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    id: SnapshotId,
    timestamp: DateTime<Utc>,
    revisions: Vec<ContentRevision>,
}

impl Snapshot {
    pub(crate) fn new(id: SnapshotId, revisions: Vec<ContentRevision>) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            revisions,
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    /// When the snapshot was committed
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// All revisions in insertion order
    pub fn revisions(&self) -> &[ContentRevision] {
        &self.revisions
    }

    /// Revision recorded for `path`, if the path was live at commit time
    pub fn file_revision(&self, path: &str) -> Option<&ContentRevision> {
        self.revisions.iter().find(|r| r.path() == path)
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// Whether both snapshots record exactly the same revisions
    ///
    /// Ignores snapshot id and timestamp.
    pub fn same_content(&self, other: &Snapshot) -> bool {
        self.revisions == other.revisions
    }

    /// Per-path changes from `older` (or from nothing) to this snapshot
    pub fn changes_since(&self, older: Option<&Snapshot>) -> Vec<Change> {
        let base = older.map(|s| s.revisions()).unwrap_or_default();
        changes_between(base, &self.revisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeKind;
    use crate::object::ObjectId;

    fn rev(id: u64, path: &str, content: &'static str) -> ContentRevision {
        ContentRevision::new(ObjectId::new(id), path, content)
    }

    #[test]
    fn test_file_revision_lookup() {
        let snapshot = Snapshot::new(
            SnapshotId::new(1),
            vec![rev(1, "file1", "a"), rev(2, "file2", "b")],
        );

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.file_revision("file2"), Some(&rev(2, "file2", "b")));
        assert!(snapshot.file_revision("missing").is_none());
    }

    #[test]
    fn test_same_content_ignores_id_and_time() {
        let a = Snapshot::new(SnapshotId::new(1), vec![rev(1, "f", "x")]);
        let b = Snapshot::new(SnapshotId::new(2), vec![rev(1, "f", "x")]);
        let c = Snapshot::new(SnapshotId::new(3), vec![rev(1, "f", "y")]);

        assert!(a.same_content(&b));
        assert!(!a.same_content(&c));
    }

    #[test]
    fn test_changes_since_first_snapshot() {
        let snapshot = Snapshot::new(SnapshotId::new(1), vec![rev(1, "f", "x")]);
        let changes = snapshot.changes_since(None);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Added);
    }

    #[test]
    fn test_snapshot_id_display() {
        assert_eq!(SnapshotId::new(3).to_string(), "s3");
        assert_eq!(SnapshotId::new(3).next(), SnapshotId::new(4));
    }
}
