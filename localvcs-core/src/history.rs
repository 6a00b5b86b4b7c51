//! Append-only snapshot log
//!
//! Snapshots are kept newest-first. The only ways a snapshot leaves the log
//! are `pop_latest` (undo of the last commit) and `truncate_oldest`
//! (retention); historical snapshots are never edited in place.

use crate::snapshot::{Snapshot, SnapshotId};
use std::collections::VecDeque;
use std::sync::Arc;

/// Newest-first sequence of committed snapshots
#[derive(Debug, Default)]
pub struct SnapshotLog {
    snapshots: VecDeque<Arc<Snapshot>>,
    /// Set once retention has dropped anything; the oldest retained
    /// snapshot then has history behind it that no longer exists.
    truncated: bool,
}

impl SnapshotLog {
    pub fn new() -> Self {
        Self {
            snapshots: VecDeque::new(),
            truncated: false,
        }
    }

    /// Log rebuilt from storage, remembering whether retention cut it
    pub fn with_truncation(truncated: bool) -> Self {
        Self {
            snapshots: VecDeque::new(),
            truncated,
        }
    }

    /// Record a new snapshot as the latest one
    pub fn push(&mut self, snapshot: Arc<Snapshot>) {
        self.snapshots.push_front(snapshot);
    }

    /// Remove and return the latest snapshot, or `None` on an empty log
    pub fn pop_latest(&mut self) -> Option<Arc<Snapshot>> {
        self.snapshots.pop_front()
    }

    pub fn latest(&self) -> Option<&Arc<Snapshot>> {
        self.snapshots.front()
    }

    /// All snapshots, newest first
    pub fn all(&self) -> impl Iterator<Item = &Arc<Snapshot>> {
        self.snapshots.iter()
    }

    /// Snapshot at `index` counting from the newest (0)
    pub fn get(&self, index: usize) -> Option<&Arc<Snapshot>> {
        self.snapshots.get(index)
    }

    pub fn find(&self, id: SnapshotId) -> Option<&Arc<Snapshot>> {
        self.snapshots.iter().find(|s| s.id() == id)
    }

    /// Drop the oldest snapshots so that at most `keep` remain
    ///
    /// Returns the dropped snapshots, oldest first.
    pub fn truncate_oldest(&mut self, keep: usize) -> Vec<Arc<Snapshot>> {
        let mut dropped = Vec::new();
        while self.snapshots.len() > keep {
            if let Some(snapshot) = self.snapshots.pop_back() {
                dropped.push(snapshot);
            }
        }
        if !dropped.is_empty() {
            self.truncated = true;
        }
        dropped
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// No commit can be undone without losing state
    ///
    /// True on an empty log, and on a truncated log down to its last
    /// snapshot: popping that would restore an empty tree in place of the
    /// state retention dropped.
    pub fn is_exhausted(&self) -> bool {
        match self.snapshots.len() {
            0 => true,
            1 => self.truncated,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: u64) -> Arc<Snapshot> {
        Arc::new(Snapshot::new(SnapshotId::new(id), Vec::new()))
    }

    #[test]
    fn test_push_is_newest_first() {
        let mut log = SnapshotLog::new();
        log.push(snapshot(1));
        log.push(snapshot(2));

        let ids: Vec<_> = log.all().map(|s| s.id().value()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(log.latest().map(|s| s.id()), Some(SnapshotId::new(2)));
    }

    #[test]
    fn test_pop_latest_on_empty_log() {
        let mut log = SnapshotLog::new();
        assert!(log.pop_latest().is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn test_pop_latest_returns_same_object() {
        let mut log = SnapshotLog::new();
        let first = snapshot(1);
        log.push(first.clone());
        log.push(snapshot(2));

        log.pop_latest();
        let latest = log.latest().cloned().unwrap();
        assert!(Arc::ptr_eq(&latest, &first));
    }

    #[test]
    fn test_truncate_oldest() {
        let mut log = SnapshotLog::new();
        for id in 1..=5 {
            log.push(snapshot(id));
        }

        let dropped = log.truncate_oldest(3);
        let dropped_ids: Vec<_> = dropped.iter().map(|s| s.id().value()).collect();
        assert_eq!(dropped_ids, vec![1, 2]);
        assert_eq!(log.len(), 3);
        assert!(log.find(SnapshotId::new(2)).is_none());
        assert!(log.find(SnapshotId::new(3)).is_some());
        assert_eq!(log.get(0).map(|s| s.id().value()), Some(5));
        assert!(log.is_truncated());
    }

    #[test]
    fn test_exhausted_only_at_truncated_floor() {
        let mut log = SnapshotLog::new();
        assert!(log.is_exhausted());

        log.push(snapshot(1));
        assert!(!log.is_exhausted());

        log.push(snapshot(2));
        assert!(log.truncate_oldest(5).is_empty());
        assert!(!log.is_truncated());

        log.push(snapshot(3));
        log.truncate_oldest(2);
        assert!(!log.is_exhausted());

        log.pop_latest();
        assert_eq!(log.len(), 1);
        assert!(log.is_exhausted());
    }
}
