//! Named references into snapshot history

use crate::snapshot::Snapshot;
use std::collections::HashMap;
use std::sync::Arc;

/// Label index
///
/// Labels hold the snapshot object itself rather than a position in the
/// log, so pushing or popping newer snapshots never retargets them.
#[derive(Debug, Default)]
pub struct LabelIndex {
    labels: HashMap<String, Arc<Snapshot>>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    /// Bind `name` to `snapshot`, replacing any previous binding
    pub fn put(&mut self, name: impl Into<String>, snapshot: Arc<Snapshot>) {
        self.labels.insert(name.into(), snapshot);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Snapshot>> {
        self.labels.get(name)
    }

    /// Drop every label bound to `snapshot`
    ///
    /// Called when the snapshot leaves the log; returns the released names.
    pub fn release(&mut self, snapshot: &Arc<Snapshot>) -> Vec<String> {
        let mut released: Vec<String> = self
            .labels
            .iter()
            .filter(|(_, target)| Arc::ptr_eq(target, snapshot))
            .map(|(name, _)| name.clone())
            .collect();
        released.sort();

        for name in &released {
            self.labels.remove(name);
        }
        released
    }

    /// Label names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.labels.keys().cloned().collect();
        names.sort();
        names
    }

    /// Iterate over all bindings, unordered
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<Snapshot>)> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotId;

    fn snapshot(id: u64) -> Arc<Snapshot> {
        Arc::new(Snapshot::new(SnapshotId::new(id), Vec::new()))
    }

    #[test]
    fn test_put_overwrites() {
        let mut index = LabelIndex::new();
        index.put("release", snapshot(1));
        index.put("release", snapshot(2));

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("release").map(|s| s.id()), Some(SnapshotId::new(2)));
    }

    #[test]
    fn test_unknown_label() {
        let index = LabelIndex::new();
        assert!(index.get("missing").is_none());
    }

    #[test]
    fn test_release_only_matching_snapshot() {
        let mut index = LabelIndex::new();
        let first = snapshot(1);
        let second = snapshot(2);
        index.put("a", first.clone());
        index.put("b", first.clone());
        index.put("c", second.clone());

        let released = index.release(&first);
        assert_eq!(released, vec!["a".to_string(), "b".to_string()]);
        assert!(index.get("a").is_none());
        assert!(index.get("c").is_some());
        assert_eq!(index.names(), vec!["c".to_string()]);
    }

    #[test]
    fn test_release_compares_identity_not_content() {
        let mut index = LabelIndex::new();
        index.put("a", snapshot(1));

        // Equal content, different snapshot object
        let released = index.release(&snapshot(1));
        assert!(released.is_empty());
        assert!(index.get("a").is_some());
    }
}
