//! Mutable, uncommitted working state

use crate::error::{Result, VcsError};
use crate::object::{IdRegistry, ObjectId};
use crate::revision::ContentRevision;
use crate::snapshot::Snapshot;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};

/// A live tracked entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: ObjectId,
    pub path: String,
    pub content: Bytes,
}

impl Entry {
    /// Frozen copy of this entry
    pub fn to_revision(&self) -> ContentRevision {
        ContentRevision::new(self.id, self.path.clone(), self.content.clone())
    }
}

impl From<&ContentRevision> for Entry {
    fn from(rev: &ContentRevision) -> Self {
        Self {
            id: rev.object_id(),
            path: rev.path().to_string(),
            content: rev.content().clone(),
        }
    }
}

/// Current entries plus a dirty flag
///
/// Entries are keyed by object id. Ids are issued in increasing order, so
/// iterating the map yields entries in the order they were first added.
#[derive(Debug, Default)]
pub struct WorkingTree {
    entries: BTreeMap<ObjectId, Entry>,
    path_index: HashMap<String, ObjectId>,
    dirty: bool,
}

impl WorkingTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new entry at `path`
    pub fn add(&mut self, ids: &mut IdRegistry, path: &str, content: Bytes) -> Result<ObjectId> {
        if self.path_index.contains_key(path) {
            return Err(VcsError::AlreadyExists(path.to_string()));
        }

        let id = ids.assign();
        self.path_index.insert(path.to_string(), id);
        self.entries.insert(
            id,
            Entry {
                id,
                path: path.to_string(),
                content,
            },
        );
        self.dirty = true;
        Ok(id)
    }

    /// Replace the content at `path`, keeping its object id
    pub fn change(&mut self, path: &str, content: Bytes) -> Result<ObjectId> {
        let entry = self
            .path_index
            .get(path)
            .and_then(|id| self.entries.get_mut(id))
            .ok_or_else(|| VcsError::NotFound(path.to_string()))?;

        entry.content = content;
        self.dirty = true;
        Ok(entry.id)
    }

    /// Stop tracking `path`
    pub fn remove(&mut self, path: &str) -> Result<Entry> {
        let id = self
            .path_index
            .remove(path)
            .ok_or_else(|| VcsError::NotFound(path.to_string()))?;

        let entry = self
            .entries
            .remove(&id)
            .ok_or_else(|| VcsError::NotFound(path.to_string()))?;
        self.dirty = true;
        Ok(entry)
    }

    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.path_index.get(path).and_then(|id| self.entries.get(id))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.path_index.contains_key(path)
    }

    /// True iff nothing changed since the last commit or revert
    pub fn is_clean(&self) -> bool {
        !self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Frozen revisions of every live entry, in insertion order
    ///
    /// `LocalVcs::commit` wraps this view into the new `Snapshot`.
    pub fn snapshot_view(&self) -> Vec<ContentRevision> {
        self.entries.values().map(Entry::to_revision).collect()
    }

    /// Replace every entry with the revisions of `snapshot`
    ///
    /// An absent snapshot empties the tree. The tree is clean afterwards.
    pub fn restore_from(&mut self, snapshot: Option<&Snapshot>) {
        let revisions = snapshot.map(|s| s.revisions()).unwrap_or_default();
        self.restore_revisions(revisions);
        self.dirty = false;
    }

    /// Rebuild from raw revisions without touching the dirty flag
    pub(crate) fn restore_revisions(&mut self, revisions: &[ContentRevision]) {
        self.entries = revisions.iter().map(|r| (r.object_id(), Entry::from(r))).collect();
        self.path_index = self
            .entries
            .values()
            .map(|e| (e.path.clone(), e.id))
            .collect();
    }
}
