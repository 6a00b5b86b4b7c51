//! Thread-safe handle around a `LocalVcs`
//!
//! Each mutating call holds the write lock for its whole duration, so no
//! reader ever observes a half-applied edit. Queries share the read lock.

use crate::change::Change;
use crate::error::Result;
use crate::object::ObjectId;
use crate::revision::ContentRevision;
use crate::snapshot::Snapshot;
use crate::vcs::{LocalVcs, RevertAction};
use bytes::Bytes;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable, lock-guarded engine handle
#[derive(Clone, Default)]
pub struct SharedVcs {
    inner: Arc<RwLock<LocalVcs>>,
}

impl SharedVcs {
    pub fn new(vcs: LocalVcs) -> Self {
        Self {
            inner: Arc::new(RwLock::new(vcs)),
        }
    }

    pub fn add_file(&self, path: &str, content: impl Into<Bytes>) -> Result<ObjectId> {
        self.inner.write().add_file(path, content)
    }

    pub fn change_file(&self, path: &str, content: impl Into<Bytes>) -> Result<ObjectId> {
        self.inner.write().change_file(path, content)
    }

    pub fn remove_file(&self, path: &str) -> Result<()> {
        self.inner.write().remove_file(path)
    }

    pub fn commit(&self) -> Arc<Snapshot> {
        self.inner.write().commit()
    }

    pub fn revert(&self) -> RevertAction {
        self.inner.write().revert()
    }

    pub fn put_label(&self, name: &str) -> Result<Arc<Snapshot>> {
        self.inner.write().put_label(name)
    }

    pub fn is_clean(&self) -> bool {
        self.inner.read().is_clean()
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.inner.read().has_file(path)
    }

    pub fn file_revision(&self, path: &str) -> Option<ContentRevision> {
        self.inner.read().file_revision(path)
    }

    pub fn snapshots(&self) -> Vec<Arc<Snapshot>> {
        self.inner.read().snapshots()
    }

    pub fn snapshot_by_label(&self, name: &str) -> Option<Arc<Snapshot>> {
        self.inner.read().snapshot_by_label(name)
    }

    pub fn pending_changes(&self) -> Vec<Change> {
        self.inner.read().pending_changes()
    }

    /// Run several queries under one read lock
    pub fn read<R>(&self, f: impl FnOnce(&LocalVcs) -> R) -> R {
        f(&self.inner.read())
    }

    /// Apply several edits as one serialized step
    pub fn update<R>(&self, f: impl FnOnce(&mut LocalVcs) -> R) -> R {
        f(&mut self.inner.write())
    }
}
