//! History engine
//!
//! `LocalVcs` owns the working tree, the snapshot log and the label index.
//! Edits only touch the working tree; `commit` freezes it into a snapshot,
//! `revert` either discards pending edits or undoes the latest commit.

use crate::change::{changes_between, Change};
use crate::config::VcsConfig;
use crate::error::{Result, VcsError};
use crate::history::SnapshotLog;
use crate::label::LabelIndex;
use crate::object::{IdRegistry, ObjectId};
use crate::revision::ContentRevision;
use crate::snapshot::{Snapshot, SnapshotId};
use crate::working_tree::WorkingTree;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

/// What a call to `revert` does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertAction {
    /// Discard pending edits, restoring the latest snapshot (or nothing)
    RestoreLatest,
    /// Drop the latest snapshot and restore the one beneath it
    PopThenRestore,
    /// Clean tree and nothing left to undo
    Noop,
}

impl RevertAction {
    /// Decide the revert step from the two state bits
    ///
    /// `history_exhausted` is true when the log is empty, or when retention
    /// has trimmed it down to a single snapshot whose predecessor is gone.
    ///
    /// | tree  | history   | action         |
    /// |-------|-----------|----------------|
    /// | dirty | any       | RestoreLatest  |
    /// | clean | undoable  | PopThenRestore |
    /// | clean | exhausted | Noop           |
    pub fn plan(is_clean: bool, history_exhausted: bool) -> Self {
        match (is_clean, history_exhausted) {
            (false, _) => RevertAction::RestoreLatest,
            (true, false) => RevertAction::PopThenRestore,
            (true, true) => RevertAction::Noop,
        }
    }
}

/// In-process version history engine
#[derive(Debug)]
pub struct LocalVcs {
    uuid: String,
    config: VcsConfig,
    ids: IdRegistry,
    next_snapshot: SnapshotId,
    tree: WorkingTree,
    log: SnapshotLog,
    labels: LabelIndex,
}

impl LocalVcs {
    /// Create an empty engine with default policies
    pub fn new() -> Self {
        Self::with_config(VcsConfig::default())
    }

    /// Create an empty engine
    pub fn with_config(config: VcsConfig) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            config,
            ids: IdRegistry::new(),
            next_snapshot: SnapshotId::new(1),
            tree: WorkingTree::new(),
            log: SnapshotLog::new(),
            labels: LabelIndex::new(),
        }
    }

    /// Instance UUID, stable across save/load
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn config(&self) -> &VcsConfig {
        &self.config
    }

    /// Replace the active policies
    ///
    /// A tighter retention limit takes effect at the next commit.
    pub fn set_config(&mut self, config: VcsConfig) {
        self.config = config;
    }

    // ─────────────────────────────────────────────────────
    // Working tree edits
    // ─────────────────────────────────────────────────────

    /// Start tracking a new entry
    pub fn add_file(&mut self, path: &str, content: impl Into<Bytes>) -> Result<ObjectId> {
        let id = self.tree.add(&mut self.ids, path, content.into())?;
        debug!("Added {} as {}", path, id);
        Ok(id)
    }

    /// Replace the content of a tracked entry
    pub fn change_file(&mut self, path: &str, content: impl Into<Bytes>) -> Result<ObjectId> {
        let id = self.tree.change(path, content.into())?;
        debug!("Changed {} ({})", path, id);
        Ok(id)
    }

    /// Stop tracking an entry
    pub fn remove_file(&mut self, path: &str) -> Result<()> {
        let entry = self.tree.remove(path)?;
        debug!("Removed {} ({})", path, entry.id);
        Ok(())
    }

    // ─────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────

    /// Freeze the working tree into a new snapshot
    ///
    /// Committing a clean tree still records a new snapshot unless
    /// `deduplicate_commits` is set, in which case the unchanged latest
    /// snapshot is returned.
    pub fn commit(&mut self) -> Arc<Snapshot> {
        let revisions = self.tree.snapshot_view();

        if self.config.deduplicate_commits && self.tree.is_clean() {
            if let Some(latest) = self.log.latest() {
                if latest.revisions() == revisions.as_slice() {
                    debug!("Commit skipped: tree matches {}", latest.id());
                    return latest.clone();
                }
            }
        }

        let id = self.next_snapshot;
        self.next_snapshot = id.next();

        let snapshot = Arc::new(Snapshot::new(id, revisions));
        self.log.push(snapshot.clone());
        self.tree.mark_clean();
        info!("Committed {} ({} entries)", id, snapshot.len());

        self.apply_retention();
        snapshot
    }

    /// Undo one step; never fails
    ///
    /// With pending edits this discards them. On a clean tree it undoes the
    /// latest commit, releasing any labels bound to it. On a clean tree with
    /// no history, or with only a retention-trimmed last snapshot, it does
    /// nothing.
    pub fn revert(&mut self) -> RevertAction {
        let action = RevertAction::plan(self.tree.is_clean(), self.log.is_exhausted());

        match action {
            RevertAction::RestoreLatest => {
                self.tree.restore_from(self.log.latest().map(Arc::as_ref));
                info!("Reverted pending changes");
            }
            RevertAction::PopThenRestore => {
                if let Some(popped) = self.log.pop_latest() {
                    let released = self.labels.release(&popped);
                    if !released.is_empty() {
                        debug!("Labels released with {}: {:?}", popped.id(), released);
                    }
                    info!("Reverted commit {}", popped.id());
                }
                self.tree.restore_from(self.log.latest().map(Arc::as_ref));
            }
            RevertAction::Noop => {
                debug!("Revert: no earlier state to return to");
            }
        }

        action
    }

    fn apply_retention(&mut self) {
        let Some(limit) = self.config.max_snapshots else {
            return;
        };

        for dropped in self.log.truncate_oldest(limit.max(1)) {
            let released = self.labels.release(&dropped);
            debug!(
                "Retention dropped {} (labels released: {:?})",
                dropped.id(),
                released
            );
        }
    }

    // ─────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────

    /// True iff there are no edits since the last commit or revert
    pub fn is_clean(&self) -> bool {
        self.tree.is_clean()
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.tree.contains(path)
    }

    /// Current (uncommitted) state of `path`
    pub fn file_revision(&self, path: &str) -> Option<ContentRevision> {
        self.tree.get(path).map(|e| e.to_revision())
    }

    /// Current state of every tracked entry, in insertion order
    pub fn files(&self) -> Vec<ContentRevision> {
        self.tree.snapshot_view()
    }

    /// All snapshots, newest first
    pub fn snapshots(&self) -> Vec<Arc<Snapshot>> {
        self.log.all().cloned().collect()
    }

    pub fn latest_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.log.latest().cloned()
    }

    /// Snapshot at `index` counting from the newest (0)
    pub fn snapshot_at(&self, index: usize) -> Option<Arc<Snapshot>> {
        self.log.get(index).cloned()
    }

    /// Label the latest committed snapshot
    ///
    /// Pending edits are not part of the label.
    pub fn put_label(&mut self, name: &str) -> Result<Arc<Snapshot>> {
        let latest = self.log.latest().cloned().ok_or(VcsError::NoHistory)?;
        self.labels.put(name, latest.clone());
        info!("Label '{}' -> {}", name, latest.id());
        Ok(latest)
    }

    /// Snapshot bound to `name`, absent if unknown or undone
    pub fn snapshot_by_label(&self, name: &str) -> Option<Arc<Snapshot>> {
        self.labels.get(name).cloned()
    }

    /// Label names in sorted order
    pub fn labels(&self) -> Vec<String> {
        self.labels.names()
    }

    /// Differences between the latest snapshot and the working tree
    pub fn pending_changes(&self) -> Vec<Change> {
        let base = self.log.latest().map(|s| s.revisions()).unwrap_or_default();
        changes_between(base, &self.tree.snapshot_view())
    }

    // ─────────────────────────────────────────────────────
    // Rehydration (used by the history store)
    // ─────────────────────────────────────────────────────

    pub(crate) fn working_tree(&self) -> &WorkingTree {
        &self.tree
    }

    pub(crate) fn snapshot_log(&self) -> &SnapshotLog {
        &self.log
    }

    pub(crate) fn label_index(&self) -> &LabelIndex {
        &self.labels
    }

    pub(crate) fn next_object_id(&self) -> ObjectId {
        self.ids.peek()
    }

    pub(crate) fn next_snapshot_id(&self) -> SnapshotId {
        self.next_snapshot
    }

    pub(crate) fn from_parts(
        uuid: String,
        config: VcsConfig,
        ids: IdRegistry,
        next_snapshot: SnapshotId,
        tree: WorkingTree,
        log: SnapshotLog,
        labels: LabelIndex,
    ) -> Self {
        Self {
            uuid,
            config,
            ids,
            next_snapshot,
            tree,
            log,
            labels,
        }
    }
}

impl Default for LocalVcs {
    fn default() -> Self {
        Self::new()
    }
}
