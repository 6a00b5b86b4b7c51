//! History store
//!
//! Persists a complete engine image (snapshots, labels, working tree and id
//! counters) to a single file. Layout:
//!
//! ```text
//! offset  size  field
//! 0       4     magic "LVCS"
//! 4       4     format version (u32 LE)
//! 8       32    SHA-256 of the payload
//! 40      ..    payload (bincode HistoryImage)
//! ```
//!
//! Writes go to `<file>.tmp` and are renamed into place.

use crate::config::VcsConfig;
use crate::error::StoreError;
use crate::history::SnapshotLog;
use crate::label::LabelIndex;
use crate::object::{IdRegistry, ObjectId};
use crate::revision::ContentRevision;
use crate::snapshot::{Snapshot, SnapshotId};
use crate::vcs::LocalVcs;
use crate::working_tree::WorkingTree;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// File name of the history image inside a repository directory
pub const HISTORY_FILE: &str = "history.bin";

/// Leading magic bytes
pub const STORE_MAGIC: [u8; 4] = *b"LVCS";

/// Current format version
pub const STORE_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 32;

/// Serialized engine state
#[derive(Debug, Serialize, Deserialize)]
struct HistoryImage {
    uuid: String,
    next_object_id: ObjectId,
    next_snapshot_id: SnapshotId,
    /// Newest first
    snapshots: Vec<Snapshot>,
    labels: Vec<(String, SnapshotId)>,
    working: Vec<ContentRevision>,
    dirty: bool,
    /// Retention has dropped older snapshots
    truncated: bool,
}

/// Encode an engine into the on-disk byte format
pub fn encode(vcs: &LocalVcs) -> Result<Vec<u8>> {
    let mut labels: Vec<(String, SnapshotId)> = vcs
        .label_index()
        .iter()
        .map(|(name, snapshot)| (name.clone(), snapshot.id()))
        .collect();
    labels.sort();

    let image = HistoryImage {
        uuid: vcs.uuid().to_string(),
        next_object_id: vcs.next_object_id(),
        next_snapshot_id: vcs.next_snapshot_id(),
        snapshots: vcs.snapshot_log().all().map(|s| Snapshot::clone(s)).collect(),
        labels,
        working: vcs.working_tree().snapshot_view(),
        dirty: !vcs.is_clean(),
        truncated: vcs.snapshot_log().is_truncated(),
    };
    seal(&image)
}

fn seal(image: &HistoryImage) -> Result<Vec<u8>> {
    let payload = bincode::serialize(image)?;
    let checksum = Sha256::digest(&payload);

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&STORE_MAGIC);
    out.extend_from_slice(&STORE_VERSION.to_le_bytes());
    out.extend_from_slice(checksum.as_slice());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Rebuild an engine from bytes produced by [`encode`]
pub fn decode(data: &[u8], config: VcsConfig) -> Result<LocalVcs> {
    if data.len() < HEADER_LEN {
        return Err(StoreError::Corrupted(format!(
            "file too short ({} bytes)",
            data.len()
        )));
    }
    if data[0..4] != STORE_MAGIC {
        return Err(StoreError::Corrupted("bad magic".to_string()));
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&data[4..8]);
    let version = u32::from_le_bytes(version);
    if version != STORE_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }

    let expected = &data[8..HEADER_LEN];
    let payload = &data[HEADER_LEN..];
    let actual = Sha256::digest(payload);
    if actual.as_slice() != expected {
        return Err(StoreError::Corrupted(format!(
            "checksum mismatch: expected {}, got {}",
            hex::encode(expected),
            hex::encode(actual)
        )));
    }

    let image: HistoryImage = bincode::deserialize(payload)?;
    rebuild(image, config)
}

/// Reject a revision set holding the same path or ObjectId twice
fn check_unique(revisions: &[ContentRevision], owner: &str) -> Result<()> {
    let mut paths = HashSet::new();
    let mut ids = HashSet::new();
    for revision in revisions {
        if !paths.insert(revision.path()) {
            return Err(StoreError::Corrupted(format!(
                "duplicate path '{}' in {}",
                revision.path(),
                owner
            )));
        }
        if !ids.insert(revision.object_id()) {
            return Err(StoreError::Corrupted(format!(
                "duplicate object {} in {}",
                revision.object_id(),
                owner
            )));
        }
    }
    Ok(())
}

fn rebuild(image: HistoryImage, config: VcsConfig) -> Result<LocalVcs> {
    // Newest first means strictly decreasing ids
    for pair in image.snapshots.windows(2) {
        if pair[0].id() <= pair[1].id() {
            return Err(StoreError::Corrupted(format!(
                "snapshot order broken at {} / {}",
                pair[0].id(),
                pair[1].id()
            )));
        }
    }

    for snapshot in &image.snapshots {
        check_unique(snapshot.revisions(), &snapshot.id().to_string())?;
    }
    check_unique(&image.working, "working tree")?;

    let seen_max = image
        .snapshots
        .iter()
        .flat_map(|s| s.revisions())
        .chain(image.working.iter())
        .map(|r| r.object_id())
        .max();
    let stored_last = ObjectId::new(image.next_object_id.value().saturating_sub(1));
    let ids = IdRegistry::resume_after(seen_max.max(Some(stored_last)));

    let next_snapshot = image
        .snapshots
        .first()
        .map(|s| s.id().next())
        .into_iter()
        .chain([image.next_snapshot_id])
        .max()
        .unwrap_or(image.next_snapshot_id);

    let mut log = SnapshotLog::with_truncation(image.truncated);
    for snapshot in image.snapshots.into_iter().rev() {
        log.push(Arc::new(snapshot));
    }

    let mut labels = LabelIndex::new();
    for (name, id) in image.labels {
        match log.find(id) {
            Some(snapshot) => labels.put(name, snapshot.clone()),
            None => warn!("Dropping label '{}': snapshot {} not in history", name, id),
        }
    }

    let mut tree = WorkingTree::new();
    tree.restore_revisions(&image.working);
    if image.dirty {
        tree.mark_dirty();
    }

    debug!(
        "Rebuilt history: {} snapshots, {} labels, {} entries",
        log.len(),
        labels.len(),
        tree.len()
    );

    Ok(LocalVcs::from_parts(
        image.uuid,
        config,
        ids,
        next_snapshot,
        tree,
        log,
        labels,
    ))
}

/// File-backed history store for one repository directory
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    /// Store rooted at `repo_path`; nothing is touched until save/load
    pub fn new(repo_path: &Path) -> Self {
        Self {
            root: repo_path.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the history image
    pub fn history_path(&self) -> PathBuf {
        self.root.join(HISTORY_FILE)
    }

    /// Whether a history image has been written
    pub fn exists(&self) -> bool {
        self.history_path().exists()
    }

    /// Write the engine state atomically
    pub fn save(&self, vcs: &LocalVcs) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.history_path();
        let tmp_path = path.with_extension("tmp");

        let data = encode(vcs)?;
        fs::write(&tmp_path, &data)?;
        fs::rename(&tmp_path, &path)?;

        info!(
            "Saved history to {:?} ({} snapshots, {} bytes)",
            path,
            vcs.snapshot_log().len(),
            data.len()
        );
        Ok(())
    }

    /// Read the engine state, applying `config`
    pub fn load(&self, config: VcsConfig) -> Result<LocalVcs> {
        let path = self.history_path();
        let data = fs::read(&path)?;
        let vcs = decode(&data, config)?;
        info!("Loaded history from {:?}", path);
        Ok(vcs)
    }

    /// Load the stored engine, or start a fresh one if nothing was saved
    pub fn load_or_init(&self, config: VcsConfig) -> Result<LocalVcs> {
        if self.exists() {
            self.load(config)
        } else {
            debug!("No history at {:?}, starting empty", self.history_path());
            Ok(LocalVcs::with_config(config))
        }
    }
}
