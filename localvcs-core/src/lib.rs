//! LocalVcs Core Library
//!
//! In-process version history for a working set of named entries:
//! - Persistent object identity (ObjectId, IdRegistry)
//! - Immutable revisions and snapshots
//! - Append-only, newest-first snapshot log with pop-based undo
//! - Labels bound to historical snapshots
//! - Working tree with clean/dirty tracking
//! - History engine (commit, two-tier revert, labels, queries)
//! - File-backed history store and engine configuration

pub mod change;
pub mod config;
pub mod error;
mod history;
mod label;
pub mod object;
pub mod revision;
pub mod shared;
pub mod snapshot;
pub mod store;
pub mod vcs;
mod working_tree;

pub use change::{Change, ChangeKind};
pub use config::VcsConfig;
pub use error::{Result, StoreError, VcsError};
pub use object::{IdRegistry, ObjectId};
pub use revision::ContentRevision;
pub use shared::SharedVcs;
pub use snapshot::{Snapshot, SnapshotId};
pub use store::HistoryStore;
pub use vcs::{LocalVcs, RevertAction};
