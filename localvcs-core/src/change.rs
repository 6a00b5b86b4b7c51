//! Per-path differences between two tracked states

use crate::revision::ContentRevision;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of difference recorded for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl ChangeKind {
    /// Single-letter status code (`A`, `M`, `D`)
    pub fn code(&self) -> char {
        match self {
            ChangeKind::Added => 'A',
            ChangeKind::Modified => 'M',
            ChangeKind::Removed => 'D',
        }
    }
}

/// A single path-level difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub path: String,
    pub kind: ChangeKind,
}

impl Change {
    fn new(path: &str, kind: ChangeKind) -> Self {
        Self {
            path: path.to_string(),
            kind,
        }
    }
}

/// Compare two revision sets by path
///
/// Added and modified paths come first in the order of `newer`, followed by
/// removed paths in the order of `older`. A path whose entry was removed and
/// re-added carries a different object id and is reported as modified even
/// when the content is identical.
pub fn changes_between(older: &[ContentRevision], newer: &[ContentRevision]) -> Vec<Change> {
    let before: HashMap<&str, &ContentRevision> =
        older.iter().map(|r| (r.path(), r)).collect();
    let after: HashMap<&str, &ContentRevision> =
        newer.iter().map(|r| (r.path(), r)).collect();

    let mut changes = Vec::new();

    for rev in newer {
        match before.get(rev.path()) {
            None => changes.push(Change::new(rev.path(), ChangeKind::Added)),
            Some(old) if *old != rev => {
                changes.push(Change::new(rev.path(), ChangeKind::Modified))
            }
            Some(_) => {}
        }
    }

    for rev in older {
        if !after.contains_key(rev.path()) {
            changes.push(Change::new(rev.path(), ChangeKind::Removed));
        }
    }

    changes
}
