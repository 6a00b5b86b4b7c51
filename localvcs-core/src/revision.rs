//! Frozen content revisions

use crate::object::ObjectId;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Immutable copy of an entry taken at commit time
///
/// Two revisions are equal iff id, path and content all match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRevision {
    id: ObjectId,
    path: String,
    content: Bytes,
}

impl ContentRevision {
    /// Create a new revision
    pub fn new(id: ObjectId, path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            id,
            path: path.into(),
            content: content.into(),
        }
    }

    /// Identity of the entry this revision was taken from
    pub fn object_id(&self) -> ObjectId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Content decoded as UTF-8, replacing invalid sequences
    pub fn content_lossy(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}
