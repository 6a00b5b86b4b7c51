//! Object identity for LocalVcs
//!
//! Every tracked entry receives an `ObjectId` when it is first added. The id
//! survives content changes, commits and reverts, so equality of ids is the
//! test for "same logical entry" regardless of path or content history.

use serde::{Deserialize, Serialize};

/// Persistent identifier of a tracked entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Wrap a raw id value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw numeric value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues fresh object ids
///
/// Ids are handed out in strictly increasing order and never reused within
/// the lifetime of a registry.
#[derive(Debug, Clone)]
pub struct IdRegistry {
    next: u64,
}

impl IdRegistry {
    /// Create a registry whose first id is `#1`
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Create a registry that continues after `last`
    ///
    /// Used when rehydrating an engine from a stored image.
    pub fn resume_after(last: Option<ObjectId>) -> Self {
        Self {
            next: last.map(|id| id.0 + 1).unwrap_or(1),
        }
    }

    /// Issue a previously unused id
    pub fn assign(&mut self) -> ObjectId {
        let id = ObjectId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to `assign` will return
    pub fn peek(&self) -> ObjectId {
        ObjectId(self.next)
    }
}

impl Default for IdRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_is_monotonic() {
        let mut registry = IdRegistry::new();
        let a = registry.assign();
        let b = registry.assign();
        let c = registry.assign();
        assert!(a < b && b < c);
        assert_eq!(a, ObjectId::new(1));
    }

    #[test]
    fn test_resume_after_skips_seen_ids() {
        let mut registry = IdRegistry::resume_after(Some(ObjectId::new(41)));
        assert_eq!(registry.assign(), ObjectId::new(42));

        let mut fresh = IdRegistry::resume_after(None);
        assert_eq!(fresh.assign(), ObjectId::new(1));
    }

    #[test]
    fn test_display() {
        assert_eq!(ObjectId::new(7).to_string(), "#7");
    }
}
