//! Error types for LocalVcs

/// Result type for history engine operations
pub type Result<T> = std::result::Result<T, VcsError>;

/// Errors raised by working tree mutations and labelling
///
/// Every other engine operation is total and reports absence through
/// `Option` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VcsError {
    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Cannot label: no snapshots have been committed")]
    NoHistory,
}

/// Errors that can occur while saving or loading a history image
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("History file corrupted: {0}")]
    Corrupted(String),

    #[error("Unsupported history format version {0}")]
    UnsupportedVersion(u32),
}

impl From<bincode::Error> for StoreError {
    fn from(e: bincode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
