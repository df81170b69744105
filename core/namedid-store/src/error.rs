//! Error types for the named identifier store.

use namedid_storage::StorageError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a failed resolve.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entry exists and creation was not requested.
    #[error("no identifier stored under {0:?}")]
    NotFound(String),

    /// The request was rejected before touching the document.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The host refused a read or write. Any owned transaction was rolled back.
    #[error("storage fault: {0}")]
    Storage(#[from] StorageError),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
