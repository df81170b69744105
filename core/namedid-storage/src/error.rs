//! Error types for the storage layer.

use namedid_types::SchemaId;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The document was opened read-only.
    #[error("document is read-only")]
    ReadOnly,

    /// A write was attempted with no open transaction.
    #[error("no transaction is open")]
    NoTransaction,

    /// A transaction (or save) was attempted while one is already open.
    #[error("transaction already open: {0}")]
    TransactionAlreadyOpen(String),

    /// A record for this name already exists under the schema.
    #[error("record {name:?} already exists under schema {schema_id}")]
    DuplicateRecord { schema_id: SchemaId, name: String },

    /// A schema id was re-declared with a different layout.
    #[error("schema {0} is already registered with a different layout")]
    SchemaMismatch(SchemaId),

    /// The schema descriptor is malformed.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Persisted data could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The host refused to commit the transaction.
    #[error("commit failed: {0}")]
    CommitFailed(String),

    /// Storage is temporarily unusable (poisoned lock, closed handle).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
