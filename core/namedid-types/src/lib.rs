//! Identifier types for the named identifier store.
//!
//! This crate defines the small, host-agnostic value types shared by every
//! other crate in the workspace:
//! - [`Identifier`]: the random 128-bit value handed out per name (UUID v4)
//! - [`SchemaId`]: the fixed identity tag of a storage schema
//! - [`DocumentId`]: identity of a host document (UUID v7)
//! - [`RecordId`]: host-assigned handle of a storage record inside a document

mod ids;

pub use ids::{DocumentId, Identifier, RecordId, SchemaId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid identifier bytes: expected 16, got {0}")]
    InvalidLength(usize),
}
