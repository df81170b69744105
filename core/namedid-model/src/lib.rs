//! Data model for the named identifier store.
//!
//! Defines the types every storage backend and the store itself agree on:
//! - [`SchemaDescriptor`] — identity tag plus field layout of a storage schema
//! - [`FieldType`] — the kind of value a schema's single field holds
//! - [`Entry`] — a persisted name → identifier pair
//!
//! [`named_identifier_schema`] returns the fixed, versioned descriptor every
//! named-identifier record is tagged with.

mod entry;
mod schema;

pub use entry::Entry;
pub use schema::{
    named_identifier_schema, FieldType, SchemaDescriptor, NAMED_IDENTIFIER_FIELD,
    NAMED_IDENTIFIER_SCHEMA_ID, NAMED_IDENTIFIER_SCHEMA_NAME, NAMED_IDENTIFIER_SCHEMA_VERSION,
};
