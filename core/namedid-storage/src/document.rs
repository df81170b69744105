//! Host document abstraction.
//!
//! Defines the interface a host document exposes to the store: tagged
//! record lookup and creation, plus scoped write transactions.

use crate::error::StorageResult;
use crate::record::Record;
use namedid_model::SchemaDescriptor;
use namedid_types::{DocumentId, Identifier};

/// A host document holding schema-tagged records.
///
/// Reads need no transaction. Writes are only accepted inside an open
/// write transaction, and a commit applies all of them or none.
pub trait DocumentStorage {
    /// Returns the document's identity.
    fn document_id(&self) -> DocumentId;

    /// Returns the document's title.
    fn title(&self) -> &str;

    /// Returns whether the document rejects writes.
    fn is_read_only(&self) -> bool;

    /// Number of committed transactions that changed the document.
    /// Pure lookups never change it.
    fn revision(&self) -> StorageResult<u64>;

    /// Returns whether a write transaction is currently open.
    fn is_transaction_open(&self) -> bool;

    /// Opens a write transaction.
    fn begin_transaction(&mut self, label: &str) -> StorageResult<()>;

    /// Commits the open transaction.
    fn commit_transaction(&mut self) -> StorageResult<()>;

    /// Discards everything written since the transaction began.
    fn rollback_transaction(&mut self) -> StorageResult<()>;

    /// Finds the record stored under `name` for `schema`.
    ///
    /// Matching is exact on `name` and scoped to the schema id; records
    /// tagged with any other schema are invisible.
    fn find_record(&self, schema: &SchemaDescriptor, name: &str) -> StorageResult<Option<Record>>;

    /// Creates a record for `name` holding `identifier`.
    /// Requires an open write transaction.
    fn create_record(
        &mut self,
        schema: &SchemaDescriptor,
        name: &str,
        identifier: Identifier,
    ) -> StorageResult<Record>;

    /// Decodes the identifier held by `record`.
    fn read_field(&self, schema: &SchemaDescriptor, record: &Record) -> StorageResult<Identifier> {
        Ok(record.to_entry(schema)?.identifier)
    }
}
