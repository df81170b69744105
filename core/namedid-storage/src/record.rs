//! Storage records.

use crate::error::{StorageError, StorageResult};
use namedid_model::{Entry, SchemaDescriptor};
use namedid_types::{Identifier, RecordId, SchemaId};
use serde::{Deserialize, Serialize};

/// A tagged storage unit attached to a document.
///
/// The field blob is opaque to the host; only a matching schema can
/// interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub schema_id: SchemaId,
    pub name: String,
    pub field_name: String,
    pub value: Vec<u8>,
}

impl Record {
    /// Builds an unsaved record holding `identifier` under `schema`.
    pub(crate) fn new(
        id: RecordId,
        schema: &SchemaDescriptor,
        name: &str,
        identifier: Identifier,
    ) -> Self {
        Self {
            id,
            schema_id: schema.id,
            name: name.to_string(),
            field_name: schema.field_name.clone(),
            value: identifier.to_bytes().to_vec(),
        }
    }

    /// Decodes the record as an entry of `schema`.
    pub fn to_entry(&self, schema: &SchemaDescriptor) -> StorageResult<Entry> {
        if self.schema_id != schema.id {
            return Err(StorageError::InvalidData(format!(
                "record {} belongs to schema {}, not {}",
                self.id, self.schema_id, schema.id
            )));
        }
        if self.field_name != schema.field_name {
            return Err(StorageError::InvalidData(format!(
                "record {} has field {:?}, schema {} expects {:?}",
                self.id, self.field_name, schema.id, schema.field_name
            )));
        }
        let identifier = Identifier::from_slice(&self.value)
            .map_err(|e| StorageError::InvalidData(format!("record {}: {e}", self.id)))?;
        Ok(Entry::new(self.name.clone(), identifier))
    }
}
