//! Session-scoped schema registry.
//!
//! Schemas are declared once per session and shared by every document the
//! session opens. Declaring a schema never touches a document: only record
//! creation does.

use crate::error::{StorageError, StorageResult};
use namedid_model::SchemaDescriptor;
use namedid_types::SchemaId;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Registry of declared storage schemas, keyed by schema id.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<SchemaId, SchemaDescriptor>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the descriptor registered under `id`, if any.
    pub fn find_schema(&self, id: SchemaId) -> StorageResult<Option<SchemaDescriptor>> {
        let schemas = self
            .schemas
            .read()
            .map_err(|_| StorageError::Unavailable("schema registry lock poisoned".into()))?;
        Ok(schemas.get(&id).cloned())
    }

    /// Registers `descriptor` unless an identical one is already present.
    ///
    /// Re-declaring an identical schema is a no-op. Re-declaring an id with a
    /// different layout fails with [`StorageError::SchemaMismatch`].
    pub fn ensure_schema(&self, descriptor: &SchemaDescriptor) -> StorageResult<SchemaDescriptor> {
        if let Some(existing) = self.find_schema(descriptor.id)? {
            return Self::check_same(existing, descriptor);
        }

        descriptor.validate().map_err(StorageError::InvalidSchema)?;

        let mut schemas = self
            .schemas
            .write()
            .map_err(|_| StorageError::Unavailable("schema registry lock poisoned".into()))?;
        // Another thread may have registered it between the read and the write.
        if let Some(existing) = schemas.get(&descriptor.id) {
            return Self::check_same(existing.clone(), descriptor);
        }
        debug!(schema_id = %descriptor.id, name = %descriptor.name, "Registered storage schema");
        schemas.insert(descriptor.id, descriptor.clone());
        Ok(descriptor.clone())
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_same(
        existing: SchemaDescriptor,
        descriptor: &SchemaDescriptor,
    ) -> StorageResult<SchemaDescriptor> {
        if existing == *descriptor {
            Ok(existing)
        } else {
            Err(StorageError::SchemaMismatch(descriptor.id))
        }
    }
}
