//! Get-or-create resolution of named identifiers.

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use namedid_model::{Entry, SchemaDescriptor};
use namedid_storage::{DocumentStorage, SchemaRegistry, Transaction};
use namedid_types::Identifier;
use std::sync::Arc;
use tracing::{debug, info};

/// The identifier a name resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub identifier: Identifier,
    /// True only for the call that generated and stored the identifier.
    pub created: bool,
}

impl Resolved {
    fn existing(identifier: Identifier) -> Self {
        Self {
            identifier,
            created: false,
        }
    }

    fn created(identifier: Identifier) -> Self {
        Self {
            identifier,
            created: true,
        }
    }

    pub fn into_entry(self, name: impl Into<String>) -> Entry {
        Entry::new(name, self.identifier)
    }
}

/// Document-scoped store mapping names to identifiers.
///
/// The store holds no per-document state: the document is passed to every
/// call, and entries live only in the document's records.
#[derive(Debug, Clone)]
pub struct NamedIdentifierStore {
    registry: Arc<SchemaRegistry>,
    config: StoreConfig,
}

impl Default for NamedIdentifierStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NamedIdentifierStore {
    /// Creates a store with the default schema and its own schema registry.
    pub fn new() -> Self {
        Self::with_config(Arc::new(SchemaRegistry::new()), StoreConfig::default())
    }

    /// Creates a store sharing a session's schema registry.
    pub fn with_registry(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(registry, StoreConfig::default())
    }

    pub fn with_config(registry: Arc<SchemaRegistry>, config: StoreConfig) -> Self {
        Self { registry, config }
    }

    /// The schema entry records are tagged with.
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.config.schema
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Returns the identifier stored under `name`, creating one if asked to.
    ///
    /// With `create_if_missing == false` a miss returns
    /// [`StoreError::NotFound`] and the document is left untouched.
    ///
    /// On the create path a fresh random identifier is written inside a
    /// write transaction. If the caller already has a transaction open it is
    /// joined, and committing it stays the caller's job; otherwise the store
    /// opens, commits, and on any failure rolls back its own. The record is
    /// looked up again inside the transaction, so an entry written by a
    /// competing caller after the first lookup wins and is returned with
    /// `created == false`.
    pub fn resolve<D>(
        &self,
        doc: &mut D,
        name: &str,
        create_if_missing: bool,
    ) -> StoreResult<Resolved>
    where
        D: DocumentStorage + ?Sized,
    {
        let schema = self.prepare(name)?;

        if let Some(identifier) = lookup(&*doc, &schema, name)? {
            debug!(document = %doc.title(), name, identifier = %identifier, "Resolved existing identifier");
            return Ok(Resolved::existing(identifier));
        }

        if !create_if_missing {
            debug!(document = %doc.title(), name, "No identifier stored");
            return Err(StoreError::NotFound(name.to_string()));
        }

        let candidate = Identifier::new();
        let mut txn = Transaction::begin_or_join(doc, &self.config.transaction_label)?;

        let resolved = match lookup(txn.document(), &schema, name)? {
            Some(winner) => {
                debug!(name, winner = %winner, discarded = %candidate, "Entry appeared before write, using it");
                Resolved::existing(winner)
            }
            None => {
                txn.document_mut().create_record(&schema, name, candidate)?;
                Resolved::created(candidate)
            }
        };

        let owned = txn.is_owned();
        txn.commit()?;

        if resolved.created {
            info!(name, identifier = %candidate, committed = owned, "Created named identifier");
        }
        Ok(resolved)
    }

    /// Returns the identifier stored under `name`, if any. Never writes.
    pub fn find<D>(&self, doc: &D, name: &str) -> StoreResult<Option<Identifier>>
    where
        D: DocumentStorage + ?Sized,
    {
        let schema = self.prepare(name)?;
        lookup(doc, &schema, name)
    }

    /// Shorthand for `resolve(doc, name, true)`.
    pub fn get_or_create<D>(&self, doc: &mut D, name: &str) -> StoreResult<Resolved>
    where
        D: DocumentStorage + ?Sized,
    {
        self.resolve(doc, name, true)
    }

    /// Validates `name` and makes sure the schema is registered.
    fn prepare(&self, name: &str) -> StoreResult<SchemaDescriptor> {
        if name.is_empty() {
            return Err(StoreError::InvalidArgument("name must not be empty".into()));
        }
        Ok(self.registry.ensure_schema(&self.config.schema)?)
    }
}

fn lookup<D>(doc: &D, schema: &SchemaDescriptor, name: &str) -> StoreResult<Option<Identifier>>
where
    D: DocumentStorage + ?Sized,
{
    match doc.find_record(schema, name)? {
        Some(record) => Ok(Some(doc.read_field(schema, &record)?)),
        None => Ok(None),
    }
}
