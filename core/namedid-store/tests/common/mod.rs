//! Shared test doubles for store tests.

#![allow(dead_code)]

use namedid_model::SchemaDescriptor;
use namedid_storage::{DocumentStorage, Record, StorageError, StorageResult};
use namedid_types::{DocumentId, Identifier};

/// Installs a test-friendly subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Host failure to inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `begin_transaction` is refused.
    Begin,
    /// `create_record` is refused (document locked).
    Create,
    /// `commit_transaction` fails after the writes were staged.
    Commit,
}

/// Wraps a document to count transactions, inject host faults, and run a
/// competing writer right before the store opens its transaction.
pub struct TestDocument<D> {
    pub inner: D,
    pub fault: Option<Fault>,
    pub begins: usize,
    pub commits: usize,
    pub before_begin: Option<Box<dyn FnOnce(&mut D)>>,
}

impl<D: DocumentStorage> TestDocument<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            fault: None,
            begins: 0,
            commits: 0,
            before_begin: None,
        }
    }

    pub fn with_fault(inner: D, fault: Fault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::new(inner)
        }
    }

    /// Runs `competitor` against the wrapped document just before the next
    /// transaction begins, i.e. after the store's first lookup missed.
    pub fn with_competitor(inner: D, competitor: impl FnOnce(&mut D) + 'static) -> Self {
        Self {
            before_begin: Some(Box::new(competitor)),
            ..Self::new(inner)
        }
    }
}

impl<D: DocumentStorage> DocumentStorage for TestDocument<D> {
    fn document_id(&self) -> DocumentId {
        self.inner.document_id()
    }

    fn title(&self) -> &str {
        self.inner.title()
    }

    fn is_read_only(&self) -> bool {
        self.inner.is_read_only()
    }

    fn revision(&self) -> StorageResult<u64> {
        self.inner.revision()
    }

    fn is_transaction_open(&self) -> bool {
        self.inner.is_transaction_open()
    }

    fn begin_transaction(&mut self, label: &str) -> StorageResult<()> {
        if let Some(competitor) = self.before_begin.take() {
            competitor(&mut self.inner);
        }
        self.begins += 1;
        if self.fault == Some(Fault::Begin) {
            return Err(StorageError::Unavailable("document is locked by another user".into()));
        }
        self.inner.begin_transaction(label)
    }

    fn commit_transaction(&mut self) -> StorageResult<()> {
        if self.fault == Some(Fault::Commit) {
            return Err(StorageError::CommitFailed("disk full".into()));
        }
        self.inner.commit_transaction()?;
        self.commits += 1;
        Ok(())
    }

    fn rollback_transaction(&mut self) -> StorageResult<()> {
        self.inner.rollback_transaction()
    }

    fn find_record(&self, schema: &SchemaDescriptor, name: &str) -> StorageResult<Option<Record>> {
        self.inner.find_record(schema, name)
    }

    fn create_record(
        &mut self,
        schema: &SchemaDescriptor,
        name: &str,
        identifier: Identifier,
    ) -> StorageResult<Record> {
        if self.fault == Some(Fault::Create) {
            return Err(StorageError::Unavailable("element is checked out".into()));
        }
        self.inner.create_record(schema, name, identifier)
    }
}
