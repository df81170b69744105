//! In-memory document with JSON save/reload.
//!
//! Writes are staged on a copy of the committed state and swapped in on
//! commit, so a rollback (or a failed commit) leaves the committed state
//! untouched.

use crate::document::DocumentStorage;
use crate::error::{StorageError, StorageResult};
use crate::record::Record;
use namedid_model::SchemaDescriptor;
use namedid_types::{DocumentId, Identifier, RecordId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Version of the JSON document file layout.
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DocumentState {
    records: Vec<Record>,
    next_record_id: u64,
    revision: u64,
}

impl DocumentState {
    fn find(&self, schema: &SchemaDescriptor, name: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.schema_id == schema.id && r.name == name)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentFile {
    format_version: u32,
    document_id: DocumentId,
    title: String,
    #[serde(flatten)]
    state: DocumentState,
}

#[derive(Debug)]
struct PendingTransaction {
    label: String,
    state: DocumentState,
    changed: bool,
}

/// A document kept in memory, optionally backed by a JSON file.
///
/// Entries become durable when the document is saved; an unsaved document
/// reports [`is_modified`](MemoryDocument::is_modified).
#[derive(Debug)]
pub struct MemoryDocument {
    id: DocumentId,
    title: String,
    path: Option<PathBuf>,
    read_only: bool,
    committed: DocumentState,
    pending: Option<PendingTransaction>,
    modified: bool,
}

impl MemoryDocument {
    /// Creates an empty, unsaved document.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(),
            title: title.into(),
            path: None,
            read_only: false,
            committed: DocumentState::default(),
            pending: None,
            modified: false,
        }
    }

    /// Opens a document file for reading and writing.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::load(path.as_ref(), false)
    }

    /// Opens a document file that rejects every write.
    pub fn open_read_only(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::load(path.as_ref(), true)
    }

    fn load(path: &Path, read_only: bool) -> StorageResult<Self> {
        let bytes = std::fs::read(path)?;
        let file: DocumentFile = serde_json::from_slice(&bytes)?;
        if file.format_version != DOCUMENT_FORMAT_VERSION {
            return Err(StorageError::InvalidData(format!(
                "unsupported document format version {} (expected {})",
                file.format_version, DOCUMENT_FORMAT_VERSION
            )));
        }
        debug!(
            path = %path.display(),
            records = file.state.records.len(),
            read_only,
            "Opened document"
        );
        Ok(Self {
            id: file.document_id,
            title: file.title,
            path: Some(path.to_path_buf()),
            read_only,
            committed: file.state,
            pending: None,
            modified: false,
        })
    }

    /// Saves to the path the document was opened from or last saved to.
    pub fn save(&mut self) -> StorageResult<()> {
        let path = self.path.clone().ok_or_else(|| {
            StorageError::Unavailable(format!("document {:?} has no file path", self.title))
        })?;
        self.save_as(path)
    }

    /// Saves to `path` and makes it the document's path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> StorageResult<()> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        if let Some(pending) = &self.pending {
            return Err(StorageError::TransactionAlreadyOpen(pending.label.clone()));
        }
        let path = path.as_ref();
        let file = DocumentFile {
            format_version: DOCUMENT_FORMAT_VERSION,
            document_id: self.id,
            title: self.title.clone(),
            state: self.committed.clone(),
        };
        std::fs::write(path, serde_json::to_vec_pretty(&file)?)?;
        info!(path = %path.display(), records = self.committed.records.len(), "Saved document");
        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// Whether committed changes exist that have not been saved.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Committed records, in creation order.
    pub fn records(&self) -> &[Record] {
        &self.committed.records
    }

    fn visible(&self) -> &DocumentState {
        match &self.pending {
            Some(p) => &p.state,
            None => &self.committed,
        }
    }
}

impl DocumentStorage for MemoryDocument {
    fn document_id(&self) -> DocumentId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn revision(&self) -> StorageResult<u64> {
        Ok(self.committed.revision)
    }

    fn is_transaction_open(&self) -> bool {
        self.pending.is_some()
    }

    fn begin_transaction(&mut self, label: &str) -> StorageResult<()> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        if let Some(pending) = &self.pending {
            return Err(StorageError::TransactionAlreadyOpen(pending.label.clone()));
        }
        self.pending = Some(PendingTransaction {
            label: label.to_string(),
            state: self.committed.clone(),
            changed: false,
        });
        Ok(())
    }

    fn commit_transaction(&mut self) -> StorageResult<()> {
        let pending = self.pending.take().ok_or(StorageError::NoTransaction)?;
        if pending.changed {
            self.committed = pending.state;
            self.committed.revision += 1;
            self.modified = true;
        }
        Ok(())
    }

    fn rollback_transaction(&mut self) -> StorageResult<()> {
        let pending = self.pending.take().ok_or(StorageError::NoTransaction)?;
        debug!(document = %self.title, label = %pending.label, "Transaction rolled back");
        Ok(())
    }

    fn find_record(&self, schema: &SchemaDescriptor, name: &str) -> StorageResult<Option<Record>> {
        Ok(self.visible().find(schema, name).cloned())
    }

    fn create_record(
        &mut self,
        schema: &SchemaDescriptor,
        name: &str,
        identifier: Identifier,
    ) -> StorageResult<Record> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        let pending = self.pending.as_mut().ok_or(StorageError::NoTransaction)?;
        if pending.state.find(schema, name).is_some() {
            return Err(StorageError::DuplicateRecord {
                schema_id: schema.id,
                name: name.to_string(),
            });
        }
        pending.state.next_record_id += 1;
        let record = Record::new(
            RecordId::new(pending.state.next_record_id),
            schema,
            name,
            identifier,
        );
        pending.state.records.push(record.clone());
        pending.changed = true;
        Ok(record)
    }
}
