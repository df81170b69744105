//! SQLite-backed document file.
//!
//! Every committed transaction is durable immediately. Several connections
//! may open the same file; write transactions start with `BEGIN IMMEDIATE`
//! so SQLite serializes writers and a read inside a write transaction sees
//! the latest committed state.

use crate::document::DocumentStorage;
use crate::error::{StorageError, StorageResult};
use crate::record::Record;
use namedid_model::SchemaDescriptor;
use namedid_types::{DocumentId, Identifier, RecordId};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// How long a writer waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A document stored in a SQLite database file.
pub struct SqliteDocument {
    conn: Connection,
    id: DocumentId,
    title: String,
    path: Option<PathBuf>,
    read_only: bool,
    open_label: Option<String>,
    changed: bool,
}

impl SqliteDocument {
    /// Creates (or opens, if it already exists) a document file.
    pub fn create(path: impl AsRef<Path>, title: &str) -> StorageResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let doc = Self::init(conn, title, Some(path.to_path_buf()))?;
        info!(path = %path.display(), document_id = %doc.id, "Created document");
        Ok(doc)
    }

    /// Opens an existing document file for reading and writing.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        Self::attach(conn, Some(path.to_path_buf()), false)
    }

    /// Opens an existing document file that rejects every write.
    pub fn open_read_only(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Self::attach(conn, Some(path.to_path_buf()), true)
    }

    /// Opens a private in-memory document (for testing).
    pub fn open_in_memory(title: &str) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, title, None)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of committed records across all schemas.
    pub fn record_count(&self) -> StorageResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn init(conn: Connection, title: &str, path: Option<PathBuf>) -> StorageResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS document_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                schema_id TEXT NOT NULL,
                name TEXT NOT NULL,
                field_name TEXT NOT NULL,
                value BLOB NOT NULL,
                UNIQUE(schema_id, name)
            );
            ",
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO document_meta (key, value) VALUES ('document_id', ?1)",
            params![DocumentId::new().to_string()],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO document_meta (key, value) VALUES ('title', ?1)",
            params![title],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO document_meta (key, value) VALUES ('revision', '0')",
            [],
        )?;
        Self::attach(conn, path, false)
    }

    fn attach(conn: Connection, path: Option<PathBuf>, read_only: bool) -> StorageResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let id = read_meta(&conn, "document_id")?;
        let id = DocumentId::parse(&id)
            .map_err(|e| StorageError::InvalidData(format!("invalid document_id: {e}")))?;
        let title = read_meta(&conn, "title")?;
        Ok(Self {
            conn,
            id,
            title,
            path,
            read_only,
            open_label: None,
            changed: false,
        })
    }
}

fn read_meta(conn: &Connection, key: &str) -> StorageResult<String> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM document_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StorageError::InvalidData(format!("not a document file: {e}")))?;
    value.ok_or_else(|| StorageError::InvalidData(format!("document metadata {key:?} missing")))
}

impl DocumentStorage for SqliteDocument {
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
        let value = read_meta(&self.conn, "revision")?;
        value
            .parse()
            .map_err(|e| StorageError::InvalidData(format!("invalid revision {value:?}: {e}")))
    }

    fn is_transaction_open(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn begin_transaction(&mut self, label: &str) -> StorageResult<()> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        if self.is_transaction_open() {
            return Err(StorageError::TransactionAlreadyOpen(
                self.open_label.clone().unwrap_or_default(),
            ));
        }
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        self.open_label = Some(label.to_string());
        self.changed = false;
        Ok(())
    }

    fn commit_transaction(&mut self) -> StorageResult<()> {
        if !self.is_transaction_open() {
            return Err(StorageError::NoTransaction);
        }
        if self.changed {
            self.conn.execute(
                "UPDATE document_meta SET value = CAST(CAST(value AS INTEGER) + 1 AS TEXT) WHERE key = 'revision'",
                [],
            )?;
        }
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| StorageError::CommitFailed(e.to_string()))?;
        self.open_label = None;
        self.changed = false;
        Ok(())
    }

    fn rollback_transaction(&mut self) -> StorageResult<()> {
        if !self.is_transaction_open() {
            return Err(StorageError::NoTransaction);
        }
        self.conn.execute_batch("ROLLBACK")?;
        let label = self.open_label.take().unwrap_or_default();
        debug!(document = %self.title, label = %label, "Transaction rolled back");
        self.changed = false;
        Ok(())
    }

    fn find_record(&self, schema: &SchemaDescriptor, name: &str) -> StorageResult<Option<Record>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, field_name, value FROM records WHERE schema_id = ?1 AND name = ?2",
                params![schema.id.to_string(), name],
                |row| {
                    let id: i64 = row.get(0)?;
                    let field_name: String = row.get(1)?;
                    let value: Vec<u8> = row.get(2)?;
                    Ok((id, field_name, value))
                },
            )
            .optional()?;

        Ok(row.map(|(id, field_name, value)| Record {
            id: RecordId::new(id as u64),
            schema_id: schema.id,
            name: name.to_string(),
            field_name,
            value,
        }))
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
        if !self.is_transaction_open() {
            return Err(StorageError::NoTransaction);
        }
        if self.find_record(schema, name)?.is_some() {
            return Err(StorageError::DuplicateRecord {
                schema_id: schema.id,
                name: name.to_string(),
            });
        }
        self.conn.execute(
            "INSERT INTO records (schema_id, name, field_name, value) VALUES (?1, ?2, ?3, ?4)",
            params![
                schema.id.to_string(),
                name,
                schema.field_name,
                identifier.to_bytes().to_vec()
            ],
        )?;
        let id = RecordId::new(self.conn.last_insert_rowid() as u64);
        self.changed = true;
        Ok(Record::new(id, schema, name, identifier))
    }
}
