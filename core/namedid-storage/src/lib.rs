//! Extensible storage adapter.
//!
//! A thin facade over a host document's tagged-storage facility:
//!
//! - [`SchemaRegistry`] declares and finds storage schemas for the session
//! - [`DocumentStorage`] finds and creates schema-tagged [`Record`]s inside a
//!   document and exposes its write transactions
//! - [`Transaction`] scopes a write transaction, rolling back on drop
//!
//! Two document implementations are provided: [`MemoryDocument`] (in memory,
//! saved as JSON) and [`SqliteDocument`] (a SQLite database file).

mod document;
mod error;
mod memory;
mod record;
mod registry;
mod sqlite;
mod transaction;

pub use document::DocumentStorage;
pub use error::{StorageError, StorageResult};
pub use memory::{MemoryDocument, DOCUMENT_FORMAT_VERSION};
pub use record::Record;
pub use registry::SchemaRegistry;
pub use sqlite::SqliteDocument;
pub use transaction::Transaction;
