//! Named identifier store.
//!
//! Hands out one stable identifier per name per document. The first
//! [`NamedIdentifierStore::resolve`] of a name (with creation requested)
//! generates a random identifier and persists it inside the document; every
//! later call, in this process or after the document is reopened elsewhere,
//! returns the same value.
//!
//! ```no_run
//! use namedid_storage::MemoryDocument;
//! use namedid_store::NamedIdentifierStore;
//!
//! let store = NamedIdentifierStore::new();
//! let mut doc = MemoryDocument::new("Tower A");
//! let first = store.resolve(&mut doc, "ProjectTrackingId", true)?;
//! let again = store.resolve(&mut doc, "ProjectTrackingId", true)?;
//! assert!(first.created && !again.created);
//! assert_eq!(first.identifier, again.identifier);
//! # Ok::<(), namedid_store::StoreError>(())
//! ```

mod config;
mod error;
mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use store::{NamedIdentifierStore, Resolved};
