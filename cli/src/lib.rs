//! Command implementations for the `namedid` binary.
//!
//! Kept in a library so the commands can be exercised without a process.

use anyhow::{Context, Result};
use clap::ValueEnum;
use namedid_storage::{DocumentStorage, MemoryDocument, SqliteDocument};
use namedid_store::{NamedIdentifierStore, StoreError};
use namedid_types::Identifier;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

/// On-disk document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Json,
    Sqlite,
}

impl Backend {
    /// Picks a backend from the file extension: `.sqlite`/`.db` use SQLite.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("sqlite") | Some("db") => Backend::Sqlite,
            _ => Backend::Json,
        }
    }
}

/// What a resolve command reports back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Report {
    Resolved {
        name: String,
        identifier: Identifier,
        created: bool,
    },
    NotFound {
        name: String,
    },
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Resolved {
                identifier,
                created: true,
                ..
            } => write!(f, "{identifier} (created)"),
            Report::Resolved { identifier, .. } => write!(f, "{identifier} (existing)"),
            Report::NotFound { name } => write!(f, "no identifier stored under {name:?}"),
        }
    }
}

/// Creates an empty document file.
pub fn init_document(path: &Path, title: &str, backend: Backend) -> Result<()> {
    match backend {
        Backend::Json => {
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            MemoryDocument::new(title)
                .save_as(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Backend::Sqlite => {
            SqliteDocument::create(path, title)
                .with_context(|| format!("Failed to create {}", path.display()))?;
        }
    }
    info!(path = %path.display(), ?backend, "Initialized document");
    Ok(())
}

/// Resolves `name` in the document at `path`, saving it if an entry was created.
pub fn resolve_in_file(
    store: &NamedIdentifierStore,
    path: &Path,
    name: &str,
    create: bool,
    backend: Backend,
) -> Result<Report> {
    match backend {
        Backend::Json => {
            let mut doc = if create {
                MemoryDocument::open(path)
            } else {
                MemoryDocument::open_read_only(path)
            }
            .with_context(|| format!("Failed to open {}", path.display()))?;
            let report = resolve_in(store, &mut doc, name, create)?;
            if doc.is_modified() {
                doc.save().context("Failed to save document")?;
            }
            Ok(report)
        }
        Backend::Sqlite => {
            let mut doc = if create {
                SqliteDocument::open(path)
            } else {
                SqliteDocument::open_read_only(path)
            }
            .with_context(|| format!("Failed to open {}", path.display()))?;
            resolve_in(store, &mut doc, name, create)
        }
    }
}

fn resolve_in<D>(
    store: &NamedIdentifierStore,
    doc: &mut D,
    name: &str,
    create: bool,
) -> Result<Report>
where
    D: DocumentStorage + ?Sized,
{
    match store.resolve(doc, name, create) {
        Ok(resolved) => Ok(Report::Resolved {
            name: name.to_string(),
            identifier: resolved.identifier,
            created: resolved.created,
        }),
        Err(StoreError::NotFound(missing)) => Ok(Report::NotFound { name: missing }),
        Err(e) => Err(e).with_context(|| format!("Failed to resolve {name:?} in {}", doc.title())),
    }
}
