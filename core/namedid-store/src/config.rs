//! Store configuration.

use namedid_model::{named_identifier_schema, SchemaDescriptor};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a [`NamedIdentifierStore`](crate::NamedIdentifierStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Schema every entry record is tagged with.
    pub schema: SchemaDescriptor,
    /// Label given to transactions the store opens itself.
    pub transaction_label: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            schema: named_identifier_schema(),
            transaction_label: "Create named identifier".to_string(),
        }
    }
}

impl StoreConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(std::io::Error::other)
    }
}
