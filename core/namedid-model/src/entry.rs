use namedid_types::Identifier;
use serde::{Deserialize, Serialize};

/// A persisted name → identifier pair.
///
/// There is at most one entry per name in a document, and its identifier
/// never changes once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub identifier: Identifier,
}

impl Entry {
    pub fn new(name: impl Into<String>, identifier: Identifier) -> Self {
        Self {
            name: name.into(),
            identifier,
        }
    }
}
