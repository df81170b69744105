use namedid_types::SchemaId;
use serde::{Deserialize, Serialize};

/// Schema id tagging every named-identifier record.
pub const NAMED_IDENTIFIER_SCHEMA_ID: SchemaId =
    SchemaId::from_u128(0x5f3c_9a2e_71d4_4b08_a6e1_0c2b_9d87_f413);

/// Human-readable schema name.
pub const NAMED_IDENTIFIER_SCHEMA_NAME: &str = "NamedIdentifierStorage";

/// Name of the single field holding the identifier.
pub const NAMED_IDENTIFIER_FIELD: &str = "Identifier";

/// Layout version. Bumping it requires a new schema id.
pub const NAMED_IDENTIFIER_SCHEMA_VERSION: u32 = 1;

/// Describes a storage schema: a stable identity tag plus the layout of
/// its single field.
///
/// Two descriptors with the same `id` must be identical; the registry
/// rejects a re-declaration that changes the layout under an existing id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub id: SchemaId,
    pub name: String,
    pub field_name: String,
    pub field_type: FieldType,
    pub version: u32,
    /// Reverse-DNS style vendor tag of the schema author.
    pub vendor_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub documentation: String,
}

impl SchemaDescriptor {
    /// Shorthand for a schema holding a single identifier field.
    pub fn identifier(id: SchemaId, name: &str, field_name: &str) -> Self {
        Self {
            id,
            name: name.into(),
            field_name: field_name.into(),
            field_type: FieldType::Identifier,
            version: 1,
            vendor_id: String::new(),
            documentation: String::new(),
        }
    }

    pub fn with_vendor(mut self, vendor_id: &str) -> Self {
        self.vendor_id = vendor_id.into();
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_documentation(mut self, documentation: &str) -> Self {
        self.documentation = documentation.into();
        self
    }

    /// Checks the descriptor is well formed, returning a reason if not.
    ///
    /// The schema and field names must be identifiers: an ASCII letter
    /// followed by ASCII letters, digits or underscores.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_nil() {
            return Err("schema id must not be nil".into());
        }
        if !is_identifier(&self.name) {
            return Err(format!("invalid schema name {:?}", self.name));
        }
        if !is_identifier(&self.field_name) {
            return Err(format!("invalid field name {:?}", self.field_name));
        }
        if self.version == 0 {
            return Err("schema version must be at least 1".into());
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The data type of a schema's field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// A 128-bit identifier stored as a 16-byte blob.
    Identifier,
}

/// The descriptor every named-identifier record is tagged with.
pub fn named_identifier_schema() -> SchemaDescriptor {
    SchemaDescriptor::identifier(
        NAMED_IDENTIFIER_SCHEMA_ID,
        NAMED_IDENTIFIER_SCHEMA_NAME,
        NAMED_IDENTIFIER_FIELD,
    )
    .with_version(NAMED_IDENTIFIER_SCHEMA_VERSION)
    .with_vendor("io.namedid")
    .with_documentation("Document-scoped mapping from a name to a unique identifier.")
}
