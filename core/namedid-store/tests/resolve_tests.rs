mod common;

use common::{init_tracing, Fault, TestDocument};
use namedid_model::{named_identifier_schema, SchemaDescriptor};
use namedid_storage::{
    DocumentStorage, MemoryDocument, SchemaRegistry, SqliteDocument, StorageError,
};
use namedid_store::{NamedIdentifierStore, StoreConfig, StoreError};
use namedid_types::{Identifier, SchemaId};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

fn fresh() -> (NamedIdentifierStore, MemoryDocument) {
    init_tracing();
    (NamedIdentifierStore::new(), MemoryDocument::new("test model"))
}

// ── Basic get-or-create ──────────────────────────────────────────

#[test]
fn tracking_id_scenario() {
    let (store, mut doc) = fresh();

    let first = store.resolve(&mut doc, "ProjectTrackingId", true).unwrap();
    assert!(first.created);

    let second = store.resolve(&mut doc, "ProjectTrackingId", true).unwrap();
    assert!(!second.created);
    assert_eq!(second.identifier, first.identifier);

    let other = store.resolve(&mut doc, "Other", false).unwrap_err();
    assert!(other.is_not_found());
}

#[test]
fn repeated_creation_is_idempotent() {
    let (store, mut doc) = fresh();
    let first = store.get_or_create(&mut doc, "X").unwrap();
    for _ in 0..5 {
        let again = store.get_or_create(&mut doc, "X").unwrap();
        assert_eq!(again.identifier, first.identifier);
        assert!(!again.created);
    }
    assert_eq!(doc.records().len(), 1);
    assert_eq!(doc.revision().unwrap(), 1);
}

#[test]
fn lookup_after_create_finds_entry() {
    let (store, mut doc) = fresh();
    let created = store.resolve(&mut doc, "X", true).unwrap();
    let found = store.resolve(&mut doc, "X", false).unwrap();
    assert_eq!(found.identifier, created.identifier);
    assert!(!found.created);
    assert_eq!(store.find(&doc, "X").unwrap(), Some(created.identifier));
}

#[test]
fn distinct_names_get_distinct_records() {
    let (store, mut doc) = fresh();
    let a = store.get_or_create(&mut doc, "Alpha").unwrap();
    let b = store.get_or_create(&mut doc, "Beta").unwrap();
    assert_ne!(a.identifier, b.identifier);
    assert_eq!(doc.records().len(), 2);
    assert_eq!(doc.revision().unwrap(), 2);
}

#[test]
fn resolved_into_entry() {
    let (store, mut doc) = fresh();
    let resolved = store.get_or_create(&mut doc, "X").unwrap();
    let entry = resolved.into_entry("X");
    assert_eq!(entry.name, "X");
    assert_eq!(entry.identifier, resolved.identifier);
}

// ── Lookup without create ────────────────────────────────────────

#[test]
fn missing_lookup_does_not_mutate() {
    init_tracing();
    let store = NamedIdentifierStore::new();
    let mut doc = TestDocument::new(MemoryDocument::new("doc"));

    let err = store.resolve(&mut doc, "Absent", false).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ref name) if name == "Absent"));
    assert_eq!(doc.begins, 0);
    assert_eq!(doc.revision().unwrap(), 0);
    assert!(!doc.inner.is_modified());
    assert!(doc.inner.records().is_empty());
}

#[test]
fn find_missing_is_none() {
    let (store, doc) = fresh();
    assert_eq!(store.find(&doc, "Absent").unwrap(), None);
}

#[test]
fn lookup_works_on_read_only_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    let (store, mut doc) = fresh();
    let created = store.get_or_create(&mut doc, "X").unwrap();
    doc.save_as(&path).unwrap();

    let mut ro = MemoryDocument::open_read_only(&path).unwrap();
    let found = store.resolve(&mut ro, "X", true).unwrap();
    assert_eq!(found.identifier, created.identifier);
    assert!(!found.created);
}

// ── Argument validation ──────────────────────────────────────────

#[test]
fn empty_name_is_rejected_before_host_access() {
    init_tracing();
    let store = NamedIdentifierStore::new();
    let mut doc = TestDocument::new(MemoryDocument::new("doc"));

    let err = store.resolve(&mut doc, "", true).unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));
    assert_eq!(doc.begins, 0);
    assert!(store.registry().is_empty());

    assert!(matches!(store.find(&doc, ""), Err(StoreError::InvalidArgument(_))));
}

// ── Faults and rollback ──────────────────────────────────────────

#[test]
fn commit_failure_leaves_no_entry() {
    init_tracing();
    let store = NamedIdentifierStore::new();
    let mut doc = TestDocument::with_fault(MemoryDocument::new("doc"), Fault::Commit);

    let err = store.resolve(&mut doc, "X", true).unwrap_err();
    assert!(matches!(err, StoreError::Storage(StorageError::CommitFailed(_))));
    assert!(!doc.is_transaction_open());

    doc.fault = None;
    assert!(store.resolve(&mut doc, "X", false).unwrap_err().is_not_found());
    assert_eq!(doc.revision().unwrap(), 0);
}

#[test]
fn create_failure_rolls_back() {
    init_tracing();
    let store = NamedIdentifierStore::new();
    let mut doc = TestDocument::with_fault(MemoryDocument::new("doc"), Fault::Create);

    let err = store.resolve(&mut doc, "X", true).unwrap_err();
    assert!(matches!(err, StoreError::Storage(StorageError::Unavailable(_))));
    assert!(!doc.is_transaction_open());
    assert_eq!(doc.commits, 0);
    assert!(doc.inner.records().is_empty());
}

#[test]
fn begin_failure_is_propagated() {
    init_tracing();
    let store = NamedIdentifierStore::new();
    let mut doc = TestDocument::with_fault(MemoryDocument::new("doc"), Fault::Begin);

    let err = store.resolve(&mut doc, "X", true).unwrap_err();
    assert!(matches!(err, StoreError::Storage(StorageError::Unavailable(_))));
    assert!(doc.inner.records().is_empty());
}

#[test]
fn read_only_document_cannot_create() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    MemoryDocument::new("doc").save_as(&path).unwrap();

    let store = NamedIdentifierStore::new();
    let mut ro = MemoryDocument::open_read_only(&path).unwrap();
    let err = store.resolve(&mut ro, "X", true).unwrap_err();
    assert!(matches!(err, StoreError::Storage(StorageError::ReadOnly)));
    assert!(ro.records().is_empty());
}

#[test]
fn commit_failure_on_sqlite_leaves_no_row() {
    let store = NamedIdentifierStore::new();
    let inner = SqliteDocument::open_in_memory("mem").unwrap();
    let mut doc = TestDocument::with_fault(inner, Fault::Commit);

    assert!(store.resolve(&mut doc, "X", true).is_err());
    assert!(!doc.is_transaction_open());
    assert_eq!(doc.inner.record_count().unwrap(), 0);
}

// ── Competing writers ────────────────────────────────────────────

#[test]
fn competing_writer_wins_and_is_returned() {
    init_tracing();
    let store = NamedIdentifierStore::new();
    let winner = Rc::new(Cell::new(None));

    let seen = Rc::clone(&winner);
    let competitor_store = store.clone();
    let mut doc = TestDocument::with_competitor(MemoryDocument::new("doc"), move |inner| {
        let r = competitor_store.get_or_create(inner, "Shared").unwrap();
        assert!(r.created);
        seen.set(Some(r.identifier));
    });

    let resolved = store.resolve(&mut doc, "Shared", true).unwrap();
    assert!(!resolved.created);
    assert_eq!(Some(resolved.identifier), winner.get());
    assert_eq!(doc.inner.records().len(), 1);
}

#[test]
fn competing_connection_on_same_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.sqlite");
    drop(SqliteDocument::create(&path, "shared").unwrap());

    let winner = Rc::new(Cell::new(None));
    let seen = Rc::clone(&winner);
    let other_path = path.clone();
    let mut mine = TestDocument::with_competitor(SqliteDocument::open(&path).unwrap(), move |_| {
        // A second process resolves the same name through its own connection.
        let store = NamedIdentifierStore::new();
        let mut theirs = SqliteDocument::open(&other_path).unwrap();
        let r = store.get_or_create(&mut theirs, "ProjectTrackingId").unwrap();
        seen.set(Some(r.identifier));
    });

    let store = NamedIdentifierStore::new();
    let resolved = store.resolve(&mut mine, "ProjectTrackingId", true).unwrap();
    assert!(!resolved.created);
    assert_eq!(Some(resolved.identifier), winner.get());
    assert_eq!(mine.inner.record_count().unwrap(), 1);
}

// ── Caller-supplied transactions ─────────────────────────────────

#[test]
fn joins_caller_transaction_without_committing() {
    let (store, mut doc) = fresh();
    doc.begin_transaction("caller").unwrap();

    let resolved = store.resolve(&mut doc, "X", true).unwrap();
    assert!(resolved.created);
    assert!(doc.is_transaction_open());
    // Visible inside the caller's transaction
    assert_eq!(store.find(&doc, "X").unwrap(), Some(resolved.identifier));

    doc.commit_transaction().unwrap();
    assert_eq!(store.find(&doc, "X").unwrap(), Some(resolved.identifier));
    assert_eq!(doc.records().len(), 1);
}

#[test]
fn caller_rollback_discards_entry() {
    let (store, mut doc) = fresh();
    doc.begin_transaction("caller").unwrap();
    store.resolve(&mut doc, "X", true).unwrap();
    doc.rollback_transaction().unwrap();

    assert!(store.resolve(&mut doc, "X", false).unwrap_err().is_not_found());
}

#[test]
fn joined_transaction_sees_entry_on_second_call() {
    let (store, mut doc) = fresh();
    doc.begin_transaction("caller").unwrap();
    let first = store.resolve(&mut doc, "X", true).unwrap();
    let second = store.resolve(&mut doc, "X", true).unwrap();
    assert_eq!(first.identifier, second.identifier);
    assert!(!second.created);
    doc.commit_transaction().unwrap();
    assert_eq!(doc.records().len(), 1);
}

// ── Persistence ──────────────────────────────────────────────────

#[test]
fn identifier_survives_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");

    let created = {
        let store = NamedIdentifierStore::new();
        let mut doc = MemoryDocument::new("model");
        let r = store.get_or_create(&mut doc, "ProjectTrackingId").unwrap();
        doc.save_as(&path).unwrap();
        r.identifier
    };

    // Fresh store and registry, as in a new process.
    let store = NamedIdentifierStore::new();
    let mut reopened = MemoryDocument::open(&path).unwrap();
    let again = store.get_or_create(&mut reopened, "ProjectTrackingId").unwrap();
    assert_eq!(again.identifier, created);
    assert!(!again.created);
    assert!(!reopened.is_modified());
}

#[test]
fn identifier_survives_sqlite_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.sqlite");

    let created = {
        let mut doc = SqliteDocument::create(&path, "model").unwrap();
        NamedIdentifierStore::new().get_or_create(&mut doc, "X").unwrap().identifier
    };

    let mut doc = SqliteDocument::open(&path).unwrap();
    let again = NamedIdentifierStore::new().resolve(&mut doc, "X", true).unwrap();
    assert_eq!(again.identifier, created);
    assert!(!again.created);
}

// ── Schema handling ──────────────────────────────────────────────

#[test]
fn records_under_other_schema_are_invisible() {
    let (store, mut doc) = fresh();
    let foreign = SchemaDescriptor::identifier(SchemaId::from_u128(0xf00d), "Foreign", "Identifier");
    doc.begin_transaction("foreign").unwrap();
    doc.create_record(&foreign, "X", Identifier::new()).unwrap();
    doc.commit_transaction().unwrap();

    assert!(store.resolve(&mut doc, "X", false).unwrap_err().is_not_found());
    let created = store.resolve(&mut doc, "X", true).unwrap();
    assert!(created.created);
    assert_eq!(doc.records().len(), 2);
}

#[test]
fn stores_with_different_schemas_are_independent() {
    let registry = Arc::new(SchemaRegistry::new());
    let default_store = NamedIdentifierStore::with_registry(Arc::clone(&registry));
    let custom_store = NamedIdentifierStore::with_config(
        Arc::clone(&registry),
        StoreConfig {
            schema: SchemaDescriptor::identifier(SchemaId::from_u128(0x42), "PluginIds", "Guid"),
            ..StoreConfig::default()
        },
    );
    let mut doc = MemoryDocument::new("doc");

    let a = default_store.get_or_create(&mut doc, "Name").unwrap();
    let b = custom_store.get_or_create(&mut doc, "Name").unwrap();
    assert!(a.created && b.created);
    assert_ne!(a.identifier, b.identifier);
    assert_eq!(registry.len(), 2);
}

#[test]
fn conflicting_schema_declaration_is_a_storage_fault() {
    let registry = Arc::new(SchemaRegistry::new());
    let mut clashing = named_identifier_schema();
    clashing.field_name = "Different".into();
    registry.ensure_schema(&clashing).unwrap();

    let store = NamedIdentifierStore::with_registry(registry);
    let mut doc = MemoryDocument::new("doc");
    let err = store.resolve(&mut doc, "X", true).unwrap_err();
    assert!(matches!(err, StoreError::Storage(StorageError::SchemaMismatch(_))));
    assert!(doc.records().is_empty());
}

#[test]
fn works_through_trait_object() {
    let store = NamedIdentifierStore::new();
    let mut memory = MemoryDocument::new("a");
    let mut sqlite = SqliteDocument::open_in_memory("b").unwrap();
    let docs: [&mut dyn DocumentStorage; 2] = [&mut memory, &mut sqlite];
    for doc in docs {
        let first = store.resolve(doc, "X", true).unwrap();
        let second = store.resolve(doc, "X", true).unwrap();
        assert_eq!(first.identifier, second.identifier);
    }
}

// ── Config ───────────────────────────────────────────────────────

#[test]
fn default_config_uses_builtin_schema() {
    let store = NamedIdentifierStore::new();
    assert_eq!(store.schema(), &named_identifier_schema());
}

#[test]
fn config_from_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, r#"{"transaction_label":"Assign tracking id"}"#).unwrap();

    let config = StoreConfig::from_file(&path).unwrap();
    assert_eq!(config.transaction_label, "Assign tracking id");
    assert_eq!(config.schema, named_identifier_schema());
}

#[test]
fn config_from_malformed_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(StoreConfig::from_file(&path).is_err());
}
