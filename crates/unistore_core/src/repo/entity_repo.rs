//! Entity repository contract and JSON document implementation.
//!
//! # Responsibility
//! - Provide add/update/delete/search over the three entity collections.
//! - Snapshot the document before every write that changes it.
//! - Enforce department -> professor referential integrity on delete.
//!
//! # Invariants
//! - Each call reads the whole document, mutates it in memory and writes the
//!   whole document back in one `write`.
//! - All validation and integrity checks run before the snapshot and write,
//!   so a rejected call leaves no trace on disk.
//! - Exactly one snapshot is written per successful mutating call.
//! - There is no locking: concurrent writers race and the last write wins.

use crate::backup::{list_snapshots, write_snapshot};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::model::document::{Document, Record};
use crate::model::kind::EntityKind;
use crate::repo::error::{Operation, OperationError, OperationResult, StoreError, StoreResult};
use crate::schema::{validate, ValidationError};
use crate::search::criteria::{matches, SearchCriteria};
use crate::storage::{DocumentStorage, FsStorage};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::time::Instant;

/// Repository interface for entity CRUD and search.
pub trait EntityRepository {
    /// Creates the document and backup directory when missing.
    fn initialize(&self) -> OperationResult<()>;
    /// Inserts a new record and returns it.
    fn add(&self, kind: EntityKind, record: Record) -> OperationResult<Record>;
    /// Shallow-merges `updates` onto an existing record and returns the result.
    fn update(&self, kind: EntityKind, id: &str, updates: Record) -> OperationResult<Record>;
    /// Removes a record. Returns `true` on success.
    fn delete(&self, kind: EntityKind, id: &str) -> OperationResult<bool>;
    /// Returns every record of `kind` matching all `criteria`.
    fn search(&self, kind: EntityKind, criteria: &SearchCriteria) -> OperationResult<Vec<Record>>;
    /// Reads one record by id.
    fn get(&self, kind: EntityKind, id: &str) -> OperationResult<Option<Record>>;
    /// Returns every record of `kind`.
    fn list(&self, kind: EntityKind) -> OperationResult<Vec<Record>>;
    /// Lists snapshot file names, oldest first.
    fn list_backups(&self) -> OperationResult<Vec<String>>;
    /// Replaces the document with a snapshot's content.
    fn restore_backup(&self, name: &str) -> OperationResult<()>;
}

/// Entity store persisted as one pretty-printed JSON document.
pub struct JsonEntityStore<S: DocumentStorage = FsStorage, C: Clock = SystemClock> {
    config: StoreConfig,
    storage: S,
    clock: C,
}

impl JsonEntityStore {
    /// Opens a store on the local filesystem using wall-clock timestamps.
    pub fn open(config: StoreConfig) -> Self {
        Self::with_parts(config, FsStorage, SystemClock)
    }
}

impl<S: DocumentStorage, C: Clock> JsonEntityStore<S, C> {
    pub fn with_parts(config: StoreConfig, storage: S, clock: C) -> Self {
        Self {
            config,
            storage,
            clock,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read_document(&self) -> StoreResult<Document> {
        let path = &self.config.document_path;
        let text = self
            .storage
            .read_to_string(path)
            .map_err(|err| StoreError::io("read", path, err))?;
        serde_json::from_str(&text).map_err(|source| StoreError::InvalidDocument {
            path: path.clone(),
            source,
        })
    }

    fn encode(&self, document: &Document) -> StoreResult<String> {
        serde_json::to_string_pretty(document).map_err(|source| StoreError::InvalidDocument {
            path: self.config.document_path.clone(),
            source,
        })
    }

    fn write_document(&self, document: &Document) -> StoreResult<()> {
        let text = self.encode(document)?;
        let path = &self.config.document_path;
        self.storage
            .write(path, &text)
            .map_err(|err| StoreError::io("write", path, err))
    }

    /// Writes `document` (the pre-mutation state) as a new snapshot.
    fn snapshot(&self, document: &Document) -> StoreResult<()> {
        let text = self.encode(document)?;
        let dir = &self.config.backup_dir;
        let path = write_snapshot(&self.storage, &self.clock, dir, &text)
            .map_err(|err| StoreError::io("write backup in", dir, err))?;
        debug!(
            "event=backup_write module=store status=ok file={}",
            path.display()
        );
        Ok(())
    }

    fn initialize_inner(&self) -> StoreResult<()> {
        let path = &self.config.document_path;
        if !self.storage.exists(path) {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                self.storage
                    .create_dir_all(parent)
                    .map_err(|err| StoreError::io("create directory", parent, err))?;
            }
            self.write_document(&Document::empty())?;
            info!(
                "event=store_init module=store status=created path={}",
                path.display()
            );
        }

        let dir = &self.config.backup_dir;
        self.storage
            .create_dir_all(dir)
            .map_err(|err| StoreError::io("create directory", dir, err))
    }

    fn add_inner(&self, kind: EntityKind, record: Record) -> StoreResult<Record> {
        validate(kind, &record)?;
        let id = record_id(&record)?;

        let mut document = self.read_document()?;
        if document.collection(kind).contains_key(&id) {
            return Err(StoreError::Conflict { kind, id });
        }

        self.snapshot(&document)?;
        document
            .collection_mut(kind)
            .insert(id, Value::Object(record.clone()));
        self.write_document(&document)?;
        Ok(record)
    }

    fn update_inner(&self, kind: EntityKind, id: &str, updates: Record) -> StoreResult<Record> {
        let mut document = self.read_document()?;
        let Some(existing) = document.record(kind, id) else {
            return Err(StoreError::NotFound {
                kind,
                id: id.to_string(),
            });
        };

        let mut merged = existing.clone();
        merged.extend(updates);
        validate(kind, &merged)?;
        let merged_id = record_id(&merged)?;
        if merged_id != id {
            return Err(ValidationError::IdMismatch {
                expected: id.to_string(),
                found: merged_id,
            }
            .into());
        }

        self.snapshot(&document)?;
        document
            .collection_mut(kind)
            .insert(id.to_string(), Value::Object(merged.clone()));
        self.write_document(&document)?;
        Ok(merged)
    }

    fn delete_inner(&self, kind: EntityKind, id: &str) -> StoreResult<bool> {
        let mut document = self.read_document()?;
        if !document.collection(kind).contains_key(id) {
            return Err(StoreError::NotFound {
                kind,
                id: id.to_string(),
            });
        }

        if kind == EntityKind::Department && has_assigned_professors(&document, id) {
            return Err(StoreError::Dependency {
                kind,
                id: id.to_string(),
            });
        }

        self.snapshot(&document)?;
        document.collection_mut(kind).remove(id);
        self.write_document(&document)?;
        Ok(true)
    }

    fn search_inner(
        &self,
        kind: EntityKind,
        criteria: &SearchCriteria,
    ) -> StoreResult<Vec<Record>> {
        let document = self.read_document()?;
        let hits: Vec<Record> = document
            .collection(kind)
            .values()
            .filter_map(Value::as_object)
            .filter(|record| matches(record, criteria))
            .cloned()
            .collect();
        debug!(
            "event=entity_scan module=store collection={} scanned={} hits={}",
            kind.collection_key(),
            document.collection(kind).len(),
            hits.len()
        );
        Ok(hits)
    }

    fn get_inner(&self, kind: EntityKind, id: &str) -> StoreResult<Option<Record>> {
        let document = self.read_document()?;
        Ok(document.record(kind, id).cloned())
    }

    fn list_backups_inner(&self) -> StoreResult<Vec<String>> {
        let dir = &self.config.backup_dir;
        list_snapshots(&self.storage, dir).map_err(|err| StoreError::io("list", dir, err))
    }

    fn restore_backup_inner(&self, name: &str) -> StoreResult<()> {
        let known = self.list_backups_inner()?;
        let backup_path = self.config.backup_dir.join(name);
        if !known.iter().any(|candidate| candidate == name) {
            return Err(StoreError::io(
                "read",
                backup_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such backup"),
            ));
        }

        let text = self
            .storage
            .read_to_string(&backup_path)
            .map_err(|err| StoreError::io("read", &backup_path, err))?;
        let restored: Document =
            serde_json::from_str(&text).map_err(|source| StoreError::InvalidDocument {
                path: backup_path.clone(),
                source,
            })?;

        let current = self.read_document()?;
        self.snapshot(&current)?;
        self.write_document(&restored)
    }

    fn finish<T>(
        &self,
        operation: Operation,
        kind: Option<EntityKind>,
        started_at: Instant,
        result: StoreResult<T>,
    ) -> OperationResult<T> {
        let kind_label = kind.map(EntityKind::as_str).unwrap_or("-");
        match result {
            Ok(value) => {
                debug!(
                    "event=entity_{} module=store status=ok kind={} duration_ms={}",
                    operation.as_str(),
                    kind_label,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                let err = OperationError::new(operation, kind, err);
                match err.cause() {
                    StoreError::Io { .. } | StoreError::InvalidDocument { .. } => error!(
                        "event=entity_{} module=store status=error kind={} duration_ms={} error={}",
                        operation.as_str(),
                        kind_label,
                        started_at.elapsed().as_millis(),
                        err
                    ),
                    _ => warn!(
                        "event=entity_{} module=store status=rejected kind={} duration_ms={} error={}",
                        operation.as_str(),
                        kind_label,
                        started_at.elapsed().as_millis(),
                        err
                    ),
                }
                Err(err)
            }
        }
    }
}

impl<S: DocumentStorage, C: Clock> EntityRepository for JsonEntityStore<S, C> {
    fn initialize(&self) -> OperationResult<()> {
        let started_at = Instant::now();
        let result = self.initialize_inner();
        self.finish(Operation::Initialize, None, started_at, result)
    }

    fn add(&self, kind: EntityKind, record: Record) -> OperationResult<Record> {
        let started_at = Instant::now();
        let result = self.add_inner(kind, record);
        self.finish(Operation::Add, Some(kind), started_at, result)
    }

    fn update(&self, kind: EntityKind, id: &str, updates: Record) -> OperationResult<Record> {
        let started_at = Instant::now();
        let result = self.update_inner(kind, id, updates);
        self.finish(Operation::Update, Some(kind), started_at, result)
    }

    fn delete(&self, kind: EntityKind, id: &str) -> OperationResult<bool> {
        let started_at = Instant::now();
        let result = self.delete_inner(kind, id);
        self.finish(Operation::Delete, Some(kind), started_at, result)
    }

    fn search(
        &self,
        kind: EntityKind,
        criteria: &SearchCriteria,
    ) -> OperationResult<Vec<Record>> {
        let started_at = Instant::now();
        let result = self.search_inner(kind, criteria);
        self.finish(Operation::Search, Some(kind), started_at, result)
    }

    fn get(&self, kind: EntityKind, id: &str) -> OperationResult<Option<Record>> {
        let started_at = Instant::now();
        let result = self.get_inner(kind, id);
        self.finish(Operation::Get, Some(kind), started_at, result)
    }

    fn list(&self, kind: EntityKind) -> OperationResult<Vec<Record>> {
        let started_at = Instant::now();
        let result = self.search_inner(kind, &SearchCriteria::new());
        self.finish(Operation::List, Some(kind), started_at, result)
    }

    fn list_backups(&self) -> OperationResult<Vec<String>> {
        let started_at = Instant::now();
        let result = self.list_backups_inner();
        self.finish(Operation::ListBackups, None, started_at, result)
    }

    fn restore_backup(&self, name: &str) -> OperationResult<()> {
        let started_at = Instant::now();
        let result = self.restore_backup_inner(name);
        self.finish(Operation::RestoreBackup, None, started_at, result)
    }
}

// Validation has already established that `id` is present and a string.
fn record_id(record: &Record) -> StoreResult<String> {
    match record.get("id").and_then(Value::as_str) {
        Some(id) => Ok(id.to_string()),
        None => Err(ValidationError::MissingField {
            field: "id".to_string(),
        }
        .into()),
    }
}

fn has_assigned_professors(document: &Document, department_id: &str) -> bool {
    document
        .professors
        .values()
        .filter_map(|professor| professor.get("department"))
        .any(|department| department.as_str() == Some(department_id))
}

#[cfg(test)]
mod tests {
    use super::{EntityRepository, JsonEntityStore};
    use crate::clock::FixedClock;
    use crate::config::StoreConfig;
    use crate::model::document::Record;
    use crate::model::kind::EntityKind;
    use crate::repo::error::StoreError;
    use crate::storage::{DocumentStorage, MemoryStorage};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::path::Path;

    fn object(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn memory_store() -> JsonEntityStore<MemoryStorage, FixedClock> {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap());
        let store = JsonEntityStore::with_parts(
            StoreConfig::new("/uni/database.json"),
            MemoryStorage::new(),
            clock,
        );
        store.initialize().unwrap();
        store
    }

    fn department() -> Record {
        object(json!({
            "id": "cs101",
            "name": "Computer Science",
            "building": "Tech Park",
            "budget": 1000000
        }))
    }

    #[test]
    fn failed_document_write_surfaces_as_io_error_after_backup() {
        let store = memory_store();
        store
            .storage()
            .fail_writes_to("/uni/database.json")
            .unwrap();

        let err = store.add(EntityKind::Department, department()).unwrap_err();
        assert!(matches!(err.cause(), StoreError::Io { action: "write", .. }));
        assert!(err.to_string().starts_with("Failed to add department: "));

        // The pre-write snapshot exists and allows manual recovery.
        assert_eq!(store.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn backup_failure_aborts_the_mutation() {
        let store = memory_store();
        store
            .storage()
            .fail_writes_to("/uni/backups/backup_2024-05-06T07-08-09-000Z.json")
            .unwrap();

        let err = store.add(EntityKind::Department, department()).unwrap_err();
        assert!(matches!(err.cause(), StoreError::Io { .. }));
        assert!(store
            .get(EntityKind::Department, "cs101")
            .unwrap()
            .is_none());
    }

    #[test]
    fn backups_recreate_a_deleted_backup_directory() {
        let store = memory_store();
        store
            .storage()
            .remove_dir_all(Path::new("/uni/backups"))
            .unwrap();

        store.add(EntityKind::Department, department()).unwrap();
        assert_eq!(store.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn corrupt_document_is_reported_as_invalid() {
        let store = memory_store();
        store
            .storage()
            .write(Path::new("/uni/database.json"), "{not json")
            .unwrap();

        let err = store
            .search(EntityKind::Department, &Record::new())
            .unwrap_err();
        assert!(matches!(err.cause(), StoreError::InvalidDocument { .. }));
        assert!(err.to_string().starts_with("Search failed: "));
    }

    #[test]
    fn operations_before_initialize_fail_with_io() {
        let store = JsonEntityStore::with_parts(
            StoreConfig::new("/uni/database.json"),
            MemoryStorage::new(),
            FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        );
        let err = store.add(EntityKind::Department, department()).unwrap_err();
        assert!(matches!(err.cause(), StoreError::Io { action: "read", .. }));
    }
}
