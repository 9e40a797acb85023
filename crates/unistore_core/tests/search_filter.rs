use serde_json::{json, Value};
use tempfile::TempDir;
use unistore_core::{
    EntityKind, EntityRepository, JsonEntityStore, Record, SearchCriteria, StoreConfig,
    StoreError,
};

fn object(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn seeded_store() -> (TempDir, JsonEntityStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonEntityStore::open(StoreConfig::new(dir.path().join("database.json")));
    store.initialize().unwrap();

    for department in [
        json!({"id": "cs101", "name": "Computer Science", "building": "Tech Park", "budget": 1000000}),
        json!({"id": "ce200", "name": "Computer Engineering", "building": "Tech Park", "budget": 750000}),
        json!({"id": "bio10", "name": "Biology", "building": "Life Sciences", "budget": 10000000}),
    ] {
        store.add(EntityKind::Department, object(department)).unwrap();
    }
    (dir, store)
}

fn ids(records: &[Record]) -> Vec<String> {
    let mut ids: Vec<String> = records
        .iter()
        .map(|record| record["id"].as_str().unwrap().to_string())
        .collect();
    ids.sort();
    ids
}

#[test]
fn text_search_is_case_insensitive_substring() {
    let (_dir, store) = seeded_store();

    let hits = store
        .search(EntityKind::Department, &object(json!({"name": "computer"})))
        .unwrap();
    assert_eq!(ids(&hits), vec!["ce200", "cs101"]);
}

#[test]
fn numeric_search_is_exact_equality() {
    let (_dir, store) = seeded_store();

    let hits = store
        .search(EntityKind::Department, &object(json!({"budget": 1000000})))
        .unwrap();
    assert_eq!(ids(&hits), vec!["cs101"]);
}

#[test]
fn criteria_combine_with_and() {
    let (_dir, store) = seeded_store();

    let hits = store
        .search(
            EntityKind::Department,
            &object(json!({"building": "tech", "name": "engineering"})),
        )
        .unwrap();
    assert_eq!(ids(&hits), vec!["ce200"]);
}

#[test]
fn empty_criteria_return_every_record_of_the_kind() {
    let (_dir, store) = seeded_store();

    let all = store
        .search(EntityKind::Department, &SearchCriteria::new())
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(store
        .search(EntityKind::Student, &SearchCriteria::new())
        .unwrap()
        .is_empty());
}

#[test]
fn absent_field_never_matches() {
    let (_dir, store) = seeded_store();

    let hits = store
        .search(EntityKind::Department, &object(json!({"dean": "smith"})))
        .unwrap();
    assert!(hits.is_empty());
}

#[test]
fn search_on_missing_document_is_wrapped() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonEntityStore::open(StoreConfig::new(dir.path().join("missing.json")));

    let err = store
        .search(EntityKind::Department, &SearchCriteria::new())
        .unwrap_err();
    assert!(matches!(err.cause(), StoreError::Io { .. }));
    assert!(err.to_string().starts_with("Search failed: "));
}
