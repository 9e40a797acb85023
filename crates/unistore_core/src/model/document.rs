//! Persisted document shape.
//!
//! # Invariants
//! - Serialized form is exactly `{departments, professors, students}`.
//! - Each mapping is keyed by the record's `id`.

use crate::model::kind::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat key-value entity instance.
pub type Record = Map<String, Value>;

/// Mapping from entity id to record for a single kind.
pub type Collection = Map<String, Value>;

/// The whole store contents, read and written in one piece.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub departments: Collection,
    #[serde(default)]
    pub professors: Collection,
    #[serde(default)]
    pub students: Collection,
}

impl Document {
    /// Creates a document with all three collections empty.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn collection(&self, kind: EntityKind) -> &Collection {
        match kind {
            EntityKind::Department => &self.departments,
            EntityKind::Professor => &self.professors,
            EntityKind::Student => &self.students,
        }
    }

    pub fn collection_mut(&mut self, kind: EntityKind) -> &mut Collection {
        match kind {
            EntityKind::Department => &mut self.departments,
            EntityKind::Professor => &mut self.professors,
            EntityKind::Student => &mut self.students,
        }
    }

    /// Returns the record stored under `id`, if it is a JSON object.
    pub fn record(&self, kind: EntityKind, id: &str) -> Option<&Record> {
        self.collection(kind).get(id).and_then(Value::as_object)
    }

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.departments.len() + self.professors.len() + self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use crate::model::kind::EntityKind;
    use serde_json::json;

    #[test]
    fn empty_document_serializes_all_collections() {
        let value = serde_json::to_value(Document::empty()).unwrap();
        assert_eq!(
            value,
            json!({"departments": {}, "professors": {}, "students": {}})
        );
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let doc: Document =
            serde_json::from_value(json!({"departments": {"d1": {"id": "d1"}}})).unwrap();
        assert_eq!(doc.departments.len(), 1);
        assert!(doc.collection(EntityKind::Student).is_empty());
        assert!(doc.record(EntityKind::Department, "d1").is_some());
    }
}
