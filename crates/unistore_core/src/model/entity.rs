//! Typed views over the three record kinds.
//!
//! Stored records stay untyped JSON objects (updates may carry fields outside
//! the schema); these structs are a convenience for callers that build or read
//! well-formed records.

use crate::model::document::Record;
use crate::model::kind::EntityKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shared behavior for typed entity structs.
pub trait Entity: Serialize + DeserializeOwned {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Converts into the untyped record stored in the document.
    fn to_record(&self) -> Result<Record, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(record) => Ok(record),
            _ => Err(serde::ser::Error::custom("entity must serialize to an object")),
        }
    }

    /// Reads a typed entity back from a stored record.
    fn from_record(record: Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(record))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub building: String,
    pub budget: f64,
}

/// `department` references `Department::id`; existence is not checked on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub specialization: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Any JSON number, like the schema allows.
    pub enrollment_year: f64,
    /// Required but untyped, so kept as raw JSON.
    pub major: Value,
    /// Type-checked as a string when present, never required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

impl Entity for Department {
    const KIND: EntityKind = EntityKind::Department;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Professor {
    const KIND: EntityKind = EntityKind::Professor;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Student {
    const KIND: EntityKind = EntityKind::Student;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::{Entity, Student};
    use serde_json::json;

    #[test]
    fn student_uses_camel_case_wire_names() {
        let student = Student {
            id: "s1".to_string(),
            name: "Ada".to_string(),
            email: "ada@u.edu".to_string(),
            enrollment_year: 2023.0,
            major: json!("Mathematics"),
            course: None,
        };

        let record = student.to_record().unwrap();
        assert_eq!(record["enrollmentYear"], json!(2023.0));
        assert!(!record.contains_key("course"));

        let decoded = Student::from_record(record).unwrap();
        assert_eq!(decoded, student);
    }
}
