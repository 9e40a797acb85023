//! Per-kind record schemas and validation.
//!
//! # Responsibility
//! - Hold the static required-field and field-type table for every kind.
//! - Validate records before any write reaches storage.
//!
//! # Invariants
//! - The required-field pass runs to completion before the type pass.
//! - Validation stops at the first violation.
//! - Fields outside a kind's type map are passed through unchecked.
//! - Student requires `major` but type-checks `course`; the two lists are
//!   deliberately kept as they are (see `student_major_is_required_but_untyped`).

use crate::model::document::Record;
use crate::model::kind::EntityKind;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Runtime type expected for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }

    /// Returns whether `value` has this runtime type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required fields and field types for one kind.
#[derive(Debug)]
pub struct KindSchema {
    pub required: &'static [&'static str],
    pub types: &'static [(&'static str, FieldType)],
}

impl KindSchema {
    /// Expected type for `field`, if the schema types it.
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.types
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, field_type)| *field_type)
    }
}

const DEPARTMENT_SCHEMA: KindSchema = KindSchema {
    required: &["id", "name", "building", "budget"],
    types: &[
        ("id", FieldType::String),
        ("name", FieldType::String),
        ("building", FieldType::String),
        ("budget", FieldType::Number),
    ],
};

const PROFESSOR_SCHEMA: KindSchema = KindSchema {
    required: &["id", "name", "email", "department", "specialization"],
    types: &[
        ("id", FieldType::String),
        ("name", FieldType::String),
        ("email", FieldType::String),
        ("department", FieldType::String),
        ("specialization", FieldType::String),
    ],
};

const STUDENT_SCHEMA: KindSchema = KindSchema {
    required: &["id", "name", "email", "enrollmentYear", "major"],
    types: &[
        ("id", FieldType::String),
        ("name", FieldType::String),
        ("email", FieldType::String),
        ("enrollmentYear", FieldType::Number),
        ("course", FieldType::String),
    ],
};

/// Returns the static schema for `kind`.
pub fn schema_for(kind: EntityKind) -> &'static KindSchema {
    match kind {
        EntityKind::Department => &DEPARTMENT_SCHEMA,
        EntityKind::Professor => &PROFESSOR_SCHEMA,
        EntityKind::Student => &STUDENT_SCHEMA,
    }
}

/// Schema violation found in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent.
    MissingField { field: String },
    /// A typed field holds a value of another runtime type.
    WrongType { field: String, expected: FieldType },
    /// An update tried to change the record's `id`.
    IdMismatch { expected: String, found: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "Missing required field: {field}"),
            Self::WrongType { field, expected } => {
                write!(f, "Invalid type for field {field}: expected {expected}")
            }
            Self::IdMismatch { expected, found } => {
                write!(f, "Record id cannot change from {expected} to {found}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Validates `record` against the schema of `kind`.
///
/// # Errors
/// - `MissingField` naming the first absent required field.
/// - `WrongType` naming the first typed field with a mismatched value.
pub fn validate(kind: EntityKind, record: &Record) -> Result<(), ValidationError> {
    let schema = schema_for(kind);

    if let Some(field) = schema
        .required
        .iter()
        .find(|field| !record.contains_key(**field))
    {
        return Err(ValidationError::MissingField {
            field: (*field).to_string(),
        });
    }

    for (field, expected) in schema.types {
        let Some(value) = record.get(*field) else {
            continue;
        };
        if !expected.matches(value) {
            return Err(ValidationError::WrongType {
                field: (*field).to_string(),
                expected: *expected,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate, FieldType, ValidationError};
    use crate::model::document::Record;
    use crate::model::kind::EntityKind;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn valid_department_passes() {
        let dept = record(json!({
            "id": "cs101",
            "name": "Computer Science",
            "building": "Tech Park",
            "budget": 1000000
        }));
        assert_eq!(validate(EntityKind::Department, &dept), Ok(()));
    }

    #[test]
    fn missing_field_is_reported_before_type_errors() {
        let dept = record(json!({"id": 7, "name": "Physics", "building": "B"}));
        assert_eq!(
            validate(EntityKind::Department, &dept),
            Err(ValidationError::MissingField {
                field: "budget".to_string()
            })
        );
    }

    #[test]
    fn wrong_type_names_field_and_expected_type() {
        let dept = record(json!({
            "id": "d1",
            "name": "Physics",
            "building": "B",
            "budget": "lots"
        }));
        let err = validate(EntityKind::Department, &dept).unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongType {
                field: "budget".to_string(),
                expected: FieldType::Number
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid type for field budget: expected number"
        );
    }

    #[test]
    fn unknown_fields_pass_through() {
        let prof = record(json!({
            "id": "p1",
            "name": "Dr. X",
            "email": "x@u.edu",
            "department": "cs101",
            "specialization": "AI",
            "office": 42
        }));
        assert_eq!(validate(EntityKind::Professor, &prof), Ok(()));
    }

    #[test]
    fn student_major_is_required_but_untyped() {
        let mut student = record(json!({
            "id": "s1",
            "name": "Ada",
            "email": "ada@u.edu",
            "enrollmentYear": 2023
        }));
        assert_eq!(
            validate(EntityKind::Student, &student),
            Err(ValidationError::MissingField {
                field: "major".to_string()
            })
        );

        student.insert("major".to_string(), json!(12));
        assert_eq!(validate(EntityKind::Student, &student), Ok(()));
    }

    #[test]
    fn student_course_is_typed_but_optional() {
        let mut student = record(json!({
            "id": "s1",
            "name": "Ada",
            "email": "ada@u.edu",
            "enrollmentYear": 2023,
            "major": "Math"
        }));
        assert_eq!(validate(EntityKind::Student, &student), Ok(()));

        student.insert("course".to_string(), json!(101));
        assert!(matches!(
            validate(EntityKind::Student, &student),
            Err(ValidationError::WrongType { field, .. }) if field == "course"
        ));
    }
}
