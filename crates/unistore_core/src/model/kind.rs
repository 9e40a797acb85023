//! Entity kind selector.
//!
//! A kind picks both the validation schema and the storage collection.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the three entity collections managed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Department,
    Professor,
    Student,
}

impl EntityKind {
    /// Every kind, in document order.
    pub const ALL: [EntityKind; 3] = [Self::Department, Self::Professor, Self::Student];

    /// Singular lowercase name used in error messages and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::Professor => "professor",
            Self::Student => "student",
        }
    }

    /// Top-level key of this kind's mapping in the persisted document.
    pub fn collection_key(self) -> &'static str {
        match self {
            Self::Department => "departments",
            Self::Professor => "professors",
            Self::Student => "students",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a kind name is not one of `department|professor|student`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKindError(pub String);

impl Display for UnknownKindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown entity kind `{}`; expected department|professor|student",
            self.0
        )
    }
}

impl Error for UnknownKindError {}

impl FromStr for EntityKind {
    type Err = UnknownKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "department" => Ok(Self::Department),
            "professor" => Ok(Self::Professor),
            "student" => Ok(Self::Student),
            _ => Err(UnknownKindError(value.to_string())),
        }
    }
}
