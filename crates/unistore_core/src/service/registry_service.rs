//! Registry use-case service.
//!
//! # Responsibility
//! - Convert typed `Department`/`Professor`/`Student` values to and from
//!   stored records.
//! - Provide the common department/professor lookups.
//!
//! # Invariants
//! - Service APIs never bypass repository validation, backup or integrity
//!   rules.

use crate::model::document::Record;
use crate::model::entity::{Department, Entity, Professor};
use crate::model::kind::EntityKind;
use crate::repo::entity_repo::EntityRepository;
use crate::repo::error::OperationError;
use crate::search::criteria::SearchCriteria;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for typed registry use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Repository operation failed.
    Store(OperationError),
    /// Typed value could not be converted into a record.
    Encode {
        kind: EntityKind,
        source: serde_json::Error,
    },
    /// Stored record does not fit the typed shape (e.g. extra schema drift).
    Decode {
        kind: EntityKind,
        id: String,
        source: serde_json::Error,
    },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Encode { kind, source } => write!(f, "cannot encode {kind}: {source}"),
            Self::Decode { kind, id, source } => {
                write!(f, "stored {kind} `{id}` has unexpected shape: {source}")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encode { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
        }
    }
}

impl From<OperationError> for ServiceError {
    fn from(value: OperationError) -> Self {
        Self::Store(value)
    }
}

/// Typed wrapper around an `EntityRepository`.
pub struct RegistryService<R: EntityRepository> {
    repo: R,
}

impl<R: EntityRepository> RegistryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Adds a typed entity and returns it as stored.
    pub fn add<E: Entity>(&self, entity: &E) -> ServiceResult<E> {
        let record = entity.to_record().map_err(|source| ServiceError::Encode {
            kind: E::KIND,
            source,
        })?;
        let stored = self.repo.add(E::KIND, record)?;
        decode(stored)
    }

    /// Reads a typed entity by id.
    pub fn get<E: Entity>(&self, id: &str) -> ServiceResult<Option<E>> {
        self.repo.get(E::KIND, id)?.map(decode::<E>).transpose()
    }

    /// Lists every entity of one kind.
    pub fn list<E: Entity>(&self) -> ServiceResult<Vec<E>> {
        self.repo
            .list(E::KIND)?
            .into_iter()
            .map(decode::<E>)
            .collect()
    }

    /// Returns professors whose `department` is exactly `department_id`.
    ///
    /// Store search treats text as a substring, so `cs1` would also match
    /// `cs101`; this narrows the result to exact references.
    pub fn professors_in_department(&self, department_id: &str) -> ServiceResult<Vec<Professor>> {
        let mut criteria = SearchCriteria::new();
        criteria.insert("department".to_string(), json!(department_id));

        self.repo
            .search(EntityKind::Professor, &criteria)?
            .into_iter()
            .filter(|record| {
                record.get("department").and_then(Value::as_str) == Some(department_id)
            })
            .map(decode::<Professor>)
            .collect()
    }

    /// Sets a department's budget, keeping its other fields.
    pub fn set_department_budget(&self, id: &str, budget: f64) -> ServiceResult<Department> {
        let mut updates = Record::new();
        updates.insert("budget".to_string(), json!(budget));
        let merged = self.repo.update(EntityKind::Department, id, updates)?;
        decode(merged)
    }

    /// Moves a professor to another department.
    ///
    /// Like every store write, the target department's existence is not checked.
    pub fn assign_professor(
        &self,
        professor_id: &str,
        department_id: &str,
    ) -> ServiceResult<Professor> {
        let mut updates = Record::new();
        updates.insert("department".to_string(), json!(department_id));
        let merged = self.repo.update(EntityKind::Professor, professor_id, updates)?;
        decode(merged)
    }

    /// Deletes an entity by id.
    pub fn remove<E: Entity>(&self, id: &str) -> ServiceResult<bool> {
        Ok(self.repo.delete(E::KIND, id)?)
    }
}

fn decode<E: Entity>(record: Record) -> ServiceResult<E> {
    let id = record
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    E::from_record(record).map_err(|source| ServiceError::Decode {
        kind: E::KIND,
        id,
        source,
    })
}
