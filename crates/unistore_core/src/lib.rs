//! Core of the university registry store.
//! Departments, professors and students persisted in one JSON document with a
//! snapshot taken before every change.

pub mod backup;
pub mod clock;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schema;
pub mod search;
pub mod service;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::StoreConfig;
pub use logging::{init_logging, logging_status, LogLevel, LoggingConfig, LoggingError};
pub use model::document::{Document, Record};
pub use model::entity::{Department, Entity, Professor, Student};
pub use model::kind::{EntityKind, UnknownKindError};
pub use repo::entity_repo::{EntityRepository, JsonEntityStore};
pub use repo::error::{Operation, OperationError, OperationResult, StoreError, StoreResult};
pub use schema::{FieldType, ValidationError};
pub use search::criteria::SearchCriteria;
pub use service::registry_service::{RegistryService, ServiceError, ServiceResult};
pub use storage::{DocumentStorage, FsStorage, MemoryStorage};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
