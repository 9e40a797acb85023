//! Repository layer contracts and the JSON document store.
//!
//! # Responsibility
//! - Define the public entity operations as a storage-agnostic trait.
//! - Implement them over one whole-file JSON document.
//!
//! # Invariants
//! - Writes validate records against their kind schema before persistence.
//! - Every operation failure is wrapped with its operation and kind.

pub mod entity_repo;
pub mod error;
