//! Domain model for the department/professor/student registry.
//!
//! # Responsibility
//! - Define the entity kinds and the record shape shared by every kind.
//! - Define the persisted document that holds all three collections.
//!
//! # Invariants
//! - Records are flat JSON objects keyed by their string `id`.
//! - The document always carries all three collections, possibly empty.

pub mod document;
pub mod entity;
pub mod kind;
