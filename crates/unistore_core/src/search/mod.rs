//! Linear-scan record filtering.
//!
//! # Responsibility
//! - Decide whether a record matches a set of field criteria.
//! - Keep matching rules independent of storage.

pub mod criteria;
