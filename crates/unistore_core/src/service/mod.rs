//! Core use-case services.
//!
//! # Responsibility
//! - Offer typed entry points over the untyped entity repository.
//! - Keep callers decoupled from the document storage details.

pub mod registry_service;
