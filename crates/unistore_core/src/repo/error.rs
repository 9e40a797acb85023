//! Store error model.
//!
//! # Responsibility
//! - Name the root causes an operation can fail with.
//! - Wrap every root cause into one per-operation error with a uniform
//!   top-level message.
//!
//! # Invariants
//! - `OperationError` always renders its cause's message as a suffix, so
//!   callers can match on either the typed cause or the text.

use crate::model::kind::EntityKind;
use crate::schema::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub type StoreResult<T> = Result<T, StoreError>;
pub type OperationResult<T> = Result<T, OperationError>;

/// Root cause of a failed store operation.
#[derive(Debug)]
pub enum StoreError {
    /// Record is missing a required field or has a mistyped field.
    Validation(ValidationError),
    /// A record with the same id already exists.
    Conflict { kind: EntityKind, id: String },
    /// No record with the given id exists.
    NotFound { kind: EntityKind, id: String },
    /// Removing the record would leave dangling references.
    Dependency { kind: EntityKind, id: String },
    /// Underlying read/write failure.
    Io {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    /// A stored document could not be parsed or encoded.
    InvalidDocument {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict { kind, id } => write!(f, "{kind} with ID {id} already exists"),
            Self::NotFound { kind, id } => write!(f, "{kind} with ID {id} not found"),
            Self::Dependency { kind, .. } => match kind {
                EntityKind::Department => {
                    write!(f, "Cannot delete department with assigned professors")
                }
                other => write!(f, "Cannot delete {other} with dependent records"),
            },
            Self::Io {
                action,
                path,
                source,
            } => write!(f, "failed to {action} `{}`: {source}", path.display()),
            Self::InvalidDocument { path, source } => {
                write!(f, "invalid document `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::InvalidDocument { source, .. } => Some(source),
            Self::Conflict { .. } | Self::NotFound { .. } | Self::Dependency { .. } => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Public operation that produced an `OperationError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Initialize,
    Add,
    Update,
    Delete,
    Get,
    List,
    Search,
    ListBackups,
    RestoreBackup,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Get => "get",
            Self::List => "list",
            Self::Search => "search",
            Self::ListBackups => "list_backups",
            Self::RestoreBackup => "restore_backup",
        }
    }
}

/// Failure of one public store operation, wrapping its root cause.
#[derive(Debug)]
pub struct OperationError {
    operation: Operation,
    kind: Option<EntityKind>,
    cause: StoreError,
}

impl OperationError {
    pub fn new(operation: Operation, kind: Option<EntityKind>, cause: StoreError) -> Self {
        Self {
            operation,
            kind,
            cause,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn kind(&self) -> Option<EntityKind> {
        self.kind
    }

    /// Root cause, for matching on the failure category.
    pub fn cause(&self) -> &StoreError {
        &self.cause
    }
}

impl Display for OperationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let cause = &self.cause;
        match (self.operation, self.kind) {
            (Operation::Search, _) => write!(f, "Search failed: {cause}"),
            (Operation::Initialize, _) => write!(f, "Failed to initialize store: {cause}"),
            (Operation::ListBackups, _) => write!(f, "Failed to list backups: {cause}"),
            (Operation::RestoreBackup, _) => write!(f, "Failed to restore backup: {cause}"),
            (operation, Some(kind)) => {
                write!(f, "Failed to {} {kind}: {cause}", operation.as_str())
            }
            (operation, None) => write!(f, "Failed to {}: {cause}", operation.as_str()),
        }
    }
}

impl Error for OperationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}
