//! Store location configuration.
//!
//! # Invariants
//! - Paths are fixed once a store is constructed.
//! - Unless overridden, backups live in a `backups` directory next to the
//!   primary document.

use std::path::{Path, PathBuf};

/// Environment variable naming the primary document path.
pub const DATA_FILE_ENV: &str = "UNISTORE_DATA_FILE";
/// Primary document used when nothing else is configured.
pub const DEFAULT_DATA_FILE: &str = "data/database.json";
/// Name of the backup directory created alongside the document.
pub const BACKUP_DIR_NAME: &str = "backups";

/// File locations for one entity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub document_path: PathBuf,
    pub backup_dir: PathBuf,
}

impl StoreConfig {
    /// Uses `document_path` and a sibling `backups` directory.
    pub fn new(document_path: impl Into<PathBuf>) -> Self {
        let document_path = document_path.into();
        let backup_dir = default_backup_dir(&document_path);
        Self {
            document_path,
            backup_dir,
        }
    }

    /// Overrides the backup directory.
    pub fn with_backup_dir(mut self, backup_dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = backup_dir.into();
        self
    }

    /// Reads the document path from `UNISTORE_DATA_FILE`, falling back to
    /// `data/database.json`.
    pub fn from_env() -> Self {
        let path = std::env::var(DATA_FILE_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());
        Self::new(path)
    }
}

fn default_backup_dir(document_path: &Path) -> PathBuf {
    match document_path.parent() {
        Some(parent) => parent.join(BACKUP_DIR_NAME),
        None => PathBuf::from(BACKUP_DIR_NAME),
    }
}
