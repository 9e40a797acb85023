//! File-persistence collaborator used by the store.
//!
//! # Responsibility
//! - Abstract whole-file text reads/writes and directory setup.
//! - Let tests swap the filesystem for an in-memory map.
//!
//! # Invariants
//! - `write` replaces the whole file content in one call.
//! - Implementations report failures as `std::io::Error`.

mod fs;
mod memory;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

use std::io;
use std::path::{Path, PathBuf};

/// Whole-file storage operations required by the entity store.
pub trait DocumentStorage {
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Lists direct children of `dir` (files only, unordered).
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

impl<T: DocumentStorage + ?Sized> DocumentStorage for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        (**self).write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        (**self).list_dir(dir)
    }
}
