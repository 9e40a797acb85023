//! Local filesystem storage.

use super::DocumentStorage;
use std::io;
use std::path::{Path, PathBuf};

/// `DocumentStorage` backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl DocumentStorage for FsStorage {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::FsStorage;
    use crate::storage::DocumentStorage;

    #[test]
    fn write_then_read_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage;
        let nested = dir.path().join("a").join("b");
        storage.create_dir_all(&nested).unwrap();
        storage.create_dir_all(&nested).unwrap();

        let file = nested.join("doc.json");
        assert!(!storage.exists(&file));
        storage.write(&file, "{}").unwrap();
        assert_eq!(storage.read_to_string(&file).unwrap(), "{}");

        let listed = storage.list_dir(dir.path()).unwrap();
        assert!(listed.is_empty(), "directories are not listed");
        assert_eq!(storage.list_dir(&nested).unwrap(), vec![file]);
    }
}
