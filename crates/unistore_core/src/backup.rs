//! Timestamped document snapshots.
//!
//! # Responsibility
//! - Name snapshot files so that lexical order equals chronological order.
//! - Write a full copy of the document into the backup directory.
//! - Enumerate existing snapshots.
//!
//! # Invariants
//! - File names look like `backup_2024-01-01T12-00-00-000Z.json`.
//! - An existing snapshot is never overwritten; same-millisecond snapshots
//!   get a `-1`, `-2`, ... suffix.

use crate::clock::Clock;
use crate::storage::DocumentStorage;
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};

const BACKUP_PREFIX: &str = "backup_";
const BACKUP_EXTENSION: &str = ".json";
const MAX_NAME_COLLISIONS: u32 = 10_000;

static BACKUP_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^backup_\d{4}-\d{2}-\d{2}T\d{2}-\d{2}-\d{2}-\d{3}Z(-\d+)?\.json$")
        .expect("valid backup name regex")
});

/// Builds the snapshot file name for `timestamp`.
///
/// The ISO-8601 form has `:` and `.` replaced by `-`.
pub fn backup_file_name(timestamp: DateTime<Utc>) -> String {
    let iso = timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{BACKUP_PREFIX}{iso}{BACKUP_EXTENSION}")
}

/// Returns whether `name` is a snapshot file produced by this module.
pub fn is_backup_file_name(name: &str) -> bool {
    BACKUP_NAME_RE.is_match(name)
}

/// Writes `contents` as a new snapshot and returns its path.
///
/// The backup directory is created when missing.
pub fn write_snapshot<S: DocumentStorage, C: Clock>(
    storage: &S,
    clock: &C,
    backup_dir: &Path,
    contents: &str,
) -> io::Result<PathBuf> {
    storage.create_dir_all(backup_dir)?;

    let base_name = backup_file_name(clock.now());
    let mut path = backup_dir.join(&base_name);
    let mut suffix = 0;
    while storage.exists(&path) {
        suffix += 1;
        if suffix > MAX_NAME_COLLISIONS {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("no free backup name for {base_name}"),
            ));
        }
        let stem = base_name.trim_end_matches(BACKUP_EXTENSION);
        path = backup_dir.join(format!("{stem}-{suffix}{BACKUP_EXTENSION}"));
    }

    storage.write(&path, contents)?;
    Ok(path)
}

/// Lists snapshot file names in `backup_dir`, oldest first.
///
/// A missing directory yields an empty list; unrelated files are skipped.
pub fn list_snapshots<S: DocumentStorage>(
    storage: &S,
    backup_dir: &Path,
) -> io::Result<Vec<String>> {
    if !storage.exists(backup_dir) {
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = storage
        .list_dir(backup_dir)?
        .into_iter()
        .filter_map(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .filter(|name| is_backup_file_name(name))
        .collect();
    names.sort_by(|a, b| snapshot_sort_key(a).cmp(&snapshot_sort_key(b)));
    Ok(names)
}

// Orders `backup_<ts>.json` before `backup_<ts>-1.json`, then by numeric suffix.
fn snapshot_sort_key(name: &str) -> (&str, u32) {
    let stem = name
        .trim_start_matches(BACKUP_PREFIX)
        .trim_end_matches(BACKUP_EXTENSION);
    match stem.rsplit_once("Z-") {
        Some((timestamp, suffix)) => (timestamp, suffix.parse().unwrap_or(u32::MAX)),
        None => (stem.trim_end_matches('Z'), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::{backup_file_name, is_backup_file_name, list_snapshots, write_snapshot};
    use crate::clock::FixedClock;
    use crate::storage::{DocumentStorage, MemoryStorage};
    use chrono::{TimeZone, Utc};
    use std::path::Path;

    fn clock() -> FixedClock {
        FixedClock(
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
                + chrono::Duration::milliseconds(678),
        )
    }

    #[test]
    fn file_name_replaces_colons_and_dots() {
        assert_eq!(
            backup_file_name(clock().0),
            "backup_2024-01-02T03-04-05-678Z.json"
        );
        assert!(is_backup_file_name("backup_2024-01-02T03-04-05-678Z.json"));
        assert!(is_backup_file_name("backup_2024-01-02T03-04-05-678Z-3.json"));
        assert!(!is_backup_file_name("database.json"));
    }

    #[test]
    fn same_millisecond_snapshots_do_not_overwrite() {
        let storage = MemoryStorage::new();
        let dir = Path::new("/data/backups");

        let first = write_snapshot(&storage, &clock(), dir, "one").unwrap();
        let second = write_snapshot(&storage, &clock(), dir, "two").unwrap();
        let third = write_snapshot(&storage, &clock(), dir, "three").unwrap();

        assert_ne!(first, second);
        assert_eq!(storage.read_to_string(&first).unwrap(), "one");
        assert_eq!(storage.read_to_string(&second).unwrap(), "two");
        assert_eq!(
            list_snapshots(&storage, dir).unwrap(),
            vec![
                "backup_2024-01-02T03-04-05-678Z.json".to_string(),
                "backup_2024-01-02T03-04-05-678Z-1.json".to_string(),
                third
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned(),
            ]
        );
    }

    #[test]
    fn listing_missing_directory_is_empty() {
        let storage = MemoryStorage::new();
        assert!(list_snapshots(&storage, Path::new("/nowhere"))
            .unwrap()
            .is_empty());
    }
}
