//! Small JSON file helpers shared by the episode index and the feedback log.
//!
//! Writes go to a sibling temp file that is renamed into place, and
//! read-modify-write cycles hold an exclusive advisory lock on `<file>.lock`.

use crate::error::{Result, WoohooError};
use crate::speech::TEMP_PREFIX;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Read a JSON array. A missing or blank file is an empty array.
pub(crate) fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| WoohooError::Persistence(format!("cannot read {}: {}", path.display(), e)))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content)
        .map_err(|e| WoohooError::Persistence(format!("{} is corrupt: {}", path.display(), e)))
}

/// Serialize `value` as pretty JSON and atomically replace `path`.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &json)
}

/// Atomically replace `path` with `contents`.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = parent_dir(path);
    std::fs::create_dir_all(&parent)
        .map_err(|e| WoohooError::Persistence(format!("cannot create {}: {}", parent.display(), e)))?;

    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|e| WoohooError::Persistence(format!("cannot create temp file: {}", e)))?;
    temp.write_all(contents)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| WoohooError::Persistence(format!("cannot write {}: {}", path.display(), e)))?;
    temp.persist(path)
        .map_err(|e| WoohooError::Persistence(format!("cannot replace {}: {}", path.display(), e.error)))?;
    Ok(())
}

/// Run `f` while holding an exclusive lock for `path`.
pub(crate) fn with_exclusive_lock<R>(path: &Path, f: impl FnOnce() -> Result<R>) -> Result<R> {
    let lock_path = lock_path(path);
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| WoohooError::Persistence(format!("cannot open {}: {}", lock_path.display(), e)))?;

    let mut lock = fd_lock::RwLock::new(file);
    let _guard = lock
        .write()
        .map_err(|e| WoohooError::Persistence(format!("cannot lock {}: {}", lock_path.display(), e)))?;

    f()
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_blank_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let empty: Vec<String> = read_json_array(&path).unwrap();
        assert!(empty.is_empty());

        std::fs::write(&path, "\n").unwrap();
        let blank: Vec<String> = read_json_array(&path).unwrap();
        assert!(blank.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, "[{").unwrap();

        let result: Result<Vec<String>> = read_json_array(&path);
        assert!(matches!(result, Err(WoohooError::Persistence(_))));
    }

    #[test]
    fn test_atomic_write_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        write_json_atomic(&path, &vec!["a"]).unwrap();
        with_exclusive_lock(&path, || write_json_atomic(&path, &vec!["a", "b"])).unwrap();

        let values: Vec<String> = read_json_array(&path).unwrap();
        assert_eq!(values, vec!["a", "b"]);

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["index.json", "index.json.lock"]);
    }
}
