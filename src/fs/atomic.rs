//! Atomic filesystem writes.
//!
//! Every write follows the same pattern:
//! 1. Write content to a temporary file in the same directory as the target
//! 2. Sync the temporary file to disk
//! 3. Rename it over the target
//!
//! Because the rename happens within one directory, readers see either the
//! previous document or the complete new one. A crash between steps 2 and 3
//! may leave a `.{filename}.{pid}.tmp` file behind; it is never read.

use crate::error::{Result, SprintError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories as needed.
///
/// # Example
///
/// ```no_run
/// use sprintctl::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("roadmaps.json"), b"{}")?;
/// # Ok::<(), sprintctl::error::SprintError>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            SprintError::UserError(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;
    replace(&temp_path, path)
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Temporary sibling path for `target`, unique per process.
fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            SprintError::UserError(format!("invalid file path '{}'", target.display()))
        })?;

    Ok(parent.join(format!(".{}.{}.tmp", filename, std::process::id())))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        SprintError::UserError(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(SprintError::UserError(format!(
            "failed to write temporary file '{}': {}",
            path.display(),
            e
        )));
    }

    Ok(())
}

fn replace(source: &Path, target: &Path) -> Result<()> {
    // rename() replaces an existing target on POSIX and on Windows (MoveFileEx
    // with MOVEFILE_REPLACE_EXISTING under the hood).
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        SprintError::UserError(format!(
            "failed to atomically replace '{}': {}",
            target.display(),
            e
        ))
    })?;

    #[cfg(unix)]
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("store.json");

        atomic_write(&file_path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
    }

    #[test]
    fn test_atomic_write_replace_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("store.json");
        fs::write(&file_path, "{\"old\": true}").unwrap();

        atomic_write_file(&file_path, "{\"new\": true}").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{\"new\": true}");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("dirs").join("a.yaml");

        atomic_write_file(&file_path, "key: value\n").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "key: value\n");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("store.json");

        atomic_write(&file_path, b"content").unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let target = Path::new("/some/path/roadmaps.json");
        let temp = temp_path_for(target).unwrap();

        assert_eq!(temp.parent().unwrap(), Path::new("/some/path"));
        let name = temp.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(".roadmaps.json."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn test_atomic_write_empty_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("empty.txt");

        atomic_write(&file_path, b"").unwrap();

        assert!(fs::read(&file_path).unwrap().is_empty());
    }

    #[test]
    fn test_atomic_write_under_file_parent_fails() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where a directory is expected.
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let result = atomic_write(blocker.join("store.json"), b"{}");
        assert!(result.is_err());
    }
}
