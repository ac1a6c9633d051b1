//! Filesystem Utilities.
//!
//! Helpers for the few filesystem operations Nestbook performs: creating
//! directories, reading small files, and replacing a file atomically. Errors
//! are mapped to [`CoreError::Filesystem`] with the offending path attached.

use crate::error::CoreError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Ensures that a directory exists at the given path, creating parents as needed.
///
/// # Errors
///
/// Returns [`CoreError::Filesystem`] if the path exists but is not a directory,
/// or if directory creation fails.
///
/// # Examples
///
/// ```no_run
/// # use nestbook_core::utils::fs::ensure_dir_exists;
/// # use tempfile::tempdir;
/// let temp_dir = tempdir().unwrap();
/// let dir_path = temp_dir.path().join("sessions");
/// ensure_dir_exists(&dir_path).unwrap();
/// assert!(dir_path.is_dir());
/// ```
pub fn ensure_dir_exists(path: &Path) -> Result<(), CoreError> {
    if path.exists() {
        if !path.is_dir() {
            Err(CoreError::Filesystem {
                message: "Path exists but is not a directory".to_string(),
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "Path exists but is not a directory",
                ),
            })
        } else {
            Ok(())
        }
    } else {
        fs::create_dir_all(path).map_err(|e| CoreError::Filesystem {
            message: "Failed to create directory".to_string(),
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Reads a file into a string, returning `Ok(None)` when the file does not exist.
pub fn read_optional_to_string(path: &Path) -> Result<Option<String>, CoreError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CoreError::Filesystem {
            message: "Failed to read file to string".to_string(),
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Replaces the contents of `path` atomically.
///
/// The content is written to a temporary file in the same directory, flushed,
/// and renamed over the target, so readers observe either the old or the new
/// content, never a truncated file. The parent directory is created if needed.
pub fn write_string_atomically(path: &Path, content: &str) -> Result<(), CoreError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir_exists(parent)?;

    let fs_error = |message: &str, source: std::io::Error| CoreError::Filesystem {
        message: message.to_string(),
        path: path.to_path_buf(),
        source,
    };

    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| fs_error("Failed to create temporary file", e))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| fs_error("Failed to write temporary file", e))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| fs_error("Failed to flush temporary file", e))?;
    temp_file
        .persist(path)
        .map_err(|e| fs_error("Failed to replace file", e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_exists_creates_nested() {
        let temp_dir = tempdir().unwrap();
        let nested = temp_dir.path().join("a/b/c");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
        // Idempotent.
        ensure_dir_exists(&nested).unwrap();
    }

    #[test]
    fn test_ensure_dir_exists_rejects_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("file.txt");
        fs::write(&file_path, "x").unwrap();
        assert!(matches!(ensure_dir_exists(&file_path), Err(CoreError::Filesystem { .. })));
    }

    #[test]
    fn test_read_optional_to_string_missing_file() {
        let temp_dir = tempdir().unwrap();
        assert_eq!(read_optional_to_string(&temp_dir.path().join("absent")).unwrap(), None);
    }

    #[test]
    fn test_write_string_atomically_replaces_content() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested/storage.json");

        write_string_atomically(&path, "{\"a\":1}").unwrap();
        assert_eq!(read_optional_to_string(&path).unwrap().as_deref(), Some("{\"a\":1}"));

        write_string_atomically(&path, "{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "temporary files must not be left behind");
    }
}
