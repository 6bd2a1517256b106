//! Utility functions for common operations.
//!
//! - Atomic whole-file writes, so an interrupted run never leaves a
//!   half-written artifact behind
//! - Optional reads that treat a missing file as `None`

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{AdvocateError, Result};

/// Atomically write content to a file.
///
/// The content goes to a temporary file in the target's directory, is
/// flushed, and is then renamed over the target. If any step fails the
/// previous file (if any) is left untouched. Missing parent directories are
/// created.
///
/// # Example
///
/// ```rust,no_run
/// use advocate_events::util::atomic_write;
///
/// atomic_write("artifacts/last-processed-commit.txt", b"0123abcd").unwrap();
/// ```
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(AdvocateError::io(
                format!("Cannot determine parent directory for: {}", path.display()),
                io::Error::new(io::ErrorKind::InvalidInput, "No parent directory"),
            ))
        }
    };

    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AdvocateError::io(format!("Failed to create directory: {}", parent.display()), e)
        })?;
    }

    // Same directory as the target, so the rename stays on one filesystem.
    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| {
        AdvocateError::io(
            format!("Failed to create temporary file in: {}", parent.display()),
            e,
        )
    })?;

    temp_file.write_all(content).map_err(|e| {
        AdvocateError::io(
            format!("Failed to write to temporary file for: {}", path.display()),
            e,
        )
    })?;

    temp_file.flush().map_err(|e| {
        AdvocateError::io(
            format!("Failed to flush temporary file for: {}", path.display()),
            e,
        )
    })?;

    temp_file.persist(path).map_err(|e| {
        AdvocateError::io(
            format!("Failed to atomically write file: {}", path.display()),
            e.error,
        )
    })?;

    Ok(())
}

/// Read a UTF-8 file, returning `None` when it does not exist.
pub fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AdvocateError::io(
            format!("Failed to read file: {}", path.display()),
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");

        atomic_write(&path, b"Hello, world!").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("test.txt");

        atomic_write(&path, b"Nested content").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Nested content");
    }

    #[test]
    fn test_read_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maybe.txt");

        assert_eq!(read_optional(&path).unwrap(), None);
        std::fs::write(&path, "here").unwrap();
        assert_eq!(read_optional(&path).unwrap().as_deref(), Some("here"));
    }
}
