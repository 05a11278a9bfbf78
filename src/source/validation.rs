//! File validation utilities for ensuring files are suitable for paging.
//!
//! Opening a file source validates the path first so startup failures carry a
//! precise message instead of a bare io error.

use crate::error::{ChunkyError, Result};
use std::fs::File;
use std::path::Path;

/// Validate that a file path is accessible and suitable for paging
///
/// # Validations Performed
/// - Path exists
/// - Path is a regular file (not a directory)
/// - File is readable by the current process
///
/// Empty files are accepted; they simply have no lines.
pub fn validate_file_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ChunkyError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let metadata = std::fs::metadata(path)
        .map_err(|e| ChunkyError::file_error("Failed to read file metadata", e))?;

    if !metadata.is_file() {
        return Err(ChunkyError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    // Try to open the file to verify read permissions
    File::open(path).map_err(|e| {
        ChunkyError::file_error(
            format!("Cannot open file for reading: {}", path.display()),
            e,
        )
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_validate_valid_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(b"line 1\nline 2\n").unwrap();
        assert!(validate_file_path(file.path()).is_ok());
    }

    #[test]
    fn test_validate_empty_file_is_accepted() {
        let file = NamedTempFile::new().expect("Failed to create temp file");
        assert!(validate_file_path(file.path()).is_ok());
    }

    #[test]
    fn test_validate_nonexistent_file() {
        let result = validate_file_path(Path::new("/this/file/does/not/exist.log"));
        assert!(matches!(result, Err(ChunkyError::FileNotFound { .. })));
    }

    #[test]
    fn test_validate_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = validate_file_path(temp_dir.path());
        assert!(matches!(result, Err(ChunkyError::NotAFile { .. })));
    }
}
