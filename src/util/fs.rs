//! Whole-file text reads with error classification.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{ToolError, ToolResult};

/// Read the entire file at `path` as UTF-8 text.
///
/// Missing paths map to [`ToolError::FileNotFound`]; directories, permission
/// problems and invalid UTF-8 map to [`ToolError::FileUnreadable`].
pub fn read_text(path: &Path) -> ToolResult<String> {
    let meta = std::fs::metadata(path).map_err(|e| classify(path, &e))?;
    if !meta.is_file() {
        return Err(ToolError::FileUnreadable {
            path: path.to_path_buf(),
            reason: "not a regular file".to_owned(),
        });
    }

    std::fs::read_to_string(path).map_err(|e| classify(path, &e))
}

fn classify(path: &Path, err: &std::io::Error) -> ToolError {
    match err.kind() {
        ErrorKind::NotFound => ToolError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::InvalidData => ToolError::FileUnreadable {
            path: path.to_path_buf(),
            reason: "file is not valid UTF-8 text".to_owned(),
        },
        _ => ToolError::FileUnreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_text(&dir.path().join("nope.txt")).expect_err("missing");
        assert!(matches!(err, ToolError::FileNotFound { .. }));
    }

    #[test]
    fn test_directory_is_unreadable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_text(dir.path()).expect_err("dir");
        assert!(matches!(err, ToolError::FileUnreadable { .. }));
    }

    #[test]
    fn test_binary_is_unreadable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bin.dat");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).expect("write");
        let err = read_text(&path).expect_err("binary");
        assert!(err.to_string().contains("UTF-8"));
    }
}
