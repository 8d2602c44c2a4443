//! Atomic file writing via tempfile + rename.
//!
//! Uses [`tempfile::NamedTempFile`] to write to a temporary file in the same
//! directory as the target, then atomically renames it. A replacement is
//! either fully visible or not at all; readers never observe a half-written
//! file.

use std::io::Write;
use std::path::Path;

use crate::error::{ToolError, ToolResult};

/// Atomically write `content` to `path`, creating parent directories first.
///
/// # Errors
///
/// Returns [`ToolError::WriteFailure`] if the parent directory cannot be
/// created, writing fails, or the rename fails (e.g., cross-device). The
/// original file is untouched in every error case.
pub fn atomic_write(path: &Path, content: &str) -> ToolResult<()> {
    let failure = |reason: String| ToolError::WriteFailure {
        path: path.to_path_buf(),
        reason,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(parent)
        .map_err(|e| failure(format!("failed to create {}: {e}", parent.display())))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| failure(format!("failed to create temp file: {e}")))?;

    tmp.write_all(content.as_bytes())
        .map_err(|e| failure(format!("failed to write temp file: {e}")))?;

    tmp.flush()
        .map_err(|e| failure(format!("failed to flush temp file: {e}")))?;

    // The temp file starts out 0600; keep the target's existing mode.
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| failure(format!("failed to copy permissions: {e}")))?;
    }

    tmp.persist(path)
        .map_err(|e| failure(format!("failed to replace file: {}", e.error)))?;

    Ok(())
}
