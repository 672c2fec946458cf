//! Destination handling shared by the file-writing handlers.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::format::error::RegionError;

/// Fail if `path` exists (as a file, directory or dangling link) and
/// overwriting was not requested.
pub fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), RegionError> {
    if !overwrite && std::fs::symlink_metadata(path).is_ok() {
        return Err(RegionError::already_exists(path));
    }
    Ok(())
}

/// Write `content` to `path`, replacing it only when `overwrite` is set.
///
/// Without `overwrite` the file is created exclusively, so a destination
/// that appears after [`ensure_writable`] still fails instead of being
/// clobbered.
pub fn write_output(path: &Path, content: &str, overwrite: bool) -> Result<(), RegionError> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => RegionError::already_exists(path),
        _ => RegionError::Io(e),
    })?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
