//! Filesystem writability probe.

use std::path::Path;

/// Whether new files can be created inside `dir`.
///
/// Permission bits alone do not account for ownership, ACLs or read-only
/// mounts, so the probe creates an anonymous temporary file that is removed
/// again as soon as it is dropped.
pub(crate) fn is_writable_dir(dir: &Path) -> Result<(), String> {
    if !dir.exists() {
        return Err(format!("{} does not exist", dir.display()));
    }
    if !dir.is_dir() {
        return Err(format!("{} is not a directory", dir.display()));
    }

    tempfile::tempfile_in(dir)
        .map(drop)
        .map_err(|e| format!("{} is not writable: {}", dir.display(), e))
}
