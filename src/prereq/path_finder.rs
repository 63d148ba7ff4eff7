//! PATH-based executable lookup with fallback locations.

use std::path::PathBuf;

/// System fallback paths to check if executable not found in PATH.
const FALLBACK_PATHS: &[&str] = &["/usr/local/bin", "/usr/bin", "/bin"];

/// Find an executable by name.
///
/// Tries the system PATH via the `which` crate first, then common system
/// directories that are not always on the PATH of a web server user.
///
/// # Arguments
///
/// * `name` - The executable name to search for (e.g., "node", "tar")
///
/// # Returns
///
/// `Some(PathBuf)` if a regular file with that name is found, `None`
/// otherwise.
pub(crate) fn find_executable(name: &str) -> Option<PathBuf> {
    // Primary: PATH lookup via which crate
    if let Ok(path) = which::which(name) {
        return Some(path);
    }

    // Fallback: service accounts often run with a minimal PATH
    FALLBACK_PATHS
        .iter()
        .map(|dir| PathBuf::from(dir).join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_common_executable() {
        // sh should exist on any Unix system
        let result = find_executable("sh");
        assert!(result.is_some());
        assert!(result.unwrap().exists());
    }

    #[test]
    fn test_find_nonexistent_executable() {
        let result = find_executable("definitely_not_a_real_executable_12345");
        assert!(result.is_none());
    }
}
