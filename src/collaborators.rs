//! Capabilities the installation steps depend on.
//!
//! The pipeline orchestrates the installation but leaves talking to a
//! concrete database engine, applying migrations and copying files to
//! implementations of these traits. Tests use recording fakes; applications
//! plug in their real database layer.

use crate::config::{AdminUser, DatabaseConfig, StoredConfig};
use crate::errors::CollaboratorError;
use std::collections::BTreeMap;
use std::io::{self, ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

/// An open connection to the application database.
///
/// The handle is opened once by the connect step and shared by every later
/// step of the same run.
pub trait Connection: Send + Sync {
    /// Insert or replace the given settings rows.
    fn write_settings(&self, settings: &BTreeMap<String, String>) -> Result<(), CollaboratorError>;

    /// Create the user and add it to the administrator group.
    fn create_admin(&self, admin: &AdminUser) -> Result<(), CollaboratorError>;
}

/// Opens database connections.
pub trait DatabaseConnector: Send + Sync {
    /// Connect using `config`, failing with [`CollaboratorError::Connection`]
    /// when the server cannot be reached or rejects the credentials.
    fn connect(&self, config: &DatabaseConfig) -> Result<Arc<dyn Connection>, CollaboratorError>;
}

/// Applies schema migrations.
pub trait MigrationRunner: Send + Sync {
    /// Apply every pending migration found in `dir`.
    fn migrate(&self, connection: &Arc<dyn Connection>, dir: &Path)
        -> Result<(), CollaboratorError>;
}

/// Persists the application config file.
pub trait ConfigWriter: Send + Sync {
    /// Write `config` to `path`.
    fn write_config(&self, path: &Path, config: &StoredConfig) -> Result<(), CollaboratorError>;
}

/// Publishes static assets from third-party packages into the web root.
pub trait AssetPublisher: Send + Sync {
    /// Copy or link assets from `vendor` into `assets`.
    fn publish(&self, vendor: &Path, assets: &Path) -> Result<(), CollaboratorError>;
}

/// Activates extensions shipped in the vendor directory.
pub trait ExtensionManager: Send + Sync {
    /// Enable `extension`, publishing its assets into `assets`.
    fn enable(
        &self,
        connection: &Arc<dyn Connection>,
        vendor: &Path,
        assets: &Path,
        extension: &str,
    ) -> Result<(), CollaboratorError>;
}

/// The set of collaborators a pipeline is built with.
#[derive(Clone)]
pub struct Collaborators {
    /// Opens the database connection.
    pub database: Arc<dyn DatabaseConnector>,
    /// Applies schema migrations.
    pub migrations: Arc<dyn MigrationRunner>,
    /// Writes the config file.
    pub config_writer: Arc<dyn ConfigWriter>,
    /// Publishes vendor assets.
    pub assets: Arc<dyn AssetPublisher>,
    /// Enables bundled extensions.
    pub extensions: Arc<dyn ExtensionManager>,
}

/// Writes the config file as pretty-printed JSON.
///
/// Installation happens once: an existing config file is never overwritten.
///
/// # Example
///
/// ```rust,no_run
/// use app_installer::{ConfigWriter, JsonConfigWriter, StoredConfig};
/// use std::path::Path;
///
/// fn persist(config: &StoredConfig) {
///     JsonConfigWriter
///         .write_config(Path::new("/srv/app/config.json"), config)
///         .expect("config written");
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConfigWriter;

impl ConfigWriter for JsonConfigWriter {
    fn write_config(&self, path: &Path, config: &StoredConfig) -> Result<(), CollaboratorError> {
        let json = serde_json::to_vec_pretty(config)
            .map_err(|e| CollaboratorError::Rejected(format!("cannot serialize config: {}", e)))?;

        create_staged(path, |file| {
            file.write_all(&json)?;
            file.write_all(b"\n")
        })?;

        debug!(path = %path.display(), "wrote config file");
        Ok(())
    }
}

/// Create `path` with the content produced by `write`, never replacing an
/// existing file.
///
/// The content is staged in a temporary file in the same directory and moved
/// into place only once fully written, so a failed write leaves nothing
/// behind and a later attempt starts clean.
///
/// # Arguments
///
/// * `path` - The file to create
/// * `write` - Fills the staged file
///
/// # Returns
///
/// `Ok(())` once `path` holds the complete content,
/// `Err(CollaboratorError::Rejected)` if `path` already exists, or
/// `Err(CollaboratorError::Io)` if staging, writing or moving failed.
fn create_staged<W>(path: &Path, write: W) -> Result<(), CollaboratorError>
where
    W: FnOnce(&mut NamedTempFile) -> io::Result<()>,
{
    let exists = || {
        CollaboratorError::Rejected(format!(
            "{} already exists; the application appears to be installed",
            path.display()
        ))
    };
    if path.exists() {
        return Err(exists());
    }

    // Stage in the target directory so the final move stays on one filesystem
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    write(&mut staged)?;
    staged.as_file().sync_all()?;

    // Dropping the staged file on any error above removes it
    staged
        .persist_noclobber(path)
        .map_err(|e| match e.error.kind() {
            ErrorKind::AlreadyExists => exists(),
            _ => CollaboratorError::Io(e.error),
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoredPaths;

    fn stored() -> StoredConfig {
        StoredConfig {
            debug: true,
            database: crate::config::tests::database(),
            url: "http://example.com/forum".to_string(),
            paths: StoredPaths::default(),
        }
    }

    #[test]
    fn test_json_config_writer_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        JsonConfigWriter.write_config(&path, &stored()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let read: StoredConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(read, stored());
    }

    #[test]
    fn test_json_config_writer_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        let err = JsonConfigWriter.write_config(&path, &stored()).unwrap_err();
        assert!(matches!(err, CollaboratorError::Rejected(_)));
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_json_config_writer_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("config.json");

        let err = JsonConfigWriter.write_config(&path, &stored()).unwrap_err();
        assert!(matches!(err, CollaboratorError::Io(_)));
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let err = create_staged(&path, |file| {
            file.write_all(b"{\"debug\":")?;
            Err(io::Error::new(ErrorKind::Other, "disk full"))
        })
        .unwrap_err();
        assert!(matches!(err, CollaboratorError::Io(_)));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        // A later attempt is not mistaken for an existing installation
        JsonConfigWriter.write_config(&path, &stored()).unwrap();
        let read: StoredConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, stored());
    }

    #[test]
    fn test_json_config_writer_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        JsonConfigWriter.write_config(&path, &stored()).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("config.json")]);
    }
}
