//! The installation builder.

use crate::base_url::normalize_base_url;
use crate::collaborators::Collaborators;
use crate::config::{AdminUser, DatabaseConfig, InstallConfig, InstallPaths};
use crate::errors::InstallError;
use crate::pipeline::Pipeline;
use crate::prereq::{Check, Prerequisites, Requirements};
use crate::steps::standard_steps;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Collects installation parameters and assembles the pipeline.
///
/// `Installation` is an immutable value: every setter consumes it and
/// returns an updated copy, so calls chain fluently. Nothing is validated
/// until [`snapshot`](Self::snapshot) or [`build`](Self::build), except the
/// base URL, which is normalized (and rejected if malformed) when set.
///
/// # Example
///
/// ```rust
/// use app_installer::{AdminUser, DatabaseConfig, Installation};
///
/// let installation = Installation::new(
///     "/srv/app",
///     "/srv/app/public",
///     "/srv/app/storage",
///     "/srv/app/vendor",
/// )
/// .debug_mode(true)
/// .database_config(DatabaseConfig {
///     driver: "mysql".to_string(),
///     host: "localhost".to_string(),
///     port: 3306,
///     database: "forum".to_string(),
///     username: "forum".to_string(),
///     password: "secret".to_string(),
///     prefix: String::new(),
/// })
/// .admin_user(AdminUser::new("admin", "a@b.com", "secret"))
/// .base_url("example.com/forum/index.php")
/// .unwrap();
///
/// let config = installation.snapshot().unwrap();
/// assert_eq!(config.base_url, "http://example.com/forum");
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct Installation {
    paths: InstallPaths,
    config_path: Option<PathBuf>,
    debug: bool,
    base_url: Option<String>,
    database: Option<DatabaseConfig>,
    settings: BTreeMap<String, String>,
    admin: Option<AdminUser>,
    requirements: Requirements,
}

impl Installation {
    /// Start configuring an installation into the given directories.
    pub fn new(
        base: impl Into<PathBuf>,
        public: impl Into<PathBuf>,
        storage: impl Into<PathBuf>,
        vendor: impl Into<PathBuf>,
    ) -> Self {
        Self::with_paths(InstallPaths::new(base, public, storage, vendor))
    }

    /// Start configuring an installation into `paths`.
    pub fn with_paths(paths: InstallPaths) -> Self {
        Self {
            paths,
            config_path: None,
            debug: false,
            base_url: None,
            database: None,
            settings: BTreeMap::new(),
            admin: None,
            requirements: Requirements::default(),
        }
    }

    /// Config file location, relative to the base path.
    pub fn config_path(self, path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            ..self
        }
    }

    /// Run the application in debug mode.
    pub fn debug_mode(self, flag: bool) -> Self {
        Self {
            debug: flag,
            ..self
        }
    }

    /// Database connection settings.
    pub fn database_config(self, config: DatabaseConfig) -> Self {
        Self {
            database: Some(config),
            ..self
        }
    }

    /// Public address of the site.
    ///
    /// Accepts anything string-like, including [`url::Url`]. The value is
    /// stored normalized; see [`normalize_base_url`].
    pub fn base_url(self, url: impl AsRef<str>) -> Result<Self, InstallError> {
        let normalized = normalize_base_url(url.as_ref())?;
        Ok(Self {
            base_url: Some(normalized),
            ..self
        })
    }

    /// Settings written on top of the defaults, replacing earlier ones.
    pub fn settings<I, K, V>(self, settings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            settings: settings
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            ..self
        }
    }

    /// The first administrator account.
    pub fn admin_user(self, admin: AdminUser) -> Self {
        Self {
            admin: Some(admin),
            ..self
        }
    }

    /// Replace the default runtime and tool requirements.
    pub fn requirements(self, requirements: Requirements) -> Self {
        Self {
            requirements,
            ..self
        }
    }

    /// The installation directories.
    pub fn paths(&self) -> &InstallPaths {
        &self.paths
    }

    /// Environment checks for this installation.
    ///
    /// Depends only on the configured requirements and paths: the base,
    /// asset and storage directories must be writable. Evaluate the result
    /// before running the pipeline so problems surface before anything is
    /// written.
    pub fn prerequisites(&self) -> Prerequisites {
        let mut checks = Vec::new();
        if let Some(runtime) = &self.requirements.runtime {
            checks.push(Check::RuntimeVersion(runtime.clone()));
        }
        if !self.requirements.tools.is_empty() {
            checks.push(Check::Executables(self.requirements.tools.clone()));
        }
        checks.push(Check::WritablePaths(vec![
            self.paths.base.clone(),
            self.paths.asset_path(),
            self.paths.storage.clone(),
        ]));
        Prerequisites::new(checks)
    }

    /// Finalize the configuration.
    ///
    /// Fails with [`InstallError::MissingConfiguration`] when the database
    /// config, base URL or admin user has not been set.
    pub fn snapshot(&self) -> Result<InstallConfig, InstallError> {
        let database = self
            .database
            .clone()
            .ok_or_else(|| InstallError::missing("database config", "database_config"))?;
        let base_url = self
            .base_url
            .clone()
            .ok_or_else(|| InstallError::missing("base URL", "base_url"))?;
        let admin = self
            .admin
            .clone()
            .ok_or_else(|| InstallError::missing("admin user", "admin_user"))?;

        Ok(InstallConfig {
            paths: self.paths.clone(),
            config_path: self.config_path.clone(),
            debug: self.debug,
            base_url,
            database,
            settings: self.settings.clone(),
            admin,
        })
    }

    /// Assemble the seven-step installation pipeline.
    ///
    /// Every step is constructed from a single [`snapshot`](Self::snapshot).
    /// Nothing runs until the returned pipeline is run; each call returns a
    /// new, independent pipeline.
    pub fn build(&self, collaborators: &Collaborators) -> Result<Pipeline, InstallError> {
        let config = Arc::new(self.snapshot()?);

        let mut pipeline = Pipeline::new();
        for step in standard_steps(&config, collaborators) {
            pipeline.pipe(step);
        }

        debug!(steps = pipeline.len(), base_url = %config.base_url, "built installation pipeline");
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::database;

    fn installation() -> Installation {
        Installation::new(
            "/srv/app",
            "/srv/app/public",
            "/srv/app/storage",
            "/srv/app/vendor",
        )
    }

    fn complete() -> Installation {
        installation()
            .database_config(database())
            .admin_user(AdminUser::new("admin", "a@b.com", "secret"))
            .base_url("example.com/forum/index.php")
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let installation = installation();
        assert!(!installation.debug);
        assert!(installation.config_path.is_none());
        assert!(installation.base_url.is_none());
        assert!(installation.settings.is_empty());
        assert_eq!(installation.requirements, Requirements::default());
    }

    #[test]
    fn test_setters_overwrite() {
        let installation = installation()
            .debug_mode(true)
            .debug_mode(false)
            .settings([("a", "1")])
            .settings([("b", "2")])
            .config_path("one.json")
            .config_path("two.json");

        assert!(!installation.debug);
        assert_eq!(installation.settings.len(), 1);
        assert_eq!(installation.settings["b"], "2");
        assert_eq!(installation.config_path, Some(PathBuf::from("two.json")));
    }

    #[test]
    fn test_base_url_stored_normalized() {
        let installation = complete();
        assert_eq!(
            installation.base_url.as_deref(),
            Some("http://example.com/forum")
        );
    }

    #[test]
    fn test_base_url_accepts_url_type() {
        let url = url::Url::parse("https://example.com/forum/").unwrap();
        let installation = installation().base_url(url).unwrap();
        assert_eq!(
            installation.base_url.as_deref(),
            Some("https://example.com/forum")
        );
    }

    #[test]
    fn test_malformed_base_url_fails_immediately() {
        let err = installation().base_url("http://").unwrap_err();
        assert!(matches!(err, InstallError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_snapshot_requires_database() {
        let err = installation()
            .admin_user(AdminUser::new("admin", "a@b.com", "secret"))
            .base_url("example.com")
            .unwrap()
            .snapshot()
            .unwrap_err();
        assert!(matches!(
            err,
            InstallError::MissingConfiguration {
                field: "database config",
                ..
            }
        ));
    }

    #[test]
    fn test_snapshot_requires_admin_and_url() {
        let no_admin = installation()
            .database_config(database())
            .base_url("example.com")
            .unwrap();
        assert!(no_admin.snapshot().is_err());

        let no_url = installation()
            .database_config(database())
            .admin_user(AdminUser::new("admin", "a@b.com", "secret"));
        assert!(matches!(
            no_url.snapshot(),
            Err(InstallError::MissingConfiguration {
                field: "base URL",
                ..
            })
        ));
    }

    #[test]
    fn test_prerequisites_cover_paths() {
        let prerequisites = complete().prerequisites();
        let checks = prerequisites.checks();
        assert_eq!(checks.len(), 3);
        assert_eq!(
            checks[2],
            Check::WritablePaths(vec![
                PathBuf::from("/srv/app"),
                PathBuf::from("/srv/app/public/assets"),
                PathBuf::from("/srv/app/storage"),
            ])
        );
    }

    #[test]
    fn test_prerequisites_without_runtime_or_tools() {
        let prerequisites = installation()
            .requirements(Requirements {
                runtime: None,
                tools: vec![],
            })
            .prerequisites();
        assert_eq!(prerequisites.checks().len(), 1);
    }

    #[test]
    fn test_setters_leave_original_untouched() {
        let base = installation();
        let debug = base.clone().debug_mode(true);
        assert!(!base.debug);
        assert!(debug.debug);
    }
}
