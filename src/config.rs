//! Installation configuration records.
//!
//! This module provides the records the installer is configured with
//! ([`DatabaseConfig`], [`AdminUser`], [`InstallPaths`]) and the finalized
//! [`InstallConfig`] snapshot that every pipeline step reads from.

use crate::errors::StepError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// File name of the config file when no custom path is configured.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Sub-directory of the public path that receives published assets.
pub const ASSETS_DIR: &str = "assets";

/// Maximum length of a table prefix.
const MAX_PREFIX_LEN: usize = 10;

/// Connection settings for the application database.
///
/// The installer does not interpret these values beyond basic validation;
/// they are handed to the [`DatabaseConnector`](crate::DatabaseConnector)
/// and written to the config file.
///
/// # Example
///
/// ```rust
/// use app_installer::DatabaseConfig;
///
/// let db = DatabaseConfig {
///     driver: "mysql".to_string(),
///     host: "localhost".to_string(),
///     port: 3306,
///     database: "forum".to_string(),
///     username: "forum".to_string(),
///     password: "secret".to_string(),
///     prefix: String::new(),
/// };
/// assert!(db.validate().is_ok());
/// assert!(!format!("{:?}", db).contains("secret"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver name (e.g., "mysql").
    pub driver: String,
    /// Host name or address of the database server.
    pub host: String,
    /// TCP port of the database server.
    pub port: u16,
    /// Name of the schema to install into.
    pub database: String,
    /// User to connect as.
    pub username: String,
    /// Password for `username`.
    pub password: String,
    /// Prefix prepended to every table name. May be empty.
    #[serde(default)]
    pub prefix: String,
}

impl DatabaseConfig {
    /// Check that the settings are usable before a connection is attempted.
    pub fn validate(&self) -> Result<(), StepError> {
        for (field, value) in [
            ("driver", &self.driver),
            ("host", &self.host),
            ("database", &self.database),
        ] {
            if value.trim().is_empty() {
                return Err(StepError::InvalidConfiguration(format!(
                    "database {} must not be empty",
                    field
                )));
            }
        }

        if self.port == 0 {
            return Err(StepError::InvalidConfiguration(
                "database port must be between 1 and 65535".to_string(),
            ));
        }

        let prefix_re = Regex::new(r"^\w*$").expect("Invalid prefix regex");
        if !prefix_re.is_match(&self.prefix) || self.prefix.chars().count() > MAX_PREFIX_LEN {
            return Err(StepError::InvalidConfiguration(format!(
                "table prefix may contain at most {} letters, digits or underscores",
                MAX_PREFIX_LEN
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// The first administrator account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    /// Login name.
    pub username: String,
    /// Contact address, stored as already confirmed.
    pub email: String,
    /// Plain-text password; hashing is up to the [`Connection`](crate::Connection).
    pub password: String,
}

impl AdminUser {
    /// Create an admin user record.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check the identity fields before the account is created.
    ///
    /// ```rust
    /// use app_installer::AdminUser;
    ///
    /// assert!(AdminUser::new("admin", "a@b.com", "secret").validate().is_ok());
    /// assert!(AdminUser::new("admin", "not-an-email", "secret").validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), StepError> {
        if self.username.trim().is_empty() {
            return Err(StepError::InvalidConfiguration(
                "admin username must not be empty".to_string(),
            ));
        }

        let email_re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex");
        if !email_re.is_match(&self.email) {
            return Err(StepError::InvalidConfiguration(format!(
                "admin email {:?} is not a valid address",
                self.email
            )));
        }

        if self.password.is_empty() {
            return Err(StepError::InvalidConfiguration(
                "admin password must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for AdminUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Directories the installation works with.
///
/// These are fixed when the [`Installation`](crate::Installation) is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallPaths {
    /// Application root; the config file lives here.
    pub base: PathBuf,
    /// Web root served to browsers.
    pub public: PathBuf,
    /// Writable storage for caches, logs and uploads.
    pub storage: PathBuf,
    /// Third-party code, including bundled extensions.
    pub vendor: PathBuf,
}

impl InstallPaths {
    /// Group the four installation directories.
    pub fn new(
        base: impl Into<PathBuf>,
        public: impl Into<PathBuf>,
        storage: impl Into<PathBuf>,
        vendor: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base: base.into(),
            public: public.into(),
            storage: storage.into(),
            vendor: vendor.into(),
        }
    }

    /// Directory that receives published assets.
    pub fn asset_path(&self) -> PathBuf {
        self.public.join(ASSETS_DIR)
    }
}

/// Finalized installation parameters.
///
/// Produced by [`Installation::snapshot`](crate::Installation::snapshot) once
/// every required value is present. All pipeline steps read from the same
/// snapshot, so nothing configured afterwards can leak into a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    /// Installation directories.
    pub paths: InstallPaths,
    /// Config file location relative to the base path, if customized.
    pub config_path: Option<PathBuf>,
    /// Whether the application runs in debug mode.
    pub debug: bool,
    /// Normalized base URL (no trailing slash).
    pub base_url: String,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Settings that override the defaults written to the database.
    pub settings: BTreeMap<String, String>,
    /// The first administrator.
    pub admin: AdminUser,
}

impl InstallConfig {
    /// Location of the config file, always inside the base path.
    ///
    /// Fails when the custom path is absolute or climbs out of the base path
    /// with `..`.
    pub fn config_file(&self) -> Result<PathBuf, StepError> {
        let relative = self
            .config_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.file_name().is_none() {
            return Err(StepError::InvalidConfiguration(format!(
                "config path {} must be a file path relative to the base path",
                relative.display()
            )));
        }

        Ok(self.paths.base.join(relative))
    }

    /// Directory that receives published assets.
    pub fn asset_path(&self) -> PathBuf {
        self.paths.asset_path()
    }

    /// Directory holding the schema migrations shipped with the installer.
    pub fn migration_path(&self) -> PathBuf {
        migration_path()
    }
}

/// Migrations ship next to the installer's own sources.
pub(crate) fn migration_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

/// Route prefixes written to the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPaths {
    /// Prefix of the JSON API.
    pub api: String,
    /// Prefix of the admin panel.
    pub admin: String,
}

impl Default for StoredPaths {
    fn default() -> Self {
        Self {
            api: "api".to_string(),
            admin: "admin".to_string(),
        }
    }
}

/// The document persisted by the store-config step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    /// Debug mode flag.
    pub debug: bool,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Normalized base URL.
    pub url: String,
    /// Route prefixes.
    pub paths: StoredPaths,
}

impl From<&InstallConfig> for StoredConfig {
    fn from(config: &InstallConfig) -> Self {
        Self {
            debug: config.debug,
            database: config.database.clone(),
            url: config.base_url.clone(),
            paths: StoredPaths::default(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn database() -> DatabaseConfig {
        DatabaseConfig {
            driver: "mysql".to_string(),
            host: "localhost".to_string(),
            port: 3306,
            database: "forum".to_string(),
            username: "root".to_string(),
            password: "hunter2".to_string(),
            prefix: "app_".to_string(),
        }
    }

    fn config() -> InstallConfig {
        InstallConfig {
            paths: InstallPaths::new(
                "/srv/app",
                "/srv/app/public",
                "/srv/app/storage",
                "/srv/app/vendor",
            ),
            config_path: None,
            debug: false,
            base_url: "http://example.com".to_string(),
            database: database(),
            settings: BTreeMap::new(),
            admin: AdminUser::new("admin", "a@b.com", "secret"),
        }
    }

    #[test]
    fn test_valid_database_config() {
        assert!(database().validate().is_ok());
    }

    #[test]
    fn test_database_config_rejects_empty_host() {
        let db = DatabaseConfig {
            host: "  ".to_string(),
            ..database()
        };
        let err = db.validate().unwrap_err();
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn test_database_config_rejects_zero_port() {
        let db = DatabaseConfig {
            port: 0,
            ..database()
        };
        assert!(db.validate().is_err());
    }

    #[test]
    fn test_database_config_prefix_rules() {
        let long = DatabaseConfig {
            prefix: "abcdefghijk".to_string(),
            ..database()
        };
        assert!(long.validate().is_err());

        let dashed = DatabaseConfig {
            prefix: "my-app".to_string(),
            ..database()
        };
        assert!(dashed.validate().is_err());

        let empty = DatabaseConfig {
            prefix: String::new(),
            ..database()
        };
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let db = format!("{:?}", database());
        assert!(!db.contains("hunter2"));
        assert!(db.contains("<redacted>"));

        let admin = format!("{:?}", AdminUser::new("admin", "a@b.com", "secret"));
        assert!(!admin.contains("secret"));
    }

    #[test]
    fn test_admin_validation() {
        assert!(AdminUser::new("admin", "a@b.com", "secret").validate().is_ok());
        assert!(AdminUser::new("", "a@b.com", "secret").validate().is_err());
        assert!(AdminUser::new("admin", "a@b", "secret").validate().is_err());
        assert!(AdminUser::new("admin", "a@b.com", "").validate().is_err());
    }

    #[test]
    fn test_derived_paths() {
        let mut config = config();
        assert_eq!(
            config.config_file().unwrap(),
            PathBuf::from("/srv/app/config.json")
        );
        assert_eq!(config.asset_path(), PathBuf::from("/srv/app/public/assets"));
        assert!(config.migration_path().ends_with("migrations"));

        config.config_path = Some(PathBuf::from("etc/app.json"));
        assert_eq!(
            config.config_file().unwrap(),
            PathBuf::from("/srv/app/etc/app.json")
        );
    }

    #[test]
    fn test_config_file_stays_under_base() {
        let mut config = config();
        for path in ["/etc/app.json", "../app.json", "etc/../../app.json", "", "."] {
            config.config_path = Some(PathBuf::from(path));
            assert!(
                matches!(config.config_file(), Err(StepError::InvalidConfiguration(_))),
                "{:?} should be rejected",
                path
            );
        }

        config.config_path = Some(PathBuf::from("./etc/app.json"));
        let file = config.config_file().unwrap();
        assert!(file.starts_with("/srv/app"));
        assert!(file.ends_with("etc/app.json"));
    }

    #[test]
    fn test_stored_config_from_snapshot() {
        let stored = StoredConfig::from(&config());
        assert_eq!(stored.url, "http://example.com");
        assert_eq!(stored.paths.api, "api");
        assert_eq!(stored.paths.admin, "admin");

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["database"]["password"], "hunter2");
        assert_eq!(json["debug"], false);
    }
}
