//! Steps that work against the database.

use super::{RunContext, Step, StepKind};
use crate::collaborators::{DatabaseConnector, MigrationRunner};
use crate::config::InstallConfig;
use crate::errors::StepError;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Opens the connection every later database step uses.
pub struct ConnectToDatabase {
    config: Arc<InstallConfig>,
    connector: Arc<dyn DatabaseConnector>,
}

impl ConnectToDatabase {
    pub(crate) fn new(config: Arc<InstallConfig>, connector: Arc<dyn DatabaseConnector>) -> Self {
        Self { config, connector }
    }
}

impl Step for ConnectToDatabase {
    fn kind(&self) -> StepKind {
        StepKind::ConnectToDatabase
    }

    fn execute(&self, ctx: &mut RunContext) -> Result<(), StepError> {
        let database = &self.config.database;
        database.validate()?;

        let connection = self.connector.connect(database)?;
        info!(
            driver = %database.driver,
            host = %database.host,
            database = %database.database,
            "connected to database"
        );
        ctx.set_connection(connection);
        Ok(())
    }
}

/// Applies the schema migrations shipped with the installer.
pub struct RunMigrations {
    config: Arc<InstallConfig>,
    runner: Arc<dyn MigrationRunner>,
}

impl RunMigrations {
    pub(crate) fn new(config: Arc<InstallConfig>, runner: Arc<dyn MigrationRunner>) -> Self {
        Self { config, runner }
    }
}

impl Step for RunMigrations {
    fn kind(&self) -> StepKind {
        StepKind::RunMigrations
    }

    fn execute(&self, ctx: &mut RunContext) -> Result<(), StepError> {
        let connection = ctx.connection()?;
        let dir = self.config.migration_path();
        debug!(dir = %dir.display(), "applying migrations");
        self.runner.migrate(connection, &dir)?;
        Ok(())
    }
}

/// Writes the default settings, overlaid with the configured ones.
pub struct WriteSettings {
    config: Arc<InstallConfig>,
}

impl WriteSettings {
    pub(crate) fn new(config: Arc<InstallConfig>) -> Self {
        Self { config }
    }

    /// The rows that will be written: defaults first, custom values win.
    pub fn settings(&self) -> BTreeMap<String, String> {
        let mut settings = default_settings(&self.config.base_url);
        settings.extend(
            self.config
                .settings
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        settings
    }
}

impl Step for WriteSettings {
    fn kind(&self) -> StepKind {
        StepKind::WriteSettings
    }

    fn execute(&self, ctx: &mut RunContext) -> Result<(), StepError> {
        let connection = ctx.connection()?;
        let settings = self.settings();
        connection.write_settings(&settings)?;
        debug!(count = settings.len(), "wrote settings");
        Ok(())
    }
}

/// Settings every fresh installation starts with.
fn default_settings(base_url: &str) -> BTreeMap<String, String> {
    let host = Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "localhost".to_string());

    [
        ("allow_post_editing", "reply".to_string()),
        ("allow_renaming", "10".to_string()),
        ("allow_sign_up", "1".to_string()),
        ("custom_less", String::new()),
        ("default_locale", "en".to_string()),
        ("default_route", "/all".to_string()),
        ("extensions_enabled", "[]".to_string()),
        ("forum_description", String::new()),
        ("forum_title", "A new forum".to_string()),
        ("mail_driver", "mail".to_string()),
        ("mail_from", format!("noreply@{}", host)),
        ("theme_colored_header", "0".to_string()),
        ("theme_dark_mode", "0".to_string()),
        ("theme_primary_color", "#4D698E".to_string()),
        ("theme_secondary_color", "#4D698E".to_string()),
        (
            "welcome_message",
            "This is beta software and you should not use it in production.".to_string(),
        ),
        ("welcome_title", "Welcome to your new forum".to_string()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}

/// Creates the first administrator.
pub struct CreateAdminUser {
    config: Arc<InstallConfig>,
}

impl CreateAdminUser {
    pub(crate) fn new(config: Arc<InstallConfig>) -> Self {
        Self { config }
    }
}

impl Step for CreateAdminUser {
    fn kind(&self) -> StepKind {
        StepKind::CreateAdminUser
    }

    fn execute(&self, ctx: &mut RunContext) -> Result<(), StepError> {
        let connection = ctx.connection()?;
        let admin = &self.config.admin;
        admin.validate()?;
        connection.create_admin(admin)?;
        info!(username = %admin.username, "created admin user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminUser, InstallPaths};

    fn config(settings: &[(&str, &str)]) -> Arc<InstallConfig> {
        Arc::new(InstallConfig {
            paths: InstallPaths::new("/srv/app", "/srv/app/public", "/srv/app/storage", "/srv/app/vendor"),
            config_path: None,
            debug: false,
            base_url: "http://example.com/forum".to_string(),
            database: crate::config::tests::database(),
            settings: settings
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            admin: AdminUser::new("admin", "a@b.com", "secret"),
        })
    }

    #[test]
    fn test_default_settings_use_site_host() {
        let settings = default_settings("http://example.com/forum");
        assert_eq!(settings["mail_from"], "noreply@example.com");
        assert_eq!(settings["forum_title"], "A new forum");
    }

    #[test]
    fn test_custom_settings_override_defaults() {
        let step = WriteSettings::new(config(&[("welcomeTitle", "Hi"), ("forum_title", "Mine")]));
        let settings = step.settings();
        assert_eq!(settings["welcomeTitle"], "Hi");
        assert_eq!(settings["forum_title"], "Mine");
        assert_eq!(settings["default_locale"], "en");
    }

    #[test]
    fn test_database_steps_require_connection() {
        let mut ctx = RunContext::new();
        let settings = WriteSettings::new(config(&[]));
        assert!(matches!(settings.execute(&mut ctx), Err(StepError::NotConnected)));

        let admin = CreateAdminUser::new(config(&[]));
        assert!(matches!(admin.execute(&mut ctx), Err(StepError::NotConnected)));
        assert_eq!(admin.name(), "Create admin user");
    }
}
