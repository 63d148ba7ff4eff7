//! Installation steps.
//!
//! Each step is one unit of installation work with a name and an
//! [`execute`](Step::execute) contract. The standard installation consists
//! of seven steps in a fixed order; see [`StepKind::all`].

mod database;
mod extensions;
mod files;

pub use database::{ConnectToDatabase, CreateAdminUser, RunMigrations, WriteSettings};
pub use extensions::{EnableBundledExtensions, BUNDLED_EXTENSIONS};
pub use files::{PublishAssets, StoreConfig};

use crate::collaborators::{Collaborators, Connection};
use crate::config::InstallConfig;
use crate::errors::StepError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Identifies a step of the standard installation.
///
/// Variants are declared in execution order.
///
/// # Example
///
/// ```rust
/// use app_installer::StepKind;
///
/// let order: Vec<_> = StepKind::all().map(|k| k.label()).collect();
/// assert_eq!(order.first(), Some(&"Connect to database"));
/// assert_eq!(order.len(), 7);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::EnumIter,
)]
pub enum StepKind {
    /// Open the database connection.
    ConnectToDatabase,
    /// Write the config file.
    StoreConfig,
    /// Apply schema migrations.
    RunMigrations,
    /// Write default and custom settings.
    WriteSettings,
    /// Create the administrator account.
    CreateAdminUser,
    /// Publish vendor assets into the web root.
    PublishAssets,
    /// Enable the extensions bundled with the application.
    EnableBundledExtensions,
}

impl StepKind {
    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ConnectToDatabase => "Connect to database",
            Self::StoreConfig => "Store config",
            Self::RunMigrations => "Run migrations",
            Self::WriteSettings => "Write settings",
            Self::CreateAdminUser => "Create admin user",
            Self::PublishAssets => "Publish assets",
            Self::EnableBundledExtensions => "Enable bundled extensions",
        }
    }

    /// All steps in execution order.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// State threaded through one pipeline run.
///
/// Holds the database connection opened by the first step. Every later step
/// that needs the database reads the same handle.
#[derive(Default)]
pub struct RunContext {
    connection: Option<Arc<dyn Connection>>,
}

impl RunContext {
    /// A context with no connection yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The open connection, or [`StepError::NotConnected`].
    pub fn connection(&self) -> Result<&Arc<dyn Connection>, StepError> {
        self.connection.as_ref().ok_or(StepError::NotConnected)
    }

    /// Whether a connection has been opened.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub(crate) fn set_connection(&mut self, connection: Arc<dyn Connection>) {
        self.connection = Some(connection);
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// A single unit of installation work.
pub trait Step: Send {
    /// Which step this is.
    fn kind(&self) -> StepKind;

    /// Short human-readable label.
    fn name(&self) -> &'static str {
        self.kind().label()
    }

    /// Perform the work, reading and updating the shared run state.
    fn execute(&self, ctx: &mut RunContext) -> Result<(), StepError>;
}

/// Construct the seven standard steps from one configuration snapshot.
pub(crate) fn standard_steps(
    config: &Arc<InstallConfig>,
    collaborators: &Collaborators,
) -> Vec<Box<dyn Step>> {
    vec![
        Box::new(ConnectToDatabase::new(
            Arc::clone(config),
            Arc::clone(&collaborators.database),
        )),
        Box::new(StoreConfig::new(
            Arc::clone(config),
            Arc::clone(&collaborators.config_writer),
        )),
        Box::new(RunMigrations::new(
            Arc::clone(config),
            Arc::clone(&collaborators.migrations),
        )),
        Box::new(WriteSettings::new(Arc::clone(config))),
        Box::new(CreateAdminUser::new(Arc::clone(config))),
        Box::new(PublishAssets::new(
            Arc::clone(config),
            Arc::clone(&collaborators.assets),
        )),
        Box::new(EnableBundledExtensions::new(
            Arc::clone(config),
            Arc::clone(&collaborators.extensions),
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        let all: Vec<_> = StepKind::all().collect();
        assert_eq!(
            all,
            vec![
                StepKind::ConnectToDatabase,
                StepKind::StoreConfig,
                StepKind::RunMigrations,
                StepKind::WriteSettings,
                StepKind::CreateAdminUser,
                StepKind::PublishAssets,
                StepKind::EnableBundledExtensions,
            ]
        );
    }

    #[test]
    fn test_labels_are_distinct() {
        let mut labels: Vec<_> = StepKind::all().map(|k| k.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 7);
        assert_eq!(StepKind::RunMigrations.to_string(), "Run migrations");
    }

    #[test]
    fn test_run_context_starts_disconnected() {
        let ctx = RunContext::new();
        assert!(!ctx.is_connected());
        assert!(matches!(ctx.connection(), Err(StepError::NotConnected)));
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&StepKind::CreateAdminUser).unwrap();
        let back: StepKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StepKind::CreateAdminUser);
    }
}
