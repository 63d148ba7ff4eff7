//! # app-installer
//!
//! One-time installation pipeline for a self-hosted web application.
//!
//! The installer verifies environment prerequisites, writes the config file,
//! initializes the database schema, seeds the settings and the first admin
//! account, and publishes static assets. Work is split into seven steps that
//! run in a fixed order and stop at the first failure, reporting which step
//! failed and why.
//!
//! ## Features
//!
//! - [`Installation`] collects configuration and normalizes the base URL
//! - [`Prerequisites`] checks the runtime, required tools and writable paths,
//!   reporting every problem at once
//! - [`Pipeline`] runs the steps with live [`InstallProgress`] reporting
//! - Collaborator traits ([`DatabaseConnector`], [`MigrationRunner`], ...)
//!   plug in the concrete database and filesystem layer
//!
//! ## Example
//!
//! ```rust,no_run
//! use app_installer::{AdminUser, Collaborators, DatabaseConfig, Installation};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     # let collaborators: Collaborators = unimplemented!();
//!     # let database: DatabaseConfig = unimplemented!();
//!     let installation = Installation::new(
//!         "/srv/app",
//!         "/srv/app/public",
//!         "/srv/app/storage",
//!         "/srv/app/vendor",
//!     )
//!     .database_config(database)
//!     .admin_user(AdminUser::new("admin", "admin@example.com", "correct horse"))
//!     .base_url("example.com/forum")?;
//!
//!     // Environment problems are reported before anything is written.
//!     let report = installation.prerequisites().evaluate().await;
//!     for failure in report.failures() {
//!         eprintln!("{}: {}", failure.name, failure.message);
//!     }
//!     report.into_result()?;
//!
//!     let pipeline = installation.build(&collaborators)?;
//!     pipeline
//!         .run(|progress| println!("{}", progress.description()))
//!         .into_result()?;
//!     Ok(())
//! }
//! ```

mod base_url;
mod builder;
mod collaborators;
mod config;
mod errors;
mod executor;
mod pipeline;
mod prereq;
mod progress;
mod steps;

pub use base_url::normalize_base_url;
pub use builder::Installation;
pub use collaborators::{
    AssetPublisher, Collaborators, ConfigWriter, Connection, DatabaseConnector, ExtensionManager,
    JsonConfigWriter, MigrationRunner,
};
pub use config::{
    AdminUser, DatabaseConfig, InstallConfig, InstallPaths, StoredConfig, StoredPaths, ASSETS_DIR,
    DEFAULT_CONFIG_FILE,
};
pub use errors::{CollaboratorError, InstallError, StepError};
pub use executor::install;
pub use pipeline::{Pipeline, PipelineReport, RunStatus, StepOutcome};
pub use prereq::{
    Check, CheckResult, PrerequisiteReport, Prerequisites, Requirements, RuntimeRequirement,
};
pub use progress::InstallProgress;
pub use steps::{RunContext, Step, StepKind, BUNDLED_EXTENSIONS};
