//! Error types for installation operations.
//!
//! This module defines the errors that can occur while configuring the
//! installer, checking prerequisites and running the pipeline. Each
//! user-facing [`InstallError`] variant includes an actionable fix suggestion
//! to help operators resolve the issue.

use crate::prereq::CheckResult;
use crate::steps::StepKind;
use thiserror::Error;

/// Errors that can occur during installation.
///
/// Each variant includes contextual information about what went wrong and
/// a `fix` field with an actionable suggestion for resolving the issue.
///
/// # Example
///
/// ```rust
/// use app_installer::InstallError;
///
/// fn handle_error(error: InstallError) {
///     eprintln!("Installation failed: {}", error);
///     eprintln!("To fix: {}", error.fix_suggestion());
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstallError {
    /// The base URL could not be parsed into a scheme and host.
    #[error("Invalid base URL {input:?}: {reason}")]
    InvalidBaseUrl {
        /// The value as it was given to the installer.
        input: String,
        /// Why parsing failed.
        reason: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// A value the pipeline depends on was never configured.
    #[error("Missing configuration: {field}")]
    MissingConfiguration {
        /// Name of the missing setting (e.g., "database config").
        field: &'static str,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// One or more environment checks failed.
    ///
    /// `failures` lists every failing check, not just the first one.
    #[error("{} prerequisite check(s) failed", .failures.len())]
    PrerequisitesFailed {
        /// The failing checks in evaluation order.
        failures: Vec<CheckResult>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// A pipeline step failed and the installation halted.
    #[error("Step '{}' failed: {source}", .step.label())]
    StepFailed {
        /// The step that failed.
        step: StepKind,
        /// The error reported by the step.
        #[source]
        source: StepError,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },
}

impl InstallError {
    /// Get an actionable suggestion for fixing this error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use app_installer::InstallError;
    ///
    /// let error = InstallError::MissingConfiguration {
    ///     field: "database config",
    ///     fix: "Call database_config() before build()".to_string(),
    /// };
    /// assert!(error.fix_suggestion().contains("database_config"));
    /// ```
    pub fn fix_suggestion(&self) -> &str {
        match self {
            Self::InvalidBaseUrl { fix, .. } => fix,
            Self::MissingConfiguration { fix, .. } => fix,
            Self::PrerequisitesFailed { fix, .. } => fix,
            Self::StepFailed { fix, .. } => fix,
        }
    }

    pub(crate) fn missing(field: &'static str, setter: &str) -> Self {
        Self::MissingConfiguration {
            field,
            fix: format!("Call {}() on the installation before building it", setter),
        }
    }
}

/// Error reported by a single installation step.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepError {
    /// The step needs the database connection but no earlier step opened it.
    #[error("no database connection is open")]
    NotConnected,

    /// The configuration handed to the step is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An external collaborator reported a failure.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// Failures reported by collaborator implementations (database, filesystem,
/// migration runner and so on).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CollaboratorError {
    /// Could not open or use the database connection.
    #[error("database connection error: {0}")]
    Connection(String),

    /// A schema migration failed to apply.
    #[error("migration error: {0}")]
    Migration(String),

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The collaborator refused the request (e.g., duplicate record).
    #[error("{0}")]
    Rejected(String),
}

impl StepError {
    /// Suggested operator action for a failure of the given step.
    pub(crate) fn fix_for(&self, step: StepKind) -> String {
        match (self, step) {
            (Self::NotConnected, _) => {
                "Run the full pipeline; the database step must succeed first".to_string()
            }
            (Self::InvalidConfiguration(_), StepKind::CreateAdminUser) => {
                "Provide a non-empty username and a valid email for the admin user".to_string()
            }
            (Self::InvalidConfiguration(_), _) => {
                "Check the database settings passed to database_config()".to_string()
            }
            (Self::Collaborator(CollaboratorError::Connection(_)), _) => {
                "Check that the database server is running and the credentials are correct"
                    .to_string()
            }
            (Self::Collaborator(CollaboratorError::Migration(_)), _) => {
                "Inspect the migration error, fix the database state and reinstall".to_string()
            }
            (Self::Collaborator(CollaboratorError::Io(_)), _) => {
                "Check that the installation paths exist and are writable".to_string()
            }
            (Self::Collaborator(_), _) => {
                format!("Resolve the problem reported by '{}' and reinstall", step.label())
            }
        }
    }
}
