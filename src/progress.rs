//! Progress reporting types for installation runs.
//!
//! The [`InstallProgress`] enum represents discrete stages of an installation
//! that are reported to a callback while the pipeline runs, so a CLI or web
//! UI can render a live progress list.

use crate::steps::StepKind;

/// Progress stages during an installation run.
///
/// # Example
///
/// ```rust
/// use app_installer::InstallProgress;
///
/// fn on_progress(progress: InstallProgress) {
///     match &progress {
///         InstallProgress::CheckingPrerequisites => println!("Checking prerequisites..."),
///         InstallProgress::Started { total_steps } => {
///             println!("Installing ({} steps)", total_steps);
///         }
///         InstallProgress::StepStarted { step, index, total } => {
///             println!("[{}/{}] {}...", index + 1, total, step.label());
///         }
///         InstallProgress::StepCompleted { step } => println!("  {} done", step.label()),
///         InstallProgress::StepFailed { step, message } => {
///             println!("  {} failed: {}", step.label(), message);
///         }
///         InstallProgress::Completed => println!("Installation complete"),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallProgress {
    /// Checking prerequisites before any step runs.
    CheckingPrerequisites,

    /// The pipeline started.
    Started {
        /// Number of steps that will run if none fails.
        total_steps: usize,
    },

    /// A step is about to run.
    StepStarted {
        /// The step.
        step: StepKind,
        /// Zero-based position in the pipeline.
        index: usize,
        /// Number of steps in the pipeline.
        total: usize,
    },

    /// A step finished successfully.
    StepCompleted {
        /// The step.
        step: StepKind,
    },

    /// A step failed; no further steps will run.
    StepFailed {
        /// The step.
        step: StepKind,
        /// The step's error message.
        message: String,
    },

    /// Every step finished successfully.
    Completed,
}

impl InstallProgress {
    /// Get a human-readable description of the current progress stage.
    ///
    /// # Example
    ///
    /// ```rust
    /// use app_installer::InstallProgress;
    ///
    /// let progress = InstallProgress::CheckingPrerequisites;
    /// assert_eq!(progress.description(), "Checking prerequisites");
    /// ```
    pub fn description(&self) -> &'static str {
        match self {
            Self::CheckingPrerequisites => "Checking prerequisites",
            Self::Started { .. } => "Starting installation",
            Self::StepStarted { step, .. } => step.label(),
            Self::StepCompleted { .. } => "Step complete",
            Self::StepFailed { .. } => "Step failed",
            Self::Completed => "Installation complete",
        }
    }

    /// Check if this progress stage ends the run, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::StepFailed { .. })
    }
}
