//! Ordered, fail-fast execution of installation steps.

use crate::errors::{InstallError, StepError};
use crate::progress::InstallProgress;
use crate::steps::{RunContext, Step, StepKind};
use std::fmt;
use tracing::{info, warn};

/// An ordered sequence of installation steps.
///
/// Steps run strictly in registration order on the caller's thread. The
/// first failure stops the run; steps that already completed are not undone.
/// [`run`](Pipeline::run) consumes the pipeline, because running the same
/// steps twice would repeat side effects that were already applied.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub(crate) fn pipe(&mut self, step: Box<dyn Step>) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step is registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The registered steps, in execution order.
    pub fn steps(&self) -> Vec<StepKind> {
        self.steps.iter().map(|step| step.kind()).collect()
    }

    /// Run every step in order until one fails.
    ///
    /// `on_progress` is called before and after each step, so callers can
    /// render live progress.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use app_installer::{Collaborators, Installation, InstallError};
    ///
    /// fn install(installation: &Installation, collaborators: &Collaborators) -> Result<(), InstallError> {
    ///     let pipeline = installation.build(collaborators)?;
    ///     let report = pipeline.run(|progress| println!("{}", progress.description()));
    ///     report.into_result()
    /// }
    /// ```
    pub fn run<F>(self, mut on_progress: F) -> PipelineReport
    where
        F: FnMut(InstallProgress),
    {
        let total = self.steps.len();
        let mut ctx = RunContext::new();
        let mut outcomes = Vec::with_capacity(total);

        info!(steps = total, "starting installation");
        on_progress(InstallProgress::Started { total_steps: total });

        for (index, step) in self.steps.iter().enumerate() {
            let kind = step.kind();
            on_progress(InstallProgress::StepStarted {
                step: kind,
                index,
                total,
            });

            match step.execute(&mut ctx) {
                Ok(()) => {
                    info!(step = step.name(), "step completed");
                    on_progress(InstallProgress::StepCompleted { step: kind });
                    outcomes.push(StepOutcome::Succeeded(kind));
                }
                Err(error) => {
                    warn!(step = step.name(), %error, "step failed, halting installation");
                    on_progress(InstallProgress::StepFailed {
                        step: kind,
                        message: error.to_string(),
                    });
                    outcomes.push(StepOutcome::Failed { step: kind, error });
                    return PipelineReport { outcomes };
                }
            }
        }

        info!("installation completed");
        on_progress(InstallProgress::Completed);
        PipelineReport { outcomes }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.steps())
            .finish()
    }
}

/// What happened to one attempted step.
#[derive(Debug)]
pub enum StepOutcome {
    /// The step finished successfully.
    Succeeded(StepKind),
    /// The step failed and the run halted.
    Failed {
        /// The step.
        step: StepKind,
        /// Its error.
        error: StepError,
    },
}

impl StepOutcome {
    /// The step this outcome belongs to.
    pub fn step(&self) -> StepKind {
        match self {
            Self::Succeeded(step) => *step,
            Self::Failed { step, .. } => *step,
        }
    }

    /// Whether the step succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every step succeeded.
    Completed,
    /// The given step failed; later steps did not run.
    FailedAt(StepKind),
}

/// The steps a run attempted, in order, with their outcomes.
///
/// Only the last outcome can be a failure.
#[derive(Debug)]
pub struct PipelineReport {
    outcomes: Vec<StepOutcome>,
}

impl PipelineReport {
    /// Every attempted step.
    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// Whether the run reached the end or which step stopped it.
    pub fn status(&self) -> RunStatus {
        match self.outcomes.last() {
            Some(StepOutcome::Failed { step, .. }) => RunStatus::FailedAt(*step),
            _ => RunStatus::Completed,
        }
    }

    /// Whether every step succeeded.
    pub fn is_completed(&self) -> bool {
        self.status() == RunStatus::Completed
    }

    /// Steps that finished successfully before the run ended.
    pub fn completed_steps(&self) -> Vec<StepKind> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_success())
            .map(StepOutcome::step)
            .collect()
    }

    /// Convert into the failing step's error, if any.
    pub fn into_result(self) -> Result<(), InstallError> {
        match self.outcomes.into_iter().last() {
            Some(StepOutcome::Failed { step, error }) => Err(InstallError::StepFailed {
                fix: error.fix_for(step),
                step,
                source: error,
            }),
            _ => Ok(()),
        }
    }
}
