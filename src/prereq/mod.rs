//! Environment prerequisite checks.
//!
//! Prerequisites are evaluated before any stateful installation step runs so
//! that environment problems surface before anything is written. Evaluation
//! never stops at the first problem: the [`PrerequisiteReport`] lists every
//! check, letting the operator fix all issues in one pass.
//!
//! # Example
//!
//! ```rust,no_run
//! use app_installer::Installation;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let installation = Installation::new(
//!         "/srv/app",
//!         "/srv/app/public",
//!         "/srv/app/storage",
//!         "/srv/app/vendor",
//!     );
//!
//!     let report = installation.prerequisites().evaluate().await;
//!     for check in report.failures() {
//!         eprintln!("{}: {}", check.name, check.message);
//!     }
//! }
//! ```

mod path_finder;
mod version;
mod writable;

use crate::InstallError;
use path_finder::find_executable;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};
use version::{probe_version, ProbeError};
use writable::is_writable_dir;

/// A runtime that must be installed in at least a given version.
///
/// # Example
///
/// ```rust
/// use app_installer::RuntimeRequirement;
/// use semver::Version;
///
/// let node = RuntimeRequirement::new("Node.js", "node", Version::new(18, 0, 0));
/// assert_eq!(node.args, vec!["--version".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeRequirement {
    /// Display name (e.g., "Node.js").
    pub name: String,
    /// Executable to probe (e.g., "node").
    pub program: String,
    /// Arguments that make `program` print its version.
    pub args: Vec<String>,
    /// Oldest acceptable version.
    pub minimum: Version,
}

impl RuntimeRequirement {
    /// A runtime probed with `program --version`.
    pub fn new(name: impl Into<String>, program: impl Into<String>, minimum: Version) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: vec!["--version".to_string()],
            minimum,
        }
    }

    /// Replace the probe arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// What the environment must provide, independent of installation paths.
///
/// The default is the fixed set the application ships with: Node.js 18+ for
/// building extension assets, plus `tar` and `gzip` for unpacking them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    /// Minimum runtime version, if a runtime is needed at all.
    pub runtime: Option<RuntimeRequirement>,
    /// Executables that must be available.
    pub tools: Vec<String>,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            runtime: Some(RuntimeRequirement::new(
                "Node.js",
                "node",
                Version::new(18, 0, 0),
            )),
            tools: vec!["tar".to_string(), "gzip".to_string()],
        }
    }
}

/// A single environment check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Check {
    /// A runtime is installed in at least the required version.
    RuntimeVersion(RuntimeRequirement),
    /// Every listed executable can be found.
    Executables(Vec<String>),
    /// Every listed directory exists and accepts new files.
    WritablePaths(Vec<PathBuf>),
}

impl Check {
    /// Evaluate the check, producing one result per inspected item.
    async fn evaluate(&self) -> Vec<CheckResult> {
        match self {
            Self::RuntimeVersion(runtime) => vec![check_runtime(runtime).await],
            Self::Executables(tools) => tools.iter().map(|tool| check_tool(tool)).collect(),
            Self::WritablePaths(paths) => paths
                .iter()
                .map(|path| {
                    let name = format!("writable {}", path.display());
                    match is_writable_dir(path) {
                        Ok(()) => CheckResult::passed(name, format!("{} is writable", path.display())),
                        Err(message) => CheckResult::failed(name, message),
                    }
                })
                .collect(),
        }
    }
}

async fn check_runtime(runtime: &RuntimeRequirement) -> CheckResult {
    let name = format!("{} {}+", runtime.name, runtime.minimum);

    let path = match find_executable(&runtime.program) {
        Some(path) => path,
        None => {
            return CheckResult::failed(
                name,
                format!(
                    "{} ({}) was not found; install {} {} or newer",
                    runtime.name, runtime.program, runtime.name, runtime.minimum
                ),
            )
        }
    };

    match probe_version(&path, &runtime.args).await {
        Ok(found) if found >= runtime.minimum => {
            CheckResult::passed(name, format!("{} {} found", runtime.name, found))
        }
        Ok(found) => CheckResult::failed(
            name,
            format!(
                "{} {} is older than the required {}; upgrade {}",
                runtime.name, found, runtime.minimum, runtime.name
            ),
        ),
        Err(ProbeError::Timeout) => CheckResult::failed(
            name,
            format!("{} did not report its version in time", runtime.program),
        ),
        Err(ProbeError::Failed(reason)) => CheckResult::failed(
            name,
            format!("could not run {}: {}", path.display(), reason),
        ),
        Err(ProbeError::Unparseable(output)) => CheckResult::failed(
            name,
            format!("could not read a version from {:?}", output),
        ),
    }
}

fn check_tool(tool: &str) -> CheckResult {
    let name = format!("tool {}", tool);
    match find_executable(tool) {
        Some(path) => CheckResult::passed(name, format!("found at {}", path.display())),
        None => CheckResult::failed(name, format!("{} was not found on PATH; install it", tool)),
    }
}

/// Outcome of one environment check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// What was checked (e.g., "tool tar", "writable /srv/app").
    pub name: String,
    /// Whether the environment satisfies the check.
    pub passed: bool,
    /// Human-readable detail; for failures, what to do about it.
    pub message: String,
}

impl CheckResult {
    pub(crate) fn passed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
        }
    }

    pub(crate) fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
        }
    }
}

/// Results of evaluating a [`Prerequisites`] composite, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteReport {
    /// Every check that was evaluated.
    pub results: Vec<CheckResult>,
}

impl PrerequisiteReport {
    /// `true` only if every check passed.
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// The failing checks, in evaluation order.
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// Convert into an error carrying every failing check.
    pub fn into_result(self) -> Result<(), InstallError> {
        if self.passed() {
            return Ok(());
        }

        let failures: Vec<CheckResult> = self.results.into_iter().filter(|r| !r.passed).collect();
        Err(InstallError::PrerequisitesFailed {
            failures,
            fix: "Fix every listed problem, then check the prerequisites again".to_string(),
        })
    }
}

/// A composite of environment checks.
///
/// Evaluation only inspects the environment; the writability probe creates
/// and immediately removes an anonymous temporary file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prerequisites {
    checks: Vec<Check>,
}

impl Prerequisites {
    /// Compose the given checks.
    pub fn new(checks: Vec<Check>) -> Self {
        Self { checks }
    }

    /// The checks in evaluation order.
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Evaluate every check and collect the results.
    pub async fn evaluate(&self) -> PrerequisiteReport {
        let mut results = Vec::new();
        for check in &self.checks {
            for result in check.evaluate().await {
                if result.passed {
                    debug!(check = %result.name, "prerequisite passed");
                } else {
                    warn!(check = %result.name, message = %result.message, "prerequisite failed");
                }
                results.push(result);
            }
        }
        PrerequisiteReport { results }
    }

    /// Evaluate and fail with every failing check if any did not pass.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use app_installer::{Check, Prerequisites};
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() {
    ///     let prerequisites = Prerequisites::new(vec![Check::Executables(vec!["tar".into()])]);
    ///     match prerequisites.check().await {
    ///         Ok(()) => println!("Environment ready"),
    ///         Err(e) => eprintln!("{} ({})", e, e.fix_suggestion()),
    ///     }
    /// }
    /// ```
    pub async fn check(&self) -> Result<(), InstallError> {
        self.evaluate().await.into_result()
    }
}
