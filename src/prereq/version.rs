//! Runtime version probing.

use regex::Regex;
use semver::Version;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Default timeout for a runtime version probe.
pub(crate) const VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a version probe produced no version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProbeError {
    /// The command did not finish in time.
    Timeout,
    /// The command could not be started or exited unsuccessfully.
    Failed(String),
    /// The command ran but printed nothing that looks like a version.
    Unparseable(String),
}

/// Run `program args...` and parse a version from its output.
///
/// stdout is preferred, stderr is used when stdout is empty (some tools
/// print their version there). The child is killed if it outlives
/// [`VERSION_TIMEOUT`].
///
/// # Arguments
///
/// * `program` - Path to the executable to probe
/// * `args` - Arguments that make it print its version (e.g., `--version`)
///
/// # Returns
///
/// `Ok(Version)` if the command succeeded and printed a version,
/// `Err(ProbeError::Timeout)` if it did not finish in time,
/// `Err(ProbeError::Failed)` if it could not start or exited unsuccessfully,
/// `Err(ProbeError::Unparseable)` with the trimmed output otherwise.
pub(crate) async fn probe_version(program: &Path, args: &[String]) -> Result<Version, ProbeError> {
    // kill_on_drop reaps the child when the timeout drops the future
    let mut cmd = Command::new(program);
    cmd.args(args).kill_on_drop(true);

    let output = timeout(VERSION_TIMEOUT, cmd.output())
        .await
        .map_err(|_| ProbeError::Timeout)?
        .map_err(|e| ProbeError::Failed(e.to_string()))?;

    if !output.status.success() {
        return Err(ProbeError::Failed(format!(
            "exited with {}",
            output.status
        )));
    }

    // Fall back to stderr for tools that print their version there
    let out = if !output.stdout.is_empty() {
        output.stdout
    } else {
        output.stderr
    };
    let text = String::from_utf8_lossy(&out);

    parse_version(&text).ok_or_else(|| ProbeError::Unparseable(text.trim().to_string()))
}

/// Extract the first version number from CLI output.
///
/// Handles the formats runtimes and tools commonly print:
///
/// - `v18.17.1` -> 18.17.1
/// - `Version: 3.2.1` -> 3.2.1
/// - `tar (GNU tar) 1.34` -> 1.34.0 (patch defaults to 0)
///
/// # Arguments
///
/// * `output` - The CLI output text to parse
///
/// # Returns
///
/// `Some(Version)` for the first `major.minor[.patch]` found, `None` if
/// nothing matches or a component overflows.
pub(crate) fn parse_version(output: &str) -> Option<Version> {
    // Optional leading "v", two or three numeric components
    let re = Regex::new(r"v?(\d+)\.(\d+)(?:\.(\d+))?").expect("Invalid version regex");
    let caps = re.captures(output)?;

    let part = |i: usize| -> Option<u64> {
        caps.get(i)
            .map(|m| m.as_str().parse().ok())
            .unwrap_or(Some(0))
    };

    Some(Version::new(part(1)?, part(2)?, part(3)?))
}
