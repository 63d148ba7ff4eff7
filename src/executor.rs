//! End-to-end installation: prerequisites first, then the pipeline.

use crate::builder::Installation;
use crate::collaborators::Collaborators;
use crate::errors::InstallError;
use crate::progress::InstallProgress;
use tracing::info;

/// Install the application.
///
/// This function:
/// 1. Evaluates the prerequisites, failing with every unmet check
/// 2. Finalizes the configuration and assembles the pipeline
/// 3. Runs the pipeline, reporting each step via `on_progress`
///
/// The environment report comes first, even when the configuration is
/// incomplete. No step runs unless every prerequisite passed.
///
/// # Example
///
/// ```rust,no_run
/// use app_installer::{install, Collaborators, Installation};
///
/// async fn run(installation: Installation, collaborators: Collaborators) {
///     let result = install(&installation, &collaborators, |progress| {
///         println!("{:?}", progress)
///     })
///     .await;
///
///     match result {
///         Ok(()) => println!("Installed successfully!"),
///         Err(e) => println!("Failed: {}. Fix: {}", e, e.fix_suggestion()),
///     }
/// }
/// ```
pub async fn install<F>(
    installation: &Installation,
    collaborators: &Collaborators,
    mut on_progress: F,
) -> Result<(), InstallError>
where
    F: FnMut(InstallProgress),
{
    on_progress(InstallProgress::CheckingPrerequisites);
    installation.prerequisites().check().await?;
    info!("prerequisites met");

    let pipeline = installation.build(collaborators)?;

    pipeline.run(&mut on_progress).into_result()
}
