//! Enabling the extensions that ship with the application.

use super::{RunContext, Step, StepKind};
use crate::collaborators::ExtensionManager;
use crate::config::InstallConfig;
use crate::errors::StepError;
use std::sync::Arc;
use tracing::{debug, info};

/// Extensions enabled on every fresh installation, in activation order.
pub const BUNDLED_EXTENSIONS: &[&str] = &[
    "approval",
    "bbcode",
    "emoji",
    "lang-english",
    "flags",
    "likes",
    "lock",
    "markdown",
    "mentions",
    "statistics",
    "sticky",
    "subscriptions",
    "suspend",
    "tags",
];

/// Enables [`BUNDLED_EXTENSIONS`].
pub struct EnableBundledExtensions {
    config: Arc<InstallConfig>,
    manager: Arc<dyn ExtensionManager>,
}

impl EnableBundledExtensions {
    pub(crate) fn new(config: Arc<InstallConfig>, manager: Arc<dyn ExtensionManager>) -> Self {
        Self { config, manager }
    }
}

impl Step for EnableBundledExtensions {
    fn kind(&self) -> StepKind {
        StepKind::EnableBundledExtensions
    }

    fn execute(&self, ctx: &mut RunContext) -> Result<(), StepError> {
        let connection = ctx.connection()?;
        let assets = self.config.asset_path();

        for &extension in BUNDLED_EXTENSIONS {
            self.manager
                .enable(connection, &self.config.paths.vendor, &assets, extension)?;
            debug!(extension, "enabled extension");
        }

        info!(count = BUNDLED_EXTENSIONS.len(), "enabled bundled extensions");
        Ok(())
    }
}
