//! Steps that write to the filesystem.

use super::{RunContext, Step, StepKind};
use crate::collaborators::{AssetPublisher, ConfigWriter};
use crate::config::{InstallConfig, StoredConfig};
use crate::errors::StepError;
use std::sync::Arc;
use tracing::info;

/// Writes the application config file.
pub struct StoreConfig {
    config: Arc<InstallConfig>,
    writer: Arc<dyn ConfigWriter>,
}

impl StoreConfig {
    pub(crate) fn new(config: Arc<InstallConfig>, writer: Arc<dyn ConfigWriter>) -> Self {
        Self { config, writer }
    }
}

impl Step for StoreConfig {
    fn kind(&self) -> StepKind {
        StepKind::StoreConfig
    }

    fn execute(&self, _ctx: &mut RunContext) -> Result<(), StepError> {
        let path = self.config.config_file()?;
        let stored = StoredConfig::from(self.config.as_ref());
        self.writer.write_config(&path, &stored)?;
        info!(path = %path.display(), "stored config");
        Ok(())
    }
}

/// Publishes vendor assets into the public asset directory.
pub struct PublishAssets {
    config: Arc<InstallConfig>,
    publisher: Arc<dyn AssetPublisher>,
}

impl PublishAssets {
    pub(crate) fn new(config: Arc<InstallConfig>, publisher: Arc<dyn AssetPublisher>) -> Self {
        Self { config, publisher }
    }
}

impl Step for PublishAssets {
    fn kind(&self) -> StepKind {
        StepKind::PublishAssets
    }

    fn execute(&self, _ctx: &mut RunContext) -> Result<(), StepError> {
        let assets = self.config.asset_path();
        self.publisher.publish(&self.config.paths.vendor, &assets)?;
        info!(assets = %assets.display(), "published assets");
        Ok(())
    }
}
