//! Config loading facade over the layered sources.

use super::merge::builder_with_defaults;
use super::sources::{add_files, layered_files};
use super::StageConfig;
use config::{ConfigError, Environment, File};
use std::path::Path;
use tracing::debug;

/// Loads [`StageConfig`] from files and the environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence, lowest first: defaults, global file, workspace files,
    /// `STAGETREE__SECTION__KEY` environment variables.
    pub fn load(workspace_root: &Path) -> Result<StageConfig, ConfigError> {
        let files = layered_files(workspace_root);
        let config = add_files(builder_with_defaults()?, &files)
            .add_source(Environment::with_prefix("STAGETREE").separator("__"))
            .build()?
            .try_deserialize::<StageConfig>()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from one explicit file on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<StageConfig, ConfigError> {
        builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<StageConfig>()
    }
}
