//! Config file layers, lowest precedence first.

use config::builder::DefaultState;
use config::{ConfigBuilder, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "stagetree";
const ENV_SELECTOR: &str = "STAGETREE_ENV";
const DEFAULT_ENV: &str = "development";

/// `$XDG_CONFIG_HOME/stagetree/config.toml`, falling back to `~/.config`
pub fn global_config_path() -> Option<PathBuf> {
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(config_home.join(APP_DIR).join("config.toml"))
}

/// Every candidate file for a workspace in merge order.
///
/// The environment-specific file is selected by `STAGETREE_ENV`.
pub fn layered_files(workspace_root: &Path) -> Vec<PathBuf> {
    let env_name = std::env::var(ENV_SELECTOR).unwrap_or_else(|_| DEFAULT_ENV.to_string());
    let workspace_dir = workspace_root.join("config");

    global_config_path()
        .into_iter()
        .chain([
            workspace_dir.join("stagetree.toml"),
            workspace_dir.join(format!("stagetree.{}.toml", env_name)),
        ])
        .collect()
}

/// Stack the files that exist onto `builder`
pub fn add_files(
    builder: ConfigBuilder<DefaultState>,
    files: &[PathBuf],
) -> ConfigBuilder<DefaultState> {
    files.iter().fold(builder, |builder, path| {
        if path.is_file() {
            debug!(config_path = %path.display(), "Adding configuration layer");
            builder.add_source(File::from(path.as_path()).format(FileFormat::Toml))
        } else {
            builder
        }
    })
}
