//! CLI route: single route table and run context.

use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{format_log_json, format_log_text, format_root};
use crate::config::{ConfigLoader, StageConfig};
use crate::error::TreeError;
use crate::store::LocalStore;
use crate::tree::action::ActionLog;
use crate::tree::staged::Tree;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: loaded configuration and workspace.
pub struct RunContext {
    config: StageConfig,
    workspace_root: PathBuf,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, TreeError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        config.ensure_valid()?;
        Ok(Self {
            config,
            workspace_root,
        })
    }

    /// Build from an already loaded configuration.
    pub fn with_config(workspace_root: PathBuf, config: StageConfig) -> Self {
        Self {
            config,
            workspace_root,
        }
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Execute a command and return its printable output.
    pub fn execute(&self, command: &Commands) -> Result<String, TreeError> {
        match command {
            Commands::Show { log, format } => {
                let log = self.read_log(log)?;
                match format {
                    OutputFormat::Text => Ok(format_log_text(&log)),
                    OutputFormat::Json => format_log_json(&log),
                }
            }
            Commands::Apply { log, root, dry_run } => self.handle_apply(log, root, *dry_run),
            Commands::Root { dir } => {
                let tree = self.open_tree(dir)?;
                Ok(format_root(&tree.state_root()?))
            }
        }
    }

    fn handle_apply(&self, log: &Path, root: &Path, dry_run: bool) -> Result<String, TreeError> {
        let log = self.read_log(log)?;
        let store = Arc::new(LocalStore::open(&self.resolve(root))?);
        let mut tree = Tree::with_config(store.clone(), self.config.tree.clone());

        for action in &log {
            tree.apply(action)?;
        }
        let state_root = format_root(&tree.state_root()?);

        if dry_run {
            info!(actions = log.len(), "Dry run; nothing written");
            return Ok(format!(
                "Validated {} action(s); nothing written\n{}",
                log.len(),
                state_root
            ));
        }

        tree.commit(store.as_ref())?;
        info!(actions = log.len(), root = %store.root().display(), "Committed action log");
        Ok(format!("Applied {} action(s)\n{}", log.len(), state_root))
    }

    fn open_tree(&self, dir: &Path) -> Result<Tree, TreeError> {
        let store = LocalStore::open(&self.resolve(dir))?;
        Ok(Tree::with_config(Arc::new(store), self.config.tree.clone()))
    }

    fn read_log(&self, path: &Path) -> Result<ActionLog, TreeError> {
        let path = self.resolve(path);
        debug!(log = %path.display(), "Reading action log");
        let bytes = std::fs::read(&path).map_err(crate::error::StoreError::from)?;
        if path.extension().and_then(|e| e.to_str()) == Some("bin") {
            ActionLog::from_bytes(&bytes)
        } else {
            let text = String::from_utf8(bytes)
                .map_err(|e| TreeError::Encoding(format!("log is not UTF-8: {}", e)))?;
            ActionLog::from_json(&text)
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}
