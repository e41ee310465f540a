//! Configuration System
//!
//! Layered configuration for tree behavior and logging. Sources are merged
//! with the `config` crate: defaults, the user's global file, workspace files
//! and finally `STAGETREE__*` environment overrides.

use crate::error::TreeError;
use crate::logging::LoggingConfig;
use crate::tree::merge::MergeStrategy;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageConfig {
    /// Tree behavior
    #[serde(default)]
    pub tree: TreeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Per-tree behavior, inherited by every branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Record an `Overwrite` even when content is byte-identical
    #[serde(default = "default_true")]
    pub record_identical_overwrites: bool,

    /// Strategy used by `Tree::merge_configured`
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
}

fn default_true() -> bool {
    true
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            record_identical_overwrites: default_true(),
            merge_strategy: MergeStrategy::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl StageConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = self
            .logging
            .validate()
            .into_iter()
            .map(ValidationError::Logging)
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold all problems into one error
    pub fn ensure_valid(&self) -> Result<(), TreeError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            TreeError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })
    }
}
