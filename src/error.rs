//! Error types for the staged tree.

use crate::tree::path::TreePath;
use thiserror::Error;

/// Backing store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found in backing store: {0}")]
    NotFound(TreePath),

    #[error("Not a directory in backing store: {0}")]
    NotADirectory(TreePath),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tree operation errors
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Path not found: {0}")]
    NotFound(TreePath),

    #[error("Path already exists: {0}")]
    PathAlreadyExists(TreePath),

    #[error("Path is a directory: {0}")]
    PathIsDirectory(TreePath),

    #[error("Path is a file: {0}")]
    PathIsFile(TreePath),

    #[error("Merge conflict at {0}")]
    MergeConflict(TreePath),

    #[error("Content is not valid UTF-8: {0}")]
    NotUtf8(TreePath),

    #[error("Action log encoding error: {0}")]
    Encoding(String),

    #[error("Backing store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TreeError {
    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        TreeError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Map a store read failure, surfacing store-level absence as `NotFound`.
    pub(crate) fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => TreeError::NotFound(path),
            other => TreeError::Store(other),
        }
    }
}

impl From<config::ConfigError> for TreeError {
    fn from(err: config::ConfigError) -> Self {
        TreeError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        TreeError::Encoding(err.to_string())
    }
}

impl From<bincode::Error> for TreeError {
    fn from(err: bincode::Error) -> Self {
        TreeError::Encoding(err.to_string())
    }
}
