//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::TreeError;

/// Map tree errors to a string for CLI output.
pub fn map_error(e: &TreeError) -> String {
    match e {
        TreeError::MergeConflict(path) => format!("conflict: {}", path),
        TreeError::Encoding(msg) => format!("malformed action log: {}", msg),
        other => other.to_string(),
    }
}
