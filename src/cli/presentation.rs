//! CLI presentation: formatting of action logs and state roots.

use crate::error::TreeError;
use crate::tree::action::{Action, ActionLog};
use crate::types::Hash;

/// One line per action, numbered from zero
pub fn format_log_text(log: &ActionLog) -> String {
    if log.is_empty() {
        return "No actions.".to_string();
    }
    let mut lines = Vec::with_capacity(log.len());
    for (index, action) in log.iter().enumerate() {
        let detail = match action {
            Action::Create { path, content } | Action::Overwrite { path, content } => {
                format!("{} ({} bytes)", path, content.len())
            }
            Action::Rename { from, to } => format!("{} -> {}", from, to),
            Action::Delete { path } => path.to_string(),
        };
        lines.push(format!("{:>4}  {:<9} {}", index, action.kind(), detail));
    }
    lines.join("\n")
}

pub fn format_log_json(log: &ActionLog) -> Result<String, TreeError> {
    log.to_json()
}

pub fn format_root(root: &Hash) -> String {
    hex::encode(root)
}
