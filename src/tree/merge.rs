//! Merging one tree's action history into another

use crate::error::TreeError;
use crate::tree::action::Action;
use crate::tree::path::TreePath;
use crate::tree::staged::Tree;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// Conflict-resolution policy for [`Tree::merge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Like `Error`, but identical creates from both sides are no-ops
    #[default]
    Default,
    /// Any conflict fails the merge
    Error,
    /// The incoming action wins every conflict
    Overwrite,
    /// Only incoming overwrites may replace conflicting content
    ContentOnly,
}

/// Replay `other`'s log onto `target` under `strategy`.
///
/// Conflicts are judged against what `target` staged since `other` forked
/// from it (or its whole log when `other` is not a descendant). The merge
/// runs on a scratch copy that replaces `target` only if every action applies.
#[instrument(skip(target, other), fields(incoming = other.actions().len()))]
pub(crate) fn merge_into(
    target: &mut Tree,
    other: &Tree,
    strategy: MergeStrategy,
) -> Result<(), TreeError> {
    let fork_point = target.fork_point_in(other);
    let staged = target.actions().touched_since(fork_point);
    let mut scratch = target.scratch();

    for action in other.actions() {
        if strategy == MergeStrategy::Overwrite {
            apply_forced(&mut scratch, action)?;
            continue;
        }

        let staged_conflict = action
            .targets()
            .into_iter()
            .find(|path| staged.contains_key(*path))
            .cloned();
        let conflict = match staged_conflict {
            Some(path) => Some(path),
            None => occupied_create(&scratch, action)?,
        };

        let Some(conflict) = conflict else {
            scratch.apply(action).map_err(|e| as_conflict(e, action))?;
            continue;
        };

        match strategy {
            MergeStrategy::Default if is_identical_create(&scratch, action)? => {
                trace!(path = %conflict, "Skipping identical create");
            }
            MergeStrategy::ContentOnly => match action {
                Action::Overwrite { path, content } if scratch.file_exists(path)? => {
                    scratch.overwrite(path, content.clone())?;
                }
                _ => return Err(TreeError::MergeConflict(conflict)),
            },
            _ => return Err(TreeError::MergeConflict(conflict)),
        }
    }

    debug!(
        applied = scratch.actions().len() - target.actions().len(),
        "Merge complete"
    );
    *target = scratch;
    Ok(())
}

/// The path of a `Create` that would land on an existing file or directory
fn occupied_create(tree: &Tree, action: &Action) -> Result<Option<TreePath>, TreeError> {
    match action {
        Action::Create { path, .. } if tree.kind(path)?.is_some() => Ok(Some(path.clone())),
        _ => Ok(None),
    }
}

fn is_identical_create(tree: &Tree, action: &Action) -> Result<bool, TreeError> {
    let Action::Create { path, content } = action else {
        return Ok(false);
    };
    Ok(tree
        .get(path)?
        .map(|entry| entry.content() == &content[..])
        .unwrap_or(false))
}

/// Precondition failures while replaying are conflicts with this tree's state
fn as_conflict(err: TreeError, action: &Action) -> TreeError {
    match err {
        TreeError::PathAlreadyExists(path)
        | TreeError::NotFound(path)
        | TreeError::PathIsDirectory(path)
        | TreeError::PathIsFile(path) => {
            debug!(action = %action, path = %path, "Incoming action does not apply");
            TreeError::MergeConflict(path)
        }
        other => other,
    }
}

/// Apply an action so that its intent wins over whatever `tree` holds
fn apply_forced(tree: &mut Tree, action: &Action) -> Result<(), TreeError> {
    match action {
        Action::Create { path, content } | Action::Overwrite { path, content } => {
            tree.write(path, content.clone())
        }
        Action::Delete { path } => {
            if tree.file_exists(path)? {
                tree.delete(path)
            } else {
                Ok(())
            }
        }
        Action::Rename { from, to } => {
            if !tree.file_exists(from)? {
                return Err(TreeError::MergeConflict(from.clone()));
            }
            if tree.file_exists(to)? {
                tree.delete(to)?;
            }
            tree.rename(from, to)
        }
    }
}
