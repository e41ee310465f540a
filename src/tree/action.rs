//! Action log: the ordered, replayable record of mutation intents
//!
//! Every successful mutation on a tree appends exactly one [`Action`]. The log
//! is the only artifact a tree exports; a commit stage replays it in order
//! onto a [`ReplayTarget`].

use crate::error::{StoreError, TreeError};
use crate::store::ReplayTarget;
use crate::tree::path::TreePath;
use crate::types::Content;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Action discriminator as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Overwrite,
    Rename,
    Delete,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Create => "create",
            ActionKind::Overwrite => "overwrite",
            ActionKind::Rename => "rename",
            ActionKind::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// A single recorded mutation intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ActionRecord", try_from = "ActionRecord")]
pub enum Action {
    Create { path: TreePath, content: Content },
    Overwrite { path: TreePath, content: Content },
    Rename { from: TreePath, to: TreePath },
    Delete { path: TreePath },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Create { .. } => ActionKind::Create,
            Action::Overwrite { .. } => ActionKind::Overwrite,
            Action::Rename { .. } => ActionKind::Rename,
            Action::Delete { .. } => ActionKind::Delete,
        }
    }

    /// Primary path (source path for renames)
    pub fn path(&self) -> &TreePath {
        match self {
            Action::Create { path, .. }
            | Action::Overwrite { path, .. }
            | Action::Delete { path } => path,
            Action::Rename { from, .. } => from,
        }
    }

    /// Every path this action touches
    pub fn targets(&self) -> Vec<&TreePath> {
        match self {
            Action::Rename { from, to } => vec![from, to],
            other => vec![other.path()],
        }
    }

    /// Apply this action to a replay target
    pub fn replay(&self, target: &dyn ReplayTarget) -> Result<(), StoreError> {
        match self {
            Action::Create { path, content } => target.create(path, content),
            Action::Overwrite { path, content } => target.overwrite(path, content),
            Action::Rename { from, to } => target.rename(from, to),
            Action::Delete { path } => target.delete(path),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create { path, content } | Action::Overwrite { path, content } => {
                write!(f, "{} {} ({} bytes)", self.kind(), path, content.len())
            }
            Action::Rename { from, to } => write!(f, "rename {} -> {}", from, to),
            Action::Delete { path } => write!(f, "delete {}", path),
        }
    }
}

/// Flat wire record: `{kind, path, toPath?, content?}` with hex content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub kind: ActionKind,
    pub path: TreePath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_path: Option<TreePath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl From<Action> for ActionRecord {
    fn from(action: Action) -> Self {
        let kind = action.kind();
        match action {
            Action::Create { path, content } | Action::Overwrite { path, content } => {
                ActionRecord {
                    kind,
                    path,
                    to_path: None,
                    content: Some(hex::encode(&content)),
                }
            }
            Action::Rename { from, to } => ActionRecord {
                kind,
                path: from,
                to_path: Some(to),
                content: None,
            },
            Action::Delete { path } => ActionRecord {
                kind,
                path,
                to_path: None,
                content: None,
            },
        }
    }
}

impl TryFrom<ActionRecord> for Action {
    type Error = TreeError;

    fn try_from(record: ActionRecord) -> Result<Self, Self::Error> {
        let decode_content = |record: &ActionRecord| -> Result<Content, TreeError> {
            let encoded = record.content.as_deref().ok_or_else(|| {
                TreeError::Encoding(format!("{} {} is missing content", record.kind, record.path))
            })?;
            let bytes = hex::decode(encoded).map_err(|e| {
                TreeError::Encoding(format!("Invalid content for {}: {}", record.path, e))
            })?;
            Ok(bytes.into())
        };

        match record.kind {
            ActionKind::Create => Ok(Action::Create {
                content: decode_content(&record)?,
                path: record.path,
            }),
            ActionKind::Overwrite => Ok(Action::Overwrite {
                content: decode_content(&record)?,
                path: record.path,
            }),
            ActionKind::Rename => {
                let to = record.to_path.ok_or_else(|| {
                    TreeError::Encoding(format!("rename {} is missing toPath", record.path))
                })?;
                Ok(Action::Rename {
                    from: record.path,
                    to,
                })
            }
            ActionKind::Delete => Ok(Action::Delete { path: record.path }),
        }
    }
}

/// Binary form; bincode is not self-describing, so optional record fields
/// cannot be skipped the way the JSON record skips them.
#[derive(Serialize, Deserialize)]
enum PackedAction {
    Create(TreePath, Vec<u8>),
    Overwrite(TreePath, Vec<u8>),
    Rename(TreePath, TreePath),
    Delete(TreePath),
}

impl From<&Action> for PackedAction {
    fn from(action: &Action) -> Self {
        match action {
            Action::Create { path, content } => PackedAction::Create(path.clone(), content.to_vec()),
            Action::Overwrite { path, content } => {
                PackedAction::Overwrite(path.clone(), content.to_vec())
            }
            Action::Rename { from, to } => PackedAction::Rename(from.clone(), to.clone()),
            Action::Delete { path } => PackedAction::Delete(path.clone()),
        }
    }
}

impl From<PackedAction> for Action {
    fn from(packed: PackedAction) -> Self {
        match packed {
            PackedAction::Create(path, content) => Action::Create {
                path,
                content: content.into(),
            },
            PackedAction::Overwrite(path, content) => Action::Overwrite {
                path,
                content: content.into(),
            },
            PackedAction::Rename(from, to) => Action::Rename { from, to },
            PackedAction::Delete(path) => Action::Delete { path },
        }
    }
}

/// The intent a tree last staged for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedIntent {
    Created,
    Overwritten,
    Deleted,
}

/// Ordered, append-only action log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionLog {
    actions: Vec<Action>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }

    /// Actions appended at or after `index`
    pub fn since(&self, index: usize) -> &[Action] {
        self.actions.get(index..).unwrap_or(&[])
    }

    /// Last staged intent per path among actions at or after `index`
    pub fn touched_since(&self, index: usize) -> BTreeMap<TreePath, StagedIntent> {
        let mut touched = BTreeMap::new();
        for action in self.since(index) {
            match action {
                Action::Create { path, .. } => {
                    touched.insert(path.clone(), StagedIntent::Created);
                }
                Action::Overwrite { path, .. } => {
                    touched.insert(path.clone(), StagedIntent::Overwritten);
                }
                Action::Delete { path } => {
                    touched.insert(path.clone(), StagedIntent::Deleted);
                }
                Action::Rename { from, to } => {
                    touched.insert(from.clone(), StagedIntent::Deleted);
                    touched.insert(to.clone(), StagedIntent::Created);
                }
            }
        }
        touched
    }

    /// Replay every action in order onto `target`, stopping at the first failure
    pub fn replay(&self, target: &dyn ReplayTarget) -> Result<(), TreeError> {
        for action in &self.actions {
            action.replay(target)?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact binary encoding (bincode); raw content bytes, no hex
    pub fn to_bytes(&self) -> Result<Vec<u8>, TreeError> {
        let packed: Vec<PackedAction> = self.actions.iter().map(PackedAction::from).collect();
        Ok(bincode::serialize(&packed)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TreeError> {
        let packed: Vec<PackedAction> = bincode::deserialize(bytes)?;
        Ok(packed.into_iter().map(Action::from).collect())
    }
}

impl FromIterator<Action> for ActionLog {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ActionLog {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
