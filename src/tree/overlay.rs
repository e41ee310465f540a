//! Entry overlay: staged files and delete markers masking a base layer

use crate::tree::entry::FileEntry;
use crate::tree::path::TreePath;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// What an overlay says about a single path
#[derive(Debug, Clone, Copy)]
pub enum Staged<'a> {
    /// Created or overwritten in this overlay
    Created(&'a FileEntry),
    /// Masked by a delete marker
    Deleted,
    /// Not staged here; resolve through the base
    Untouched,
}

/// Staged creates/overwrites plus delete markers.
///
/// `created` and `deleted` never share a key.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    created: BTreeMap<TreePath, FileEntry>,
    deleted: BTreeSet<TreePath>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, path: &TreePath) -> Staged<'_> {
        if self.deleted.contains(path) {
            Staged::Deleted
        } else if let Some(entry) = self.created.get(path) {
            Staged::Created(entry)
        } else {
            Staged::Untouched
        }
    }

    /// Stage a file, clearing any delete marker on its path
    pub fn stage_file(&mut self, entry: FileEntry) {
        self.deleted.remove(entry.path());
        self.created.insert(entry.path().clone(), entry);
    }

    /// Stage a delete marker, dropping any staged file on the path
    pub fn stage_delete(&mut self, path: TreePath) {
        self.created.remove(&path);
        self.deleted.insert(path);
    }

    /// Staged files strictly below `dir`, in path order
    pub fn created_within<'a>(
        &'a self,
        dir: &TreePath,
    ) -> impl Iterator<Item = &'a FileEntry> + 'a {
        let prefix = dir.descendant_prefix();
        self.created
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(move |(path, _)| path.as_str().starts_with(&prefix))
            .map(|(_, entry)| entry)
    }

    pub fn has_created_within(&self, dir: &TreePath) -> bool {
        self.created_within(dir).next().is_some()
    }

    /// Apply this overlay to a base file set under `dir`
    pub fn mask(&self, dir: &TreePath, files: &mut BTreeSet<TreePath>) {
        files.retain(|path| !self.deleted.contains(path));
        files.extend(self.created_within(dir).map(|entry| entry.path().clone()));
    }

    pub fn created(&self) -> impl Iterator<Item = &FileEntry> {
        self.created.values()
    }

    pub fn deleted(&self) -> impl Iterator<Item = &TreePath> {
        self.deleted.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }
}
