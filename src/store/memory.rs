//! In-memory backing store

use crate::error::{StoreError, TreeError};
use crate::store::{BackingStore, ReplayTarget};
use crate::tree::path::{normalize, TreePath};
use crate::types::Content;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// Files held in a sorted map; directories are implicit.
///
/// Interior mutability lets one shared instance act as both the base of a
/// tree and the target a log is replayed onto.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<TreePath, Content>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from raw `(path, content)` pairs
    pub fn from_files<I, P, C>(files: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let store = Self::new();
        for (path, content) in files {
            store.insert(normalize(path.as_ref())?, content.as_ref());
        }
        Ok(store)
    }

    /// Insert or replace a file without any checks
    pub fn insert(&self, path: TreePath, content: &[u8]) {
        self.files.write().insert(path, Content::from(content));
    }

    /// Copy of every file currently held, in path order
    pub fn snapshot(&self) -> BTreeMap<TreePath, Content> {
        self.files.read().clone()
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl BackingStore for MemoryStore {
    fn read_file(&self, path: &TreePath) -> Result<Content, StoreError> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    fn list_children(&self, path: &TreePath) -> Result<BTreeSet<String>, StoreError> {
        let files = self.files.read();
        if files.contains_key(path) {
            return Err(StoreError::NotADirectory(path.clone()));
        }

        let prefix = path.descendant_prefix();
        let children: BTreeSet<String> = files
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(|(file, _)| file.as_str().starts_with(&prefix))
            .filter_map(|(file, _)| file.child_segment_under(path).map(str::to_string))
            .collect();

        if children.is_empty() && !path.is_root() {
            return Err(StoreError::NotFound(path.clone()));
        }
        Ok(children)
    }
}

impl ReplayTarget for MemoryStore {
    fn create(&self, path: &TreePath, content: &[u8]) -> Result<(), StoreError> {
        self.insert(path.clone(), content);
        Ok(())
    }

    fn overwrite(&self, path: &TreePath, content: &[u8]) -> Result<(), StoreError> {
        self.insert(path.clone(), content);
        Ok(())
    }

    fn rename(&self, from: &TreePath, to: &TreePath) -> Result<(), StoreError> {
        let mut files = self.files.write();
        let content = files
            .remove(from)
            .ok_or_else(|| StoreError::NotFound(from.clone()))?;
        files.insert(to.clone(), content);
        Ok(())
    }

    fn delete(&self, path: &TreePath) -> Result<(), StoreError> {
        self.files
            .write()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }
}
