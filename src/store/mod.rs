//! Backing store adapter interface
//!
//! A tree reads the pre-existing hierarchy through [`BackingStore`] and a
//! commit stage writes an action log out through [`ReplayTarget`]. Both are
//! plain traits so adapters are passed in explicitly per pipeline run.

pub mod local;
pub mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::tree::entry::EntryKind;
use crate::tree::path::TreePath;
use crate::types::Content;
use std::collections::BTreeSet;
use std::fmt;

/// Read access to a physical hierarchy
pub trait BackingStore: fmt::Debug + Send + Sync {
    /// Read a file's full content.
    fn read_file(&self, path: &TreePath) -> Result<Content, StoreError>;

    /// Names of the direct children of a directory.
    ///
    /// Fails with `NotADirectory` for files and `NotFound` for absent paths.
    fn list_children(&self, path: &TreePath) -> Result<BTreeSet<String>, StoreError>;

    /// Classify a path; `None` when the store does not have it.
    fn kind(&self, path: &TreePath) -> Result<Option<EntryKind>, StoreError> {
        if path.is_root() {
            return Ok(Some(EntryKind::Directory));
        }
        match self.list_children(path) {
            Ok(_) => Ok(Some(EntryKind::Directory)),
            Err(StoreError::NotADirectory(_)) => Ok(Some(EntryKind::File)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Write side of a store, driven by action replay
pub trait ReplayTarget {
    fn create(&self, path: &TreePath, content: &[u8]) -> Result<(), StoreError>;
    fn overwrite(&self, path: &TreePath, content: &[u8]) -> Result<(), StoreError>;
    fn rename(&self, from: &TreePath, to: &TreePath) -> Result<(), StoreError>;
    fn delete(&self, path: &TreePath) -> Result<(), StoreError>;
}
