//! File entries and entry kinds

use crate::tree::hasher;
use crate::tree::path::TreePath;
use crate::types::{Content, Hash};

/// Whether a path names a file or an (implicit) directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A staged or resolved file: path plus immutable content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: TreePath,
    content: Content,
}

impl FileEntry {
    pub fn new(path: TreePath, content: impl Into<Content>) -> Self {
        Self {
            path,
            content: content.into(),
        }
    }

    pub fn path(&self) -> &TreePath {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Shared handle to the content buffer
    pub fn content_handle(&self) -> Content {
        self.content.clone()
    }

    pub fn content_hash(&self) -> Hash {
        hasher::compute_content_hash(&self.content)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
