//! Local directory backing store

use crate::error::StoreError;
use crate::store::{BackingStore, ReplayTarget};
use crate::tree::entry::EntryKind;
use crate::tree::path::TreePath;
use crate::types::Content;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// A directory on disk exposed as a backing store and replay target.
///
/// Tree paths resolve relative to the canonicalized root; `/` is the root
/// directory itself.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at an existing directory
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let root = dunce::canonicalize(root)?;
        if !root.is_dir() {
            return Err(StoreError::Io(std::io::Error::new(
                ErrorKind::Other,
                format!("Store root is not a directory: {}", root.display()),
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Physical location of a tree path
    pub fn resolve(&self, path: &TreePath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    fn map_io(path: &TreePath, err: std::io::Error) -> StoreError {
        if is_absent(&err) {
            StoreError::NotFound(path.clone())
        } else {
            StoreError::Io(err)
        }
    }

    /// Create missing parents and clear an empty directory sitting at `path`
    fn prepare_target(&self, path: &TreePath) -> Result<(), StoreError> {
        let physical = self.resolve(path);
        if let Some(parent) = physical.parent() {
            fs::create_dir_all(parent)?;
        }
        if physical.is_dir() {
            debug!(path = %path, "Replacing empty directory with file");
            fs::remove_dir(&physical)?;
        }
        Ok(())
    }

    /// Remove directories left empty above `path`, stopping at the root
    fn prune_empty_parents(&self, path: &TreePath) -> Result<(), StoreError> {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.is_root() {
                break;
            }
            let physical = self.resolve(&dir);
            let empty = match fs::read_dir(&physical) {
                Ok(mut entries) => entries.next().is_none(),
                Err(e) if is_absent(&e) => false,
                Err(e) => return Err(StoreError::Io(e)),
            };
            if !empty {
                break;
            }
            trace!(dir = %dir, "Pruning empty directory");
            fs::remove_dir(&physical)?;
            current = dir.parent();
        }
        Ok(())
    }
}

/// Missing entries and lookups through a file both mean "nothing here"
fn is_absent(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

impl BackingStore for LocalStore {
    fn read_file(&self, path: &TreePath) -> Result<Content, StoreError> {
        let physical = self.resolve(path);
        let metadata = fs::metadata(&physical).map_err(|e| Self::map_io(path, e))?;
        if !metadata.is_file() {
            return Err(StoreError::NotFound(path.clone()));
        }
        let bytes = fs::read(&physical).map_err(|e| Self::map_io(path, e))?;
        Ok(bytes.into())
    }

    fn list_children(&self, path: &TreePath) -> Result<BTreeSet<String>, StoreError> {
        let physical = self.resolve(path);
        let metadata = fs::metadata(&physical).map_err(|e| Self::map_io(path, e))?;
        if !metadata.is_dir() {
            return Err(StoreError::NotADirectory(path.clone()));
        }

        let mut children = BTreeSet::new();
        for entry in fs::read_dir(&physical)? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => {
                    children.insert(name);
                }
                Err(name) => {
                    warn!(dir = %path, name = ?name, "Skipping non UTF-8 entry");
                }
            }
        }
        Ok(children)
    }

    fn kind(&self, path: &TreePath) -> Result<Option<EntryKind>, StoreError> {
        match fs::metadata(self.resolve(path)) {
            Ok(m) if m.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(m) if m.is_file() => Ok(Some(EntryKind::File)),
            // Symlinks to nowhere, sockets and the like are not part of the tree
            Ok(_) => Ok(None),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

impl ReplayTarget for LocalStore {
    fn create(&self, path: &TreePath, content: &[u8]) -> Result<(), StoreError> {
        self.prepare_target(path)?;
        debug!(path = %path, bytes = content.len(), "Writing file");
        fs::write(self.resolve(path), content)?;
        Ok(())
    }

    fn overwrite(&self, path: &TreePath, content: &[u8]) -> Result<(), StoreError> {
        self.create(path, content)
    }

    fn rename(&self, from: &TreePath, to: &TreePath) -> Result<(), StoreError> {
        if !self.resolve(from).is_file() {
            return Err(StoreError::NotFound(from.clone()));
        }
        self.prepare_target(to)?;
        debug!(from = %from, to = %to, "Renaming file");
        fs::rename(self.resolve(from), self.resolve(to)).map_err(|e| Self::map_io(from, e))?;
        self.prune_empty_parents(from)
    }

    fn delete(&self, path: &TreePath) -> Result<(), StoreError> {
        debug!(path = %path, "Removing file");
        fs::remove_file(self.resolve(path)).map_err(|e| Self::map_io(path, e))?;
        self.prune_empty_parents(path)
    }
}
