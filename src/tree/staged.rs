//! The staged tree: an overlay of intents over a shared, read-only base

use crate::config::TreeConfig;
use crate::error::{StoreError, TreeError};
use crate::store::{BackingStore, MemoryStore, ReplayTarget};
use crate::tree::action::{Action, ActionLog};
use crate::tree::entry::{EntryKind, FileEntry};
use crate::tree::hasher;
use crate::tree::merge::{self, MergeStrategy};
use crate::tree::overlay::{Overlay, Staged};
use crate::tree::path::TreePath;
use crate::tree::view::DirectoryView;
use crate::types::{Content, Hash};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a tree, used to find fork points on merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Frozen copy of a tree's overlay, shared by every branch taken from it
#[derive(Debug)]
pub(crate) struct Snapshot {
    origin: TreeId,
    fork_point: usize,
    overlay: Overlay,
    base: Base,
}

/// What a tree resolves untouched paths against
#[derive(Debug, Clone)]
pub(crate) enum Base {
    Store(Arc<dyn BackingStore>),
    Snapshot(Arc<Snapshot>),
}

impl Base {
    fn read(&self, path: &TreePath) -> Result<Content, TreeError> {
        match self {
            Base::Store(store) => store.read_file(path).map_err(TreeError::from_store),
            Base::Snapshot(snapshot) => match snapshot.overlay.lookup(path) {
                Staged::Created(entry) => Ok(entry.content_handle()),
                Staged::Deleted => Err(TreeError::NotFound(path.clone())),
                Staged::Untouched => snapshot.base.read(path),
            },
        }
    }

    fn is_file(&self, path: &TreePath) -> Result<bool, TreeError> {
        match self {
            Base::Store(store) => Ok(store.kind(path)? == Some(EntryKind::File)),
            Base::Snapshot(snapshot) => match snapshot.overlay.lookup(path) {
                Staged::Created(_) => Ok(true),
                Staged::Deleted => Ok(false),
                Staged::Untouched => snapshot.base.is_file(path),
            },
        }
    }

    fn collect_files(&self, dir: &TreePath, out: &mut BTreeSet<TreePath>) -> Result<(), TreeError> {
        match self {
            Base::Store(store) => walk_store(store.as_ref(), dir, out),
            Base::Snapshot(snapshot) => {
                snapshot.base.collect_files(dir, out)?;
                snapshot.overlay.mask(dir, out);
                Ok(())
            }
        }
    }
}

fn walk_store(
    store: &dyn BackingStore,
    dir: &TreePath,
    out: &mut BTreeSet<TreePath>,
) -> Result<(), TreeError> {
    let children = match store.list_children(dir) {
        Ok(children) => children,
        Err(StoreError::NotFound(_)) | Err(StoreError::NotADirectory(_)) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    for name in children {
        let child = dir.join(&name)?;
        match store.kind(&child)? {
            Some(EntryKind::File) => {
                out.insert(child);
            }
            Some(EntryKind::Directory) => walk_store(store, &child, out)?,
            None => {}
        }
    }
    Ok(())
}

/// A staged, copy-on-write view of a file hierarchy.
///
/// Reads check the tree's own overlay first and then fall through to its
/// base. Every successful mutation updates the overlay and appends one
/// action; a failed mutation changes neither.
#[derive(Debug)]
pub struct Tree {
    id: TreeId,
    overlay: Overlay,
    base: Base,
    actions: ActionLog,
    config: TreeConfig,
}

impl Tree {
    /// Create a tree with an empty overlay over a backing store
    pub fn fresh(store: Arc<dyn BackingStore>) -> Self {
        Self::with_config(store, TreeConfig::default())
    }

    pub fn with_config(store: Arc<dyn BackingStore>, config: TreeConfig) -> Self {
        Self {
            id: TreeId::next(),
            overlay: Overlay::new(),
            base: Base::Store(store),
            actions: ActionLog::new(),
            config,
        }
    }

    /// A tree over an empty in-memory store
    pub fn empty() -> Self {
        Self::fresh(Arc::new(MemoryStore::new()))
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Read-only export of the action log
    pub fn actions(&self) -> &ActionLog {
        &self.actions
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    fn lookup_content(&self, path: &TreePath) -> Result<Option<Content>, TreeError> {
        match self.overlay.lookup(path) {
            Staged::Created(entry) => Ok(Some(entry.content_handle())),
            Staged::Deleted => Ok(None),
            Staged::Untouched => match self.base.read(path) {
                Ok(content) => Ok(Some(content)),
                Err(TreeError::NotFound(_)) => Ok(None),
                Err(e) => Err(e),
            },
        }
    }

    pub(crate) fn file_exists(&self, path: &TreePath) -> Result<bool, TreeError> {
        match self.overlay.lookup(path) {
            Staged::Created(_) => Ok(true),
            Staged::Deleted => Ok(false),
            Staged::Untouched => self.base.is_file(path),
        }
    }

    /// Effective files strictly below `dir`, in path order
    pub(crate) fn files_within(&self, dir: &TreePath) -> Result<BTreeSet<TreePath>, TreeError> {
        let mut files = BTreeSet::new();
        self.base.collect_files(dir, &mut files)?;
        self.overlay.mask(dir, &mut files);
        Ok(files)
    }

    fn has_files_within(&self, dir: &TreePath) -> Result<bool, TreeError> {
        if self.overlay.has_created_within(dir) {
            return Ok(true);
        }
        Ok(!self.files_within(dir)?.is_empty())
    }

    /// Read a file's content.
    ///
    /// Fails with `NotFound` when the path is deleted or absent and with
    /// `PathIsDirectory` when it is an implicit directory.
    pub fn read(&self, path: &TreePath) -> Result<Content, TreeError> {
        trace!(path = %path, "Reading");
        match self.lookup_content(path)? {
            Some(content) => Ok(content),
            None if path.is_root() || self.has_files_within(path)? => {
                Err(TreeError::PathIsDirectory(path.clone()))
            }
            None => Err(TreeError::NotFound(path.clone())),
        }
    }

    pub fn read_text(&self, path: &TreePath) -> Result<String, TreeError> {
        let content = self.read(path)?;
        String::from_utf8(content.to_vec()).map_err(|_| TreeError::NotUtf8(path.clone()))
    }

    /// File entry for a path, `None` if no file lives there
    pub fn get(&self, path: &TreePath) -> Result<Option<FileEntry>, TreeError> {
        Ok(self
            .lookup_content(path)?
            .map(|content| FileEntry::new(path.clone(), content)))
    }

    /// Classify a path; a directory is the root or any strict prefix of a file path
    pub fn kind(&self, path: &TreePath) -> Result<Option<EntryKind>, TreeError> {
        if self.file_exists(path)? {
            Ok(Some(EntryKind::File))
        } else if path.is_root() || self.has_files_within(path)? {
            Ok(Some(EntryKind::Directory))
        } else {
            Ok(None)
        }
    }

    pub fn exists(&self, path: &TreePath) -> bool {
        matches!(self.kind(path), Ok(Some(_)))
    }

    pub fn is_file(&self, path: &TreePath) -> bool {
        matches!(self.file_exists(path), Ok(true))
    }

    pub fn is_directory(&self, path: &TreePath) -> bool {
        matches!(self.kind(path), Ok(Some(EntryKind::Directory)))
    }

    /// Every effective file, in path order
    pub fn files(&self) -> Result<Vec<TreePath>, TreeError> {
        Ok(self.files_within(&TreePath::root())?.into_iter().collect())
    }

    /// Merkle root over the effective view
    pub fn state_root(&self) -> Result<Hash, TreeError> {
        let files = self.files_within(&TreePath::root())?;
        let mut leaves = Vec::with_capacity(files.len());
        for path in &files {
            let content = self.read(path)?;
            leaves.push((path, hasher::compute_content_hash(&content)));
        }
        Ok(hasher::compute_state_root(leaves))
    }

    pub fn get_dir(&self, path: &TreePath) -> DirectoryView<'_> {
        DirectoryView::new(self, path.clone())
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    fn check_creatable(&self, path: &TreePath) -> Result<(), TreeError> {
        if self.file_exists(path)? {
            return Err(TreeError::PathAlreadyExists(path.clone()));
        }
        if path.is_root() || self.has_files_within(path)? {
            return Err(TreeError::PathIsDirectory(path.clone()));
        }
        for ancestor in path.ancestors() {
            if !ancestor.is_root() && self.file_exists(&ancestor)? {
                return Err(TreeError::PathIsFile(ancestor));
            }
        }
        Ok(())
    }

    fn check_file(&self, path: &TreePath) -> Result<(), TreeError> {
        if self.file_exists(path)? {
            Ok(())
        } else if path.is_root() || self.has_files_within(path)? {
            Err(TreeError::PathIsDirectory(path.clone()))
        } else {
            Err(TreeError::NotFound(path.clone()))
        }
    }

    /// Stage a new file
    pub fn create(&mut self, path: &TreePath, content: impl Into<Content>) -> Result<(), TreeError> {
        self.check_creatable(path)?;
        let content = content.into();
        debug!(path = %path, bytes = content.len(), "Staging create");
        self.overlay
            .stage_file(FileEntry::new(path.clone(), content.clone()));
        self.actions.push(Action::Create {
            path: path.clone(),
            content,
        });
        Ok(())
    }

    /// Replace an existing file's content.
    ///
    /// Identical content is still recorded unless
    /// `TreeConfig::record_identical_overwrites` is off.
    pub fn overwrite(
        &mut self,
        path: &TreePath,
        content: impl Into<Content>,
    ) -> Result<(), TreeError> {
        self.check_file(path)?;
        let content = content.into();
        if !self.config.record_identical_overwrites && *self.read(path)? == *content {
            trace!(path = %path, "Eliding identical overwrite");
            return Ok(());
        }
        debug!(path = %path, bytes = content.len(), "Staging overwrite");
        self.overlay
            .stage_file(FileEntry::new(path.clone(), content.clone()));
        self.actions.push(Action::Overwrite {
            path: path.clone(),
            content,
        });
        Ok(())
    }

    /// Overwrite when the file exists, create otherwise
    pub fn write(&mut self, path: &TreePath, content: impl Into<Content>) -> Result<(), TreeError> {
        if self.file_exists(path)? {
            self.overwrite(path, content)
        } else {
            self.create(path, content)
        }
    }

    pub fn delete(&mut self, path: &TreePath) -> Result<(), TreeError> {
        self.check_file(path)?;
        debug!(path = %path, "Staging delete");
        self.overlay.stage_delete(path.clone());
        self.actions.push(Action::Delete { path: path.clone() });
        Ok(())
    }

    /// Move a file, recorded as a single `Rename` action
    pub fn rename(&mut self, from: &TreePath, to: &TreePath) -> Result<(), TreeError> {
        self.check_file(from)?;
        if from == to {
            return Err(TreeError::PathAlreadyExists(to.clone()));
        }
        self.check_creatable(to)?;
        let content = self.read(from)?;
        debug!(from = %from, to = %to, "Staging rename");
        self.overlay.stage_delete(from.clone());
        self.overlay.stage_file(FileEntry::new(to.clone(), content));
        self.actions.push(Action::Rename {
            from: from.clone(),
            to: to.clone(),
        });
        Ok(())
    }

    /// Apply one recorded action through the checked operations
    pub fn apply(&mut self, action: &Action) -> Result<(), TreeError> {
        match action {
            Action::Create { path, content } => self.create(path, content.clone()),
            Action::Overwrite { path, content } => self.overwrite(path, content.clone()),
            Action::Rename { from, to } => self.rename(from, to),
            Action::Delete { path } => self.delete(path),
        }
    }

    // ------------------------------------------------------------------
    // Branching
    // ------------------------------------------------------------------

    /// An isolated tree over a frozen snapshot of this one.
    ///
    /// The branch starts with an empty overlay and log. Later mutations on
    /// either tree are invisible to the other.
    pub fn branch(&self) -> Tree {
        let snapshot = Snapshot {
            origin: self.id,
            fork_point: self.actions.len(),
            overlay: self.overlay.clone(),
            base: self.base.clone(),
        };
        let branch = Tree {
            id: TreeId::next(),
            overlay: Overlay::new(),
            base: Base::Snapshot(Arc::new(snapshot)),
            actions: ActionLog::new(),
            config: self.config.clone(),
        };
        debug!(origin = ?self.id, branch = ?branch.id, fork_point = self.actions.len(), "Branched tree");
        branch
    }

    /// Replay `other`'s log onto this tree; all-or-nothing
    pub fn merge(&mut self, other: &Tree, strategy: MergeStrategy) -> Result<(), TreeError> {
        merge::merge_into(self, other, strategy)
    }

    /// Merge with the strategy from this tree's configuration
    pub fn merge_configured(&mut self, other: &Tree) -> Result<(), TreeError> {
        let strategy = self.config.merge_strategy;
        self.merge(other, strategy)
    }

    /// Replay the action log onto a store
    pub fn commit(&self, target: &dyn ReplayTarget) -> Result<(), TreeError> {
        info!(actions = self.actions.len(), "Committing action log");
        self.actions.replay(target)
    }

    /// Working copy for transactional operations; keeps this tree's identity.
    pub(crate) fn scratch(&self) -> Tree {
        Tree {
            id: self.id,
            overlay: self.overlay.clone(),
            base: self.base.clone(),
            actions: self.actions.clone(),
            config: self.config.clone(),
        }
    }

    /// Length of this tree's log when `other`'s lineage was branched from it,
    /// or 0 when `other` does not descend from this tree.
    pub(crate) fn fork_point_in(&self, other: &Tree) -> usize {
        let mut base = &other.base;
        while let Base::Snapshot(snapshot) = base {
            if snapshot.origin == self.id {
                return snapshot.fork_point;
            }
            base = &snapshot.base;
        }
        0
    }
}
