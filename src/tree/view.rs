//! Directory views and the visitor protocol

use crate::error::TreeError;
use crate::tree::entry::{EntryKind, FileEntry};
use crate::tree::path::TreePath;
use crate::tree::staged::Tree;
use std::collections::BTreeSet;
use std::marker::PhantomData;
use tracing::{debug, instrument, warn};

/// Whether traversal continues after a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitControl {
    Continue,
    Stop,
}

/// Single-method capability invoked once per visited file.
///
/// `entry` is `None` when the file's content could not be resolved.
pub trait Visitor {
    type Error;

    fn visit_file(
        &mut self,
        path: &TreePath,
        entry: Option<&FileEntry>,
    ) -> Result<VisitControl, Self::Error>;
}

struct FnVisitor<F, E> {
    callback: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> Visitor for FnVisitor<F, E>
where
    F: FnMut(&TreePath, Option<&FileEntry>) -> Result<VisitControl, E>,
{
    type Error = E;

    fn visit_file(
        &mut self,
        path: &TreePath,
        entry: Option<&FileEntry>,
    ) -> Result<VisitControl, E> {
        (self.callback)(path, entry)
    }
}

/// Read-only projection of a tree below one directory path
#[derive(Debug, Clone)]
pub struct DirectoryView<'t> {
    tree: &'t Tree,
    path: TreePath,
}

impl<'t> DirectoryView<'t> {
    pub(crate) fn new(tree: &'t Tree, path: TreePath) -> Self {
        Self { tree, path }
    }

    pub fn path(&self) -> &TreePath {
        &self.path
    }

    pub fn parent(&self) -> Option<DirectoryView<'t>> {
        self.path
            .parent()
            .map(|parent| DirectoryView::new(self.tree, parent))
    }

    /// View of a directory below this one
    pub fn dir(&self, name: &str) -> Result<DirectoryView<'t>, TreeError> {
        Ok(DirectoryView::new(self.tree, self.path.join(name)?))
    }

    /// A file directly or transitively below this directory
    pub fn file(&self, name: &str) -> Result<Option<FileEntry>, TreeError> {
        self.tree.get(&self.path.join(name)?)
    }

    /// Every effective file below this directory, in path order
    pub fn files(&self) -> Result<Vec<TreePath>, TreeError> {
        Ok(self.tree.files_within(&self.path)?.into_iter().collect())
    }

    /// Names of files directly inside this directory
    pub fn subfiles(&self) -> Result<Vec<String>, TreeError> {
        let files = self.tree.files_within(&self.path)?;
        Ok(files
            .iter()
            .filter(|file| file.parent().as_ref() == Some(&self.path))
            .filter_map(|file| file.file_name().map(str::to_string))
            .collect())
    }

    /// Names of directories directly inside this directory
    pub fn subdirs(&self) -> Result<Vec<String>, TreeError> {
        let files = self.tree.files_within(&self.path)?;
        let dirs: BTreeSet<String> = files
            .iter()
            .filter(|file| file.parent().as_ref() != Some(&self.path))
            .filter_map(|file| file.child_segment_under(&self.path).map(str::to_string))
            .collect();
        Ok(dirs.into_iter().collect())
    }

    fn resolve_root(&self) -> Result<(), TreeError> {
        match self.tree.kind(&self.path)? {
            Some(EntryKind::Directory) => Ok(()),
            Some(EntryKind::File) => Err(TreeError::PathIsFile(self.path.clone())),
            None => Err(TreeError::NotFound(self.path.clone())),
        }
    }

    /// Visit every file below this directory in ascending path order.
    ///
    /// A root that is a file fails with `PathIsFile`; one that matches nothing
    /// fails with `NotFound`. Callback errors abort the traversal and are
    /// returned unchanged.
    pub fn visit<F, E>(&self, callback: F) -> Result<(), E>
    where
        F: FnMut(&TreePath, Option<&FileEntry>) -> Result<VisitControl, E>,
        E: From<TreeError>,
    {
        self.walk(&mut Self::fn_visitor(callback), |e: TreeError| E::from(e))
    }

    /// Like [`visit`](Self::visit), with tree errors mapped by `resolve`
    pub fn visit_or_else<F, E, R>(&self, callback: F, resolve: R) -> Result<(), E>
    where
        F: FnMut(&TreePath, Option<&FileEntry>) -> Result<VisitControl, E>,
        R: Fn(TreeError) -> E,
    {
        self.walk(&mut Self::fn_visitor(callback), resolve)
    }

    /// Drive a [`Visitor`] over this directory
    pub fn accept<V>(&self, visitor: &mut V) -> Result<(), V::Error>
    where
        V: Visitor,
        V::Error: From<TreeError>,
    {
        self.walk(visitor, |e: TreeError| <V::Error as From<TreeError>>::from(e))
    }

    fn fn_visitor<F, E>(callback: F) -> FnVisitor<F, E>
    where
        F: FnMut(&TreePath, Option<&FileEntry>) -> Result<VisitControl, E>,
    {
        FnVisitor {
            callback,
            _error: PhantomData,
        }
    }

    #[instrument(skip_all, fields(root = %self.path))]
    fn walk<V, R>(&self, visitor: &mut V, resolve: R) -> Result<(), V::Error>
    where
        V: Visitor,
        R: Fn(TreeError) -> V::Error,
    {
        self.resolve_root().map_err(&resolve)?;
        let files = self.tree.files_within(&self.path).map_err(&resolve)?;

        for path in &files {
            let entry = match self.tree.read(path) {
                Ok(content) => Some(FileEntry::new(path.clone(), content)),
                Err(e) => {
                    warn!(path = %path, error = %e, "Content unavailable during visit");
                    None
                }
            };
            if visitor.visit_file(path, entry.as_ref())? == VisitControl::Stop {
                debug!(path = %path, "Visit stopped early");
                break;
            }
        }
        Ok(())
    }
}
