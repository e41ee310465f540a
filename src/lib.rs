//! Stagetree: Staged Virtual File Trees
//!
//! An in-memory, copy-on-write file hierarchy that accumulates proposed
//! mutations as a replayable action log before they are committed to a real
//! backing store.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod tree;
pub mod types;

pub use error::{StoreError, TreeError};
pub use store::{BackingStore, LocalStore, MemoryStore, ReplayTarget};
pub use tree::{
    normalize, Action, ActionLog, DirectoryView, FileEntry, MergeStrategy, Tree, TreePath,
    VisitControl, Visitor,
};
