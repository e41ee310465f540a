//! Staged Virtual File Tree
//!
//! A copy-on-write hierarchy that records proposed mutations as an ordered
//! action log on top of a read-only base (a backing store or a frozen
//! snapshot of another tree).

pub mod action;
pub mod entry;
pub mod hasher;
pub mod merge;
pub mod overlay;
pub mod path;
pub mod staged;
pub mod view;

pub use action::{Action, ActionKind, ActionLog};
pub use entry::{EntryKind, FileEntry};
pub use merge::MergeStrategy;
pub use path::{normalize, TreePath};
pub use staged::{Tree, TreeId};
pub use view::{DirectoryView, VisitControl, Visitor};
