//! Shared test utilities for integration tests

use stagetree::{normalize, MemoryStore, Tree, TreePath};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Serializes tests that touch process environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const CONFIG_VARS: &[&str] = &["HOME", "XDG_CONFIG_HOME", "STAGETREE_ENV"];

pub fn p(raw: &str) -> TreePath {
    normalize(raw).unwrap()
}

/// A tree over an in-memory store holding `files`
pub fn seeded_tree(files: &[(&str, &str)]) -> Tree {
    let store = MemoryStore::from_files(files.iter().copied()).unwrap();
    Tree::fresh(Arc::new(store))
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointed at a fresh temp dir.
///
/// Original values are restored afterwards, even if `f` panics.
pub fn with_config_env<F, R>(f: F) -> R
where
    F: FnOnce(&TempDir) -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|name| (*name, std::env::var(name).ok()))
        .collect();

    let temp_dir = TempDir::new().unwrap();
    std::env::set_var("HOME", temp_dir.path());
    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path().join("xdg"));
    std::env::remove_var("STAGETREE_ENV");

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&temp_dir)));

    for (name, value) in saved {
        match value {
            Some(v) => std::env::set_var(name, v),
            None => std::env::remove_var(name),
        }
    }

    match result {
        Ok(r) => r,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
