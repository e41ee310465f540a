//! CLI commands driven through the run context

use crate::integration::p;
use stagetree::cli::{Commands, OutputFormat, RunContext};
use stagetree::config::StageConfig;
use stagetree::{LocalStore, Tree};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn context(workspace: &TempDir) -> RunContext {
    RunContext::with_config(workspace.path().to_path_buf(), StageConfig::default())
}

#[test]
fn test_show_lists_actions() {
    let workspace = TempDir::new().unwrap();
    let mut tree = Tree::empty();
    tree.create(&p("/a.txt"), b"hello".to_vec()).unwrap();
    tree.rename(&p("/a.txt"), &p("/b.txt")).unwrap();
    fs::write(
        workspace.path().join("log.json"),
        tree.actions().to_json().unwrap(),
    )
    .unwrap();
    fs::write(
        workspace.path().join("log.bin"),
        tree.actions().to_bytes().unwrap(),
    )
    .unwrap();

    let ctx = context(&workspace);
    let text = ctx
        .execute(&Commands::Show {
            log: PathBuf::from("log.json"),
            format: OutputFormat::Text,
        })
        .unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("/a.txt -> /b.txt"));

    let from_bin = ctx
        .execute(&Commands::Show {
            log: PathBuf::from("log.bin"),
            format: OutputFormat::Text,
        })
        .unwrap();
    assert_eq!(from_bin, text);

    let json = ctx
        .execute(&Commands::Show {
            log: PathBuf::from("log.json"),
            format: OutputFormat::Json,
        })
        .unwrap();
    assert!(json.contains("\"toPath\": \"/b.txt\""));
    assert!(json.contains(&hex::encode("hello")));
}

#[test]
fn test_root_matches_tree_state_root() {
    let workspace = TempDir::new().unwrap();
    let target = workspace.path().join("target");
    fs::create_dir_all(target.join("sub")).unwrap();
    fs::write(target.join("sub").join("x"), "x").unwrap();
    fs::write(target.join("y"), "y").unwrap();

    let output = context(&workspace)
        .execute(&Commands::Root { dir: target.clone() })
        .unwrap();

    let tree = Tree::fresh(Arc::new(LocalStore::open(&target).unwrap()));
    assert_eq!(output, hex::encode(tree.state_root().unwrap()));
}

#[test]
fn test_show_rejects_missing_log() {
    let workspace = TempDir::new().unwrap();
    assert!(context(&workspace)
        .execute(&Commands::Show {
            log: PathBuf::from("absent.json"),
            format: OutputFormat::Text,
        })
        .is_err());
}
