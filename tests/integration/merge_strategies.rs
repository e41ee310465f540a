//! Merging branch histories under each strategy

use crate::integration::{p, seeded_tree};
use stagetree::config::TreeConfig;
use stagetree::{MemoryStore, MergeStrategy, Tree, TreeError};
use std::sync::Arc;

#[test]
fn test_conflict_detected_under_error_strategy() {
    let mut tree = seeded_tree(&[("/a", "base")]);
    let mut branch = tree.branch();

    tree.overwrite(&p("/a"), b"mine".to_vec()).unwrap();
    branch.overwrite(&p("/a"), b"theirs".to_vec()).unwrap();

    let err = tree.merge(&branch, MergeStrategy::Error).unwrap_err();
    assert!(matches!(err, TreeError::MergeConflict(path) if path == p("/a")));
    assert_eq!(tree.read_text(&p("/a")).unwrap(), "mine");
}

#[test]
fn test_overwrite_strategy_lets_incoming_win() {
    let mut tree = seeded_tree(&[("/a", "base")]);
    let mut branch = tree.branch();

    tree.overwrite(&p("/a"), b"mine".to_vec()).unwrap();
    tree.create(&p("/b"), b"mine".to_vec()).unwrap();
    branch.overwrite(&p("/a"), b"theirs".to_vec()).unwrap();
    branch.create(&p("/b"), b"theirs".to_vec()).unwrap();

    tree.merge(&branch, MergeStrategy::Overwrite).unwrap();
    assert_eq!(tree.read_text(&p("/a")).unwrap(), "theirs");
    assert_eq!(tree.read_text(&p("/b")).unwrap(), "theirs");
}

#[test]
fn test_failed_merge_is_transactional() {
    let mut tree = seeded_tree(&[("/a", "base")]);
    let mut branch = tree.branch();

    tree.delete(&p("/a")).unwrap();
    branch.create(&p("/new"), b"n".to_vec()).unwrap();
    branch.overwrite(&p("/a"), b"theirs".to_vec()).unwrap();

    let before_root = tree.state_root().unwrap();
    let before_len = tree.actions().len();

    assert!(tree.merge(&branch, MergeStrategy::Error).is_err());
    assert_eq!(tree.state_root().unwrap(), before_root);
    assert_eq!(tree.actions().len(), before_len);
    assert!(!tree.exists(&p("/new")));
}

#[test]
fn test_content_only_rejects_structural_conflicts() {
    let mut tree = seeded_tree(&[("/a", "base")]);
    let mut branch = tree.branch();

    tree.overwrite(&p("/a"), b"mine".to_vec()).unwrap();
    branch.delete(&p("/a")).unwrap();

    assert!(matches!(
        tree.merge(&branch, MergeStrategy::ContentOnly),
        Err(TreeError::MergeConflict(_))
    ));
}

#[test]
fn test_default_strategy_skips_identical_creates() {
    let mut tree = Tree::empty();
    let mut branch = tree.branch();

    tree.create(&p("/same"), b"x".to_vec()).unwrap();
    branch.create(&p("/same"), b"x".to_vec()).unwrap();
    branch.create(&p("/other"), b"o".to_vec()).unwrap();

    tree.merge(&branch, MergeStrategy::Default).unwrap();
    assert_eq!(tree.actions().len(), 2);
    assert!(tree.exists(&p("/other")));

    let mut diverging = Tree::empty();
    let mut side = diverging.branch();
    diverging.create(&p("/same"), b"x".to_vec()).unwrap();
    side.create(&p("/same"), b"y".to_vec()).unwrap();
    assert!(matches!(
        diverging.merge(&side, MergeStrategy::Default),
        Err(TreeError::MergeConflict(_))
    ));
}

#[test]
fn test_unrelated_trees_conflict_on_whole_log() {
    let mut left = Tree::empty();
    left.create(&p("/a"), b"l".to_vec()).unwrap();

    let mut right = Tree::empty();
    right.create(&p("/a"), b"r".to_vec()).unwrap();

    assert!(matches!(
        left.merge(&right, MergeStrategy::Error),
        Err(TreeError::MergeConflict(_))
    ));
}

#[test]
fn test_merge_configured_uses_tree_strategy() {
    let store = MemoryStore::from_files([("/a", "base")]).unwrap();
    let config = TreeConfig {
        merge_strategy: MergeStrategy::ContentOnly,
        ..TreeConfig::default()
    };
    let mut tree = Tree::with_config(Arc::new(store), config);
    let mut branch = tree.branch();
    assert_eq!(branch.config().merge_strategy, MergeStrategy::ContentOnly);

    tree.overwrite(&p("/a"), b"mine".to_vec()).unwrap();
    branch.overwrite(&p("/a"), b"theirs".to_vec()).unwrap();

    tree.merge_configured(&branch).unwrap();
    assert_eq!(tree.read_text(&p("/a")).unwrap(), "theirs");
}

#[test]
fn test_sibling_branches_conflict_on_same_create() {
    let tree = seeded_tree(&[("/base", "b")]);
    let mut branch1 = tree.branch();
    let mut branch2 = tree.branch();
    branch1.create(&p("/p"), b"1".to_vec()).unwrap();
    branch2.create(&p("/p"), b"2".to_vec()).unwrap();

    let err = branch1.merge(&branch2, MergeStrategy::Error).unwrap_err();
    assert!(matches!(err, TreeError::MergeConflict(path) if path == p("/p")));
    assert_eq!(branch1.read_text(&p("/p")).unwrap(), "1");

    branch1.merge(&branch2, MergeStrategy::Overwrite).unwrap();
    assert_eq!(branch1.read_text(&p("/p")).unwrap(), "2");
    assert!(!tree.exists(&p("/p")));
}

#[test]
fn test_pre_fork_create_replayed_into_branch() {
    let mut tree = Tree::empty();
    tree.create(&p("/p"), b"same".to_vec()).unwrap();
    let mut branch = tree.branch();

    branch.merge(&tree, MergeStrategy::Default).unwrap();
    assert!(branch.actions().is_empty());
    assert_eq!(branch.read_text(&p("/p")).unwrap(), "same");
}

#[test]
fn test_create_over_base_file_is_a_conflict() {
    let mut tree = seeded_tree(&[("/exists", "base")]);
    let mut incoming = Tree::empty();
    incoming.create(&p("/exists"), b"other".to_vec()).unwrap();

    for strategy in [MergeStrategy::Default, MergeStrategy::Error, MergeStrategy::ContentOnly] {
        let err = tree.merge(&incoming, strategy).unwrap_err();
        assert!(matches!(err, TreeError::MergeConflict(path) if path == p("/exists")));
    }

    let mut identical = Tree::empty();
    identical.create(&p("/exists"), b"base".to_vec()).unwrap();
    tree.merge(&identical, MergeStrategy::Default).unwrap();
    assert!(tree.actions().is_empty());
}

#[test]
fn test_inapplicable_incoming_action_reports_conflict() {
    let mut tree = seeded_tree(&[("/gone", "g")]);
    tree.delete(&p("/gone")).unwrap();
    tree.create(&p("/dir/inner"), b"i".to_vec()).unwrap();

    let mut incoming = seeded_tree(&[("/gone", "g"), ("/dir", "file")]);
    incoming.overwrite(&p("/dir"), b"changed".to_vec()).unwrap();

    let before = tree.actions().len();
    let err = tree.merge(&incoming, MergeStrategy::Error).unwrap_err();
    assert!(matches!(err, TreeError::MergeConflict(path) if path == p("/dir")));
    assert_eq!(tree.actions().len(), before);
}
