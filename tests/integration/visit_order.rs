//! Deterministic traversal through directory views

use crate::integration::{p, seeded_tree};
use stagetree::{FileEntry, Tree, TreeError, TreePath, VisitControl, Visitor};

fn visited(tree: &Tree, root: &str) -> Vec<String> {
    let mut seen = Vec::new();
    let result: Result<(), TreeError> = tree.get_dir(&p(root)).visit(|path, _| {
        seen.push(path.to_string());
        Ok(VisitControl::Continue)
    });
    result.unwrap();
    seen
}

#[test]
fn test_visit_order_independent_of_creation_order() {
    let mut forward = Tree::empty();
    let mut backward = Tree::empty();
    for name in ["a", "b", "c"] {
        forward.create(&p(&format!("/d/{}", name)), name.as_bytes().to_vec()).unwrap();
    }
    for name in ["c", "b", "a"] {
        backward.create(&p(&format!("/d/{}", name)), name.as_bytes().to_vec()).unwrap();
    }

    let expected = vec!["/d/a", "/d/b", "/d/c"];
    assert_eq!(visited(&forward, "/d"), expected);
    assert_eq!(visited(&backward, "/d"), expected);
}

#[test]
fn test_visit_merges_base_and_overlay() {
    let mut tree = seeded_tree(&[("/d/base-1", "1"), ("/d/base-2", "2"), ("/d/sub/deep", "d")]);
    tree.delete(&p("/d/base-2")).unwrap();
    tree.create(&p("/d/added"), b"a".to_vec()).unwrap();

    assert_eq!(
        visited(&tree, "/d"),
        vec!["/d/added", "/d/base-1", "/d/sub/deep"]
    );
}

#[test]
fn test_visit_root_errors() {
    let tree = seeded_tree(&[("/file", "f")]);

    let on_file: Result<(), TreeError> = tree
        .get_dir(&p("/file"))
        .visit(|_, _| Ok(VisitControl::Continue));
    assert!(matches!(on_file, Err(TreeError::PathIsFile(_))));

    let on_missing: Result<(), TreeError> = tree
        .get_dir(&p("/nowhere"))
        .visit(|_, _| Ok(VisitControl::Continue));
    assert!(matches!(on_missing, Err(TreeError::NotFound(_))));
}

#[derive(Debug, PartialEq)]
enum WalkError {
    Tree(String),
    Stopped(String),
}

#[test]
fn test_visit_or_else_maps_tree_errors() {
    let tree = seeded_tree(&[("/file", "f")]);
    let result = tree.get_dir(&p("/file")).visit_or_else(
        |_, _| Ok(VisitControl::Continue),
        |e| WalkError::Tree(e.to_string()),
    );
    assert!(matches!(result, Err(WalkError::Tree(msg)) if msg.contains("/file")));
}

#[test]
fn test_callback_error_propagates_unchanged() {
    let tree = seeded_tree(&[("/d/a", "a"), ("/d/b", "b"), ("/d/c", "c")]);
    let mut count = 0;
    let result = tree.get_dir(&p("/d")).visit_or_else(
        |path, _| {
            count += 1;
            if path.file_name() == Some("b") {
                Err(WalkError::Stopped(path.to_string()))
            } else {
                Ok(VisitControl::Continue)
            }
        },
        |e| WalkError::Tree(e.to_string()),
    );
    assert_eq!(result, Err(WalkError::Stopped("/d/b".to_string())));
    assert_eq!(count, 2);
}

struct Collector {
    entries: Vec<(TreePath, usize)>,
}

impl Visitor for Collector {
    type Error = TreeError;

    fn visit_file(
        &mut self,
        path: &TreePath,
        entry: Option<&FileEntry>,
    ) -> Result<VisitControl, TreeError> {
        self.entries
            .push((path.clone(), entry.map(FileEntry::len).unwrap_or(0)));
        Ok(VisitControl::Continue)
    }
}

#[test]
fn test_visitor_sees_root_directory() {
    let tree = seeded_tree(&[("/z", "zz"), ("/a/b", "b")]);
    let mut collector = Collector {
        entries: Vec::new(),
    };
    tree.get_dir(&TreePath::root()).accept(&mut collector).unwrap();
    assert_eq!(collector.entries, vec![(p("/a/b"), 1), (p("/z"), 2)]);
}
