//! Path normalization for the staged tree namespace

use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// A normalized, absolute tree path.
///
/// Always starts with `/`, uses `/` as the only separator, carries no `.`/`..`
/// or empty segments, has no trailing slash (except the root itself) and is
/// Unicode NFC. Ordering is byte-lexicographic on the normalized string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TreePath(String);

/// Normalize a raw path string into a [`TreePath`]
///
/// This function:
/// 1. Rejects NUL bytes
/// 2. Normalizes Unicode to NFC
/// 3. Treats `\` as a separator and drops empty and `.` segments
/// 4. Resolves `..`, failing if it climbs above the root
///
/// Relative input is resolved against the root. The result is idempotent:
/// normalizing an already normalized path returns it unchanged.
pub fn normalize(raw: &str) -> Result<TreePath, TreeError> {
    if raw.contains('\0') {
        return Err(TreeError::invalid_path(raw, "contains a NUL byte"));
    }

    let composed: String = raw.nfc().collect();

    let mut segments: Vec<&str> = Vec::new();
    for segment in composed.split(|c| c == '/' || c == '\\') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(TreeError::invalid_path(raw, "resolves outside the root"));
                }
            }
            other => segments.push(other),
        }
    }

    Ok(TreePath::from_segments(&segments))
}

impl TreePath {
    /// The root path `/`
    pub fn root() -> Self {
        TreePath("/".to_string())
    }

    fn from_segments(segments: &[&str]) -> Self {
        if segments.is_empty() {
            return Self::root();
        }
        let mut path = String::new();
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }
        TreePath(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Path segments, root yields nothing
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Number of segments below the root
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Last segment, `None` for the root
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit('/').next()
        }
    }

    /// Parent directory, `None` for the root
    pub fn parent(&self) -> Option<TreePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) | None => Some(Self::root()),
            Some(idx) => Some(TreePath(self.0[..idx].to_string())),
        }
    }

    /// Strict ancestors, nearest first, ending with the root.
    pub fn ancestors(&self) -> Vec<TreePath> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(p) = current {
            current = p.parent();
            out.push(p);
        }
        out
    }

    /// Join a relative path onto this one, normalizing the result.
    pub fn join(&self, relative: &str) -> Result<TreePath, TreeError> {
        if relative.starts_with('/') || relative.starts_with('\\') {
            return Err(TreeError::invalid_path(relative, "cannot join an absolute path"));
        }
        normalize(&format!("{}/{}", self.0, relative))
    }

    /// Prefix shared by every strict descendant: `/` for the root, `<path>/` otherwise.
    pub(crate) fn descendant_prefix(&self) -> String {
        if self.is_root() {
            "/".to_string()
        } else {
            format!("{}/", self.0)
        }
    }

    /// True when `self` lies strictly below `dir`.
    pub fn is_within(&self, dir: &TreePath) -> bool {
        if self == dir {
            return false;
        }
        self.0.starts_with(&dir.descendant_prefix())
    }

    /// First segment of `self` below `dir`, if `self` lies within `dir`.
    pub(crate) fn child_segment_under(&self, dir: &TreePath) -> Option<&str> {
        if !self.is_within(dir) {
            return None;
        }
        let rest = &self.0[dir.descendant_prefix().len()..];
        rest.split('/').next()
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreePath({:?})", self.0)
    }
}

impl FromStr for TreePath {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

impl TryFrom<String> for TreePath {
    type Error = TreeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        normalize(&value)
    }
}

impl TryFrom<&str> for TreePath {
    type Error = TreeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        normalize(value)
    }
}

impl From<TreePath> for String {
    fn from(path: TreePath) -> Self {
        path.0
    }
}

impl AsRef<str> for TreePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TreePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}
