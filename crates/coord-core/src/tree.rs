//! # Persistent Path Tree
//!
//! An immutable radix tree from byte-string paths to [`Status`].
//!
//! Every mutation returns a new tree and leaves the receiver untouched. Only
//! the nodes along the modified path are copied; every other subtree is
//! shared through `Arc`, so cloning a tree is O(1) and an old version stays a
//! valid snapshot for as long as somebody holds it.
//!
//! ## Layout
//!
//! ```text
//! root ("")
//!  └─ "/job/"
//!      ├─ "a"      = started
//!      └─ "b"      = failed
//!          └─ "/x" = succeeded
//! ```
//!
//! Each node stores the edge label leading into it. Children are kept sorted
//! by the first byte of their label, and no two children share that byte.
//! Interior nodes without a value always have at least two children; the
//! root is the only exception.

use std::fmt;
use std::sync::Arc;

use crate::status::Status;

#[derive(Clone, Default)]
struct Node {
    label: Box<[u8]>,
    value: Option<Status>,
    children: Vec<Arc<Node>>,
}

impl Node {
    fn leaf(label: &[u8], value: Status) -> Self {
        Self {
            label: label.into(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    fn find(&self, first: u8) -> Result<usize, usize> {
        self.children
            .binary_search_by_key(&first, |child| child.label[0])
    }

    fn relabel(&self, label: &[u8]) -> Self {
        Self {
            label: label.into(),
            value: self.value,
            children: self.children.clone(),
        }
    }
}

/// Immutable, structurally shared map from path bytes to [`Status`].
#[derive(Clone, Default)]
pub struct PathTree {
    root: Arc<Node>,
    len: usize,
}

impl PathTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of paths stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no path is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Status stored for `path`, if any.
    pub fn lookup(&self, path: &[u8]) -> Option<Status> {
        let mut node = &*self.root;
        let mut rest = path;
        while !rest.is_empty() {
            let child: &Node = &node.children[node.find(rest[0]).ok()?];
            rest = rest.strip_prefix(&*child.label)?;
            node = child;
        }
        node.value
    }

    /// Status of `path`; [`Status::Undefined`] when absent.
    pub fn get(&self, path: &[u8]) -> Status {
        self.lookup(path).unwrap_or_default()
    }

    /// Store `status` under `path`.
    ///
    /// Returns the new tree, the previous value, and whether the stored value
    /// actually changed. An unchanged insert hands back a clone of `self`.
    pub fn insert(&self, path: &[u8], status: Status) -> (PathTree, Option<Status>, bool) {
        let previous = self.lookup(path);
        if previous == Some(status) {
            return (self.clone(), previous, false);
        }
        let root = insert_at(&self.root, path, status);
        let len = if previous.is_some() { self.len } else { self.len + 1 };
        let tree = PathTree {
            root: Arc::new(root),
            len,
        };
        (tree, previous, true)
    }

    /// Delete `path`.
    ///
    /// Returns the new tree, the removed value, and whether anything was
    /// removed. Deleting an absent path hands back a clone of `self`.
    pub fn remove(&self, path: &[u8]) -> (PathTree, Option<Status>, bool) {
        match remove_at(&self.root, path, true) {
            None => (self.clone(), None, false),
            Some((root, previous)) => {
                let tree = PathTree {
                    root: Arc::new(root.unwrap_or_default()),
                    len: self.len - 1,
                };
                (tree, Some(previous), true)
            }
        }
    }

    /// All entries in ascending byte order of their path.
    pub fn entries(&self) -> Vec<(Vec<u8>, Status)> {
        let mut out = Vec::with_capacity(self.len);
        let mut prefix = Vec::new();
        collect(&self.root, &mut prefix, &mut out);
        out
    }
}

impl fmt::Debug for PathTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries()
                    .into_iter()
                    .map(|(path, status)| (String::from_utf8_lossy(&path).into_owned(), status)),
            )
            .finish()
    }
}

/// Copy of `node` with `rest` (relative to `node`) set to `status`.
fn insert_at(node: &Node, rest: &[u8], status: Status) -> Node {
    let mut copy = node.clone();
    if rest.is_empty() {
        copy.value = Some(status);
        return copy;
    }

    match node.find(rest[0]) {
        Err(slot) => {
            copy.children.insert(slot, Arc::new(Node::leaf(rest, status)));
        }
        Ok(idx) => {
            let child = &node.children[idx];
            let common = common_prefix(&child.label, rest);
            let replacement = if common == child.label.len() {
                insert_at(child, &rest[common..], status)
            } else {
                // The new key diverges inside the child's label: split it.
                let mut split = Node {
                    label: rest[..common].into(),
                    value: None,
                    children: vec![Arc::new(child.relabel(&child.label[common..]))],
                };
                if common == rest.len() {
                    split.value = Some(status);
                } else {
                    let leaf = Node::leaf(&rest[common..], status);
                    let slot = split.find(leaf.label[0]).unwrap_or_else(|slot| slot);
                    split.children.insert(slot, Arc::new(leaf));
                }
                split
            };
            copy.children[idx] = Arc::new(replacement);
        }
    }
    copy
}

/// Copy of `node` without `rest`, or `None` when `rest` is absent.
///
/// The inner `Option<Node>` is `None` when the node itself disappears.
fn remove_at(node: &Node, rest: &[u8], is_root: bool) -> Option<(Option<Node>, Status)> {
    let mut copy;
    let previous;

    if rest.is_empty() {
        previous = node.value?;
        copy = node.clone();
        copy.value = None;
    } else {
        let idx = node.find(rest[0]).ok()?;
        let child = &node.children[idx];
        let below = rest.strip_prefix(&*child.label)?;
        let (replacement, removed) = remove_at(child, below, false)?;
        previous = removed;
        copy = node.clone();
        match replacement {
            Some(replacement) => copy.children[idx] = Arc::new(replacement),
            None => {
                copy.children.remove(idx);
            }
        }
    }

    if is_root {
        return Some((Some(copy), previous));
    }
    Some((compact(copy), previous))
}

/// Restore the layout invariants after a removal below `node`.
fn compact(mut node: Node) -> Option<Node> {
    if node.value.is_some() {
        return Some(node);
    }
    match node.children.len() {
        0 => None,
        1 => {
            let only = node.children.remove(0);
            let mut label = node.label.into_vec();
            label.extend_from_slice(&only.label);
            Some(only.relabel(&label))
        }
        _ => Some(node),
    }
}

fn collect(node: &Node, prefix: &mut Vec<u8>, out: &mut Vec<(Vec<u8>, Status)>) {
    let mark = prefix.len();
    prefix.extend_from_slice(&node.label);
    if let Some(value) = node.value {
        out.push((prefix.clone(), value));
    }
    for child in &node.children {
        collect(child, prefix, out);
    }
    prefix.truncate(mark);
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(entries: &[(&str, Status)]) -> PathTree {
        entries.iter().fold(PathTree::new(), |tree, (path, status)| {
            tree.insert(path.as_bytes(), *status).0
        })
    }

    #[test]
    fn empty_tree_reports_undefined() {
        let tree = PathTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.get(b"/undefined"), Status::Undefined);
        assert_eq!(tree.lookup(b""), None);
    }

    #[test]
    fn insert_and_get() {
        let tree = tree_of(&[("/job/a", Status::Started), ("/job/b", Status::Failed)]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(b"/job/a"), Status::Started);
        assert_eq!(tree.get(b"/job/b"), Status::Failed);
        assert_eq!(tree.get(b"/job/"), Status::Undefined);
        assert_eq!(tree.get(b"/job/c"), Status::Undefined);
        assert_eq!(tree.get(b"/job/ab"), Status::Undefined);
    }

    #[test]
    fn insert_reports_previous_and_change() {
        let tree = tree_of(&[("/x", Status::Started)]);

        let (next, previous, changed) = tree.insert(b"/x", Status::Succeeded);
        assert_eq!(previous, Some(Status::Started));
        assert!(changed);
        assert_eq!(next.len(), 1);

        let (same, previous, changed) = next.insert(b"/x", Status::Succeeded);
        assert_eq!(previous, Some(Status::Succeeded));
        assert!(!changed);
        assert_eq!(same.get(b"/x"), Status::Succeeded);
    }

    #[test]
    fn prefix_keys_are_independent() {
        let tree = tree_of(&[
            ("/job/b", Status::Failed),
            ("/job/b/x", Status::Succeeded),
            ("/job", Status::Started),
            ("/jo", Status::Started),
        ]);
        assert_eq!(tree.get(b"/job/b"), Status::Failed);
        assert_eq!(tree.get(b"/job/b/x"), Status::Succeeded);
        assert_eq!(tree.get(b"/job"), Status::Started);
        assert_eq!(tree.get(b"/jo"), Status::Started);
        assert_eq!(tree.get(b"/j"), Status::Undefined);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn old_versions_survive_mutation() {
        let v1 = tree_of(&[("/a", Status::Started)]);
        let (v2, _, _) = v1.insert(b"/a", Status::Failed);
        let (v3, _, _) = v2.insert(b"/b", Status::Started);
        let (v4, _, _) = v3.remove(b"/a");

        assert_eq!(v1.get(b"/a"), Status::Started);
        assert_eq!(v2.get(b"/a"), Status::Failed);
        assert_eq!(v2.get(b"/b"), Status::Undefined);
        assert_eq!(v3.get(b"/b"), Status::Started);
        assert_eq!(v4.get(b"/a"), Status::Undefined);
        assert_eq!(v4.get(b"/b"), Status::Started);
        assert_eq!((v1.len(), v2.len(), v3.len(), v4.len()), (1, 1, 2, 1));
    }

    #[test]
    fn remove_absent_path_is_unchanged() {
        let tree = tree_of(&[("/a/b", Status::Started)]);
        for path in ["/a", "/a/b/c", "/z", ""] {
            let (same, previous, changed) = tree.remove(path.as_bytes());
            assert_eq!(previous, None, "{path}");
            assert!(!changed);
            assert_eq!(same.len(), 1);
        }
    }

    #[test]
    fn remove_merges_single_child_chains() {
        let tree = tree_of(&[
            ("/job/a", Status::Started),
            ("/job/ab", Status::Failed),
            ("/job/ac", Status::Succeeded),
        ]);
        let (tree, previous, changed) = tree.remove(b"/job/a");
        assert_eq!(previous, Some(Status::Started));
        assert!(changed);
        let (tree, _, _) = tree.remove(b"/job/ab");
        assert_eq!(tree.get(b"/job/ac"), Status::Succeeded);
        assert_eq!(
            tree.entries(),
            vec![(b"/job/ac".to_vec(), Status::Succeeded)]
        );
    }

    #[test]
    fn empty_path_is_a_key() {
        let tree = tree_of(&[("", Status::Started), ("/a", Status::Failed)]);
        assert_eq!(tree.get(b""), Status::Started);
        let (tree, previous, _) = tree.remove(b"");
        assert_eq!(previous, Some(Status::Started));
        assert_eq!(tree.get(b"/a"), Status::Failed);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn entries_are_sorted_by_path() {
        let tree = tree_of(&[
            ("/c", Status::Started),
            ("/a/b", Status::Failed),
            ("/a", Status::Succeeded),
            ("/b", Status::Started),
        ]);
        let paths: Vec<Vec<u8>> = tree.entries().into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            paths,
            vec![b"/a".to_vec(), b"/a/b".to_vec(), b"/b".to_vec(), b"/c".to_vec()]
        );
    }

    #[test]
    fn debug_lists_entries() {
        let tree = tree_of(&[("/a", Status::Started)]);
        assert_eq!(format!("{tree:?}"), "{\"/a\": Started}");
    }
}
