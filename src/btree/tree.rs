//! B+ tree core implementation.
//!
//! This module provides the main BPlusTree struct with operations for:
//! - get: Point lookups
//! - insert / put: Insertions (rejecting or overwriting duplicates)
//! - range_from / iter: Ordered scans along the leaf chain
//! - render / debug_get / export_tree / verify: Diagnostics
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. A node that
//! reaches `order` keys is split immediately; splits climb the parent links
//! in a loop until a parent has room or a new root is created.

use super::cursor::{LeafRef, Range};
use super::node::{InternalNode, LeafNode, Node};
use crate::error::{IndexError, Result};
use crate::types::{NodeId, TreeConfig};
use crate::TreeNode;
use std::fmt::{self, Debug, Display, Write};

/// An in-memory B+ tree
pub struct BPlusTree<K, V> {
    /// Node arena; nodes are never removed
    nodes: Vec<Node<K, V>>,
    /// Root node (None means empty tree)
    root: Option<NodeId>,
    config: TreeConfig,
    /// Number of key/value pairs
    len: usize,
    /// Number of levels (0 for an empty tree)
    height: usize,
}

impl<K, V> BPlusTree<K, V> {
    /// Get the tree configuration
    pub fn config(&self) -> TreeConfig {
        self.config
    }

    pub fn order(&self) -> usize {
        self.config.order
    }

    /// Number of key/value pairs
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the height of the tree
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the root node ID
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Total nodes allocated (leaf and internal)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Drop every entry, keeping the configuration
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
        self.height = 0;
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.nodes[id.index()]
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn first_leaf_id(&self) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match self.node(current) {
                Node::Leaf(_) => return Some(current),
                Node::Internal(internal) => current = internal.children[0],
            }
        }
    }
}

impl<K: Ord, V> BPlusTree<K, V> {
    /// Create an empty tree with the given order
    ///
    /// Fails with [`IndexError::InvalidConfiguration`] if `order < 3`.
    pub fn new(order: usize) -> Result<Self> {
        Self::with_config(TreeConfig::new(order))
    }

    /// Create an empty tree from a configuration
    pub fn with_config(config: TreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            nodes: Vec::new(),
            root: None,
            config,
            len: 0,
            height: 0,
        })
    }

    /// Locate the leaf whose key range covers `key`.
    ///
    /// The key need not be present. Returns `None` only for an empty tree.
    pub fn find_leaf(&self, key: &K) -> Option<LeafRef<'_, K, V>> {
        self.find_leaf_id(key).map(|id| LeafRef::new(self, id))
    }

    fn find_leaf_id(&self, key: &K) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match self.node(current) {
                Node::Leaf(_) => return Some(current),
                Node::Internal(internal) => current = internal.find_child(key),
            }
        }
    }

    /// Look up a key and return its value
    pub fn get(&self, key: &K) -> Option<&V> {
        let leaf = self.node(self.find_leaf_id(key)?).as_leaf();
        let idx = leaf.lower_bound(key);
        match leaf.keys.get(idx) {
            Some(found) if found == key => Some(&leaf.values[idx]),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over entries with keys `>= start`, in key order
    pub fn range_from(&self, start: &K) -> Range<'_, K, V> {
        match self.find_leaf(start) {
            Some(leaf) => {
                let pos = leaf.lower_bound(start);
                Range::new(Some(leaf), pos)
            }
            None => Range::empty(),
        }
    }

    /// Iterate over all entries in key order
    pub fn iter(&self) -> Range<'_, K, V> {
        match self.first_leaf_id() {
            Some(id) => Range::new(Some(LeafRef::new(self, id)), 0),
            None => Range::empty(),
        }
    }

    /// Check every structural invariant.
    ///
    /// Walks the whole tree, so this is meant for tests and diagnostics.
    pub fn verify(&self) -> Result<()> {
        let Some(root) = self.root else {
            if self.len != 0 || self.height != 0 || !self.nodes.is_empty() {
                return Err(IndexError::corruption("empty tree has leftover state"));
            }
            return Ok(());
        };

        if self.node(root).parent().is_some() {
            return Err(IndexError::corruption(format!("root {} has a parent", root)));
        }

        let max_keys = self.config.max_keys();
        let mut leaves: Vec<NodeId> = Vec::new();
        let mut leaf_depth: Option<usize> = None;
        let mut entries = 0;
        let mut visited = 0;

        // (node, depth, expected parent, lower bound inclusive, upper bound exclusive)
        let mut stack: Vec<(NodeId, usize, Option<NodeId>, Option<&K>, Option<&K>)> =
            vec![(root, 1, None, None, None)];

        while let Some((id, depth, parent, lower, upper)) = stack.pop() {
            visited += 1;
            if visited > self.nodes.len() {
                return Err(IndexError::corruption("node graph contains a cycle"));
            }

            let node = self.node(id);
            if node.parent() != parent {
                return Err(IndexError::corruption(format!(
                    "node {} has parent {:?}, expected {:?}",
                    id,
                    node.parent(),
                    parent
                )));
            }

            let keys = node.keys();
            if keys.len() > max_keys {
                return Err(IndexError::corruption(format!(
                    "node {} holds {} keys (max {})",
                    id,
                    keys.len(),
                    max_keys
                )));
            }
            if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(IndexError::corruption(format!(
                    "keys of node {} are not strictly increasing",
                    id
                )));
            }
            let in_bounds = |k: &K| lower.map_or(true, |lo| lo <= k) && upper.map_or(true, |hi| k < hi);
            if !keys.iter().all(in_bounds) {
                return Err(IndexError::corruption(format!(
                    "node {} has a key outside its separator range",
                    id
                )));
            }

            match node {
                Node::Leaf(leaf) => {
                    if leaf.values.len() != leaf.keys.len() {
                        return Err(IndexError::corruption(format!(
                            "leaf {} has {} keys but {} values",
                            id,
                            leaf.keys.len(),
                            leaf.values.len()
                        )));
                    }
                    match leaf_depth {
                        None => leaf_depth = Some(depth),
                        Some(expected) if expected != depth => {
                            return Err(IndexError::corruption(format!(
                                "leaf {} at depth {}, expected {}",
                                id, depth, expected
                            )));
                        }
                        Some(_) => {}
                    }
                    entries += leaf.keys.len();
                    leaves.push(id);
                }
                Node::Internal(internal) => {
                    if internal.children.len() != internal.keys.len() + 1 {
                        return Err(IndexError::corruption(format!(
                            "internal node {} has {} keys but {} children",
                            id,
                            internal.keys.len(),
                            internal.children.len()
                        )));
                    }
                    // Pushed in reverse so leaves are collected left to right.
                    for (i, &child) in internal.children.iter().enumerate().rev() {
                        let child_lower = if i == 0 { lower } else { Some(&internal.keys[i - 1]) };
                        let child_upper = internal.keys.get(i).or(upper);
                        stack.push((child, depth + 1, Some(id), child_lower, child_upper));
                    }
                }
            }
        }

        if visited != self.nodes.len() {
            return Err(IndexError::corruption(format!(
                "{} nodes reachable from the root, {} allocated",
                visited,
                self.nodes.len()
            )));
        }
        if leaf_depth != Some(self.height) {
            return Err(IndexError::corruption(format!(
                "recorded height {} does not match leaf depth {:?}",
                self.height, leaf_depth
            )));
        }
        if entries != self.len {
            return Err(IndexError::corruption(format!(
                "recorded length {} but leaves hold {} entries",
                self.len, entries
            )));
        }

        let mut chain = leaves.first().copied();
        for &expected in &leaves {
            if chain != Some(expected) {
                return Err(IndexError::corruption(format!(
                    "leaf chain reached {:?}, expected {}",
                    chain, expected
                )));
            }
            chain = self.node(expected).as_leaf().next;
        }
        if let Some(extra) = chain {
            return Err(IndexError::corruption(format!(
                "leaf chain continues past the last leaf to {}",
                extra
            )));
        }

        Ok(())
    }
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Insert a new key/value pair
    ///
    /// Fails with [`IndexError::DuplicateKey`] if the key is already present;
    /// the tree is left unchanged in that case.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        let Some(leaf_id) = self.find_leaf_id(&key) else {
            self.init_root(key, value);
            return Ok(());
        };

        match self.node(leaf_id).as_leaf().search(&key) {
            Ok(_) => Err(IndexError::DuplicateKey),
            Err(pos) => {
                self.insert_into_leaf(leaf_id, pos, key, value);
                Ok(())
            }
        }
    }

    /// Insert or update a key-value pair
    ///
    /// Returns the previous value if the key was already present.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let Some(leaf_id) = self.find_leaf_id(&key) else {
            self.init_root(key, value);
            return None;
        };

        match self.node(leaf_id).as_leaf().search(&key) {
            Ok(idx) => {
                let slot = &mut self.node_mut(leaf_id).as_leaf_mut().values[idx];
                Some(std::mem::replace(slot, value))
            }
            Err(pos) => {
                self.insert_into_leaf(leaf_id, pos, key, value);
                None
            }
        }
    }

    fn init_root(&mut self, key: K, value: V) {
        let id = self.alloc(Node::Leaf(LeafNode::new(key, value)));
        self.root = Some(id);
        self.height = 1;
        self.len = 1;
    }

    fn insert_into_leaf(&mut self, leaf_id: NodeId, pos: usize, key: K, value: V) {
        let order = self.config.order;
        let leaf = self.node_mut(leaf_id).as_leaf_mut();
        leaf.insert_at(pos, key, value);
        let overflow = leaf.keys.len() >= order;
        self.len += 1;

        if overflow {
            self.split_and_promote(leaf_id);
        }
    }

    /// Split `node_id` and keep promoting separators up the parent chain
    /// until an ancestor stays below `order` keys or a new root is created.
    fn split_and_promote(&mut self, mut node_id: NodeId) {
        let order = self.config.order;

        while self.node(node_id).key_count() >= order {
            let (separator, sibling_id) = self.split(node_id);

            match self.node(node_id).parent() {
                None => {
                    self.grow_root(node_id, separator, sibling_id);
                    return;
                }
                Some(parent_id) => {
                    self.node_mut(parent_id)
                        .as_internal_mut()
                        .insert_separator(separator, sibling_id);
                    node_id = parent_id;
                }
            }
        }
    }

    /// Split one node in two. Returns the separator to promote and the new
    /// right sibling, which shares the original's parent.
    fn split(&mut self, node_id: NodeId) -> (K, NodeId) {
        let mid = self.config.split_index();
        let sibling_id = NodeId::from_index(self.nodes.len());

        let (separator, sibling) = match self.node_mut(node_id) {
            Node::Leaf(leaf) => {
                let right = leaf.split_off(mid, sibling_id);
                (right.keys[0].clone(), Node::Leaf(right))
            }
            Node::Internal(internal) => {
                let (separator, right) = internal.split_off(mid);
                (separator, Node::Internal(right))
            }
        };

        let moved = match &sibling {
            Node::Internal(internal) => internal.children.clone(),
            Node::Leaf(_) => Vec::new(),
        };
        let allocated = self.alloc(sibling);
        debug_assert_eq!(allocated, sibling_id);

        for child in moved {
            self.node_mut(child).set_parent(Some(sibling_id));
        }

        (separator, sibling_id)
    }

    /// Split the root, creating a new root
    fn grow_root(&mut self, left: NodeId, separator: K, right: NodeId) {
        let root_id = self.alloc(Node::Internal(InternalNode::new_root(separator, left, right)));
        self.node_mut(left).set_parent(Some(root_id));
        self.node_mut(right).set_parent(Some(root_id));
        self.root = Some(root_id);
        self.height += 1;
    }
}

impl<K: Ord + Debug, V: Debug> BPlusTree<K, V> {
    /// Human-readable nested listing of the tree, one node per line,
    /// indented by depth.
    pub fn render(&self) -> String {
        let Some(root) = self.root else {
            return "Tree is empty\n".to_string();
        };

        let mut out = String::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((id, level)) = stack.pop() {
            let indent = "   ".repeat(level);
            // Writing to a String never fails.
            let _ = match self.node(id) {
                Node::Leaf(leaf) => writeln!(
                    out,
                    "{}Leaf: {:?} (vals: {:?}) -> next: {}",
                    indent,
                    leaf.keys,
                    leaf.values,
                    NextLink(leaf.next)
                ),
                Node::Internal(internal) => {
                    for &child in internal.children.iter().rev() {
                        stack.push((child, level + 1));
                    }
                    writeln!(out, "{}Internal: {:?}", indent, internal.keys)
                }
            };
        }
        out
    }

    /// Debug search - traces the path through the tree
    pub fn debug_get(&self, key: &K) -> Vec<String> {
        let mut trace = Vec::new();
        let Some(root) = self.root else {
            trace.push("Tree is empty (no root)".to_string());
            return trace;
        };

        trace.push(format!("Searching for key: {:?}", key));
        trace.push(format!("Root node: {}, Height: {}", root, self.height));

        let mut current = root;
        loop {
            let node = self.node(current);
            trace.push(format!(
                "  Node {}: is_leaf={}, key_count={}",
                current,
                node.is_leaf(),
                node.key_count()
            ));

            match node {
                Node::Leaf(leaf) => {
                    trace.push(format!("    keys={:?}", leaf.keys));
                    let idx = leaf.lower_bound(key);
                    match leaf.keys.get(idx) {
                        Some(found) if found == key => {
                            trace.push(format!("  FOUND at index {}", idx));
                        }
                        _ => trace.push("  NOT FOUND in leaf".to_string()),
                    }
                    return trace;
                }
                Node::Internal(internal) => {
                    trace.push(format!("    separators={:?}", internal.keys));
                    let slot = internal.child_index(key);
                    let child = internal.children[slot];
                    trace.push(format!("  -> Descending to child {} (slot {})", child, slot));
                    current = child;
                }
            }
        }
    }
}

impl<K: Ord + Display, V: Display> BPlusTree<K, V> {
    /// Export the tree structure for visualization
    pub fn export_tree(&self) -> Option<TreeNode> {
        self.root.map(|root| self.export_node(root))
    }

    fn export_node(&self, id: NodeId) -> TreeNode {
        match self.node(id) {
            Node::Leaf(leaf) => TreeNode {
                node_id: id.value(),
                is_leaf: true,
                keys: leaf.keys.iter().map(ToString::to_string).collect(),
                values: leaf.values.iter().map(ToString::to_string).collect(),
                next: leaf.next.map(NodeId::value),
                children: Vec::new(),
            },
            Node::Internal(internal) => TreeNode {
                node_id: id.value(),
                is_leaf: false,
                keys: internal.keys.iter().map(ToString::to_string).collect(),
                values: Vec::new(),
                next: None,
                children: internal
                    .children
                    .iter()
                    .map(|&child| self.export_node(child))
                    .collect(),
            },
        }
    }
}

struct NextLink(Option<NodeId>);

impl Display for NextLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{}", id),
            None => write!(f, "nil"),
        }
    }
}
