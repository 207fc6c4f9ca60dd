//! # B+ Tree Index
//!
//! An in-memory ordered key-value index built as a B+ tree.
//!
//! ## Architecture
//!
//! - **Types** (`types`): tree configuration and arena node identifiers
//! - **B+ Tree** (`btree`): nodes, insertion with cascading splits, point
//!   lookups and range scans along the leaf chain
//! - **Index** (this module): a cloneable, lock-protected handle for shared use
//!
//! ## Usage
//!
//! ```rust
//! use bptree_index::{BPlusTree, Result};
//!
//! # fn main() -> Result<()> {
//! let mut tree = BPlusTree::new(4)?;
//! for key in [10, 20, 30, 40, 5, 15] {
//!     tree.insert(key, format!("val-{}", key))?;
//! }
//!
//! assert_eq!(tree.get(&15).map(String::as_str), Some("val-15"));
//! assert_eq!(tree.get(&99), None);
//!
//! let keys: Vec<i32> = tree.range_from(&20).map(|(k, _)| *k).collect();
//! assert_eq!(keys, vec![20, 30, 40]);
//! # Ok(())
//! # }
//! ```

pub mod btree;
pub mod error;
pub mod types;

pub use error::{IndexError, Result};
pub use types::{NodeId, TreeConfig, DEFAULT_ORDER, MIN_ORDER};

// Re-export main public API
pub use btree::{BPlusTree, LeafRef, Range};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::sync::Arc;

/// Index configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// B+ tree configuration
    pub tree: TreeConfig,
}

impl Config {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tree order
    pub fn order(mut self, order: usize) -> Self {
        self.tree.order = order;
        self
    }

    /// Set the tree configuration
    pub fn tree_config(mut self, config: TreeConfig) -> Self {
        self.tree = config;
        self
    }
}

/// Node type for visualization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Arena node ID
    pub node_id: u32,
    /// Whether this is a leaf node
    pub is_leaf: bool,
    /// Keys in this node
    pub keys: Vec<String>,
    /// Values (only for leaf nodes)
    pub values: Vec<String>,
    /// Next leaf in key order (only for leaf nodes)
    pub next: Option<u32>,
    /// Child nodes (only for internal nodes)
    pub children: Vec<TreeNode>,
}

/// Index statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// Number of key/value pairs
    pub len: usize,
    /// Height of the tree (0 when empty)
    pub height: usize,
    /// Total nodes allocated
    pub node_count: usize,
    /// Leaf nodes allocated
    pub leaf_count: usize,
    /// Tree order
    pub order: usize,
}

/// Shared handle to a B+ tree
///
/// The tree itself has no internal synchronization; this handle serializes
/// writers behind an exclusive lock and lets readers share the tree.
pub struct Index<K, V> {
    tree: Arc<RwLock<BPlusTree<K, V>>>,
    config: Config,
}

impl<K, V> Clone for Index<K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            config: self.config.clone(),
        }
    }
}

impl<K: Ord + Clone, V: Clone> Index<K, V> {
    /// Create an empty index
    pub fn open(config: Config) -> Result<Self> {
        let tree = BPlusTree::with_config(config.tree)?;
        Ok(Self {
            tree: Arc::new(RwLock::new(tree)),
            config,
        })
    }

    /// Get the current tree configuration
    pub fn tree_config(&self) -> TreeConfig {
        self.config.tree
    }

    /// Insert a new key-value pair, rejecting existing keys
    pub fn insert(&self, key: K, value: V) -> Result<()> {
        let mut tree = self.tree.write();
        tree.insert(key, value)
    }

    /// Insert or update a key-value pair
    ///
    /// Returns the previous value if the key existed.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let mut tree = self.tree.write();
        tree.put(key, value)
    }

    /// Get a value by key
    pub fn get(&self, key: &K) -> Option<V> {
        let tree = self.tree.read();
        tree.get(key).cloned()
    }

    /// Check if a key exists
    pub fn contains(&self, key: &K) -> bool {
        let tree = self.tree.read();
        tree.contains_key(key)
    }

    /// Iterate over all key-value pairs in sorted order
    pub fn iter(&self) -> Vec<(K, V)> {
        let tree = self.tree.read();
        tree.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Key-value pairs with `start <= key < end`
    ///
    /// Both bounds are optional; `None` means unbounded on that side.
    pub fn range(&self, start: Option<&K>, end: Option<&K>) -> Vec<(K, V)> {
        let tree = self.tree.read();
        let scan = match start {
            Some(start) => tree.range_from(start),
            None => tree.iter(),
        };
        scan.take_while(|(k, _)| end.map_or(true, |end| *k < end))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.tree.write().clear();
    }

    /// Check the tree's structural invariants
    pub fn verify(&self) -> Result<()> {
        self.tree.read().verify()
    }

    /// Get statistics about the index
    pub fn stats(&self) -> IndexStats {
        let tree = self.tree.read();
        IndexStats {
            len: tree.len(),
            height: tree.height(),
            node_count: tree.node_count(),
            leaf_count: tree.leaf_count(),
            order: tree.order(),
        }
    }
}

impl<K: Ord + Clone + Debug, V: Clone + Debug> Index<K, V> {
    /// Debug trace a key lookup
    pub fn debug_get(&self, key: &K) -> Vec<String> {
        self.tree.read().debug_get(key)
    }

    /// Nested text listing of the tree
    pub fn render(&self) -> String {
        self.tree.read().render()
    }
}

impl<K: Ord + Clone + Display, V: Clone + Display> Index<K, V> {
    /// Export the tree structure for visualization
    pub fn export_tree(&self) -> Option<TreeNode> {
        self.tree.read().export_tree()
    }
}
