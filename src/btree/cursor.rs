//! Leaf handles and ordered iteration.
//!
//! A range scan locates its starting leaf once and then walks the leaf
//! chain through the `next` links, never re-descending the tree.

use super::node::LeafNode;
use super::tree::BPlusTree;
use crate::types::NodeId;
use std::iter::FusedIterator;

/// Borrowed handle to a leaf node
pub struct LeafRef<'a, K, V> {
    tree: &'a BPlusTree<K, V>,
    id: NodeId,
    leaf: &'a LeafNode<K, V>,
}

impl<K, V> Clone for LeafRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for LeafRef<'_, K, V> {}

impl<'a, K: Ord, V> LeafRef<'a, K, V> {
    pub(crate) fn new(tree: &'a BPlusTree<K, V>, id: NodeId) -> Self {
        Self {
            tree,
            id,
            leaf: tree.node(id).as_leaf(),
        }
    }

    /// Arena id of this leaf
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Keys in ascending order
    pub fn keys(&self) -> &'a [K] {
        &self.leaf.keys
    }

    /// Values, parallel to [`keys`](Self::keys)
    pub fn values(&self) -> &'a [V] {
        &self.leaf.values
    }

    pub fn len(&self) -> usize {
        self.leaf.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf.keys.is_empty()
    }

    /// Position of the first key `>= key` in this leaf
    pub fn lower_bound(&self, key: &K) -> usize {
        self.leaf.lower_bound(key)
    }

    /// Key/value pairs of this leaf only
    pub fn entries(&self) -> impl Iterator<Item = (&'a K, &'a V)> + 'a {
        let leaf: &'a LeafNode<K, V> = self.leaf;
        leaf.keys.iter().zip(leaf.values.iter())
    }

    /// The in-order successor leaf, if any
    pub fn next_leaf(&self) -> Option<LeafRef<'a, K, V>> {
        self.leaf.next.map(|id| LeafRef::new(self.tree, id))
    }
}

/// Lazy, forward-only iterator over `(key, value)` pairs in key order.
pub struct Range<'a, K, V> {
    leaf: Option<LeafRef<'a, K, V>>,
    pos: usize,
}

impl<'a, K: Ord, V> Range<'a, K, V> {
    pub(crate) fn new(leaf: Option<LeafRef<'a, K, V>>, pos: usize) -> Self {
        Self { leaf, pos }
    }

    pub(crate) fn empty() -> Self {
        Self { leaf: None, pos: 0 }
    }
}

impl<'a, K: Ord, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf?;
            if self.pos < leaf.len() {
                let idx = self.pos;
                self.pos += 1;
                return Some((&leaf.keys()[idx], &leaf.values()[idx]));
            }
            self.leaf = leaf.next_leaf();
            self.pos = 0;
        }
    }
}

impl<K: Ord, V> FusedIterator for Range<'_, K, V> {}

#[cfg(test)]
mod tests {
    use crate::btree::BPlusTree;
    use crate::error::Result;

    fn sample_tree() -> Result<BPlusTree<i32, String>> {
        let mut tree = BPlusTree::new(3)?;
        for key in [8, 3, 5, 1, 9, 7, 2] {
            tree.insert(key, format!("v{}", key))?;
        }
        Ok(tree)
    }

    #[test]
    fn test_range_walks_leaf_chain() -> Result<()> {
        let tree = sample_tree()?;
        let keys: Vec<i32> = tree.range_from(&4).map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![5, 7, 8, 9]);

        let values: Vec<&str> = tree.range_from(&8).map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, vec!["v8", "v9"]);
        Ok(())
    }

    #[test]
    fn test_range_past_end_is_empty() -> Result<()> {
        let tree = sample_tree()?;
        let mut range = tree.range_from(&100);
        assert!(range.next().is_none());
        assert!(range.next().is_none());
        Ok(())
    }

    #[test]
    fn test_leaf_handles_compose_scan() -> Result<()> {
        let tree = sample_tree()?;
        let start = 4;
        let mut leaf = tree.find_leaf(&start);
        let mut skip = leaf.map(|l| l.lower_bound(&start)).unwrap_or(0);
        let mut seen = Vec::new();

        while let Some(current) = leaf {
            seen.extend(current.entries().skip(skip).map(|(k, _)| *k));
            leaf = current.next_leaf();
            skip = 0;
        }
        assert_eq!(seen, vec![5, 7, 8, 9]);
        Ok(())
    }

    #[test]
    fn test_leaf_ref_accessors() -> Result<()> {
        let tree = sample_tree()?;
        let leaf = tree.find_leaf(&1).unwrap();
        assert_eq!(leaf.keys().first(), Some(&1));
        assert_eq!(leaf.keys().len(), leaf.values().len());
        assert!(!leaf.is_empty());
        assert_eq!(leaf.len(), leaf.entries().count());
        Ok(())
    }
}
