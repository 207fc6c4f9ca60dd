//! Tree nodes.
//!
//! Internal nodes route by separator keys; leaves hold the key/value pairs
//! and link to their right neighbour. Parent and next links are plain
//! [`NodeId`]s into the arena and never own anything.

use crate::types::NodeId;

/// A node in the arena
pub(crate) enum Node<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

/// Router node: `children.len() == keys.len() + 1`
pub(crate) struct InternalNode<K> {
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

/// Data node: `values.len() == keys.len()`
pub(crate) struct LeafNode<K, V> {
    pub(crate) keys: Vec<K>,
    pub(crate) values: Vec<V>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Internal(internal) => &internal.keys,
            Node::Leaf(leaf) => &leaf.keys,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys().len()
    }

    pub(crate) fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Internal(internal) => internal.parent,
            Node::Leaf(leaf) => leaf.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Internal(internal) => internal.parent = parent,
            Node::Leaf(leaf) => leaf.parent = parent,
        }
    }

    /// Returns the leaf, panicking if this is an internal node.
    pub(crate) fn as_leaf(&self) -> &LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf mutably, panicking if this is an internal node.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is a leaf.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }
}

impl<K: Ord> InternalNode<K> {
    /// Root created when a parentless node splits
    pub(crate) fn new_root(separator: K, left: NodeId, right: NodeId) -> Self {
        Self {
            keys: vec![separator],
            children: vec![left, right],
            parent: None,
        }
    }

    /// Index of the child whose range covers `key`: the first separator
    /// strictly greater than `key`.
    pub(crate) fn child_index(&self, key: &K) -> usize {
        self.keys.partition_point(|sep| sep <= key)
    }

    /// Child to descend into for `key`
    pub(crate) fn find_child(&self, key: &K) -> NodeId {
        self.children[self.child_index(key)]
    }

    /// Insert a promoted separator with its right-hand child.
    pub(crate) fn insert_separator(&mut self, separator: K, right: NodeId) {
        let pos = self.child_index(&separator);
        self.keys.insert(pos, separator);
        self.children.insert(pos + 1, right);
    }

    /// Split at `mid`. `keys[mid]` is removed and returned for promotion;
    /// the returned node takes keys `[mid+1, end)` and children `[mid+1, end)`.
    pub(crate) fn split_off(&mut self, mid: usize) -> (K, InternalNode<K>) {
        let mut right_keys = self.keys.split_off(mid);
        let separator = right_keys.remove(0);
        let right_children = self.children.split_off(mid + 1);

        let right = InternalNode {
            keys: right_keys,
            children: right_children,
            parent: self.parent,
        };
        (separator, right)
    }
}

impl<K: Ord, V> LeafNode<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            keys: vec![key],
            values: vec![value],
            parent: None,
            next: None,
        }
    }

    /// `Ok(index)` if `key` is present, otherwise `Err(insert_position)`.
    pub(crate) fn search(&self, key: &K) -> Result<usize, usize> {
        self.keys.binary_search(key)
    }

    /// Position of the first key `>= key`
    pub(crate) fn lower_bound(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }

    pub(crate) fn insert_at(&mut self, pos: usize, key: K, value: V) {
        self.keys.insert(pos, key);
        self.values.insert(pos, value);
    }

    /// Split at `mid`, splicing the returned sibling into the chain right
    /// after `self`. The sibling will live at `sibling_id`.
    pub(crate) fn split_off(&mut self, mid: usize, sibling_id: NodeId) -> LeafNode<K, V> {
        let right = LeafNode {
            keys: self.keys.split_off(mid),
            values: self.values.split_off(mid),
            parent: self.parent,
            next: self.next,
        };
        self.next = Some(sibling_id);
        right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(keys: &[i32]) -> LeafNode<i32, i32> {
        LeafNode {
            keys: keys.to_vec(),
            values: keys.iter().map(|k| k * 10).collect(),
            parent: None,
            next: None,
        }
    }

    #[test]
    fn test_child_index_routes_equal_keys_right() {
        let node = InternalNode {
            keys: vec![10, 20],
            children: vec![NodeId::new(0), NodeId::new(1), NodeId::new(2)],
            parent: None,
        };
        assert_eq!(node.child_index(&5), 0);
        assert_eq!(node.child_index(&10), 1);
        assert_eq!(node.child_index(&15), 1);
        assert_eq!(node.child_index(&20), 2);
        assert_eq!(node.find_child(&99), NodeId::new(2));
    }

    #[test]
    fn test_leaf_search_and_lower_bound() {
        let node = leaf(&[5, 10, 20]);
        assert_eq!(node.search(&10), Ok(1));
        assert_eq!(node.search(&15), Err(2));
        assert_eq!(node.lower_bound(&10), 1);
        assert_eq!(node.lower_bound(&11), 2);
        assert_eq!(node.lower_bound(&21), 3);
    }

    #[test]
    fn test_leaf_split_links_sibling() {
        let mut node = leaf(&[1, 2, 3, 4]);
        node.next = Some(NodeId::new(9));

        let right = node.split_off(2, NodeId::new(5));
        assert_eq!(node.keys, vec![1, 2]);
        assert_eq!(node.values, vec![10, 20]);
        assert_eq!(right.keys, vec![3, 4]);
        assert_eq!(right.values, vec![30, 40]);
        assert_eq!(node.next, Some(NodeId::new(5)));
        assert_eq!(right.next, Some(NodeId::new(9)));
    }

    #[test]
    fn test_internal_split_promotes_middle_key() {
        let mut node = InternalNode {
            keys: vec![10, 20, 30, 40],
            children: (0..5).map(NodeId::new).collect(),
            parent: Some(NodeId::new(7)),
        };

        let (separator, right) = node.split_off(2);
        assert_eq!(separator, 30);
        assert_eq!(node.keys, vec![10, 20]);
        assert_eq!(node.children, vec![NodeId::new(0), NodeId::new(1), NodeId::new(2)]);
        assert_eq!(right.keys, vec![40]);
        assert_eq!(right.children, vec![NodeId::new(3), NodeId::new(4)]);
        assert_eq!(right.parent, Some(NodeId::new(7)));
    }

    #[test]
    fn test_insert_separator_shifts_children() {
        let mut node = InternalNode {
            keys: vec![10, 30],
            children: vec![NodeId::new(0), NodeId::new(1), NodeId::new(2)],
            parent: None,
        };
        node.insert_separator(20, NodeId::new(3));
        assert_eq!(node.keys, vec![10, 20, 30]);
        assert_eq!(
            node.children,
            vec![NodeId::new(0), NodeId::new(1), NodeId::new(3), NodeId::new(2)]
        );
    }
}
