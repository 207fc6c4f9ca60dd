//! Node identifier type.

use std::fmt;

/// Stable handle of a node in the tree's arena.
///
/// Nodes are never freed, so an id stays valid for the life of the tree.
/// The value is an opaque debugging identifier, not a memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a node id from a raw value
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value
    pub const fn value(self) -> u32 {
        self.0
    }

    pub(crate) fn from_index(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "node arena exceeded u32::MAX nodes");
        Self(index as u32)
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_basics() {
        let id = NodeId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::from_index(7), NodeId::from(7));
        assert_eq!(u32::from(NodeId::new(9)), 9);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(format!("{}", NodeId::new(3)), "#3");
    }
}
