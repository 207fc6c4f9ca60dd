//! B+ tree implementation.
//!
//! This module provides an in-memory B+ tree that supports:
//! - Point lookups (get)
//! - Insertions with cascading node splits (insert, put)
//! - Ordered range scans along the leaf chain

mod cursor;
mod node;
mod tree;

pub use cursor::{LeafRef, Range};
pub use tree::BPlusTree;
