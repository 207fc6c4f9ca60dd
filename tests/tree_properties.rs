//! Property tests for the B+ tree.
//!
//! The tree is checked against a `BTreeMap` model while its structural
//! invariants are verified after every operation.

use bptree_index::{BPlusTree, IndexError};
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Put(u16, u32),
    Get(u16),
    RangeFrom(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // A small key space keeps duplicates frequent.
    prop_oneof![
        6 => (0u16..512, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => (0u16..512, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => (0u16..600).prop_map(Op::Get),
        1 => (0u16..600).prop_map(Op::RangeFrom),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_btreemap(order in 3usize..12, ops in prop::collection::vec(op_strategy(), 0..400)) {
        let mut tree: BPlusTree<u16, u32> = BPlusTree::new(order).unwrap();
        let mut model: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let result = tree.insert(key, value);
                    if model.contains_key(&key) {
                        prop_assert_eq!(result, Err(IndexError::DuplicateKey));
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        model.insert(key, value);
                    }
                }
                Op::Put(key, value) => {
                    prop_assert_eq!(tree.put(key, value), model.insert(key, value));
                }
                Op::Get(key) => {
                    prop_assert_eq!(tree.get(&key), model.get(&key));
                }
                Op::RangeFrom(start) => {
                    let got: Vec<(u16, u32)> = tree.range_from(&start).map(|(k, v)| (*k, *v)).collect();
                    let want: Vec<(u16, u32)> = model.range(start..).map(|(k, v)| (*k, *v)).collect();
                    prop_assert_eq!(got, want);
                }
            }

            prop_assert!(tree.verify().is_ok(), "invariants broken: {:?}", tree.verify());
            prop_assert_eq!(tree.len(), model.len());
        }

        let all: Vec<(u16, u32)> = tree.iter().map(|(k, v)| (*k, *v)).collect();
        let want: Vec<(u16, u32)> = model.into_iter().collect();
        prop_assert_eq!(all, want);
    }

    #[test]
    fn prop_node_fanout_bounded(order in 3usize..9, keys in prop::collection::btree_set(any::<i32>(), 1..300)) {
        let mut tree = BPlusTree::new(order).unwrap();
        for &key in &keys {
            tree.insert(key, key).unwrap();
        }

        let exported = tree.export_tree().unwrap();
        let mut stack = vec![(&exported, 0usize)];
        let mut leaf_depths = Vec::new();
        while let Some((node, depth)) = stack.pop() {
            prop_assert!(node.keys.len() < order);
            if node.is_leaf {
                leaf_depths.push(depth);
            } else {
                prop_assert_eq!(node.children.len(), node.keys.len() + 1);
                stack.extend(node.children.iter().map(|child| (child, depth + 1)));
            }
        }
        prop_assert!(leaf_depths.iter().all(|&d| d == tree.height() - 1));
    }
}
