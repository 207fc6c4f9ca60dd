//! Integration tests over the public API using the demo key sequence.

use bptree_index::{BPlusTree, Config, Index, Result};

const KEYS: [i64; 12] = [10, 20, 30, 40, 5, 15, 25, 35, 50, 60, 70, 80];

fn value_for(key: i64) -> String {
    format!("val-{}", key)
}

/// Every key is retrievable right after its insertion and after all later ones.
#[test]
fn test_round_trip_through_every_insert() -> Result<()> {
    let mut tree = BPlusTree::new(4)?;
    for (n, &key) in KEYS.iter().enumerate() {
        tree.insert(key, value_for(key))?;
        tree.verify()?;
        for &earlier in &KEYS[..=n] {
            assert_eq!(tree.get(&earlier), Some(&value_for(earlier)));
        }
    }
    assert_eq!(tree.get(&99), None);
    Ok(())
}

/// Range scan composed by hand from the leaf primitives.
#[test]
fn test_manual_range_scan_from_start_leaf() -> Result<()> {
    let mut tree = BPlusTree::new(4)?;
    for key in KEYS {
        tree.insert(key, value_for(key))?;
    }

    let start = 20;
    let mut scanned = Vec::new();
    let mut leaf = tree.find_leaf(&start);
    let mut from = leaf.map_or(0, |l| l.lower_bound(&start));
    while let Some(current) = leaf {
        for (key, value) in current.entries().skip(from) {
            scanned.push((*key, value.clone()));
        }
        leaf = current.next_leaf();
        from = 0;
    }

    let mut expected: Vec<i64> = KEYS.iter().copied().filter(|&k| k >= start).collect();
    expected.sort_unstable();
    let expected: Vec<(i64, String)> = expected.into_iter().map(|k| (k, value_for(k))).collect();

    assert_eq!(scanned, expected);
    let lazy: Vec<(i64, String)> = tree.range_from(&start).map(|(k, v)| (*k, v.clone())).collect();
    assert_eq!(lazy, expected);
    Ok(())
}

/// Leaf chain ids match the left-to-right leaf order of the export.
#[test]
fn test_leaf_chain_matches_export() -> Result<()> {
    let index = Index::open(Config::new().order(4))?;
    for key in KEYS {
        index.insert(key, value_for(key))?;
    }

    let root = index.export_tree().expect("tree should not be empty");
    let mut leaves = Vec::new();
    let mut stack = vec![&root];
    while let Some(node) = stack.pop() {
        if node.is_leaf {
            leaves.push(node);
        } else {
            stack.extend(node.children.iter().rev());
        }
    }

    for pair in leaves.windows(2) {
        assert_eq!(pair[0].next, Some(pair[1].node_id));
    }
    assert_eq!(leaves.last().and_then(|leaf| leaf.next), None);

    let stats = index.stats();
    assert_eq!(stats.leaf_count, leaves.len());
    assert_eq!(stats.len, KEYS.len());
    Ok(())
}
