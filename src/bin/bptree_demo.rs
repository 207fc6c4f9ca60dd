//! Demo driver for the B+ tree index.
//!
//! Usage:
//!   bptree_demo [--order N] [--json] [keys...]
//!
//! Inserts each key with the value `val-<key>`, printing the tree after
//! every insertion, then runs two lookups and a range scan.

use bptree_index::{BPlusTree, DEFAULT_ORDER};
use std::env;
use std::process::exit;

const DEFAULT_KEYS: [i64; 12] = [10, 20, 30, 40, 5, 15, 25, 35, 50, 60, 70, 80];
const SEARCH_KEYS: [i64; 2] = [25, 99];
const RANGE_START: i64 = 20;

struct Options {
    order: usize,
    json: bool,
    keys: Vec<i64>,
}

fn usage() -> ! {
    eprintln!("Usage: bptree_demo [--order N] [--json] [keys...]");
    eprintln!("  --order N   Tree order, at least 3 (default: {})", DEFAULT_ORDER);
    eprintln!("  --json      Also print the final tree as JSON");
    exit(1);
}

fn parse_args() -> Options {
    let mut options = Options {
        order: DEFAULT_ORDER,
        json: false,
        keys: Vec::new(),
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--order" => {
                let Some(value) = args.next() else { usage() };
                options.order = match value.parse() {
                    Ok(n) => n,
                    Err(_) => {
                        eprintln!("ERROR: Invalid order: {}", value);
                        exit(1);
                    }
                };
            }
            "--json" => options.json = true,
            "-h" | "--help" => usage(),
            key => match key.parse() {
                Ok(k) => options.keys.push(k),
                Err(_) => {
                    eprintln!("ERROR: Invalid key: {}", key);
                    exit(1);
                }
            },
        }
    }

    if options.keys.is_empty() {
        options.keys = DEFAULT_KEYS.to_vec();
    }
    options
}

fn main() {
    let options = parse_args();

    let mut tree: BPlusTree<i64, String> = match BPlusTree::new(options.order) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            exit(1);
        }
    };

    for &key in &options.keys {
        println!("--- Inserting {} ---", key);
        if let Err(e) = tree.insert(key, format!("val-{}", key)) {
            eprintln!("ERROR: insert {}: {}", key, e);
            exit(1);
        }
        print!("{}", tree.render());
        println!("{}", "-".repeat(40));
    }

    println!("\n--- Final Tree Structure ---");
    print!("{}", tree.render());
    println!("{}", "=".repeat(40));

    if let Err(e) = tree.verify() {
        eprintln!("ERROR: {}", e);
        exit(1);
    }

    println!("\n--- Searching ---");
    for key in SEARCH_KEYS {
        match tree.get(&key) {
            Some(value) => println!("Found key {} with value: {}", key, value),
            None => println!("Key {} not found.", key),
        }
    }

    println!("\n--- Range Scan (keys >= {}) ---", RANGE_START);
    for (key, value) in tree.range_from(&RANGE_START) {
        println!("Key: {}, Value: {}", key, value);
    }

    if options.json {
        println!("\n--- Tree JSON ---");
        match serde_json::to_string_pretty(&tree.export_tree()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                exit(1);
            }
        }
    }
}
