// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! An ordered, disk-persistent B-tree index for comparable, serializable
//! keys.
//!
//! The index supports insertion, equality lookup, and lazy in-order
//! traversal, and may optionally be persisted across process lifetimes in
//! a pair of files: a small metadata file (root position, degree, storage
//! identity) and a larger, append-only node-storage file. Traversal is
//! restart-safe and may proceed concurrently with insertions; writes are
//! serialized.
//!
//! ## Quick start
//!
//! ```rust
//! use btreeindex::{Config, Tree};
//!
//! let tree: Tree<i64> = Tree::open(Config::new(32)).unwrap();
//! tree.add([5, 1, 9, 3]).unwrap();
//! assert_eq!(tree.find(&9).unwrap(), Some(9));
//! let ordered: Vec<i64> = tree.iter().unwrap().collect::<Result<_, _>>().unwrap();
//! assert_eq!(ordered, vec![1, 3, 5, 9]);
//! ```
//!
//! ## Architecture
//!
//! - **`btree::node`** — in-memory shape of a node: ordered keys, child
//!   links, successor links.
//! - **`btree::noderef`** — lazy, position-addressed handles between
//!   nodes; the indirection that lets a tree outgrow memory.
//! - **`btree::tree`** — the insert/split engine and the public `Tree`
//!   surface.
//! - **`btree::iter`** — the lazy, in-order, restart-safe iterator.
//! - **`btree::savequeue` / `btree::storage`** — batches dirty nodes per
//!   insert and appends them to the node-storage file.
//! - **`btree::cache` / `btree::metadata`** — the bounded LRU node cache
//!   and the small file that pins root position, degree, and storage
//!   identity across process restarts.
//!
//! Persistence, caching, and range queries are all optional: a `Tree`
//! opened with a bare [`Config::new`] lives entirely in memory.

pub mod btree;
pub mod error;

pub use btree::{Codec, Config, Degree, Position, Tree, TreeIter};
pub use error::{IndexError, IndexResult};
