// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The insert/split engine and the tree's public surface (§4.3, §6).
//!
//! `Tree::add` descends from the root, inserts into the leaf, and splits
//! bottom-up, cascading promoted keys through the recorded descent path
//! until a split is absorbed or a new root is created. Every node touched
//! along the way is recorded in a save queue and flushed to storage before
//! the new root is published, so readers never observe a root whose
//! subtree is only partially written (§5).

use crate::btree::cache::NodeCache;
use crate::btree::codec::Codec;
use crate::btree::config::{Config, Degree};
use crate::btree::metadata::Metadata;
use crate::btree::node::{Key, Node, ParentLink, Side};
use crate::btree::noderef::NodeRef;
use crate::btree::savequeue::SaveQueue;
use crate::btree::storage::Storage;
use crate::error::{IndexError, IndexResult};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

/// A pending promotion bubbling up from a split: the key to insert into
/// the parent, carrying its own already-wired left/right children.
type Promotion<T> = Option<Key<T>>;

/// An ordered, disk-persistent B-tree index (§1).
pub struct Tree<T: Ord + Clone + Codec> {
    root: RwLock<Arc<NodeRef<T>>>,
    degree: Degree,
    storage: Option<Storage<T>>,
    cache: Option<NodeCache<T>>,
    metadata_path: Option<PathBuf>,
    storage_dir: Option<PathBuf>,
    storage_file_name: Option<String>,
    write_monitor: Mutex<()>,
    metadata_monitor: Mutex<()>,
}

impl<T: Ord + Clone + Codec> Tree<T> {
    /// Opens (or creates) a tree from `config` (§6, §11).
    ///
    /// Degree validation happens first, synchronously (§7: "configuration
    /// errors are synchronous at construction"). If `config.metadata`
    /// names an existing metadata file, its degree overrides the
    /// builder's and its recorded root/storage identity are used to
    /// resume the tree; otherwise a fresh, empty tree is built and the
    /// metadata file is left unwritten until an explicit [`Tree::flush`]
    /// (§9, resolved open question: construction never writes it).
    pub fn open(config: Config) -> IndexResult<Self> {
        let mut degree = config.validate_degree()?;

        let mut root_position = None;
        let mut storage_location = config.storage.clone();

        if let Some(metadata_path) = &config.metadata {
            if metadata_path.exists() {
                let metadata = Metadata::load(metadata_path)?;
                degree = Degree::new(metadata.degree as u16)?;
                root_position = metadata.root;
                if storage_location.is_none() {
                    storage_location = Some((metadata.storage_dir, metadata.storage_file_name));
                }
            } else if storage_location.is_none() {
                storage_location = Some(default_storage_location(metadata_path));
            }
        }

        let storage = match &storage_location {
            Some((dir, file_name)) => {
                std::fs::create_dir_all(dir).map_err(|err| IndexError::Io {
                    operation: "create storage directory".to_string(),
                    reason: err.to_string(),
                })?;
                Some(Storage::open(&dir.join(file_name))?)
            }
            None => None,
        };

        let cache = match (config.cache_size, &storage) {
            (Some(size), Some(_)) => Some(NodeCache::new(size)),
            _ => None,
        };

        let root = match (root_position, &storage) {
            (Some(position), Some(_)) => NodeRef::persistent(position),
            _ => NodeRef::fresh(Node::empty()),
        };

        let (storage_dir, storage_file_name) = match storage_location {
            Some((dir, file_name)) => (Some(dir), Some(file_name)),
            None => (None, None),
        };

        Ok(Self {
            root: RwLock::new(root),
            degree,
            storage,
            cache,
            metadata_path: config.metadata,
            storage_dir,
            storage_file_name,
            write_monitor: Mutex::new(()),
            metadata_monitor: Mutex::new(()),
        })
    }

    fn storage_ref(&self) -> Option<&Storage<T>> {
        self.storage.as_ref()
    }

    /// Materializes `node_ref`, registering it with the configured node
    /// cache if materializing it just triggered a load from storage (§4.6:
    /// "cache insertion happens on load and on flush-completion"). Used by
    /// every read of the tree's structure outside the flush path itself,
    /// which registers nodes with the cache directly after appending them.
    fn materialize(&self, node_ref: &Arc<NodeRef<T>>) -> IndexResult<Arc<RwLock<crate::btree::node::Node<T>>>> {
        NodeRef::materialize_cached(node_ref, self.storage_ref(), self.cache.as_ref())
    }

    /// Inserts one or more values (§6: `add(v₁, …, vₙ)`). Each value is a
    /// separate single-writer operation with its own flush, per §4.5.
    pub fn add(&self, values: impl IntoIterator<Item = T>) -> IndexResult<&Self> {
        for value in values {
            self.add_one(value)?;
        }
        Ok(self)
    }

    fn add_one(&self, value: T) -> IndexResult<()> {
        let _write_guard = self.write_monitor.lock().expect("write monitor poisoned");
        let mut queue: SaveQueue<T> = SaveQueue::new();

        let root = self.root.read().expect("root lock poisoned").clone();
        // Each frame records the ancestor node, plus the key index/side it
        // used to descend, so that if the child it led to ends up replaced
        // by a fresh split sibling, we know exactly which link to repoint.
        let mut path: Vec<(Arc<NodeRef<T>>, usize, Side)> = Vec::new();
        let mut current = root.clone();
        loop {
            let node_arc = self.materialize(&current)?;
            let node = node_arc.read().expect("node lock poisoned");
            if node.is_leaf() {
                break;
            }
            let (index, side, child) = node.descend_link(&value).ok_or_else(|| IndexError::ConcurrencyViolation {
                reason: "interior node missing child for its descent key".to_string(),
            })?;
            let next = child.clone();
            path.push((current.clone(), index, side));
            drop(node);
            current = next;
        }

        let mut promotion = self.insert_and_maybe_split(&current, Key::new(value), &mut queue)?;
        let mut new_root = root;

        while let Some(promoted_key) = promotion {
            match path.pop() {
                Some((parent_ref, key_index, side)) => {
                    let new_child = promoted_key
                        .left()
                        .cloned()
                        .expect("a promoted key always has its left child wired");
                    self.patch_child_link(&parent_ref, key_index, side, new_child)?;
                    promotion = self.insert_and_maybe_split(&parent_ref, promoted_key, &mut queue)?;
                }
                None => {
                    let mut root_node = Node::empty();
                    root_node.insert_sorted(promoted_key);
                    let new_root_ref = NodeRef::fresh(root_node);
                    queue.push(new_root_ref.clone());
                    new_root = new_root_ref;
                    promotion = None;
                }
            }
        }

        self.refresh_parent_links(&queue)?;
        self.flush_queue(&mut queue)?;
        *self.root.write().expect("root lock poisoned") = new_root;
        Ok(())
    }

    /// Rewires `node_ref`'s key at `key_index`/`side` to point at
    /// `new_child`. Used when the node that link used to address has just
    /// been replaced by a fresh split sibling (§4.3): the split node is
    /// never mutated or reused in place, so whichever ancestor link pointed
    /// at it must be repointed to the new left sibling before the promoted
    /// key is inserted above it.
    fn patch_child_link(
        &self,
        node_ref: &Arc<NodeRef<T>>,
        key_index: usize,
        side: Side,
        new_child: Arc<NodeRef<T>>,
    ) -> IndexResult<()> {
        let node_arc = self.materialize(node_ref)?;
        let mut node = node_arc.write().expect("node lock poisoned");
        let key = &mut node.keys_mut()[key_index];
        match side {
            Side::Left => key.set_left(Some(new_child)),
            Side::Right => key.set_right(Some(new_child)),
        }
        Ok(())
    }

    /// Inserts `key` into the node at `node_ref`, splitting it if its key
    /// count now reaches the configured degree (§4.3 steps 2-3). On split,
    /// `node_ref`'s own resident node is never shrunk or reused: the left
    /// and right halves are built as two brand-new siblings, so any reader
    /// already holding an index into `node_ref`'s pre-split key list keeps
    /// seeing a vector at least as long as the one it observed. Returns the
    /// promoted key, with its children already wired to the fresh left and
    /// right siblings, if a split occurred.
    fn insert_and_maybe_split(
        &self,
        node_ref: &Arc<NodeRef<T>>,
        key: Key<T>,
        queue: &mut SaveQueue<T>,
    ) -> IndexResult<Promotion<T>> {
        let node_arc = self.materialize(node_ref)?;
        let split = {
            let mut node = node_arc.write().expect("node lock poisoned");
            node.insert_sorted(key);
            if node.len() < self.degree.split_threshold() {
                None
            } else {
                Some(node.split_halves(self.degree.median_index()))
            }
        };

        let (promoted, left_keys, right_keys) = match split {
            None => {
                queue.push(node_ref.clone());
                return Ok(None);
            }
            Some(split) => split,
        };

        let left_ref = NodeRef::fresh(Node::with_keys(left_keys));
        queue.push(left_ref.clone());
        let right_ref = NodeRef::fresh(Node::with_keys(right_keys));
        queue.push(right_ref.clone());

        let mut promoted_key = Key::new(promoted.value().clone());
        promoted_key.set_left(Some(left_ref));
        promoted_key.set_right(Some(right_ref));
        if promoted.is_deleted() {
            promoted_key.mark_deleted();
        }
        Ok(Some(promoted_key))
    }

    /// Refreshes `parentKeySide` (§3, §9) on every direct child of every
    /// node touched by this insertion, since cascading splits can change
    /// which node owns which child. Not consulted by `find`/iteration
    /// (which carry their own path state); kept current so the structural
    /// invariant holds for anything that inspects it later (debugging,
    /// `Node::is_root`).
    fn refresh_parent_links(&self, queue: &SaveQueue<T>) -> IndexResult<()> {
        for node_ref in queue.entries() {
            let node_arc = self.materialize(node_ref)?;
            let node = node_arc.read().expect("node lock poisoned");
            for (index, key) in node.keys().iter().enumerate() {
                if let Some(left) = key.left() {
                    self.set_child_parent_link(left, node_ref, Side::Left, index)?;
                }
                if let Some(right) = key.right() {
                    self.set_child_parent_link(right, node_ref, Side::Right, index)?;
                }
            }
        }
        Ok(())
    }

    fn set_child_parent_link(
        &self,
        child: &Arc<NodeRef<T>>,
        parent: &Arc<NodeRef<T>>,
        side: Side,
        key_index: usize,
    ) -> IndexResult<()> {
        let child_node = self.materialize(child)?;
        child_node
            .read()
            .expect("node lock poisoned")
            .set_parent_link(Some(ParentLink {
                parent: Arc::downgrade(parent),
                side,
                key_index,
            }));
        Ok(())
    }

    /// Flushes every queued NodeRef to storage (§4.5). A tree opened
    /// without persistence has no storage to flush to; the queue is
    /// simply drained, since its nodes remain fresh and resident forever.
    fn flush_queue(&self, queue: &mut SaveQueue<T>) -> IndexResult<()> {
        let storage = match &self.storage {
            Some(storage) => storage,
            None => {
                queue.drain();
                return Ok(());
            }
        };
        for node_ref in queue.drain() {
            let node_arc = node_ref.materialize(Some(storage))?;
            let position = {
                let node = node_arc.read().expect("node lock poisoned");
                storage.append(&node)?
            };
            node_ref.set_position(position);
            if let Some(cache) = &self.cache {
                cache.touch(position, node_ref.clone());
            }
        }
        Ok(())
    }

    /// Looks up a value equal to `v` (§4.1 `find`). Descends without
    /// taking the write monitor; readers never block on writers (§5).
    pub fn find(&self, v: &T) -> IndexResult<Option<T>> {
        let mut current = self.root.read().expect("root lock poisoned").clone();
        loop {
            let node_arc = self.materialize(&current)?;
            let node = node_arc.read().expect("node lock poisoned");
            if let Some(index) = node.find_live(v) {
                return Ok(Some(node.keys()[index].value().clone()));
            }
            match node.descend_child(v) {
                Some(child) => {
                    let child = child.clone();
                    drop(node);
                    current = child;
                }
                None => return Ok(None),
            }
        }
    }

    /// Marks every key equal to any of `values` as deleted (tombstone
    /// only, §4.1 `delete`; no rebalancing, per the non-goal in §1).
    /// Returns the number of keys marked.
    pub fn delete(&self, values: impl IntoIterator<Item = T>) -> IndexResult<usize> {
        let mut marked = 0;
        for value in values {
            marked += self.delete_one(&value)?;
        }
        Ok(marked)
    }

    fn delete_one(&self, v: &T) -> IndexResult<usize> {
        let mut current = self.root.read().expect("root lock poisoned").clone();
        let mut marked = 0;
        loop {
            let node_arc = self.materialize(&current)?;
            let node = node_arc.read().expect("node lock poisoned");
            for key in node.keys() {
                if key.value() == v && !key.is_deleted() {
                    key.mark_deleted();
                    marked += 1;
                }
            }
            match node.descend_child(v) {
                Some(child) => {
                    let child = child.clone();
                    drop(node);
                    current = child;
                }
                None => break,
            }
        }
        Ok(marked)
    }

    /// An in-order, lazy iterator over live values (§4.4).
    pub fn iter(&self) -> IndexResult<crate::btree::iter::TreeIter<'_, T>> {
        let root = self.root.read().expect("root lock poisoned").clone();
        crate::btree::iter::TreeIter::new(root, self.storage_ref(), self.cache.as_ref())
    }

    /// Declared on the public surface but not implemented (§1, §7, §9
    /// resolved open question): range queries fail loudly rather than
    /// silently, at both compile time (through the `Result` return type)
    /// and run time.
    pub fn range(&self, _low: &T, _high: &T) -> IndexResult<Vec<T>> {
        Err(IndexError::NotImplemented {
            operation: "range".to_string(),
        })
    }

    /// Rewrites the metadata file so a subsequent [`Tree::open`] of the
    /// same path resumes from the current root (§6). A no-op if
    /// persistence was not configured. Rewritten under its own monitor,
    /// independent of `write_monitor` (§5).
    pub fn flush(&self) -> IndexResult<()> {
        let (Some(metadata_path), Some(storage_dir), Some(storage_file_name)) =
            (&self.metadata_path, &self.storage_dir, &self.storage_file_name)
        else {
            return Ok(());
        };
        let _metadata_guard = self.metadata_monitor.lock().expect("metadata monitor poisoned");
        let root_position = self.root.read().expect("root lock poisoned").position();
        let mut metadata = Metadata::new(
            storage_dir.clone(),
            storage_file_name.clone(),
            self.degree.value() as u32,
        );
        metadata.root = root_position;
        metadata.save(metadata_path)
    }

    pub fn degree(&self) -> u16 {
        self.degree.value()
    }
}

fn default_storage_location(metadata_path: &std::path::Path) -> (PathBuf, String) {
    let dir = metadata_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = format!(
        "{}.storage",
        metadata_path.file_name().and_then(|n| n.to_str()).unwrap_or("index")
    );
    (dir, file_name)
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
