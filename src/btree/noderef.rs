// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Lazy, position-addressed handles to nodes (§4.2).
//!
//! A `NodeRef` is the only reference type the tree uses between nodes.
//! It either already has a resident, in-memory `Node` (fresh, not yet
//! flushed) or knows only a storage `Position` and loads its `Node` lazily
//! on first access.

use crate::btree::cache::NodeCache;
use crate::btree::codec::Codec;
use crate::btree::node::Node;
use crate::btree::position::Position;
use crate::btree::storage::Storage;
use crate::error::IndexResult;
use std::sync::{Arc, Mutex, RwLock};

pub struct NodeRef<T: Ord + Clone + Codec> {
    position: Mutex<Option<Position>>,
    resident: RwLock<Option<Arc<RwLock<Node<T>>>>>,
}

impl<T: Ord + Clone + Codec> NodeRef<T> {
    /// Constructs a fresh NodeRef: no position yet, resident node attached
    /// immediately. Used for newly created nodes pending a flush.
    pub fn fresh(node: Node<T>) -> Arc<Self> {
        Arc::new(Self {
            position: Mutex::new(None),
            resident: RwLock::new(Some(Arc::new(RwLock::new(node)))),
        })
    }

    /// Constructs a persistent NodeRef: a position is known, but the node
    /// itself is not resident until [`NodeRef::materialize`] is called.
    pub fn persistent(position: Position) -> Arc<Self> {
        Arc::new(Self {
            position: Mutex::new(Some(position)),
            resident: RwLock::new(None),
        })
    }

    /// Ensures the resident node is loaded, loading it from `storage` if
    /// necessary, and returns a cheap handle to it. Idempotent: once
    /// resident, subsequent calls only take a read lock on the resident
    /// slot.
    ///
    /// `storage` is `None` for a tree opened without persistence; in that
    /// case every NodeRef is expected to already be resident (fresh nodes
    /// are never evicted when there is nowhere to reload them from), and
    /// hitting the load path is an internal invariant violation rather
    /// than an I/O error.
    pub fn materialize(&self, storage: Option<&Storage<T>>) -> IndexResult<Arc<RwLock<Node<T>>>> {
        if let Some(node) = self.resident.read().expect("resident lock poisoned").clone() {
            return Ok(node);
        }
        let position = self
            .position
            .lock()
            .expect("position lock poisoned")
            .expect("persistent NodeRef constructed without a position");
        let storage = storage.ok_or_else(|| crate::error::IndexError::ConcurrencyViolation {
            reason: "attempted to load a non-resident node from a tree with no storage".to_string(),
        })?;
        let node = storage.load(position)?;
        let arc = Arc::new(RwLock::new(node));
        *self.resident.write().expect("resident lock poisoned") = Some(arc.clone());
        Ok(arc)
    }

    /// Like [`NodeRef::materialize`], but also registers a freshly loaded
    /// node with `cache` (§4.6: "cache insertion happens on load and on
    /// flush-completion"). Takes the owning `Arc<Self>` rather than `&self`
    /// because the cache needs a clonable handle to this exact NodeRef to
    /// evict later. A no-op on the cache when the node was already
    /// resident (nothing was loaded) or when `cache` is absent.
    pub fn materialize_cached(
        self_arc: &Arc<Self>,
        storage: Option<&Storage<T>>,
        cache: Option<&NodeCache<T>>,
    ) -> IndexResult<Arc<RwLock<Node<T>>>> {
        let was_resident = self_arc.is_resident();
        let node = self_arc.materialize(storage)?;
        if !was_resident {
            if let (Some(position), Some(cache)) = (self_arc.position(), cache) {
                cache.touch(position, self_arc.clone());
            }
        }
        Ok(node)
    }

    pub fn position(&self) -> Option<Position> {
        *self.position.lock().expect("position lock poisoned")
    }

    /// Assigns (or reassigns) this NodeRef's position. Called exactly once
    /// per flush for every NodeRef in the save queue (§4.5): append-only
    /// storage means an updated node always gets a new position.
    pub fn set_position(&self, position: Position) {
        *self.position.lock().expect("position lock poisoned") = Some(position);
    }

    /// Drops the resident node, forcing the next `materialize` call to
    /// reload from storage. Used by the node cache on LRU eviction (§4.6);
    /// never called on a NodeRef with no position (that would strand a
    /// fresh, un-flushed node).
    pub fn evict(&self) {
        *self.resident.write().expect("resident lock poisoned") = None;
    }

    pub fn is_resident(&self) -> bool {
        self.resident.read().expect("resident lock poisoned").is_some()
    }
}

#[cfg(test)]
#[path = "noderef_test.rs"]
mod noderef_test;
