// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! In-memory shape of a node: its ordered keys, their child links and
//! successor links.

use crate::btree::noderef::NodeRef;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Which side of a key a child hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A back-reference from a node to the key (in its parent) whose side
/// points down to it. Absent only for the root; rebuilt on load rather
/// than stored on disk (§9: "on disk, only the child direction is
/// stored").
pub struct ParentLink<T: Ord + Clone> {
    pub parent: Weak<NodeRef<T>>,
    pub side: Side,
    pub key_index: usize,
}

/// One entry in a node's key list.
///
/// `next` mirrors the successor-link invariant of §3 (`kᵢ.next = kᵢ₊₁`);
/// it is redundant with the key's position in the owning node's `keys`
/// vector but is kept as an explicit field to match the data model, and to
/// let the iterator follow it without knowing node internals.
pub struct Key<T: Ord + Clone> {
    value: T,
    left: Option<Arc<NodeRef<T>>>,
    right: Option<Arc<NodeRef<T>>>,
    next: Option<usize>,
    deleted: AtomicBool,
}

impl<T: Ord + Clone> Key<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
            next: None,
            deleted: AtomicBool::new(false),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn left(&self) -> Option<&Arc<NodeRef<T>>> {
        self.left.as_ref()
    }

    pub fn right(&self) -> Option<&Arc<NodeRef<T>>> {
        self.right.as_ref()
    }

    pub fn set_left(&mut self, node_ref: Option<Arc<NodeRef<T>>>) {
        self.left = node_ref;
    }

    pub fn set_right(&mut self, node_ref: Option<Arc<NodeRef<T>>>) {
        self.right = node_ref;
    }

    pub fn next(&self) -> Option<usize> {
        self.next
    }

    pub fn set_next(&mut self, next: Option<usize>) {
        self.next = next;
    }

    pub fn has_children(&self) -> bool {
        self.left.is_some() || self.right.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    pub fn mark_deleted(&self) {
        self.deleted.store(true, Ordering::Release);
    }
}

impl<T: Ord + Clone> Clone for Key<T> {
    /// Clones a key's value and child links, but never its deleted flag's
    /// identity — a clone starts with a fresh, independent tombstone flag
    /// copying the current value. Used only when rebuilding a sibling's key
    /// list during a split, where the keys themselves move wholesale (no
    /// concurrent access to the original until the split completes).
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            left: self.left.clone(),
            right: self.right.clone(),
            next: self.next,
            deleted: AtomicBool::new(self.is_deleted()),
        }
    }
}

/// An in-memory node: an ordered key list plus the head of the successor
/// chain and a back-reference to the node's parent key (if any).
pub struct Node<T: Ord + Clone> {
    keys: Vec<Key<T>>,
    first: Option<usize>,
    parent_link: Mutex<Option<ParentLink<T>>>,
}

impl<T: Ord + Clone> Node<T> {
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            first: None,
            parent_link: Mutex::new(None),
        }
    }

    pub fn with_keys(keys: Vec<Key<T>>) -> Self {
        let mut node = Self {
            keys,
            first: None,
            parent_link: Mutex::new(None),
        };
        node.rebuild_chain();
        node
    }

    pub fn keys(&self) -> &[Key<T>] {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut [Key<T>] {
        &mut self.keys
    }

    pub fn first(&self) -> Option<usize> {
        self.first
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// A node is a leaf iff none of its keys has a child. By the B-tree
    /// invariant, if any key has a child then every key does.
    pub fn is_leaf(&self) -> bool {
        !self.keys.iter().any(Key::has_children)
    }

    pub fn parent_link(&self) -> Option<(Weak<NodeRef<T>>, Side, usize)> {
        let guard = self.parent_link.lock().expect("parent link lock poisoned");
        guard
            .as_ref()
            .map(|link| (link.parent.clone(), link.side, link.key_index))
    }

    pub fn set_parent_link(&self, link: Option<ParentLink<T>>) {
        *self.parent_link.lock().expect("parent link lock poisoned") = link;
    }

    pub fn is_root(&self) -> bool {
        self.parent_link
            .lock()
            .expect("parent link lock poisoned")
            .is_none()
    }

    /// Rebuilds `first` and every key's `next` from the current ordering of
    /// `keys`. Called whenever the key list is rewritten wholesale (on
    /// load, and after truncating/splitting during insert).
    pub fn rebuild_chain(&mut self) {
        let len = self.keys.len();
        self.first = if len > 0 { Some(0) } else { None };
        for (index, key) in self.keys.iter_mut().enumerate() {
            key.set_next(if index + 1 < len { Some(index + 1) } else { None });
        }
    }

    /// Inserts `key` in sorted position (new keys placed after existing
    /// equal-valued keys), rebuilds the successor chain, and returns the
    /// index it was inserted at.
    pub fn insert_sorted(&mut self, key: Key<T>) -> usize {
        let index = self.keys.partition_point(|k| k.value() <= key.value());
        self.keys.insert(index, key);
        self.rebuild_chain();
        index
    }

    /// Returns the index of the first non-deleted key equal to `v`, if any.
    pub fn find_live(&self, v: &T) -> Option<usize> {
        self.keys
            .iter()
            .position(|k| k.value() == v && !k.is_deleted())
    }

    /// The interior descent rule shared by `find` and insert (§4.3 step 1):
    /// locate the first key with `value >= v`; descend into that key's left
    /// child, or — if no key qualifies — the last key's right child.
    pub fn descend_child(&self, v: &T) -> Option<&Arc<NodeRef<T>>> {
        self.descend_link(v).map(|(_, _, child)| child)
    }

    /// Same descent rule as [`Node::descend_child`], but also reports the
    /// key index and side that the descent used. The insert engine needs
    /// this so that, if the child it descends into is later replaced by a
    /// fresh sibling pair (because it split), it knows exactly which link
    /// in *this* node to repoint (§4.3).
    pub fn descend_link(&self, v: &T) -> Option<(usize, Side, &Arc<NodeRef<T>>)> {
        match self.keys.iter().position(|k| k.value() >= v) {
            Some(index) => self.keys[index].left().map(|child| (index, Side::Left, child)),
            None => {
                let index = self.keys.len().checked_sub(1)?;
                self.keys[index].right().map(|child| (index, Side::Right, child))
            }
        }
    }

    /// Returns the first key of the leftmost leaf reachable from this node,
    /// without following child links itself (callers materialize and
    /// recurse; see [`crate::btree::tree::Tree::iter`]).
    pub fn bottom_left_child(&self) -> Option<&Arc<NodeRef<T>>> {
        self.keys.first().and_then(Key::left)
    }

    /// Computes the promoted key and the two sibling key lists a split at
    /// `degree`'s median index would produce, without mutating `self`
    /// (§4.3: "the keys strictly left of the median form a new left
    /// sibling node"). `self`'s own key vector is never resized: a reader
    /// concurrently holding an index into this exact node (a `NodeRef` it
    /// materialized before the split started) must keep seeing a vector at
    /// least as long as the one it observed, never a shorter one, or that
    /// index could run past the new end and panic. The caller builds two
    /// brand-new `NodeRef`s from the returned key lists and abandons this
    /// node's identity; any ancestor link that used to point here is
    /// re-pointed to the new left sibling by the caller.
    ///
    /// Caller is responsible for wiring the promoted key's children and
    /// for refreshing parent links afterward (§4.3 steps 3 and 5).
    pub fn split_halves(&self, median_index: usize) -> (Key<T>, Vec<Key<T>>, Vec<Key<T>>) {
        let left_keys = self.keys[..median_index].to_vec();
        let promoted = self.keys[median_index].clone();
        let right_keys = self.keys[median_index + 1..].to_vec();
        (promoted, left_keys, right_keys)
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
