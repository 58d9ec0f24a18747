// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The in-order, restart-safe iterator (§4.4).
//!
//! State is a current `(NodeRef, key index)` handle plus a small ascent
//! stack of the same shape. Descending into a key's right child is always
//! equivalent to descending into the *next* key's left child (they are
//! the same shared subtree, since splits wire a promoted key's left side
//! to the very NodeRef an earlier sibling key's right side already
//! addresses) — so before diving into a key's right subtree the iterator
//! pushes a resume frame for that key's own `next` key, if any, and relies
//! on frames already on the stack when there is none. No raw pointers are
//! held across steps, so eviction and reload between calls is transparent.

use crate::btree::cache::NodeCache;
use crate::btree::codec::Codec;
use crate::btree::noderef::NodeRef;
use crate::btree::storage::Storage;
use crate::error::IndexResult;
use std::sync::Arc;

type Frame<T> = (Arc<NodeRef<T>>, usize);

pub struct TreeIter<'a, T: Ord + Clone + Codec> {
    storage: Option<&'a Storage<T>>,
    cache: Option<&'a NodeCache<T>>,
    current: Option<Frame<T>>,
    stack: Vec<Frame<T>>,
}

impl<'a, T: Ord + Clone + Codec> TreeIter<'a, T> {
    pub(crate) fn new(
        root: Arc<NodeRef<T>>,
        storage: Option<&'a Storage<T>>,
        cache: Option<&'a NodeCache<T>>,
    ) -> IndexResult<Self> {
        let mut iter = Self {
            storage,
            cache,
            current: None,
            stack: Vec::new(),
        };
        iter.current = iter.descend_leftmost(root)?;
        Ok(iter)
    }

    fn materialize(&self, node_ref: &Arc<NodeRef<T>>) -> IndexResult<Arc<std::sync::RwLock<crate::btree::node::Node<T>>>> {
        NodeRef::materialize_cached(node_ref, self.storage, self.cache)
    }

    /// Follows left children from `start` down to the bottom, pushing a
    /// resume frame for every key passed through (§4.4: "pushing an
    /// ascent frame for every interior key descended past on the way
    /// down"). Returns the bottom-left key, or `None` if `start` is an
    /// empty node (only possible for the root of an empty tree).
    fn descend_leftmost(&mut self, start: Arc<NodeRef<T>>) -> IndexResult<Option<Frame<T>>> {
        let mut node_ref = start;
        loop {
            let node_arc = self.materialize(&node_ref)?;
            let node = node_arc.read().expect("node lock poisoned");
            let index = match node.first() {
                Some(index) => index,
                None => return Ok(None),
            };
            let left = node.keys()[index].left().cloned();
            match left {
                Some(left_child) => {
                    self.stack.push((node_ref.clone(), index));
                    drop(node);
                    node_ref = left_child;
                }
                None => return Ok(Some((node_ref.clone(), index))),
            }
        }
    }

    /// Computes the frame to resume at after yielding the key at
    /// `(node_ref, index)`, given what that key looked like when it was
    /// read (§4.4 `next()` steps 1-3).
    fn advance_from(
        &mut self,
        node_ref: Arc<NodeRef<T>>,
        has_children: bool,
        next_index: Option<usize>,
        right_child: Option<Arc<NodeRef<T>>>,
    ) -> IndexResult<Option<Frame<T>>> {
        if has_children {
            if let Some(next_index) = next_index {
                self.stack.push((node_ref, next_index));
            }
            let right_child = right_child.expect("a key with children always has a right child");
            return self.descend_leftmost(right_child);
        }
        if let Some(next_index) = next_index {
            return Ok(Some((node_ref, next_index)));
        }
        Ok(self.stack.pop())
    }
}

impl<'a, T: Ord + Clone + Codec> Iterator for TreeIter<'a, T> {
    type Item = IndexResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node_ref, index) = self.current.clone()?;
            let node_arc = match self.materialize(&node_ref) {
                Ok(node_arc) => node_arc,
                Err(err) => {
                    self.current = None;
                    return Some(Err(err));
                }
            };
            let (value, deleted, has_children, next_index, right_child) = {
                let node = node_arc.read().expect("node lock poisoned");
                let key = &node.keys()[index];
                (
                    key.value().clone(),
                    key.is_deleted(),
                    key.has_children(),
                    key.next(),
                    key.right().cloned(),
                )
            };

            match self.advance_from(node_ref, has_children, next_index, right_child) {
                Ok(next_frame) => self.current = next_frame,
                Err(err) => {
                    self.current = None;
                    return Some(Err(err));
                }
            }

            if !deleted {
                return Some(Ok(value));
            }
        }
    }
}

#[cfg(test)]
#[path = "iter_test.rs"]
mod iter_test;
