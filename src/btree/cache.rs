// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Bounded node cache (§4.6).
//!
//! Maps storage `Position` to the `NodeRef` that was loaded from (or
//! flushed to) it. On eviction the resident `Node` is dropped from the
//! `NodeRef` (not the `NodeRef` itself, which remains addressable by
//! position) so the next access simply reloads from storage. The teacher
//! crate has no counterpart to this — its B+-tree relies on mmap and the
//! OS page cache instead — so this is grounded in the wider example pack
//! (see DESIGN.md).

use crate::btree::codec::Codec;
use crate::btree::noderef::NodeRef;
use crate::btree::position::Position;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

pub struct NodeCache<T: Ord + Clone + Codec> {
    inner: Mutex<LruCache<Position, Arc<NodeRef<T>>>>,
}

impl<T: Ord + Clone + Codec> NodeCache<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or_else(|| NonZeroUsize::new(1).unwrap());
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Registers `node_ref` as resident at `position`, evicting the
    /// least-recently-used entry (if the cache is full) by clearing its
    /// resident node.
    pub fn touch(&self, position: Position, node_ref: Arc<NodeRef<T>>) {
        let mut cache = self.inner.lock().expect("node cache lock poisoned");
        if let Some((evicted_position, evicted_ref)) = cache.push(position, node_ref) {
            if evicted_position != position {
                evicted_ref.evict();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("node cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;
