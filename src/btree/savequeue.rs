// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The per-insert save queue (§4.5): an ordered list of dirty NodeRefs
//! awaiting flush, populated bottom-up so that by the time an ancestor is
//! flushed every child position it must encode already exists.

use crate::btree::codec::Codec;
use crate::btree::noderef::NodeRef;
use std::sync::Arc;

pub struct SaveQueue<T: Ord + Clone + Codec> {
    entries: Vec<Arc<NodeRef<T>>>,
}

impl<T: Ord + Clone + Codec> SaveQueue<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, node_ref: Arc<NodeRef<T>>) {
        self.entries.push(node_ref);
    }

    pub fn drain(&mut self) -> Vec<Arc<NodeRef<T>>> {
        std::mem::take(&mut self.entries)
    }

    /// Borrows the queued entries without draining them. Used to refresh
    /// touched nodes' parent links before the queue is flushed and
    /// cleared.
    pub fn entries(&self) -> &[Arc<NodeRef<T>>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Ord + Clone + Codec> Default for SaveQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "savequeue_test.rs"]
mod savequeue_test;
