// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The B-tree index engine: an ordered, disk-persistent key index built
//! from append-only, position-addressed nodes (see the crate-level docs
//! for the full data model).

pub mod cache;
pub mod codec;
pub mod config;
pub mod iter;
pub mod metadata;
pub mod node;
pub mod noderef;
pub mod position;
pub mod savequeue;
pub mod storage;
pub mod tree;

pub use codec::Codec;
pub use config::{Config, Degree};
pub use iter::TreeIter;
pub use position::Position;
pub use tree::Tree;
