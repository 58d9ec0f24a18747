// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tree configuration: degree validation and the builder used by
//! [`crate::btree::tree::Tree::open`].

use crate::error::{IndexError, IndexResult};
use std::path::PathBuf;

/// Minimum accepted degree. A node splits once it holds `degree` keys, so a
/// degree of 1 could never hold a key without splitting immediately.
pub const MIN_DEGREE: u16 = 2;

/// A validated node degree (maximum key count per node is `degree - 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Degree(u16);

impl Degree {
    /// Validates `degree`, failing with [`IndexError::InvalidDegree`] if it
    /// is below [`MIN_DEGREE`].
    pub fn new(degree: u16) -> IndexResult<Self> {
        if degree < MIN_DEGREE {
            return Err(IndexError::InvalidDegree { degree });
        }
        Ok(Self(degree))
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// A node is full, and must split, once its key count reaches this.
    pub fn split_threshold(&self) -> usize {
        self.0 as usize
    }

    /// Index of the median key promoted during a split. Uses the lower
    /// median uniformly; this is arithmetically identical to the
    /// odd/even-degree split described in §4.3 of the specification.
    pub fn median_index(&self) -> usize {
        (self.0 as usize - 1) / 2
    }
}

/// Configuration for opening or creating a tree. Mirrors the enumerated
/// options of the external interface: `degree`, `metadata`, `cacheSize`,
/// `storage`.
pub struct Config {
    pub(crate) degree: u16,
    pub(crate) metadata: Option<PathBuf>,
    pub(crate) cache_size: Option<usize>,
    pub(crate) storage: Option<(PathBuf, String)>,
}

impl Config {
    /// Starts a configuration with the given in-memory degree. If
    /// `metadata` is later set to a path that already contains a metadata
    /// file, that file's degree overrides this value.
    pub fn new(degree: u16) -> Self {
        Self {
            degree,
            metadata: None,
            cache_size: None,
            storage: None,
        }
    }

    /// Enables persistence: the tree's metadata and storage files live
    /// alongside `path`. If `path` exists, its degree overrides the one
    /// passed to [`Config::new`]. Unless [`Config::storage`] overrides it,
    /// the storage file defaults to `path` plus a `.storage` suffix (§6,
    /// "Default file layout").
    pub fn metadata(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata = Some(path.into());
        self
    }

    /// Enables a bounded node cache holding at most `size` resident nodes.
    pub fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
        self
    }

    /// Injects a pre-constructed storage location (directory + file name),
    /// overriding the default layout derived from `metadata`.
    pub fn storage(mut self, dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        self.storage = Some((dir.into(), file_name.into()));
        self
    }

    /// Validates the degree eagerly, at construction, per §7: configuration
    /// errors are synchronous and never deferred to first use.
    pub(crate) fn validate_degree(&self) -> IndexResult<Degree> {
        Degree::new(self.degree)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
