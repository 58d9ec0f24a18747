// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The metadata file: storage identity, root position, and degree (§6).
//!
//! Rewritten atomically on explicit [`crate::btree::tree::Tree::flush`]
//! calls only — never after every insert — so that write amplification on
//! the (much larger, append-only) node-storage file does not also apply to
//! this small file.

use crate::btree::position::Position;
use crate::btree::storage::{write_string, Cursor};
use crate::error::{IndexError, IndexResult};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The decoded contents of a metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub storage_dir: PathBuf,
    pub storage_file_name: String,
    pub root: Option<Position>,
    pub degree: u32,
}

impl Metadata {
    pub fn new(storage_dir: PathBuf, storage_file_name: String, degree: u32) -> Self {
        Self {
            storage_dir,
            storage_file_name,
            root: None,
            degree,
        }
    }

    /// Reads and decodes a metadata file.
    pub fn load(path: &Path) -> IndexResult<Self> {
        let file = File::open(path).map_err(|err| io_err("open metadata file", err))?;
        let mut cursor = Cursor::new(&file, 0);
        let storage_dir = PathBuf::from(cursor.read_string()?);
        let storage_file_name = cursor.read_string()?;
        let root_file_number = cursor.read_u64()?;
        let root_offset = cursor.read_u64()?;
        let degree = cursor.read_u32()?;
        let root_position = Position::new(root_file_number, root_offset);
        let root = if root_position.is_absent() {
            None
        } else {
            Some(root_position)
        };
        Ok(Self {
            storage_dir,
            storage_file_name,
            root,
            degree,
        })
    }

    /// Serializes and rewrites `path` atomically: the new content is
    /// written to a sibling temporary file, then renamed into place, so a
    /// reader never observes a partially written metadata file.
    pub fn save(&self, path: &Path) -> IndexResult<()> {
        let mut buffer = Vec::new();
        write_string(&mut buffer, &self.storage_dir.to_string_lossy());
        write_string(&mut buffer, &self.storage_file_name);
        let root = self.root.unwrap_or(Position::ABSENT);
        buffer.extend_from_slice(&root.file_number.to_be_bytes());
        buffer.extend_from_slice(&root.offset.to_be_bytes());
        buffer.extend_from_slice(&self.degree.to_be_bytes());

        let tmp_path = path.with_extension("tmp");
        let mut tmp = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|err| io_err("open metadata temp file", err))?;
        tmp.write_all(&buffer)
            .map_err(|err| io_err("write metadata temp file", err))?;
        tmp.sync_all().map_err(|err| io_err("sync metadata temp file", err))?;
        std::fs::rename(&tmp_path, path).map_err(|err| io_err("rename metadata file", err))?;
        Ok(())
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage_dir.join(&self.storage_file_name)
    }
}

fn io_err(operation: &str, err: std::io::Error) -> IndexError {
    IndexError::Io {
        operation: operation.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod metadata_test;
