// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Append-only node storage (§4.5, §12).
//!
//! Node records are written back to back with no inter-record alignment
//! and no checksums (non-goals: no journal, no crash-consistent
//! durability). Writes are appended under the caller's write lock; reads
//! use positioned reads and take no lock of their own, matching §5's
//! "Storage file: appended under writeMonitor; read under no lock".

use crate::btree::codec::Codec;
use crate::btree::node::{Key, Node};
use crate::btree::position::Position;
use crate::error::{IndexError, IndexResult};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::os::unix::fs::FileExt;
use std::path::Path;
use std::sync::Mutex;

/// Append-only storage for serialized nodes, backed by a single file.
pub struct Storage<T: Ord + Clone + Codec> {
    write_handle: Mutex<File>,
    read_handle: File,
    next_offset: Mutex<u64>,
    _marker: PhantomData<T>,
}

impl<T: Ord + Clone + Codec> Storage<T> {
    /// Opens `path` for append, creating it if absent.
    pub fn open(path: &Path) -> IndexResult<Self> {
        let write_handle = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)
            .map_err(|err| io_err("open storage file", err))?;
        let read_handle = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|err| io_err("open storage file for reading", err))?;
        let len = write_handle
            .metadata()
            .map_err(|err| io_err("stat storage file", err))?
            .len();
        Ok(Self {
            write_handle: Mutex::new(write_handle),
            read_handle,
            next_offset: Mutex::new(len),
            _marker: PhantomData,
        })
    }

    /// Serializes `node` and appends it, returning the position its bytes
    /// now occupy.
    pub fn append(&self, node: &Node<T>) -> IndexResult<Position> {
        let bytes = serialize_node(node);
        let mut offset_guard = self.next_offset.lock().expect("offset lock poisoned");
        let offset = *offset_guard;
        let mut file = self.write_handle.lock().expect("write lock poisoned");
        file.write_all(&bytes).map_err(|err| io_err("append node", err))?;
        file.flush().map_err(|err| io_err("flush node append", err))?;
        *offset_guard += bytes.len() as u64;
        Ok(Position::new(0, offset))
    }

    /// Reads and decodes the node record at `position`.
    pub fn load(&self, position: Position) -> IndexResult<Node<T>> {
        let mut cursor = Cursor::new(&self.read_handle, position.offset);
        let key_count = cursor.read_u32()? as usize;
        let mut keys = Vec::with_capacity(key_count);
        for _ in 0..key_count {
            let value_len = cursor.read_u32()? as usize;
            let value_bytes = cursor.read_bytes(value_len)?;
            let value = T::decode(&value_bytes)?;
            let left = cursor.read_position()?;
            let right = cursor.read_position()?;
            let deleted = cursor.read_u8()? != 0;

            let mut key = Key::new(value);
            key.set_left(left.map(|pos| crate::btree::noderef::NodeRef::persistent(pos)));
            key.set_right(right.map(|pos| crate::btree::noderef::NodeRef::persistent(pos)));
            if deleted {
                key.mark_deleted();
            }
            keys.push(key);
        }
        Ok(Node::with_keys(keys))
    }
}

fn serialize_node<T: Ord + Clone + Codec>(node: &Node<T>) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&(node.len() as u32).to_be_bytes());
    for key in node.keys() {
        let value_bytes = key.value().encode();
        buffer.extend_from_slice(&(value_bytes.len() as u32).to_be_bytes());
        buffer.extend_from_slice(&value_bytes);
        write_position(&mut buffer, key.left().and_then(|r| r.position()));
        write_position(&mut buffer, key.right().and_then(|r| r.position()));
        buffer.push(key.is_deleted() as u8);
    }
    buffer
}

fn write_position(buffer: &mut Vec<u8>, position: Option<Position>) {
    let position = position.unwrap_or(Position::ABSENT);
    buffer.extend_from_slice(&position.file_number.to_be_bytes());
    buffer.extend_from_slice(&position.offset.to_be_bytes());
}

fn io_err(operation: &str, err: std::io::Error) -> IndexError {
    IndexError::Io {
        operation: operation.to_string(),
        reason: err.to_string(),
    }
}

/// A forward-only reader over positioned bytes. Reads never move a shared
/// file cursor (`read_exact_at` takes an explicit offset), so many readers
/// may use their own `Cursor`s over the same `File` concurrently without a
/// lock. Shared with [`crate::btree::metadata`], which uses the same
/// length-prefixed-string, big-endian-integer encoding (§6).
pub(crate) struct Cursor<'a> {
    pub(crate) file: &'a File,
    pub(crate) offset: u64,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(file: &'a File, offset: u64) -> Self {
        Self { file, offset }
    }

    pub(crate) fn read_u8(&mut self) -> IndexResult<u8> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    pub(crate) fn read_u32(&mut self) -> IndexResult<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().expect("4 bytes read")))
    }

    pub(crate) fn read_u64(&mut self) -> IndexResult<u64> {
        let bytes = self.read_bytes(8)?;
        Ok(u64::from_be_bytes(bytes.try_into().expect("8 bytes read")))
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> IndexResult<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.file
            .read_exact_at(&mut buffer, self.offset)
            .map_err(|err| IndexError::Corrupt {
                position: format!("offset {}", self.offset),
                reason: err.to_string(),
            })?;
        self.offset += len as u64;
        Ok(buffer)
    }

    pub(crate) fn read_position(&mut self) -> IndexResult<Option<Position>> {
        let file_number = self.read_u64()?;
        let offset = self.read_u64()?;
        let position = Position::new(file_number, offset);
        Ok(if position.is_absent() {
            None
        } else {
            Some(position)
        })
    }

    pub(crate) fn read_string(&mut self) -> IndexResult<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|err| IndexError::Corrupt {
            position: format!("offset {}", self.offset),
            reason: err.to_string(),
        })
    }
}

/// Writes a length-prefixed string in the format shared by the metadata
/// file (§6): a 4-byte big-endian length followed by UTF-8 bytes.
pub(crate) fn write_string(buffer: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    buffer.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buffer.extend_from_slice(bytes);
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;
