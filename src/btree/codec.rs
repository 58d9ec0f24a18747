// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Value encoding for keys stored in the tree.
//!
//! The storage format (§12) length-prefixes every key's encoded bytes, so
//! the tree itself is agnostic to how a value is serialized. A blanket
//! implementation backed by `bincode` covers any `Serialize + Deserialize`
//! type; callers with unusual types may implement `Codec` directly.

use crate::error::{IndexError, IndexResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes and decodes a value to/from the bytes stored on disk.
pub trait Codec: Sized {
    fn encode(&self) -> Vec<u8>;
    fn decode(bytes: &[u8]) -> IndexResult<Self>;
}

impl<T> Codec for T
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self) -> Vec<u8> {
        // A `Serialize` value over an in-memory buffer cannot fail in
        // practice; bincode only returns an error for unsized/IO-backed
        // writers, neither of which applies here.
        bincode::serialize(self).expect("bincode serialization of an in-memory value failed")
    }

    fn decode(bytes: &[u8]) -> IndexResult<Self> {
        bincode::deserialize(bytes).map_err(|err| IndexError::Corrupt {
            position: "value".to_string(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;
