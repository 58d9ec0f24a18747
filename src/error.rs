// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the B-tree index.
//!
//! Provides structured error handling with detailed context for debugging.

use std::fmt;

/// Standard Result type for all index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Error types for B-tree index operations.
#[derive(Debug, Clone)]
pub enum IndexError {
    /// Degree was below the minimum of 2, or otherwise invalid.
    InvalidDegree { degree: u16 },

    /// I/O error during file operations.
    Io { operation: String, reason: String },

    /// Bytes read back from storage did not decode into a valid node.
    Corrupt { position: String, reason: String },

    /// Operation declared on the public surface but not implemented.
    NotImplemented { operation: String },

    /// An internal invariant was violated (poisoned lock, out-of-order
    /// iterator output). Not user-facing in correct code.
    ConcurrencyViolation { reason: String },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDegree { degree } => {
                write!(f, "invalid degree {}: degree must be >= 2", degree)
            }
            Self::Io { operation, reason } => {
                write!(f, "I/O error during '{}': {}", operation, reason)
            }
            Self::Corrupt { position, reason } => {
                write!(f, "corrupt node at {}: {}", position, reason)
            }
            Self::NotImplemented { operation } => {
                write!(f, "'{}' is not implemented", operation)
            }
            Self::ConcurrencyViolation { reason } => {
                write!(f, "concurrency violation: {}", reason)
            }
        }
    }
}

impl std::error::Error for IndexError {}

impl From<std::io::Error> for IndexError {
    fn from(err: std::io::Error) -> Self {
        IndexError::Io {
            operation: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
