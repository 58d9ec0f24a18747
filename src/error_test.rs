// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
    use crate::error::IndexError;

    #[test]
    fn test_invalid_degree_message() {
        let err = IndexError::InvalidDegree { degree: 1 };
        assert_eq!(err.to_string(), "invalid degree 1: degree must be >= 2");
    }

    #[test]
    fn test_io_error_from_std() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: IndexError = io.into();
        match err {
            IndexError::Io { operation, reason } => {
                assert_eq!(operation, "unknown");
                assert!(reason.contains("missing"));
            }
            other => panic!("expected Io variant, got {other:?}"),
        }
    }

    #[test]
    fn test_not_implemented_message() {
        let err = IndexError::NotImplemented {
            operation: "range".to_string(),
        };
        assert_eq!(err.to_string(), "'range' is not implemented");
    }
}
