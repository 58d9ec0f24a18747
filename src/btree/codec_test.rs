// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
    use crate::btree::codec::Codec;

    #[test]
    fn test_round_trip_i64() {
        let value: i64 = -12345;
        let bytes = value.encode();
        let decoded = i64::decode(&bytes).unwrap();
        assert_eq!(value, decoded);
    }

    #[test]
    fn test_round_trip_string() {
        let value = "hello index".to_string();
        let bytes = value.encode();
        let decoded = String::decode(&bytes).unwrap();
        assert_eq!(value, decoded);
    }

    #[test]
    fn test_decode_garbage_is_corrupt_error() {
        let garbage = vec![0xffu8; 3];
        let result = i64::decode(&garbage);
        assert!(result.is_err());
    }
}
