// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
    use crate::btree::metadata::Metadata;
    use crate::btree::position::Position;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let meta_path = dir.path().join("tree.meta");
        let mut metadata = Metadata::new(
            PathBuf::from(dir.path()),
            "tree.meta.storage".to_string(),
            4,
        );
        metadata.root = Some(Position::new(0, 128));
        metadata.save(&meta_path).unwrap();

        let loaded = Metadata::load(&meta_path).unwrap();
        assert_eq!(loaded, metadata);
    }

    #[test]
    fn test_absent_root_round_trips_as_none() {
        let dir = TempDir::new().unwrap();
        let meta_path = dir.path().join("tree.meta");
        let metadata = Metadata::new(PathBuf::from(dir.path()), "tree.meta.storage".to_string(), 3);
        metadata.save(&meta_path).unwrap();

        let loaded = Metadata::load(&meta_path).unwrap();
        assert_eq!(loaded.root, None);
    }

    #[test]
    fn test_idempotent_flush_produces_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let meta_path = dir.path().join("tree.meta");
        let mut metadata = Metadata::new(PathBuf::from(dir.path()), "tree.meta.storage".to_string(), 5);
        metadata.root = Some(Position::new(0, 64));
        metadata.save(&meta_path).unwrap();
        let first_bytes = std::fs::read(&meta_path).unwrap();
        metadata.save(&meta_path).unwrap();
        let second_bytes = std::fs::read(&meta_path).unwrap();
        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn test_storage_path_joins_dir_and_name() {
        let metadata = Metadata::new(PathBuf::from("/tmp/idx"), "data.storage".to_string(), 4);
        assert_eq!(metadata.storage_path(), PathBuf::from("/tmp/idx/data.storage"));
    }
}
