// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
    use crate::btree::node::{Key, Node};
    use crate::btree::noderef::NodeRef;
    use crate::btree::position::Position;
    use crate::btree::storage::Storage;
    use tempfile::tempdir;

    #[test]
    fn test_fresh_node_is_resident_without_storage() {
        let node_ref: std::sync::Arc<NodeRef<i32>> = NodeRef::fresh(Node::with_keys(vec![Key::new(1)]));
        assert!(node_ref.is_resident());
        assert!(node_ref.position().is_none());
        let resident = node_ref.materialize(None).unwrap();
        assert_eq!(resident.read().unwrap().len(), 1);
    }

    #[test]
    fn test_persistent_node_loads_from_storage_on_first_access() {
        let dir = tempdir().unwrap();
        let storage: Storage<i32> = Storage::open(&dir.path().join("nodes.storage")).unwrap();
        let position = storage.append(&Node::with_keys(vec![Key::new(7), Key::new(9)])).unwrap();

        let node_ref: std::sync::Arc<NodeRef<i32>> = NodeRef::persistent(position);
        assert!(!node_ref.is_resident());

        let resident = node_ref.materialize(Some(&storage)).unwrap();
        assert_eq!(resident.read().unwrap().len(), 2);
        assert!(node_ref.is_resident());
    }

    #[test]
    fn test_materialize_without_storage_fails_for_persistent_ref() {
        let node_ref: std::sync::Arc<NodeRef<i32>> = NodeRef::persistent(Position::new(0, 0));
        assert!(node_ref.materialize(None).is_err());
    }

    #[test]
    fn test_evict_forces_reload_on_next_materialize() {
        let dir = tempdir().unwrap();
        let storage: Storage<i32> = Storage::open(&dir.path().join("nodes.storage")).unwrap();
        let position = storage.append(&Node::with_keys(vec![Key::new(1)])).unwrap();

        let node_ref: std::sync::Arc<NodeRef<i32>> = NodeRef::persistent(position);
        node_ref.materialize(Some(&storage)).unwrap();
        assert!(node_ref.is_resident());

        node_ref.evict();
        assert!(!node_ref.is_resident());

        let resident = node_ref.materialize(Some(&storage)).unwrap();
        assert_eq!(resident.read().unwrap().len(), 1);
    }

    #[test]
    fn test_set_position_reassigns_on_rewrite() {
        let node_ref: std::sync::Arc<NodeRef<i32>> = NodeRef::fresh(Node::with_keys(vec![Key::new(1)]));
        node_ref.set_position(Position::new(0, 100));
        assert_eq!(node_ref.position(), Some(Position::new(0, 100)));
        node_ref.set_position(Position::new(0, 240));
        assert_eq!(node_ref.position(), Some(Position::new(0, 240)));
    }
}
