// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
    use crate::btree::iter::TreeIter;
    use crate::btree::node::{Key, Node};
    use crate::btree::noderef::NodeRef;
    use crate::error::IndexResult;

    fn leaf(values: &[i32]) -> Node<i32> {
        Node::with_keys(values.iter().map(|v| Key::new(*v)).collect())
    }

    fn collect(root: std::sync::Arc<NodeRef<i32>>) -> IndexResult<Vec<i32>> {
        TreeIter::new(root, None, None)?.collect()
    }

    #[test]
    fn test_empty_tree_yields_nothing() {
        let root = NodeRef::fresh(Node::empty());
        assert_eq!(collect(root).unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn test_single_key_root() {
        let root = NodeRef::fresh(leaf(&[1]));
        assert_eq!(collect(root).unwrap(), vec![1]);
    }

    #[test]
    fn test_two_level_tree_matches_scenario_s3() {
        let left = NodeRef::fresh(leaf(&[1]));
        let right = NodeRef::fresh(leaf(&[3, 4]));
        let mut root_key = Key::new(2);
        root_key.set_left(Some(left));
        root_key.set_right(Some(right));
        let root = NodeRef::fresh(Node::with_keys(vec![root_key]));
        assert_eq!(collect(root).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_three_level_tree_matches_scenario_s5() {
        let leaf10 = NodeRef::fresh(leaf(&[10]));
        let leaf30 = NodeRef::fresh(leaf(&[30]));
        let leaf50 = NodeRef::fresh(leaf(&[50]));
        let leaf70 = NodeRef::fresh(leaf(&[70]));

        let mut key20 = Key::new(20);
        key20.set_left(Some(leaf10));
        key20.set_right(Some(leaf30));
        let node20 = NodeRef::fresh(Node::with_keys(vec![key20]));

        let mut key60 = Key::new(60);
        key60.set_left(Some(leaf50));
        key60.set_right(Some(leaf70));
        let node60 = NodeRef::fresh(Node::with_keys(vec![key60]));

        let mut key40 = Key::new(40);
        key40.set_left(Some(node20));
        key40.set_right(Some(node60));
        let root = NodeRef::fresh(Node::with_keys(vec![key40]));

        assert_eq!(collect(root).unwrap(), vec![10, 20, 30, 40, 50, 60, 70]);
    }

    /// Two keys in the same node sharing a child between them (the way a
    /// split cascades a second promotion into a parent that already holds
    /// one): `k0.right` and `k1.left` are the very same NodeRef. The
    /// middle subtree must be visited exactly once, between the two keys.
    #[test]
    fn test_adjacent_keys_sharing_a_child_visit_it_once() {
        let leaf10 = NodeRef::fresh(leaf(&[10]));
        let shared = NodeRef::fresh(leaf(&[22, 23]));
        let leaf30 = NodeRef::fresh(leaf(&[30]));

        let mut key20 = Key::new(20);
        key20.set_left(Some(leaf10));
        key20.set_right(Some(shared.clone()));

        let mut key25 = Key::new(25);
        key25.set_left(Some(shared));
        key25.set_right(Some(leaf30));

        let root = NodeRef::fresh(Node::with_keys(vec![key20, key25]));
        assert_eq!(collect(root).unwrap(), vec![10, 20, 22, 23, 25, 30]);
    }

    #[test]
    fn test_deleted_keys_are_skipped() {
        let root = NodeRef::fresh(leaf(&[1, 2, 3]));
        {
            let node_arc = root.materialize(None).unwrap();
            node_arc.read().unwrap().keys()[1].mark_deleted();
        }
        assert_eq!(collect(root).unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_ascent_stack_unwinds_a_deep_left_leaning_chain() {
        // Ten nested single-key nodes, each holding the previous level's
        // node as its left child: the seeding descent pushes one ascent
        // frame per level, and every frame must unwind correctly.
        let mut node = NodeRef::fresh(leaf(&[0]));
        for level in 1..=10 {
            let mut key = Key::new(level * 10);
            key.set_left(Some(node));
            node = NodeRef::fresh(Node::with_keys(vec![key]));
        }
        let values = collect(node).unwrap();
        assert_eq!(values.len(), 11);
        assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
