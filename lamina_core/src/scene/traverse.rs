// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId};
use super::store::Scene;
use crate::error::Error;

/// An iterator over the direct children of a node, in insertion order.
///
/// Created by [`Scene::children`].
#[derive(Debug)]
pub struct Children<'a> {
    scene: &'a Scene,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(scene: &'a Scene, first: u32) -> Self {
        Self {
            scene,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.scene.next_sibling[idx as usize];
        Some(self.scene.id_of(idx))
    }
}

impl Scene {
    /// Returns the draw order of the subtree rooted at `root`.
    ///
    /// The order is depth-first pre-order: a parent precedes its children and
    /// siblings follow insertion order, so later entries paint over earlier
    /// ones. With `skip_hidden`, invisible nodes and their subtrees are left
    /// out.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] if `root` has been destroyed.
    pub fn draw_order(&self, root: NodeId, skip_hidden: bool) -> Result<Vec<NodeId>, Error> {
        let r = self.check(root)?;
        let mut order = Vec::new();
        let mut stack = Vec::new();
        stack.push(r);
        while let Some(idx) = stack.pop() {
            if skip_hidden && !self.visible[idx as usize] {
                continue;
            }
            order.push(self.id_of(idx));
            // Push children in reverse so the first child is popped first.
            let mut child = self.last_child(idx);
            while child != INVALID {
                stack.push(child);
                child = self.prev_sibling[child as usize];
            }
        }
        Ok(order)
    }

    /// Returns the last child slot of `idx`, or [`INVALID`].
    fn last_child(&self, idx: u32) -> u32 {
        let mut last = self.first_child[idx as usize];
        if last == INVALID {
            return INVALID;
        }
        while self.next_sibling[last as usize] != INVALID {
            last = self.next_sibling[last as usize];
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn draw_order_is_depth_first_preorder() {
        let mut scene = Scene::new();
        let a = scene.create_node();
        let b = scene.create_child(a).unwrap();
        let c = scene.create_child(a).unwrap();
        let d = scene.create_child(b).unwrap();

        // Tree: a -> [b -> [d], c]
        assert_eq!(scene.draw_order(a, true).unwrap(), vec![a, b, d, c]);
        assert_eq!(scene.draw_order(b, true).unwrap(), vec![b, d]);
    }

    #[test]
    fn hidden_subtrees_are_skipped_on_request() {
        let mut scene = Scene::new();
        let a = scene.create_node();
        let b = scene.create_child(a).unwrap();
        let c = scene.create_child(a).unwrap();
        let _d = scene.create_child(b).unwrap();
        scene.set_visible(b, false).unwrap();

        assert_eq!(scene.draw_order(a, true).unwrap(), vec![a, c]);
        assert_eq!(scene.draw_order(a, false).unwrap().len(), 4);
    }

    #[test]
    fn children_follow_insertion_order() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let kids: Vec<_> = (0..4).map(|_| scene.create_child(p).unwrap()).collect();
        assert_eq!(scene.children(p).collect::<Vec<_>>(), kids);
    }
}
