// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, NodeId, VisualKey};
use super::traverse::Children;
use crate::dirty;
use crate::error::Error;
use crate::transform::{Transform, TransformChain};

/// Struct-of-arrays storage for a forest of scene nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally each node occupies a
/// slot in parallel arrays; destroyed nodes are recycled via a free list and
/// generation counters reject stale handles.
///
/// Parent links are plain slot indices, so a node never owns its parent and
/// destroying a subtree leaves the rest of the tree untouched.
#[derive(Debug)]
pub struct Scene {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) transform: Vec<Transform>,
    pub(crate) version: Vec<u64>,
    pub(crate) visible: Vec<bool>,
    pub(crate) content: Vec<Option<VisualKey>>,

    // -- Invalidation --
    pub(crate) subtree_dirty: Vec<bool>,
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            transform: Vec::new(),
            version: Vec::new(),
            visible: Vec::new(),
            content: Vec::new(),
            subtree_dirty: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a detached node and returns its handle.
    ///
    /// The node starts as a visible root with an identity transform, no
    /// content, and its dirty flag set.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot. The generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.transform[i] = Transform::Identity;
            self.version[i] = 0;
            self.visible[i] = true;
            self.content[i] = None;
            self.subtree_dirty[i] = true;
            self.alive[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.transform.push(Transform::Identity);
            self.version.push(0);
            self.visible.push(true);
            self.content.push(None);
            self.subtree_dirty.push(true);
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.id_of(idx)
    }

    /// Creates a node and appends it as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] if `parent` has been destroyed.
    pub fn create_child(&mut self, parent: NodeId) -> Result<NodeId, Error> {
        self.check(parent)?;
        let child = self.create_node();
        self.add_child(parent, child)?;
        Ok(child)
    }

    /// Detaches `id` from its parent and destroys it together with all its
    /// descendants.
    ///
    /// Returns the visual keys that were attached to the destroyed nodes, in
    /// draw order, so their GPU resources can be released.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] if `id` has been destroyed.
    pub fn destroy_subtree(&mut self, id: NodeId) -> Result<Vec<VisualKey>, Error> {
        let root = self.check(id)?;
        let order = self.draw_order(id, false)?;

        if self.parent[root as usize] != INVALID {
            let p = self.parent[root as usize];
            self.unlink_from_parent(root);
            self.dirty.remove_dependency(root, p, dirty::TRANSFORM);
            self.dirty.mark(p, dirty::TOPOLOGY);
            self.mark_dirty_from(p);
        }

        let mut released = Vec::new();
        // Children first, so every slot is freed after its descendants.
        for node in order.iter().rev() {
            let idx = node.idx;
            let i = idx as usize;
            if let Some(key) = self.content[i].take() {
                released.push(key);
            }
            self.dirty.remove_key(idx);
            self.generation[i] = self.generation[i].wrapping_add(1);
            self.alive[i] = false;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.free_list.push(idx);
            self.pending_removed.push(idx);
            self.dirty.mark(idx, dirty::TOPOLOGY);
        }
        released.reverse();
        Ok(released)
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.alive[id.idx as usize]
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Appends `child` as the last child of `parent`.
    ///
    /// Marks the inherited TRANSFORM channel for `child`'s subtree and sets
    /// the dirty flag on `child` and all of its new ancestors.
    ///
    /// # Errors
    ///
    /// - [`Error::StaleNode`] if either handle is stale.
    /// - [`Error::AlreadyAttached`] if `child` already has a parent.
    /// - [`Error::CycleDetected`] if `child` is `parent` or one of its
    ///   ancestors.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        let p = self.check(parent)?;
        let c = self.check(child)?;
        if self.parent[c as usize] != INVALID {
            return Err(Error::AlreadyAttached(child));
        }
        if self.is_ancestor_or_self(c, p) {
            return Err(Error::CycleDetected { parent, child });
        }
        self.link_last(p, c);
        Ok(())
    }

    /// Detaches `child` from `parent`. The child survives as a new root and
    /// can be attached elsewhere or destroyed.
    ///
    /// # Errors
    ///
    /// - [`Error::StaleNode`] if either handle is stale.
    /// - [`Error::NotFound`] if `child` is not a direct child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        let p = self.check(parent)?;
        let c = self.check(child)?;
        if self.parent[c as usize] != p {
            return Err(Error::NotFound { parent, child });
        }

        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.mark_dirty_from(p);
        self.mark_dirty_from(c);
        Ok(())
    }

    /// Moves `child` to the end of `new_parent`'s children, detaching it from
    /// its current parent first.
    ///
    /// # Errors
    ///
    /// - [`Error::StaleNode`] if either handle is stale.
    /// - [`Error::CycleDetected`] if `child` is `new_parent` or one of its
    ///   ancestors. The tree is unchanged in that case.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) -> Result<(), Error> {
        let c = self.check(child)?;
        let p = self.check(new_parent)?;
        if self.is_ancestor_or_self(c, p) {
            return Err(Error::CycleDetected {
                parent: new_parent,
                child,
            });
        }

        let old_p = self.parent[c as usize];
        if old_p != INVALID {
            self.unlink_from_parent(c);
            self.dirty.remove_dependency(c, old_p, dirty::TRANSFORM);
            self.dirty.mark(old_p, dirty::TOPOLOGY);
            self.mark_dirty_from(old_p);
        }
        self.link_last(p, c);
        Ok(())
    }

    /// Inserts the detached node `child` immediately before `sibling`.
    ///
    /// # Errors
    ///
    /// - [`Error::StaleNode`] if either handle is stale.
    /// - [`Error::AlreadyAttached`] if `child` already has a parent.
    /// - [`Error::NotFound`] if `sibling` is a root (it has no parent to
    ///   insert into); the reported parent is `sibling` itself.
    /// - [`Error::CycleDetected`] if `child` is an ancestor of `sibling`.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId) -> Result<(), Error> {
        let c = self.check(child)?;
        let s = self.check(sibling)?;
        if self.parent[c as usize] != INVALID {
            return Err(Error::AlreadyAttached(child));
        }
        let p = self.parent[s as usize];
        if p == INVALID {
            return Err(Error::NotFound {
                parent: sibling,
                child: sibling,
            });
        }
        if self.is_ancestor_or_self(c, p) {
            return Err(Error::CycleDetected {
                parent: self.id_of(p),
                child,
            });
        }

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];
        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `sibling` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        self.attach_bookkeeping(p, c);
        Ok(())
    }

    /// Returns the parent of a node, if any.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_of(p))
    }

    /// Returns an iterator over the direct children of a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the live nodes that have no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.alive[idx as usize] && self.parent[idx as usize] == INVALID)
            .map(|idx| self.id_of(idx))
            .collect()
    }

    /// Returns `true` if `ancestor` is `node` or lies on its parent path.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] if either handle is stale.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> Result<bool, Error> {
        let a = self.check(ancestor)?;
        let n = self.check(node)?;
        Ok(self.is_ancestor_or_self(a, n))
    }

    /// Builds the transform chain that maps `node`'s local coordinates into
    /// `ancestor`'s local coordinates.
    ///
    /// The chain lists the transforms of `node` and each intermediate parent
    /// (node-to-root order), excluding `ancestor`'s own transform. Requesting
    /// the path from a node to itself yields an empty (identity) chain.
    ///
    /// # Errors
    ///
    /// - [`Error::StaleNode`] if either handle is stale.
    /// - [`Error::NotInSubtree`] if `ancestor` is not an ancestor of `node`.
    pub fn transform_to(&self, node: NodeId, ancestor: NodeId) -> Result<TransformChain, Error> {
        let n = self.check(node)?;
        let a = self.check(ancestor)?;
        let mut links = Vec::new();
        let mut cur = n;
        while cur != a {
            if cur == INVALID {
                return Err(Error::NotInSubtree { node, ancestor });
            }
            links.push(self.id_of(cur));
            cur = self.parent[cur as usize];
        }
        Ok(TransformChain::new(node, ancestor, links))
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the local transform of a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn transform(&self, id: NodeId) -> &Transform {
        self.validate(id);
        &self.transform[id.idx as usize]
    }

    /// Returns the version counter of a node's transform.
    ///
    /// The counter increases every time the transform is mutated through the
    /// scene.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn transform_version(&self, id: NodeId) -> u64 {
        self.validate(id);
        self.version[id.idx as usize]
    }

    /// Returns whether a node is visible.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visible[id.idx as usize]
    }

    /// Returns the visual attached to a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn content(&self, id: NodeId) -> Option<VisualKey> {
        self.validate(id);
        self.content[id.idx as usize]
    }

    /// Returns whether the node's subtree has changed since the last draw
    /// pass cleared it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.validate(id);
        self.subtree_dirty[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Replaces the local transform of a node and bumps its version.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] if the handle is stale.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), Error> {
        self.update_transform(id, |t| *t = transform)
    }

    /// Mutates the local transform of a node in place and bumps its version.
    ///
    /// This is the entry point camera and controller code uses, e.g.
    /// `scene.update_transform(id, |t| t.translate_by(1.0, 0.0, 0.0))`.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] if the handle is stale.
    pub fn update_transform(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut Transform),
    ) -> Result<(), Error> {
        let idx = self.check(id)?;
        f(&mut self.transform[idx as usize]);
        self.version[idx as usize] += 1;
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.mark_dirty_from(idx);
        Ok(())
    }

    /// Shows or hides a node together with its subtree.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] if the handle is stale.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), Error> {
        let idx = self.check(id)?;
        if self.visible[idx as usize] != visible {
            self.visible[idx as usize] = visible;
            self.dirty.mark(idx, dirty::TOPOLOGY);
            self.mark_dirty_from(idx);
        }
        Ok(())
    }

    /// Attaches (or clears) the visual drawn by a node.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] if the handle is stale.
    pub fn set_content(&mut self, id: NodeId, content: Option<VisualKey>) -> Result<(), Error> {
        let idx = self.check(id)?;
        self.content[idx as usize] = content;
        self.dirty.mark(idx, dirty::VISUAL);
        self.mark_dirty_from(idx);
        Ok(())
    }

    /// Records that the visual state of `id` changed.
    ///
    /// The dirty flag propagates upward only: `id` and every ancestor are
    /// flagged, descendants are untouched and nothing is recomputed.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] if the handle is stale.
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<(), Error> {
        let idx = self.check(id)?;
        self.dirty.mark(idx, dirty::VISUAL);
        self.mark_dirty_from(idx);
        Ok(())
    }

    /// Clears the dirty flag of a single node. Draw passes call this for the
    /// nodes they resolved.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] if the handle is stale.
    pub fn clear_dirty(&mut self, id: NodeId) -> Result<(), Error> {
        let idx = self.check(id)?;
        self.subtree_dirty[idx as usize] = false;
        Ok(())
    }

    // -- Internal helpers --

    /// Returns the slot index for a live handle.
    pub(crate) fn check(&self, id: NodeId) -> Result<u32, Error> {
        if self.is_alive(id) {
            Ok(id.idx)
        } else {
            Err(Error::StaleNode(id))
        }
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Builds the current handle for a live slot.
    pub(crate) fn id_of(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns `true` if `a` is `n` or one of its ancestors.
    fn is_ancestor_or_self(&self, a: u32, n: u32) -> bool {
        let mut cur = n;
        while cur != INVALID {
            if cur == a {
                return true;
            }
            cur = self.parent[cur as usize];
        }
        false
    }

    /// Appends `c` to `p`'s child list. `c` must be detached.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
        self.attach_bookkeeping(p, c);
    }

    /// Dirty bookkeeping shared by every attach path.
    fn attach_bookkeeping(&mut self, p: u32, c: u32) {
        // Child depends on parent for TRANSFORM, so marking a parent reports
        // its whole subtree.
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.mark_dirty_from(c);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Sets the dirty flag on `idx` and every ancestor.
    fn mark_dirty_from(&mut self, idx: u32) {
        let mut cur = idx;
        while cur != INVALID {
            self.subtree_dirty[cur as usize] = true;
            cur = self.parent[cur as usize];
        }
    }
}
