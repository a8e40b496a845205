// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame change draining.
//!
//! [`SceneChanges`] uses raw slot indices (`u32`) rather than [`NodeId`]
//! handles: removed nodes no longer have a valid handle, and the render side
//! only needs to know which slots to refresh.
//!
//! [`NodeId`]: super::NodeId

use alloc::vec::Vec;

use super::store::Scene;
use crate::dirty;

/// The set of changes recorded since the previous [`Scene::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct SceneChanges {
    /// Nodes whose composite transform moved (an own edit or an ancestor's).
    pub transforms: Vec<u32>,
    /// Nodes whose visual payload changed.
    pub visuals: Vec<u32>,
    /// Nodes created since the last evaluate.
    pub added: Vec<u32>,
    /// Nodes destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether structure or visibility changed.
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.visuals.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.visuals.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl Scene {
    /// Drains the dirty channels and returns what changed since the last
    /// call.
    ///
    /// This does not touch the per-node dirty flags, which belong to the draw
    /// pass.
    pub fn evaluate(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();

        let alive = &self.alive;
        changes.transforms = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .filter(|&idx| alive[idx as usize])
            .collect();

        changes.visuals = self
            .dirty
            .drain(dirty::VISUAL)
            .deterministic()
            .run()
            .filter(|&idx| alive[idx as usize])
            .collect();

        let topology: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        changes.topology_changed = !topology.is_empty();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::VisualKey;
    use crate::transform::Transform;

    #[test]
    fn transform_edit_reports_subtree() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let a = scene.create_child(root).unwrap();
        let b = scene.create_child(a).unwrap();
        let c = scene.create_child(root).unwrap();
        let _ = scene.evaluate();

        scene
            .set_transform(a, Transform::translation(1.0, 0.0, 0.0))
            .unwrap();
        let changes = scene.evaluate();
        assert!(changes.transforms.contains(&a.index()));
        assert!(changes.transforms.contains(&b.index()));
        assert!(!changes.transforms.contains(&c.index()));
        assert!(!changes.transforms.contains(&root.index()));
        assert!(!changes.topology_changed);
    }

    #[test]
    fn visual_edit_is_local() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let a = scene.create_child(root).unwrap();
        let b = scene.create_child(a).unwrap();
        let _ = scene.evaluate();

        scene.set_content(a, Some(VisualKey::new(0, 0))).unwrap();
        let changes = scene.evaluate();
        assert_eq!(changes.visuals, &[a.index()]);
        assert!(!changes.visuals.contains(&b.index()));
    }

    #[test]
    fn lifecycle_lists_drain_once() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let child = scene.create_child(root).unwrap();

        let changes = scene.evaluate();
        assert_eq!(changes.added, &[root.index(), child.index()]);
        assert!(changes.topology_changed);

        scene.destroy_subtree(child).unwrap();
        let changes = scene.evaluate();
        assert_eq!(changes.removed, &[child.index()]);
        assert!(changes.transforms.is_empty());

        assert!(scene.evaluate().is_empty());
    }
}
