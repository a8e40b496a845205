// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cached composite transforms along a scene path.

use alloc::vec::Vec;

use super::{Point3, Transform};
use crate::error::Error;
use crate::matrix::Transform3d;
use crate::scene::{NodeId, Scene};

/// The composite transform from a node's local space to one of its
/// ancestors' local space.
///
/// A chain holds node handles, not transforms: it never owns or outlives the
/// nodes it references. The combined transform is cached together with a
/// stamp (the sum of the link versions). Any edit through the scene bumps a
/// version and therefore the stamp, so a stale cache is detected without
/// walking the transforms themselves.
///
/// Created by [`Scene::transform_to`].
#[derive(Clone, Debug)]
pub struct TransformChain {
    node: NodeId,
    ancestor: NodeId,
    /// Node-to-root order, `ancestor` excluded.
    links: Vec<NodeId>,
    cached: Option<Transform>,
    stamp: u64,
    recompute_count: u64,
}

impl TransformChain {
    pub(crate) fn new(node: NodeId, ancestor: NodeId, links: Vec<NodeId>) -> Self {
        Self {
            node,
            ancestor,
            links,
            cached: None,
            stamp: 0,
            recompute_count: 0,
        }
    }

    /// The node whose local space the chain maps from.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The ancestor whose local space the chain maps into.
    #[must_use]
    pub fn ancestor(&self) -> NodeId {
        self.ancestor
    }

    /// The nodes whose transforms make up the chain, node first.
    #[must_use]
    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    /// How many times the combined transform has been rebuilt.
    #[must_use]
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    /// Returns the combined transform, rebuilding it if any link changed
    /// since the last call.
    ///
    /// # Errors
    ///
    /// - [`Error::StaleNode`] if a node on the path was destroyed.
    /// - [`Error::NotInSubtree`] if the path was restructured so that the
    ///   ancestor is no longer reached through the recorded links. Build a
    ///   fresh chain with [`Scene::transform_to`] in that case.
    pub fn combined(&mut self, scene: &Scene) -> Result<&Transform, Error> {
        let stamp = self.current_stamp(scene)?;
        let combined = match self.cached.take() {
            Some(t) if self.stamp == stamp => t,
            _ => {
                let t = self.links.iter().fold(Transform::Identity, |acc, &link| {
                    scene.transform(link).compose(&acc)
                });
                self.stamp = stamp;
                self.recompute_count += 1;
                t
            }
        };
        Ok(self.cached.insert(combined))
    }

    /// Returns `true` if the cached transform is present and up to date.
    #[must_use]
    pub fn is_valid(&self, scene: &Scene) -> bool {
        self.cached.is_some() && self.current_stamp(scene) == Ok(self.stamp)
    }

    /// Returns `true` if every link is alive and still parented as recorded.
    #[must_use]
    pub fn is_intact(&self, scene: &Scene) -> bool {
        self.current_stamp(scene).is_ok()
    }

    /// Drops the cached transform. The next access rebuilds it.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Maps a point from the node's space into the ancestor's space.
    ///
    /// Works for every chain: when the combined transform has no matrix form
    /// the point is passed through each step in turn.
    ///
    /// # Errors
    ///
    /// Same as [`combined`](Self::combined).
    pub fn map_through_chain(&mut self, scene: &Scene, p: Point3) -> Result<Point3, Error> {
        Ok(self.combined(scene)?.map(p))
    }

    /// Maps a point from the ancestor's space back into the node's space.
    ///
    /// # Errors
    ///
    /// [`Error::NonInvertible`] if a step has no inverse, otherwise as
    /// [`combined`](Self::combined).
    pub fn imap_through_chain(&mut self, scene: &Scene, p: Point3) -> Result<Point3, Error> {
        self.combined(scene)?.imap(p)
    }

    /// Returns the combined transform as a matrix.
    ///
    /// # Errors
    ///
    /// [`Error::NotMatrixRepresentable`] if a link is nonlinear, otherwise as
    /// [`combined`](Self::combined).
    pub fn matrix(&mut self, scene: &Scene) -> Result<Transform3d, Error> {
        self.combined(scene)?.as_matrix()
    }

    /// Sums link versions after checking the recorded path.
    fn current_stamp(&self, scene: &Scene) -> Result<u64, Error> {
        scene.check(self.ancestor)?;
        if self.links.is_empty() {
            scene.check(self.node)?;
            return Ok(0);
        }
        let mut stamp = 0_u64;
        for (i, &link) in self.links.iter().enumerate() {
            scene.check(link)?;
            let expected = self.links.get(i + 1).copied().unwrap_or(self.ancestor);
            if scene.parent(link) != Some(expected) {
                return Err(Error::NotInSubtree {
                    node: self.node,
                    ancestor: self.ancestor,
                });
            }
            stamp = stamp.wrapping_add(scene.transform_version(link));
        }
        Ok(stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point3, b: Point3) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn scale_translate_node_maps_into_root() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let node = scene.create_child(root).unwrap();
        scene
            .set_transform(
                node,
                Transform::scale_translate([2.0, 2.0, 1.0], [5.0, 5.0, 0.0]),
            )
            .unwrap();

        let mut chain = scene.transform_to(node, root).unwrap();
        assert_eq!(
            chain.map_through_chain(&scene, [0.0, 0.0, 0.0]).unwrap(),
            [5.0, 5.0, 0.0]
        );
        assert_eq!(
            chain.map_through_chain(&scene, [1.0, 0.0, 0.0]).unwrap(),
            [7.0, 5.0, 0.0]
        );
    }

    #[test]
    fn links_compose_node_first() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let parent = scene.create_child(root).unwrap();
        let leaf = scene.create_child(parent).unwrap();
        scene
            .set_transform(parent, Transform::scale(10.0, 10.0, 1.0))
            .unwrap();
        scene
            .set_transform(leaf, Transform::translation(1.0, 0.0, 0.0))
            .unwrap();

        let mut chain = scene.transform_to(leaf, root).unwrap();
        assert_eq!(chain.links(), &[leaf, parent]);
        // Translate in leaf space first, then scale in parent space.
        assert_eq!(
            chain.map_through_chain(&scene, [0.0, 0.0, 0.0]).unwrap(),
            [10.0, 0.0, 0.0]
        );
        // The root's own transform is excluded.
        scene
            .set_transform(root, Transform::translation(100.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(
            chain.map_through_chain(&scene, [0.0, 0.0, 0.0]).unwrap(),
            [10.0, 0.0, 0.0]
        );
    }

    #[test]
    fn recomputes_exactly_once_per_change() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let a = scene.create_child(root).unwrap();
        let b = scene.create_child(a).unwrap();

        let mut chain = scene.transform_to(b, root).unwrap();
        assert!(!chain.is_valid(&scene));
        chain.combined(&scene).unwrap();
        chain.combined(&scene).unwrap();
        assert_eq!(chain.recompute_count(), 1);
        assert!(chain.is_valid(&scene));

        scene
            .update_transform(a, |t| t.translate_by(1.0, 2.0, 0.0))
            .unwrap();
        assert!(!chain.is_valid(&scene));
        chain.combined(&scene).unwrap();
        chain.combined(&scene).unwrap();
        assert_eq!(chain.recompute_count(), 2);

        chain.invalidate();
        chain.combined(&scene).unwrap();
        assert_eq!(chain.recompute_count(), 3);
    }

    #[test]
    fn self_path_is_identity() {
        let mut scene = Scene::new();
        let n = scene.create_node();
        scene
            .set_transform(n, Transform::scale(3.0, 3.0, 3.0))
            .unwrap();
        let mut chain = scene.transform_to(n, n).unwrap();
        assert!(chain.links().is_empty());
        assert_eq!(chain.combined(&scene).unwrap(), &Transform::Identity);
    }

    #[test]
    fn nonlinear_chain_maps_sequentially_and_rejects_matrix() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let polar = scene.create_child(root).unwrap();
        let leaf = scene.create_child(polar).unwrap();
        scene.set_transform(polar, Transform::Polar).unwrap();
        scene
            .set_transform(leaf, Transform::scale(1.0, 2.0, 1.0))
            .unwrap();

        let mut chain = scene.transform_to(leaf, root).unwrap();
        let p = chain
            .map_through_chain(&scene, [core::f64::consts::FRAC_PI_2, 1.0, 0.0])
            .unwrap();
        assert!(close(p, [0.0, 2.0, 0.0]));
        assert!(matches!(
            chain.matrix(&scene),
            Err(Error::NotMatrixRepresentable { .. })
        ));
        let back = chain.imap_through_chain(&scene, p).unwrap();
        assert!(close(back, [core::f64::consts::FRAC_PI_2, 1.0, 0.0]));
    }

    #[test]
    fn restructured_path_is_detected() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let a = scene.create_child(root).unwrap();
        let b = scene.create_child(a).unwrap();
        let other = scene.create_child(root).unwrap();

        let mut chain = scene.transform_to(b, root).unwrap();
        chain.combined(&scene).unwrap();
        scene.reparent(b, other).unwrap();
        assert!(!chain.is_intact(&scene));
        assert_eq!(
            chain.combined(&scene).err(),
            Some(Error::NotInSubtree {
                node: b,
                ancestor: root
            })
        );

        scene.destroy_subtree(other).unwrap();
        assert_eq!(chain.combined(&scene).err(), Some(Error::StaleNode(b)));
    }
}
