// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Application-facing facade over a scene, its visuals, and a scheduler.

use alloc::vec::Vec;

use lamina_core::scene::{NodeId, Scene, VisualKey};
use lamina_core::transform::Transform;

use crate::config::DrawConfig;
use crate::context::GraphicsContext;
use crate::error::RenderError;
use crate::plan::DrawPlan;
use crate::scheduler::DrawScheduler;
use crate::trace::{TraceSink, Tracer};
use crate::visual::{AttributeValue, Visual, VisualKind, Visuals};

/// A scene with a fixed root, the visuals drawn from it, and the scheduler
/// that draws them.
///
/// Every edit made through the canvas marks the affected node dirty, so the
/// next [`draw`](Self::draw) picks it up.
#[derive(Debug)]
pub struct Canvas {
    scene: Scene,
    visuals: Visuals,
    scheduler: DrawScheduler,
    root: NodeId,
}

impl Canvas {
    /// Creates a canvas with an empty root node.
    #[must_use]
    pub fn new(config: DrawConfig) -> Self {
        let mut scene = Scene::new();
        let root = scene.create_node();
        Self {
            scene,
            visuals: Visuals::new(),
            scheduler: DrawScheduler::new(config),
            root,
        }
    }

    /// The root node. Its own transform is not applied when drawing: item
    /// transforms map into root space.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The scene tree.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access for topology and transform edits.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The visual store.
    #[must_use]
    pub fn visuals(&self) -> &Visuals {
        &self.visuals
    }

    /// The scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &DrawScheduler {
        &self.scheduler
    }

    /// Looks up the visual behind `key`.
    #[must_use]
    pub fn visual(&self, key: VisualKey) -> Option<&Visual> {
        self.visuals.get(key)
    }

    /// Adds an empty grouping node under `parent`.
    ///
    /// # Errors
    ///
    /// [`RenderError::Scene`] if `parent` is stale.
    pub fn add_group(&mut self, parent: NodeId) -> Result<NodeId, RenderError> {
        Ok(self.scene.create_child(parent)?)
    }

    /// Adds a node drawing a new visual of `kind` under `parent`.
    ///
    /// # Errors
    ///
    /// [`RenderError::Scene`] if `parent` is stale.
    pub fn add_visual(
        &mut self,
        parent: NodeId,
        kind: VisualKind,
    ) -> Result<(NodeId, VisualKey), RenderError> {
        let node = self.scene.create_child(parent)?;
        let key = self.visuals.insert(Visual::new(node, kind));
        self.scene.set_content(node, Some(key))?;
        Ok((node, key))
    }

    /// Sets an attribute on a visual and marks its node dirty.
    ///
    /// # Errors
    ///
    /// - [`RenderError::UnknownVisual`] for an unknown key.
    /// - [`RenderError::InvalidAttribute`] if validation fails; nothing is
    ///   marked in that case.
    pub fn set_attribute(
        &mut self,
        key: VisualKey,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<(), RenderError> {
        let visual = self
            .visuals
            .get_mut(key)
            .ok_or(RenderError::UnknownVisual(key))?;
        visual.set_attribute(name, value)?;
        self.scene.mark_dirty(visual.node())?;
        Ok(())
    }

    /// Replaces the local transform of `node`.
    ///
    /// # Errors
    ///
    /// [`RenderError::Scene`] if `node` is stale.
    pub fn set_transform(&mut self, node: NodeId, transform: Transform) -> Result<(), RenderError> {
        Ok(self.scene.set_transform(node, transform)?)
    }

    /// Destroys `node` and its subtree, releasing the GPU handles of every
    /// visual in it.
    ///
    /// # Errors
    ///
    /// - [`RenderError::Scene`] if `node` is stale. Removing the root is
    ///   refused with [`lamina_core::Error::NotInSubtree`].
    /// - The first release error; every visual is still removed.
    pub fn remove(&mut self, node: NodeId, ctx: &mut dyn GraphicsContext) -> Result<(), RenderError> {
        if node == self.root {
            return Err(RenderError::Scene(lamina_core::Error::NotInSubtree {
                node,
                ancestor: self.root,
            }));
        }
        let keys: Vec<VisualKey> = self.scene.destroy_subtree(node)?;
        let mut first_err = None;
        for key in keys {
            if let Some(mut visual) = self.visuals.remove(key) {
                if let Err(e) = visual.release(ctx) {
                    first_err.get_or_insert(e);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Draws one frame.
    ///
    /// # Errors
    ///
    /// See [`DrawScheduler::draw`].
    pub fn draw(&mut self, ctx: &mut dyn GraphicsContext) -> Result<DrawPlan, RenderError> {
        self.draw_with(ctx, &mut Tracer::none())
    }

    /// Draws one frame, reporting events to `sink`.
    ///
    /// # Errors
    ///
    /// See [`DrawScheduler::draw`].
    pub fn draw_traced(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        sink: &mut dyn TraceSink,
    ) -> Result<DrawPlan, RenderError> {
        self.draw_with(ctx, &mut Tracer::new(sink))
    }

    fn draw_with(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        tracer: &mut Tracer<'_>,
    ) -> Result<DrawPlan, RenderError> {
        self.scheduler
            .draw(&mut self.scene, &mut self.visuals, self.root, ctx, tracer)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(DrawConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::headless::HeadlessContext;
    use crate::visual::HandleRole;

    #[test]
    fn attribute_edits_reach_the_next_frame() {
        let mut ctx = HeadlessContext::new();
        let mut canvas = Canvas::default();
        let (node, key) = canvas.add_visual(canvas.root(), VisualKind::Line).unwrap();
        canvas
            .set_attribute(key, "positions", vec![[0.0, 0.0, 0.0], [1.0, 1.0, 0.0]])
            .unwrap();
        let plan = canvas.draw(&mut ctx).unwrap();
        assert_eq!(plan.item(node).unwrap().draw_calls[0].indices, 0..2);

        canvas
            .set_attribute(key, "color", [1.0, 0.0, 0.0, 1.0])
            .unwrap();
        assert!(canvas.scene().is_dirty(node));
        assert!(canvas.scene().is_dirty(canvas.root()));
        let plan = canvas.draw(&mut ctx).unwrap();
        assert_eq!(plan.stats.uploads, 1);
        assert_eq!(plan.stats.geometry_rebuilds, 0);
        let position = canvas.visual(key).unwrap().handle(HandleRole::Position);
        assert_eq!(position.unwrap().upload_count(), 1);
    }

    #[test]
    fn invalid_attribute_does_not_mark() {
        let mut ctx = HeadlessContext::new();
        let mut canvas = Canvas::default();
        let (node, key) = canvas.add_visual(canvas.root(), VisualKind::Ellipse).unwrap();
        canvas.draw(&mut ctx).unwrap();
        assert!(canvas.set_attribute(key, "radius", 1.0_f32).is_err());
        assert!(!canvas.scene().is_dirty(node));
        assert_eq!(
            canvas.set_attribute(VisualKey::new(7, 0), "color", [0.0; 4]),
            Err(RenderError::UnknownVisual(VisualKey::new(7, 0)))
        );
    }

    #[test]
    fn remove_releases_gpu_objects() {
        let mut ctx = HeadlessContext::new();
        let mut canvas = Canvas::default();
        let group = canvas.add_group(canvas.root()).unwrap();
        canvas.add_visual(group, VisualKind::Ellipse).unwrap();
        canvas.add_visual(group, VisualKind::Image).unwrap();
        canvas.draw(&mut ctx).unwrap();
        assert_eq!(ctx.live_objects(), 3 + 5);

        canvas.remove(group, &mut ctx).unwrap();
        assert_eq!(ctx.live_objects(), 0);
        assert!(canvas.visuals().is_empty());
        assert!(canvas.draw(&mut ctx).unwrap().items.is_empty());
        assert!(matches!(
            canvas.remove(canvas.root(), &mut ctx),
            Err(RenderError::Scene(_))
        ));
    }
}
