// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame draw pass.
//!
//! [`DrawScheduler::draw`] walks the subtree under a root in draw order and,
//! for every node carrying a visual:
//!
//! 1. resolves the node's transform into root space through a cached
//!    [`TransformChain`] (stamp-checked every frame, dirty or not),
//! 2. if the node is dirty or the visual has pending edits, re-encodes the
//!    visual's stale payloads (rebuilding geometry when a topology attribute
//!    changed),
//! 3. binds every handle, uploading only out-of-date resources,
//! 4. sets the transform and issues the visual's draw calls.
//!
//! Before walking, the scene's change channels are drained with
//! [`Scene::evaluate_into`]: destroyed nodes drop their chains and the
//! frame stats report how much moved.
//!
//! Dirty flags are cleared only once the whole frame succeeded. A failure
//! anywhere aborts the frame with the error and leaves every flag set, so
//! the next frame redoes the work.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use lamina_core::scene::{NodeId, Scene, SceneChanges};
use lamina_core::transform::TransformChain;

use crate::config::DrawConfig;
use crate::context::{DrawCall, GraphicsContext, ProgramId, ProgramKind};
use crate::error::RenderError;
use crate::plan::{DrawItem, DrawPlan, FrameStats};
use crate::trace::{
    ChainRecomputeEvent, FrameAbortEvent, FrameBeginEvent, FrameSummary, GeometryRebuildEvent,
    NodeDrawnEvent, ResourceUploadEvent, Tracer,
};
use crate::visual::Visuals;

fn saturate_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Resolves a scene into draw calls, one frame at a time.
///
/// Keeps a [`TransformChain`] per drawn node and the program ids of the
/// context it draws into, so a scheduler should stay with one context.
#[derive(Debug)]
pub struct DrawScheduler {
    config: DrawConfig,
    chains: BTreeMap<NodeId, TransformChain>,
    programs: [Option<ProgramId>; ProgramKind::COUNT],
    changes: SceneChanges,
    frame_index: u64,
}

impl DrawScheduler {
    /// Creates a scheduler with the given configuration.
    #[must_use]
    pub fn new(config: DrawConfig) -> Self {
        Self {
            config,
            chains: BTreeMap::new(),
            programs: [None; ProgramKind::COUNT],
            changes: SceneChanges::default(),
            frame_index: 0,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    /// Index of the next frame to draw.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The retained chain for `node`, if it was drawn before.
    #[must_use]
    pub fn chain(&self, node: NodeId) -> Option<&TransformChain> {
        self.chains.get(&node)
    }

    /// Draws the subtree under `root`.
    ///
    /// Returns the plan of what was drawn. On error the frame is abandoned:
    /// draw calls already issued stay issued, no dirty flag is cleared, and
    /// the frame counter does not advance.
    ///
    /// # Errors
    ///
    /// - [`RenderError::Scene`] for a stale root or a transform without a
    ///   matrix form on the path of a drawn visual.
    /// - [`RenderError::UnknownVisual`] for a node whose content key is not
    ///   in `visuals`.
    /// - Resource and context errors from binding and drawing.
    pub fn draw(
        &mut self,
        scene: &mut Scene,
        visuals: &mut Visuals,
        root: NodeId,
        ctx: &mut dyn GraphicsContext,
        tracer: &mut Tracer<'_>,
    ) -> Result<DrawPlan, RenderError> {
        scene.evaluate_into(&mut self.changes);
        if !self.changes.removed.is_empty() {
            self.chains.retain(|id, _| scene.is_alive(*id));
        }

        let order = scene.draw_order(root, self.config.skip_hidden)?;
        let frame_index = self.frame_index;
        if !self.config.retain_chains {
            self.chains.clear();
        }

        tracer.frame_begin(&FrameBeginEvent {
            frame_index,
            root_index: root.index(),
            node_count: saturate_u32(order.len()),
        });

        let mut plan = DrawPlan::new(frame_index);
        plan.stats.nodes_moved = saturate_u32(self.changes.transforms.len());
        plan.stats.nodes_removed = saturate_u32(self.changes.removed.len());
        for &node in &order {
            plan.stats.nodes_visited += 1;
            if let Err(e) = self.draw_node(scene, visuals, root, node, ctx, tracer, &mut plan) {
                tracer.frame_abort(&FrameAbortEvent {
                    frame_index,
                    node_index: node.index(),
                });
                return Err(e);
            }
        }

        for &node in &order {
            scene.clear_dirty(node)?;
        }
        self.frame_index += 1;

        tracer.frame_summary(&FrameSummary {
            frame_index,
            stats: plan.stats,
        });
        Ok(plan)
    }

    fn draw_node(
        &mut self,
        scene: &Scene,
        visuals: &mut Visuals,
        root: NodeId,
        node: NodeId,
        ctx: &mut dyn GraphicsContext,
        tracer: &mut Tracer<'_>,
        plan: &mut DrawPlan,
    ) -> Result<(), RenderError> {
        let Some(key) = scene.content(node) else {
            return Ok(());
        };
        let frame_index = plan.frame_index;
        let visual = visuals
            .get_mut(key)
            .ok_or(RenderError::UnknownVisual(key))?;

        if scene.is_dirty(node) || visual.needs_update() {
            let report = visual.update()?;
            if report.rebuilt {
                plan.stats.geometry_rebuilds += 1;
                tracer.geometry_rebuild(&GeometryRebuildEvent {
                    frame_index,
                    node_index: node.index(),
                    kind: visual.kind(),
                    elements: saturate_u32(visual.element_count()),
                });
            }
        }

        let world_transform = self.resolve(scene, root, node, tracer, &mut plan.stats, frame_index)?;

        let has_draws = visual.draws().iter().any(|d| !d.indices.is_empty());
        if self.config.cull_empty && (visual.element_count() == 0 || !has_draws) {
            plan.stats.visuals_culled += 1;
            return Ok(());
        }

        let program = self.program(ctx, visual.program())?;
        for upload in visual.bind(ctx)? {
            let bytes = u64::try_from(upload.bytes).unwrap_or(u64::MAX);
            plan.stats.uploads += 1;
            plan.stats.bytes_uploaded += bytes;
            tracer.resource_upload(&ResourceUploadEvent {
                frame_index,
                node_index: node.index(),
                role: upload.role,
                kind: upload.kind,
                bytes,
            });
        }

        ctx.set_transform(&world_transform)?;
        let mut draw_calls = Vec::new();
        for range in visual.draws().iter().filter(|d| !d.indices.is_empty()) {
            let call = DrawCall {
                program,
                primitive: range.primitive,
                indices: range.indices.clone(),
            };
            ctx.draw_call(&call)?;
            draw_calls.push(call);
        }

        plan.stats.draw_calls += saturate_u32(draw_calls.len());
        if !draw_calls.is_empty() {
            plan.stats.visuals_drawn += 1;
        }
        tracer.node_drawn(&NodeDrawnEvent {
            frame_index,
            node_index: node.index(),
            kind: visual.kind(),
            draw_calls: saturate_u32(draw_calls.len()),
        });
        plan.items.push(DrawItem {
            node,
            visual: key,
            world_transform,
            draw_calls,
        });
        Ok(())
    }

    /// Returns the local-to-root matrix of `node`, reusing its chain while
    /// the path is intact.
    fn resolve(
        &mut self,
        scene: &Scene,
        root: NodeId,
        node: NodeId,
        tracer: &mut Tracer<'_>,
        stats: &mut FrameStats,
        frame_index: u64,
    ) -> Result<[f32; 16], RenderError> {
        let reusable = self
            .chains
            .get(&node)
            .is_some_and(|c| c.ancestor() == root && c.is_intact(scene));
        if !reusable {
            self.chains.insert(node, scene.transform_to(node, root)?);
        }
        let chain = self
            .chains
            .get_mut(&node)
            .ok_or(RenderError::Scene(lamina_core::Error::StaleNode(node)))?;

        let before = chain.recompute_count();
        let combined = chain.combined(scene)?;
        let kind = combined.kind();
        let matrix = combined.as_matrix()?;
        if chain.recompute_count() != before {
            stats.chain_recomputes += 1;
            tracer.chain_recompute(&ChainRecomputeEvent {
                frame_index,
                node_index: node.index(),
                links: saturate_u32(chain.links().len()),
                kind,
            });
        }
        Ok(matrix.to_cols_array_f32())
    }

    fn program(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        kind: ProgramKind,
    ) -> Result<ProgramId, RenderError> {
        if let Some(id) = self.programs[kind.index()] {
            return Ok(id);
        }
        let id = ctx.create_program(kind)?;
        self.programs[kind.index()] = Some(id);
        Ok(id)
    }
}

impl Default for DrawScheduler {
    fn default() -> Self {
        Self::new(DrawConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use lamina_core::scene::VisualKey;
    use lamina_core::transform::Transform;

    use super::*;
    use crate::headless::{Command, HeadlessContext};
    use crate::visual::{HandleRole, Visual, VisualKind};

    struct Fixture {
        scene: Scene,
        visuals: Visuals,
        root: NodeId,
        group: NodeId,
        leaf: NodeId,
        key: VisualKey,
        ctx: HeadlessContext,
    }

    impl Fixture {
        /// root -> group -> leaf, with a triangle mesh on `leaf`.
        fn new() -> Self {
            let mut scene = Scene::new();
            let root = scene.create_node();
            let group = scene.create_child(root).unwrap();
            let leaf = scene.create_child(group).unwrap();

            let mut mesh = Visual::new(leaf, VisualKind::Mesh);
            mesh.set_attribute(
                "vertices",
                vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            )
            .unwrap();
            mesh.set_attribute("faces", vec![[0_u32, 1, 2]]).unwrap();
            let mut visuals = Visuals::new();
            let key = visuals.insert(mesh);
            scene.set_content(leaf, Some(key)).unwrap();

            Self {
                scene,
                visuals,
                root,
                group,
                leaf,
                key,
                ctx: HeadlessContext::new(),
            }
        }

        fn draw(&mut self, scheduler: &mut DrawScheduler) -> Result<DrawPlan, RenderError> {
            scheduler.draw(
                &mut self.scene,
                &mut self.visuals,
                self.root,
                &mut self.ctx,
                &mut Tracer::none(),
            )
        }
    }

    #[test]
    fn scale_translate_reaches_the_gpu() {
        let mut f = Fixture::new();
        f.scene
            .set_transform(
                f.leaf,
                Transform::scale_translate([2.0, 2.0, 1.0], [5.0, 5.0, 0.0]),
            )
            .unwrap();
        let plan = f.draw(&mut DrawScheduler::default()).unwrap();

        let item = plan.item(f.leaf).unwrap();
        let m = item.world_transform;
        assert_eq!((m[0], m[5], m[12], m[13]), (2.0, 2.0, 5.0, 5.0));
        assert!(f.ctx.commands().contains(&Command::SetTransform(m)));
        assert_eq!(item.draw_calls.len(), 1);
        assert_eq!(item.draw_calls[0].indices, 0..3);
        assert_eq!(plan.stats.geometry_rebuilds, 1);
    }

    #[test]
    fn clean_frame_uploads_nothing() {
        let mut f = Fixture::new();
        let mut scheduler = DrawScheduler::default();
        let first = f.draw(&mut scheduler).unwrap();
        assert_eq!(first.stats.uploads, 3);
        assert_eq!(first.stats.chain_recomputes, 1);
        assert!(!f.scene.is_dirty(f.leaf));

        let second = f.draw(&mut scheduler).unwrap();
        assert_eq!(second.frame_index, 1);
        assert_eq!(second.stats.uploads, 0);
        assert_eq!(second.stats.chain_recomputes, 0);
        assert_eq!(second.stats.geometry_rebuilds, 0);
        assert_eq!(second.stats.draw_calls, 1);
    }

    #[test]
    fn direct_visual_edit_on_clean_node_uploads_once() {
        let mut f = Fixture::new();
        let mut scheduler = DrawScheduler::default();
        f.draw(&mut scheduler).unwrap();
        assert!(!f.scene.is_dirty(f.leaf));

        let visual = f.visuals.get_mut(f.key).unwrap();
        visual.set_attribute("color", [0.0, 0.0, 1.0, 1.0]).unwrap();
        let color = visual.handle(HandleRole::Color).unwrap().object().unwrap();
        assert!(!f.scene.is_dirty(f.leaf));

        let plan = f.draw(&mut scheduler).unwrap();
        assert_eq!(plan.stats.uploads, 1);
        assert_eq!(plan.stats.geometry_rebuilds, 0);
        assert_eq!(f.ctx.uploads_to(color), 2);
        let visual = f.visuals.get(f.key).unwrap();
        assert!(!visual.needs_update());
        assert_eq!(
            f.ctx.contents(color),
            Some(visual.handle(HandleRole::Color).unwrap().data())
        );

        let third = f.draw(&mut scheduler).unwrap();
        assert_eq!(third.stats.uploads, 0);
    }

    #[test]
    fn scene_changes_are_drained_each_frame() {
        let mut f = Fixture::new();
        let mut scheduler = DrawScheduler::default();
        f.draw(&mut scheduler).unwrap();
        let idle = f.draw(&mut scheduler).unwrap();
        assert_eq!((idle.stats.nodes_moved, idle.stats.nodes_removed), (0, 0));

        f.scene
            .update_transform(f.group, |t| t.translate_by(0.0, 2.0, 0.0))
            .unwrap();
        let moved = f.draw(&mut scheduler).unwrap();
        assert_eq!(moved.stats.nodes_moved, 2);
        assert!(f.scene.evaluate().is_empty());

        assert!(scheduler.chain(f.leaf).is_some());
        f.scene.destroy_subtree(f.leaf).unwrap();
        let removed = f.draw(&mut scheduler).unwrap();
        assert_eq!(removed.stats.nodes_removed, 1);
        assert!(scheduler.chain(f.leaf).is_none());
        assert!(removed.items.is_empty());
    }

    #[test]
    fn ancestor_transform_recomputes_chain_only() {
        let mut f = Fixture::new();
        let mut scheduler = DrawScheduler::default();
        f.draw(&mut scheduler).unwrap();

        f.scene
            .update_transform(f.group, |t| t.translate_by(1.0, 0.0, 0.0))
            .unwrap();
        let plan = f.draw(&mut scheduler).unwrap();
        assert_eq!(plan.stats.chain_recomputes, 1);
        assert_eq!(plan.stats.uploads, 0);
        assert_eq!(plan.item(f.leaf).unwrap().world_transform[12], 1.0);
        assert_eq!(scheduler.chain(f.leaf).unwrap().recompute_count(), 2);
    }

    #[test]
    fn unmarked_transform_edit_is_still_seen() {
        // A clean node still gets its chain stamp checked.
        let mut f = Fixture::new();
        let mut scheduler = DrawScheduler::default();
        f.draw(&mut scheduler).unwrap();
        f.scene
            .set_transform(f.group, Transform::translation(0.0, 3.0, 0.0))
            .unwrap();
        f.scene.clear_dirty(f.leaf).unwrap();
        f.scene.clear_dirty(f.group).unwrap();
        f.scene.clear_dirty(f.root).unwrap();

        let plan = f.draw(&mut scheduler).unwrap();
        assert_eq!(plan.item(f.leaf).unwrap().world_transform[13], 3.0);
    }

    #[test]
    fn failed_frame_keeps_dirty_flags() {
        let mut f = Fixture::new();
        let mut scheduler = DrawScheduler::default();
        f.ctx.fail_next_uploads(1);
        assert!(matches!(
            f.draw(&mut scheduler),
            Err(RenderError::Context(_))
        ));
        assert!(f.scene.is_dirty(f.leaf));
        assert!(f.scene.is_dirty(f.root));
        assert_eq!(scheduler.frame_index(), 0);

        let plan = f.draw(&mut scheduler).unwrap();
        assert_eq!(plan.frame_index, 0);
        assert_eq!(plan.stats.draw_calls, 1);
        assert!(!f.scene.is_dirty(f.leaf));
        let position = f.visuals.get(f.key).unwrap().handle(HandleRole::Position);
        assert!(position.unwrap().is_synced());
    }

    #[test]
    fn hidden_subtrees_are_skipped() {
        let mut f = Fixture::new();
        f.scene.set_visible(f.group, false).unwrap();
        let plan = f.draw(&mut DrawScheduler::default()).unwrap();
        assert!(plan.items.is_empty());
        assert_eq!(plan.stats.nodes_visited, 1);
        assert_eq!(f.ctx.draw_calls(), 0);
    }

    #[test]
    fn empty_visuals_are_culled() {
        let mut f = Fixture::new();
        let empty = f.scene.create_child(f.root).unwrap();
        let key = f.visuals.insert(Visual::new(empty, VisualKind::Markers));
        f.scene.set_content(empty, Some(key)).unwrap();

        let plan = f.draw(&mut DrawScheduler::default()).unwrap();
        assert_eq!(plan.stats.visuals_culled, 1);
        assert!(plan.item(empty).is_none());

        let mut strict = Fixture::new();
        let empty = strict.scene.create_child(strict.root).unwrap();
        let key = strict.visuals.insert(Visual::new(empty, VisualKind::Markers));
        strict.scene.set_content(empty, Some(key)).unwrap();
        let plan = strict.draw(&mut DrawScheduler::new(DrawConfig::strict())).unwrap();
        assert_eq!(plan.stats.visuals_culled, 0);
        assert!(plan.item(empty).unwrap().draw_calls.is_empty());
    }

    #[test]
    fn strict_config_rebuilds_chains() {
        let mut f = Fixture::new();
        let mut scheduler = DrawScheduler::new(DrawConfig::strict());
        f.draw(&mut scheduler).unwrap();
        let plan = f.draw(&mut scheduler).unwrap();
        assert_eq!(plan.stats.chain_recomputes, 1);
    }

    #[test]
    fn missing_visual_aborts() {
        let mut f = Fixture::new();
        f.scene.set_content(f.group, Some(VisualKey::new(99, 0))).unwrap();
        assert_eq!(
            f.draw(&mut DrawScheduler::default()).unwrap_err(),
            RenderError::UnknownVisual(VisualKey::new(99, 0))
        );
    }

    #[test]
    fn removed_visual_key_is_not_redirected() {
        let mut f = Fixture::new();
        f.visuals.remove(f.key).unwrap();
        let other = f.scene.create_child(f.root).unwrap();
        let reused = f.visuals.insert(Visual::new(other, VisualKind::Markers));
        assert_eq!(reused.index(), f.key.index());

        assert_eq!(
            f.draw(&mut DrawScheduler::default()).unwrap_err(),
            RenderError::UnknownVisual(f.key)
        );
        assert_eq!(f.ctx.draw_calls(), 0);
    }

    #[test]
    fn nonlinear_path_is_rejected() {
        let mut f = Fixture::new();
        f.scene.set_transform(f.group, Transform::Polar).unwrap();
        assert!(matches!(
            f.draw(&mut DrawScheduler::default()),
            Err(RenderError::Scene(lamina_core::Error::NotMatrixRepresentable { .. }))
        ));
    }

    #[test]
    fn reparented_node_gets_a_fresh_chain() {
        let mut f = Fixture::new();
        let mut scheduler = DrawScheduler::default();
        f.draw(&mut scheduler).unwrap();
        f.scene.reparent(f.leaf, f.root).unwrap();
        f.scene
            .set_transform(f.group, Transform::translation(9.0, 0.0, 0.0))
            .unwrap();
        let plan = f.draw(&mut scheduler).unwrap();
        assert_eq!(plan.item(f.leaf).unwrap().world_transform[12], 0.0);
        assert_eq!(scheduler.chain(f.leaf).unwrap().links(), &[f.leaf]);
    }
}
