// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end frames against the headless context.

use lamina_core::transform::Transform;
use lamina_render::visual::HandleRole;
use lamina_render::{Canvas, Command, DrawConfig, HeadlessContext, RenderError, VisualKind};

fn triangle(canvas: &mut Canvas) -> (lamina_core::scene::NodeId, lamina_core::scene::VisualKey) {
    let (node, key) = canvas
        .add_visual(canvas.root(), VisualKind::Mesh)
        .unwrap();
    canvas
        .set_attribute(
            key,
            "vertices",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .unwrap();
    canvas.set_attribute(key, "faces", vec![[0_u32, 1, 2]]).unwrap();
    (node, key)
}

#[test]
fn child_transform_maps_into_root_space() {
    let mut ctx = HeadlessContext::new();
    let mut canvas = Canvas::default();
    let (node, _) = triangle(&mut canvas);
    canvas
        .set_transform(
            node,
            Transform::scale_translate([2.0, 2.0, 1.0], [5.0, 5.0, 0.0]),
        )
        .unwrap();

    let mut chain = canvas.scene().transform_to(node, canvas.root()).unwrap();
    let scene = canvas.scene();
    assert_eq!(
        chain.map_through_chain(scene, [0.0, 0.0, 0.0]).unwrap(),
        [5.0, 5.0, 0.0]
    );
    assert_eq!(
        chain.map_through_chain(scene, [1.0, 0.0, 0.0]).unwrap(),
        [7.0, 5.0, 0.0]
    );

    let plan = canvas.draw(&mut ctx).unwrap();
    let m = plan.item(node).unwrap().world_transform;
    // Column-major: x' = 2x + 5, y' = 2y + 5.
    assert_eq!((m[0], m[12]), (2.0, 5.0));
    assert_eq!((m[5], m[13]), (2.0, 5.0));
}

#[test]
fn color_only_edit_keeps_geometry_synced() {
    let mut ctx = HeadlessContext::new();
    let mut canvas = Canvas::default();
    let (_, key) = triangle(&mut canvas);
    canvas.draw(&mut ctx).unwrap();

    canvas
        .set_attribute(key, "color", [1.0, 0.0, 0.0, 1.0])
        .unwrap();
    ctx.clear_commands();
    let plan = canvas.draw(&mut ctx).unwrap();

    let visual = canvas.visual(key).unwrap();
    assert!(visual.handle(HandleRole::Position).unwrap().is_synced());
    assert!(visual.handle(HandleRole::Color).unwrap().is_synced());
    let color_id = visual.handle(HandleRole::Color).unwrap().object().unwrap();
    let uploads: Vec<_> = ctx
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::Upload { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(uploads, [color_id]);
    assert_eq!(plan.stats.geometry_rebuilds, 0);
}

#[test]
fn aborted_frame_is_retried() {
    let mut ctx = HeadlessContext::new();
    let mut canvas = Canvas::default();
    let (node, _) = triangle(&mut canvas);

    ctx.fail_next_uploads(2);
    assert!(matches!(canvas.draw(&mut ctx), Err(RenderError::Context(_))));
    assert!(canvas.scene().is_dirty(node));
    assert!(matches!(canvas.draw(&mut ctx), Err(RenderError::Context(_))));

    let plan = canvas.draw(&mut ctx).unwrap();
    assert_eq!(plan.frame_index, 0);
    assert_eq!(plan.stats.draw_calls, 1);
    assert!(!canvas.scene().is_dirty(node));
    assert_eq!(canvas.scheduler().frame_index(), 1);
}

#[test]
fn sibling_order_is_draw_order() {
    let mut ctx = HeadlessContext::new();
    let mut canvas = Canvas::new(DrawConfig::strict());
    let root = canvas.root();
    let (back, _) = canvas.add_visual(root, VisualKind::Ellipse).unwrap();
    let group = canvas.add_group(root).unwrap();
    let (middle, _) = canvas.add_visual(group, VisualKind::Image).unwrap();
    let (front, _) = canvas.add_visual(root, VisualKind::Ellipse).unwrap();

    let plan = canvas.draw(&mut ctx).unwrap();
    let order: Vec<_> = plan.items.iter().map(|i| i.node).collect();
    assert_eq!(order, [back, middle, front]);

    let scene = canvas.scene_mut();
    scene.remove_child(root, front).unwrap();
    scene.insert_before(front, back).unwrap();
    let plan = canvas.draw(&mut ctx).unwrap();
    let order: Vec<_> = plan.items.iter().map(|i| i.node).collect();
    assert_eq!(order, [front, back, middle]);
}
