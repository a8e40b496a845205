// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless frame loop that exercises the tracing and diagnostics pipeline.
//!
//! Builds a small scene, animates it for 60 frames against a
//! [`HeadlessContext`], and reports every frame to both a
//! [`PrettyPrintSink`] and a [`RecorderSink`]. One frame has an injected
//! upload failure to show the abort path. The recording is exported as a
//! Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use lamina_core::transform::Transform;
use lamina_render::trace::{
    ChainRecomputeEvent, FrameAbortEvent, FrameBeginEvent, FrameSummary, GeometryRebuildEvent,
    NodeDrawnEvent, ResourceUploadEvent, TraceSink,
};
use lamina_render::{Canvas, DrawConfig, HeadlessContext, VisualKind};

use lamina_debug::pretty::PrettyPrintSink;
use lamina_debug::recorder::RecorderSink;

const FRAME_COUNT: u32 = 60;
/// Frame whose first upload fails.
const FAULT_FRAME: u32 = 30;

/// Forwards every event to two sinks.
struct Tee<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.a.on_frame_begin(e);
        self.b.on_frame_begin(e);
    }

    fn on_chain_recompute(&mut self, e: &ChainRecomputeEvent) {
        self.a.on_chain_recompute(e);
        self.b.on_chain_recompute(e);
    }

    fn on_geometry_rebuild(&mut self, e: &GeometryRebuildEvent) {
        self.a.on_geometry_rebuild(e);
        self.b.on_geometry_rebuild(e);
    }

    fn on_resource_upload(&mut self, e: &ResourceUploadEvent) {
        self.a.on_resource_upload(e);
        self.b.on_resource_upload(e);
    }

    fn on_node_drawn(&mut self, e: &NodeDrawnEvent) {
        self.a.on_node_drawn(e);
        self.b.on_node_drawn(e);
    }

    fn on_frame_abort(&mut self, e: &FrameAbortEvent) {
        self.a.on_frame_abort(e);
        self.b.on_frame_abort(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.a.on_frame_summary(s);
        self.b.on_frame_summary(s);
    }
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout())).verbose(true);
    let mut recorder = RecorderSink::new();

    // -- scene -------------------------------------------------------------
    let mut ctx = HeadlessContext::new();
    let mut canvas = Canvas::new(DrawConfig::interactive());
    let root = canvas.root();

    let orbit = canvas.add_group(root).expect("root is live");
    let (_, disc) = canvas
        .add_visual(orbit, VisualKind::Ellipse)
        .expect("group is live");
    canvas
        .set_attribute(disc, "radius", [40.0, 25.0])
        .expect("valid radius");
    canvas
        .set_attribute(disc, "border_color", [1.0, 1.0, 1.0, 1.0])
        .expect("valid color");

    let (_, dots) = canvas
        .add_visual(orbit, VisualKind::Markers)
        .expect("group is live");
    let (_, path) = canvas
        .add_visual(root, VisualKind::Line)
        .expect("root is live");
    canvas
        .set_attribute(path, "positions", ring(8, 60.0))
        .expect("valid positions");

    let (badge, _) = canvas
        .add_visual(root, VisualKind::Image)
        .expect("root is live");
    canvas
        .set_transform(badge, Transform::translation(100.0, 100.0, 0.0))
        .expect("badge is live");

    // -- frame loop --------------------------------------------------------
    for frame in 0..FRAME_COUNT {
        // Spin the orbit group; only its chain and its children's are stale.
        canvas
            .scene_mut()
            .update_transform(orbit, |t| t.rotate_z(0.05))
            .expect("orbit is live");

        // A color-only edit every 10 frames, a topology edit every 20.
        if frame % 10 == 0 {
            let shade = frame as f32 / FRAME_COUNT as f32;
            canvas
                .set_attribute(disc, "color", [shade, 0.4, 1.0 - shade, 1.0])
                .expect("valid color");
        }
        if frame % 20 == 0 {
            let count = 3 + frame / 20;
            canvas
                .set_attribute(dots, "positions", ring(count, 20.0))
                .expect("valid positions");
        }

        if frame == FAULT_FRAME {
            ctx.fail_next_uploads(1);
        }

        let mut sinks = Tee {
            a: &mut pretty,
            b: &mut recorder,
        };
        if let Err(err) = canvas.draw_traced(&mut ctx, &mut sinks) {
            println!("frame {frame} aborted: {err}");
        }
    }

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    lamina_debug::chrome::export(recorder.records(), &mut writer)
        .expect("failed to write Chrome trace");

    println!(
        "Wrote {path} ({} frames drawn, {} live GPU objects)",
        canvas.scheduler().frame_index(),
        ctx.live_objects()
    );
}

/// `count` points evenly spaced on a circle of `radius`.
fn ring(count: u32, radius: f32) -> Vec<[f32; 3]> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            [radius * angle.cos(), radius * angle.sin(), 0.0]
        })
        .collect()
}
