// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offscreen wgpu example: one of each built-in visual kind, rendered into a
//! texture and written out as `lamina.ppm`.
//!
//! Run with: `cargo run -p wgpu_offscreen`

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::sync::mpsc;

use lamina_backend_wgpu::WgpuContext;
use lamina_backend_wgpu::projection::pixel_ortho;
use lamina_core::transform::Transform;
use lamina_render::{AttributeValue, Canvas, VisualKind};

const SIZE: u32 = 256;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn main() {
    // --- Device ---
    let instance = wgpu::Instance::default();
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .expect("no suitable adapter");
    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("lamina offscreen"),
        ..wgpu::DeviceDescriptor::default()
    }))
    .expect("failed to create device");

    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen target"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let mut ctx = WgpuContext::new(device, queue, FORMAT);
    ctx.set_projection(pixel_ortho(SIZE as f32, SIZE as f32));

    // --- Scene ---
    let mut canvas = Canvas::default();
    let root = canvas.root();

    let (tri, mesh) = canvas
        .add_visual(root, VisualKind::Mesh)
        .expect("root is live");
    canvas
        .set_attribute(
            mesh,
            "vertices",
            vec![[0.0, 0.0, 0.0], [80.0, 0.0, 0.0], [40.0, 70.0, 0.0]],
        )
        .expect("valid vertices");
    canvas
        .set_attribute(mesh, "faces", vec![[0_u32, 1, 2]])
        .expect("valid faces");
    canvas
        .set_attribute(mesh, "color", [0.95, 0.26, 0.21, 1.0])
        .expect("valid color");
    canvas
        .set_transform(tri, Transform::translation(20.0, 20.0, 0.0))
        .expect("mesh node is live");

    let (disc, ellipse) = canvas
        .add_visual(root, VisualKind::Ellipse)
        .expect("root is live");
    canvas
        .set_attribute(ellipse, "radius", [50.0, 30.0])
        .expect("valid radius");
    canvas
        .set_attribute(ellipse, "color", [0.13, 0.59, 0.95, 0.9])
        .expect("valid color");
    canvas
        .set_attribute(ellipse, "border_color", [1.0, 1.0, 1.0, 1.0])
        .expect("valid color");
    canvas
        .set_transform(disc, Transform::translation(180.0, 70.0, 0.0))
        .expect("ellipse node is live");

    let (_, line) = canvas
        .add_visual(root, VisualKind::Line)
        .expect("root is live");
    canvas
        .set_attribute(
            line,
            "positions",
            (0..16)
                .map(|i| {
                    let x = 16.0 + i as f32 * 14.0;
                    let y = 150.0 + if i % 2 == 0 { 0.0 } else { 20.0 };
                    [x, y, 0.0]
                })
                .collect::<Vec<_>>(),
        )
        .expect("valid positions");
    canvas
        .set_attribute(line, "color", [0.30, 0.69, 0.31, 1.0])
        .expect("valid color");

    let (badge, image) = canvas
        .add_visual(root, VisualKind::Image)
        .expect("root is live");
    canvas
        .set_attribute(image, "pixels", checkerboard(8))
        .expect("valid pixels");
    canvas
        .set_attribute(image, "size", [64.0, 64.0])
        .expect("valid size");
    canvas
        .set_transform(badge, Transform::translation(170.0, 180.0, 0.0))
        .expect("image node is live");

    // --- Draw ---
    let plan = canvas.draw(&mut ctx).expect("frame failed");
    ctx.render(&view, wgpu::Color {
        r: 0.12,
        g: 0.12,
        b: 0.15,
        a: 1.0,
    })
    .expect("render failed");
    println!(
        "drew {} visuals with {} draw calls ({} bytes uploaded)",
        plan.stats.visuals_drawn, plan.stats.draw_calls, plan.stats.bytes_uploaded
    );

    // --- Read back ---
    let pixels = read_back(&ctx, &target);
    let file = File::create("lamina.ppm").expect("failed to create lamina.ppm");
    let mut out = BufWriter::new(file);
    write!(out, "P6\n{SIZE} {SIZE}\n255\n").expect("write failed");
    for px in pixels.chunks_exact(4) {
        out.write_all(&px[..3]).expect("write failed");
    }
    println!("Wrote lamina.ppm ({SIZE}x{SIZE})");
}

/// An 8-bit RGBA checkerboard of `n`x`n` texels.
fn checkerboard(n: u32) -> AttributeValue {
    let mut rgba = Vec::with_capacity((n * n * 4) as usize);
    for y in 0..n {
        for x in 0..n {
            let on = (x + y) % 2 == 0;
            rgba.extend_from_slice(if on { &[255, 193, 7, 255] } else { &[40, 40, 48, 255] });
        }
    }
    AttributeValue::Pixels {
        width: n,
        height: n,
        rgba,
    }
}

/// Copies `texture` into a mappable buffer and returns its tightly packed
/// RGBA rows.
fn read_back(ctx: &WgpuContext, texture: &wgpu::Texture) -> Vec<u8> {
    let device = ctx.device();
    let unpadded = SIZE * 4;
    let padded = unpadded.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size: u64::from(padded) * u64::from(SIZE),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(SIZE),
            },
        },
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
    );
    ctx.queue().submit(Some(encoder.finish()));

    let slice = buffer.slice(..);
    let (sender, receiver) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .expect("device poll failed");
    receiver
        .recv()
        .expect("map callback dropped")
        .expect("buffer mapping failed");

    let mapped = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((unpadded * SIZE) as usize);
    for row in mapped.chunks_exact(padded as usize) {
        pixels.extend_from_slice(&row[..unpadded as usize]);
    }
    drop(mapped);
    buffer.unmap();
    pixels
}
