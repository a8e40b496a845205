// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in WGSL programs and their render pipelines.
//!
//! Both programs read the per-draw transform from group 0, binding 0 (a
//! dynamic-offset uniform). The textured program additionally reads group 1:
//! the style block at binding 1, the texture at binding 2 and its sampler at
//! binding 3.

use lamina_render::{Primitive, ProgramKind};

/// Byte size of one `mat4x4<f32>`.
pub(crate) const MATRIX_SIZE: u64 = 64;

const COLORED_SHADER: &str = r"
@group(0) @binding(0) var<uniform> transform: mat4x4<f32>;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = transform * vec4(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
";

const TEXTURED_SHADER: &str = r"
@group(0) @binding(0) var<uniform> transform: mat4x4<f32>;

struct Style {
    opacity: f32,
    pad0: f32,
    pad1: f32,
    pad2: f32,
}

@group(1) @binding(1) var<uniform> style: Style;
@group(1) @binding(2) var image: texture_2d<f32>;
@group(1) @binding(3) var image_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = transform * vec4(position, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(image, image_sampler, in.uv);
    return vec4(texel.rgb, texel.a * style.opacity);
}
";

/// Bind group layouts shared by every pipeline.
#[derive(Debug)]
pub(crate) struct Layouts {
    /// Group 0: the per-draw transform.
    pub(crate) transform: wgpu::BindGroupLayout,
    /// Group 1 of the textured program.
    pub(crate) style: wgpu::BindGroupLayout,
}

impl Layouts {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let transform = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lamina transform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(MATRIX_SIZE),
                },
                count: None,
            }],
        });
        let style = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lamina style layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        Self { transform, style }
    }
}

/// The two pipelines (triangles and lines) of one built-in program.
#[derive(Debug)]
pub(crate) struct Program {
    triangles: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
}

impl Program {
    pub(crate) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        layouts: &Layouts,
        kind: ProgramKind,
    ) -> Self {
        let (label, source, second_attribute) = match kind {
            ProgramKind::Colored => (
                "lamina colored",
                COLORED_SHADER,
                wgpu::VertexFormat::Float32x4,
            ),
            ProgramKind::Textured => (
                "lamina textured",
                TEXTURED_SHADER,
                wgpu::VertexFormat::Float32x2,
            ),
        };
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let group_layouts: &[&wgpu::BindGroupLayout] = match kind {
            ProgramKind::Colored => &[&layouts.transform],
            ProgramKind::Textured => &[&layouts.transform, &layouts.style],
        };
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: group_layouts,
            immediate_size: 0,
        });
        let build = |topology| {
            create_pipeline(
                device,
                format,
                &layout,
                &shader,
                label,
                second_attribute,
                topology,
            )
        };
        Self {
            triangles: build(wgpu::PrimitiveTopology::TriangleList),
            lines: build(wgpu::PrimitiveTopology::LineList),
        }
    }

    pub(crate) fn pipeline(&self, primitive: Primitive) -> &wgpu::RenderPipeline {
        match primitive {
            Primitive::Triangles => &self.triangles,
            Primitive::Lines => &self.lines,
        }
    }
}

/// Position (`Float32x3`) comes from slot 0, the second attribute from
/// slot 1. Both are tightly packed.
fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    label: &str,
    second_attribute: wgpu::VertexFormat,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: size_of::<[f32; 3]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    }],
                },
                wgpu::VertexBufferLayout {
                    array_stride: second_attribute.size(),
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: second_attribute,
                        offset: 0,
                        shader_location: 1,
                    }],
                },
            ],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            ..wgpu::PrimitiveState::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
