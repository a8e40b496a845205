// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`WgpuContext`]: a [`GraphicsContext`] on a wgpu device.

use std::collections::HashMap;
use std::ops::Range;

use lamina_render::{
    BindTarget, DrawCall, GpuObjectId, GraphicsContext, Primitive, ProgramId, ProgramKind,
    RenderError, ResourceKind,
};

use crate::pipeline::{Layouts, MATRIX_SIZE, Program};
use crate::projection::{self, IDENTITY};

/// Buffer sizes and write lengths must be multiples of this.
const COPY_ALIGN: u64 = wgpu::COPY_BUFFER_ALIGNMENT;

#[derive(Debug)]
enum Object {
    Buffer {
        buffer: wgpu::Buffer,
        kind: ResourceKind,
        size: u64,
    },
    Texture {
        texture: wgpu::Texture,
        view: wgpu::TextureView,
        width: u32,
        height: u32,
    },
}

impl Object {
    fn kind(&self) -> ResourceKind {
        match self {
            Self::Buffer { kind, .. } => *kind,
            Self::Texture { .. } => ResourceKind::Texture,
        }
    }
}

/// Currently bound objects, in [`BindTarget`] terms.
#[derive(Clone, Copy, Debug, Default)]
struct Bindings {
    vertex: [Option<GpuObjectId>; 2],
    index: Option<GpuObjectId>,
    style: Option<GpuObjectId>,
    texture: Option<GpuObjectId>,
    transform: Option<u32>,
}

/// A validated draw waiting for [`WgpuContext::render`].
#[derive(Clone, Debug)]
struct RecordedDraw {
    program: ProgramKind,
    primitive: Primitive,
    vertex: [GpuObjectId; 2],
    index: GpuObjectId,
    style: Option<(GpuObjectId, GpuObjectId)>,
    transform: u32,
    indices: Range<u32>,
}

/// A [`GraphicsContext`] backed by wgpu.
///
/// Object creation and uploads go straight to the device and queue. Binds,
/// transforms and draw calls are recorded and replayed into a single render
/// pass by [`render`](Self::render). Uploads are queued immediately, so the
/// last upload to an object before `render` is what every recorded draw
/// sees.
///
/// Root-space coordinates are mapped to clip space by the projection set with
/// [`set_projection`](Self::set_projection) (identity by default).
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    layouts: Layouts,
    sampler: wgpu::Sampler,
    programs: [Option<Program>; ProgramKind::COUNT],
    objects: HashMap<GpuObjectId, Object>,
    next_id: u64,
    projection: [f32; 16],
    bindings: Bindings,
    transforms: Vec<[f32; 16]>,
    draws: Vec<RecordedDraw>,
    transform_buffer: Option<wgpu::Buffer>,
}

impl std::fmt::Debug for WgpuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuContext")
            .field("format", &self.format)
            .field("objects", &self.objects.len())
            .field("pending_draws", &self.draws.len())
            .finish_non_exhaustive()
    }
}

impl WgpuContext {
    /// Creates a context drawing into targets of the given `format`.
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let layouts = Layouts::new(&device);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lamina image sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..wgpu::SamplerDescriptor::default()
        });
        Self {
            device,
            queue,
            format,
            layouts,
            sampler,
            programs: [None, None],
            objects: HashMap::new(),
            next_id: 0,
            projection: IDENTITY,
            bindings: Bindings::default(),
            transforms: Vec::new(),
            draws: Vec::new(),
            transform_buffer: None,
        }
    }

    /// The device objects are created on.
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// The queue uploads and passes are submitted to.
    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// The color target format pipelines are built for.
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Sets the root-to-clip matrix (column-major) applied to every
    /// subsequent [`set_transform`](GraphicsContext::set_transform).
    pub fn set_projection(&mut self, matrix: [f32; 16]) {
        self.projection = matrix;
    }

    /// Number of draws recorded since the last [`render`](Self::render).
    #[must_use]
    pub fn pending_draws(&self) -> usize {
        self.draws.len()
    }

    /// Number of live buffers and textures.
    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    /// Replays the recorded draws into one render pass over `target`, cleared
    /// to `clear` first, and submits it.
    ///
    /// The recording is consumed even on failure. Bindings persist.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownObject`] if an object used by a recorded draw
    /// was destroyed before the pass.
    pub fn render(&mut self, target: &wgpu::TextureView, clear: wgpu::Color) -> Result<(), RenderError> {
        let draws = std::mem::take(&mut self.draws);
        let transforms = std::mem::take(&mut self.transforms);
        self.bindings.transform = None;

        let stride = self.transform_stride();
        let transform_group = if transforms.is_empty() {
            None
        } else {
            Some(self.write_transforms(&transforms, stride))
        };

        let mut style_groups = HashMap::new();
        for draw in &draws {
            if let Some(pair) = draw.style
                && !style_groups.contains_key(&pair)
            {
                let group = self.style_group(pair.0, pair.1)?;
                style_groups.insert(pair, group);
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lamina frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lamina pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in &draws {
                let program = self.programs[draw.program.index()]
                    .as_ref()
                    .ok_or_else(|| RenderError::Context(format!("{:?} program missing", draw.program)))?;
                pass.set_pipeline(program.pipeline(draw.primitive));
                if let Some(group) = &transform_group {
                    #[expect(
                        clippy::cast_possible_truncation,
                        reason = "dynamic offsets are bounded by the device's buffer size limit"
                    )]
                    let offset = (u64::from(draw.transform) * stride) as u32;
                    pass.set_bind_group(0, group, &[offset]);
                }
                if let Some(pair) = draw.style
                    && let Some(group) = style_groups.get(&pair)
                {
                    pass.set_bind_group(1, group, &[]);
                }
                for (slot, id) in (0_u32..).zip(draw.vertex) {
                    pass.set_vertex_buffer(slot, self.buffer(id)?.slice(..));
                }
                pass.set_index_buffer(self.buffer(draw.index)?.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(draw.indices.clone(), 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn transform_stride(&self) -> u64 {
        let align = u64::from(self.device.limits().min_uniform_buffer_offset_alignment);
        MATRIX_SIZE.div_ceil(align) * align
    }

    fn write_transforms(&mut self, transforms: &[[f32; 16]], stride: u64) -> wgpu::BindGroup {
        let needed = stride * transforms.len() as u64;
        if self
            .transform_buffer
            .as_ref()
            .is_some_and(|b| b.size() < needed)
        {
            self.transform_buffer = None;
        }
        let device = &self.device;
        let buffer = self.transform_buffer.get_or_insert_with(|| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("lamina transforms"),
                size: needed.next_power_of_two(),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        #[expect(
            clippy::cast_possible_truncation,
            reason = "stride is a small multiple of the offset alignment"
        )]
        let stride_bytes = stride as usize;
        let mut staging = vec![0_u8; stride_bytes * transforms.len()];
        for (chunk, m) in staging.chunks_exact_mut(stride_bytes).zip(transforms) {
            chunk[..64].copy_from_slice(bytemuck::cast_slice(m));
        }
        self.queue.write_buffer(buffer, 0, &staging);

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lamina transforms"),
            layout: &self.layouts.transform,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(MATRIX_SIZE),
                }),
            }],
        })
    }

    fn style_group(&self, style: GpuObjectId, texture: GpuObjectId) -> Result<wgpu::BindGroup, RenderError> {
        let style_buffer = self.buffer(style)?;
        let Some(Object::Texture { view, .. }) = self.objects.get(&texture) else {
            return Err(RenderError::UnknownObject(texture));
        };
        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lamina style"),
            layout: &self.layouts.style,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: style_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }))
    }

    fn buffer(&self, id: GpuObjectId) -> Result<&wgpu::Buffer, RenderError> {
        match self.objects.get(&id) {
            Some(Object::Buffer { buffer, .. }) => Ok(buffer),
            _ => Err(RenderError::UnknownObject(id)),
        }
    }

    fn allocate(&mut self, object: Object) -> GpuObjectId {
        let id = GpuObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, object);
        id
    }

    fn program_kind(id: ProgramId) -> Result<ProgramKind, RenderError> {
        match id.0 {
            0 => Ok(ProgramKind::Colored),
            1 => Ok(ProgramKind::Textured),
            _ => Err(RenderError::Context(format!("unknown program {id:?}"))),
        }
    }
}

impl GraphicsContext for WgpuContext {
    fn create_buffer(&mut self, kind: ResourceKind, size: usize) -> Result<GpuObjectId, RenderError> {
        let usage = match kind {
            ResourceKind::Vertex => wgpu::BufferUsages::VERTEX,
            ResourceKind::Index => wgpu::BufferUsages::INDEX,
            ResourceKind::Uniform => wgpu::BufferUsages::UNIFORM,
            ResourceKind::Texture => {
                return Err(RenderError::Context(
                    "textures are created with create_texture".into(),
                ));
            }
        };
        let size = padded_size(size);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lamina buffer"),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Ok(self.allocate(Object::Buffer { buffer, kind, size }))
    }

    fn create_texture(&mut self, width: u32, height: u32) -> Result<GpuObjectId, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::Context(format!("empty texture {width}x{height}")));
        }
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lamina texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(self.allocate(Object::Texture {
            texture,
            view,
            width,
            height,
        }))
    }

    fn create_program(&mut self, kind: ProgramKind) -> Result<ProgramId, RenderError> {
        let slot = &mut self.programs[kind.index()];
        if slot.is_none() {
            *slot = Some(Program::new(&self.device, self.format, &self.layouts, kind));
        }
        #[expect(clippy::cast_possible_truncation, reason = "two built-in programs")]
        Ok(ProgramId(kind.index() as u32))
    }

    fn upload(&mut self, object: GpuObjectId, offset: usize, data: &[u8]) -> Result<(), RenderError> {
        match self
            .objects
            .get(&object)
            .ok_or(RenderError::UnknownObject(object))?
        {
            Object::Buffer { buffer, kind, size } => {
                let offset = offset as u64;
                if offset % COPY_ALIGN != 0 {
                    return Err(RenderError::Context(format!(
                        "unaligned upload offset {offset} into {kind:?} buffer"
                    )));
                }
                let padded = padded_size(data.len());
                if offset + padded > *size {
                    return Err(RenderError::Context(format!(
                        "upload of {} bytes overflows {kind:?} buffer of {size} bytes",
                        offset + padded
                    )));
                }
                if data.is_empty() {
                    return Ok(());
                }
                if data.len() as u64 == padded {
                    self.queue.write_buffer(buffer, offset, data);
                } else {
                    let mut staging = data.to_vec();
                    #[expect(
                        clippy::cast_possible_truncation,
                        reason = "padded length fits the allocation it came from"
                    )]
                    staging.resize(padded as usize, 0);
                    self.queue.write_buffer(buffer, offset, &staging);
                }
                Ok(())
            }
            Object::Texture {
                texture,
                width,
                height,
                ..
            } => {
                let expected = *width as usize * *height as usize * 4;
                if offset != 0 || data.len() != expected {
                    return Err(RenderError::Context(format!(
                        "texture upload must cover {width}x{height} texels exactly"
                    )));
                }
                self.queue.write_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    data,
                    wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(width * 4),
                        rows_per_image: Some(*height),
                    },
                    wgpu::Extent3d {
                        width: *width,
                        height: *height,
                        depth_or_array_layers: 1,
                    },
                );
                Ok(())
            }
        }
    }

    fn bind(&mut self, object: GpuObjectId, target: BindTarget) -> Result<(), RenderError> {
        let kind = self
            .objects
            .get(&object)
            .ok_or(RenderError::UnknownObject(object))?
            .kind();
        let slot = match (target, kind) {
            (BindTarget::Vertex(slot @ (0 | 1)), ResourceKind::Vertex) => {
                &mut self.bindings.vertex[slot as usize]
            }
            (BindTarget::Index, ResourceKind::Index) => &mut self.bindings.index,
            (BindTarget::Uniform(1), ResourceKind::Uniform) => &mut self.bindings.style,
            (BindTarget::Texture(2), ResourceKind::Texture) => &mut self.bindings.texture,
            _ => {
                return Err(RenderError::Context(format!(
                    "cannot bind {kind:?} object {object:?} to {target:?}"
                )));
            }
        };
        *slot = Some(object);
        Ok(())
    }

    fn set_transform(&mut self, matrix: &[f32; 16]) -> Result<(), RenderError> {
        let index = u32::try_from(self.transforms.len())
            .map_err(|_| RenderError::Context("too many transforms in one pass".into()))?;
        self.transforms
            .push(projection::multiply(&self.projection, matrix));
        self.bindings.transform = Some(index);
        Ok(())
    }

    fn draw_call(&mut self, call: &DrawCall) -> Result<(), RenderError> {
        let program = Self::program_kind(call.program)?;
        if self.programs[program.index()].is_none() {
            return Err(RenderError::Context(format!("{program:?} program not created")));
        }
        let b = self.bindings;
        let missing = |what: &str| RenderError::Context(format!("draw without {what} bound"));
        let [Some(position), Some(second)] = b.vertex else {
            return Err(missing("both vertex slots"));
        };
        let index = b.index.ok_or_else(|| missing("an index buffer"))?;
        let transform = b.transform.ok_or_else(|| missing("a transform"))?;
        let style = match program {
            ProgramKind::Colored => None,
            ProgramKind::Textured => Some((
                b.style.ok_or_else(|| missing("a style uniform"))?,
                b.texture.ok_or_else(|| missing("a texture"))?,
            )),
        };
        self.draws.push(RecordedDraw {
            program,
            primitive: call.primitive,
            vertex: [position, second],
            index,
            style,
            transform,
            indices: call.indices.clone(),
        });
        Ok(())
    }

    fn destroy(&mut self, object: GpuObjectId) {
        match self.objects.remove(&object) {
            Some(Object::Buffer { buffer, .. }) => buffer.destroy(),
            Some(Object::Texture { texture, .. }) => texture.destroy(),
            None => {}
        }
    }
}

/// Rounds a byte size up to [`COPY_ALIGN`], with a floor of one word.
pub(crate) fn padded_size(size: usize) -> u64 {
    (size as u64).max(COPY_ALIGN).next_multiple_of(COPY_ALIGN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sizes_round_up_to_copy_alignment() {
        assert_eq!(padded_size(0), 4);
        assert_eq!(padded_size(3), 4);
        assert_eq!(padded_size(12), 12);
        assert_eq!(padded_size(13), 16);
    }

    #[test]
    fn program_ids_round_trip_kinds() {
        for kind in [ProgramKind::Colored, ProgramKind::Textured] {
            #[expect(clippy::cast_possible_truncation, reason = "two built-in programs")]
            let id = ProgramId(kind.index() as u32);
            assert_eq!(WgpuContext::program_kind(id).unwrap(), kind);
        }
        assert!(WgpuContext::program_kind(ProgramId(7)).is_err());
    }
}
