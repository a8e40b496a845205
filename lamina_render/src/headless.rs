// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recording [`GraphicsContext`] with no GPU behind it.
//!
//! [`HeadlessContext`] keeps a CPU copy of every object and a log of every
//! command, which makes it the test double for resource and scheduler
//! behavior and the backend for headless demos.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;

use crate::context::{
    BindTarget, DrawCall, GpuObjectId, GraphicsContext, ProgramId, ProgramKind, ResourceKind,
};
use crate::error::RenderError;

/// One call made against a [`HeadlessContext`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// [`GraphicsContext::create_buffer`].
    CreateBuffer {
        /// Assigned id.
        id: GpuObjectId,
        /// Buffer kind.
        kind: ResourceKind,
        /// Requested size in bytes.
        size: usize,
    },
    /// [`GraphicsContext::create_texture`].
    CreateTexture {
        /// Assigned id.
        id: GpuObjectId,
        /// Width in texels.
        width: u32,
        /// Height in texels.
        height: u32,
    },
    /// [`GraphicsContext::create_program`], first request per kind only.
    CreateProgram {
        /// Assigned id.
        id: ProgramId,
        /// Program kind.
        kind: ProgramKind,
    },
    /// [`GraphicsContext::upload`].
    Upload {
        /// Target object.
        id: GpuObjectId,
        /// Byte offset.
        offset: usize,
        /// Bytes copied.
        len: usize,
    },
    /// [`GraphicsContext::bind`].
    Bind {
        /// Bound object.
        id: GpuObjectId,
        /// Attachment point.
        target: BindTarget,
    },
    /// [`GraphicsContext::set_transform`].
    SetTransform([f32; 16]),
    /// [`GraphicsContext::draw_call`].
    Draw(DrawCall),
    /// [`GraphicsContext::destroy`] on a live object.
    Destroy(GpuObjectId),
}

#[derive(Clone, Debug)]
struct Object {
    kind: ResourceKind,
    bytes: Vec<u8>,
}

/// A [`GraphicsContext`] that records commands and mirrors object contents in
/// memory.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    next_id: u64,
    objects: BTreeMap<GpuObjectId, Object>,
    programs: [Option<ProgramId>; ProgramKind::COUNT],
    commands: Vec<Command>,
    fail_uploads: u32,
}

impl HeadlessContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command recorded so far, in call order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drops the command log. Objects stay alive.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of live objects.
    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    /// Current contents of a live object.
    #[must_use]
    pub fn contents(&self, id: GpuObjectId) -> Option<&[u8]> {
        self.objects.get(&id).map(|o| o.bytes.as_slice())
    }

    /// Number of recorded uploads targeting `id`.
    #[must_use]
    pub fn uploads_to(&self, id: GpuObjectId) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Upload { id: target, .. } if *target == id))
            .count()
    }

    /// Number of recorded draw calls.
    #[must_use]
    pub fn draw_calls(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Draw(_)))
            .count()
    }

    /// Makes the next `n` uploads fail, to exercise frame-abort paths.
    pub fn fail_next_uploads(&mut self, n: u32) {
        self.fail_uploads = n;
    }

    fn allocate(&mut self, kind: ResourceKind, size: usize) -> GpuObjectId {
        let id = GpuObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            Object {
                kind,
                bytes: alloc::vec![0; size],
            },
        );
        id
    }
}

impl GraphicsContext for HeadlessContext {
    fn create_buffer(&mut self, kind: ResourceKind, size: usize) -> Result<GpuObjectId, RenderError> {
        let id = self.allocate(kind, size);
        self.commands.push(Command::CreateBuffer { id, kind, size });
        Ok(id)
    }

    fn create_texture(&mut self, width: u32, height: u32) -> Result<GpuObjectId, RenderError> {
        let id = self.allocate(ResourceKind::Texture, width as usize * height as usize * 4);
        self.commands.push(Command::CreateTexture { id, width, height });
        Ok(id)
    }

    fn create_program(&mut self, kind: ProgramKind) -> Result<ProgramId, RenderError> {
        if let Some(id) = self.programs[kind.index()] {
            return Ok(id);
        }
        #[expect(clippy::cast_possible_truncation, reason = "two built-in programs")]
        let id = ProgramId(kind.index() as u32);
        self.programs[kind.index()] = Some(id);
        self.commands.push(Command::CreateProgram { id, kind });
        Ok(id)
    }

    fn upload(&mut self, object: GpuObjectId, offset: usize, data: &[u8]) -> Result<(), RenderError> {
        if self.fail_uploads > 0 {
            self.fail_uploads -= 1;
            return Err(RenderError::Context(format!("injected upload failure for {object:?}")));
        }
        let obj = self
            .objects
            .get_mut(&object)
            .ok_or(RenderError::UnknownObject(object))?;
        let end = offset + data.len();
        if end > obj.bytes.len() {
            return Err(RenderError::Context(format!(
                "upload of {end} bytes overflows {:?} object of {} bytes",
                obj.kind,
                obj.bytes.len()
            )));
        }
        obj.bytes[offset..end].copy_from_slice(data);
        self.commands.push(Command::Upload {
            id: object,
            offset,
            len: data.len(),
        });
        Ok(())
    }

    fn bind(&mut self, object: GpuObjectId, target: BindTarget) -> Result<(), RenderError> {
        if !self.objects.contains_key(&object) {
            return Err(RenderError::UnknownObject(object));
        }
        self.commands.push(Command::Bind { id: object, target });
        Ok(())
    }

    fn set_transform(&mut self, matrix: &[f32; 16]) -> Result<(), RenderError> {
        self.commands.push(Command::SetTransform(*matrix));
        Ok(())
    }

    fn draw_call(&mut self, call: &DrawCall) -> Result<(), RenderError> {
        self.commands.push(Command::Draw(call.clone()));
        Ok(())
    }

    fn destroy(&mut self, object: GpuObjectId) {
        if self.objects.remove(&object).is_some() {
            self.commands.push(Command::Destroy(object));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_mirrors_bytes() {
        let mut ctx = HeadlessContext::new();
        let id = ctx.create_buffer(ResourceKind::Vertex, 8).unwrap();
        ctx.upload(id, 4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(ctx.contents(id), Some(&[0, 0, 0, 0, 1, 2, 3, 4][..]));
        assert_eq!(ctx.uploads_to(id), 1);
    }

    #[test]
    fn overflowing_upload_is_rejected() {
        let mut ctx = HeadlessContext::new();
        let id = ctx.create_buffer(ResourceKind::Index, 4).unwrap();
        assert!(matches!(
            ctx.upload(id, 2, &[0; 4]),
            Err(RenderError::Context(_))
        ));
    }

    #[test]
    fn destroyed_objects_are_unknown() {
        let mut ctx = HeadlessContext::new();
        let id = ctx.create_texture(2, 2).unwrap();
        ctx.destroy(id);
        ctx.destroy(id);
        assert_eq!(ctx.live_objects(), 0);
        assert_eq!(
            ctx.bind(id, BindTarget::Texture(2)),
            Err(RenderError::UnknownObject(id))
        );
        let destroys = ctx
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::Destroy(_)))
            .count();
        assert_eq!(destroys, 1);
    }

    #[test]
    fn programs_are_created_once_per_kind() {
        let mut ctx = HeadlessContext::new();
        let a = ctx.create_program(ProgramKind::Colored).unwrap();
        let b = ctx.create_program(ProgramKind::Colored).unwrap();
        let c = ctx.create_program(ProgramKind::Textured).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(ctx.commands().len(), 2);
    }

    #[test]
    fn injected_failures_are_consumed() {
        let mut ctx = HeadlessContext::new();
        let id = ctx.create_buffer(ResourceKind::Uniform, 4).unwrap();
        ctx.fail_next_uploads(1);
        assert!(ctx.upload(id, 0, &[1; 4]).is_err());
        assert!(ctx.upload(id, 0, &[1; 4]).is_ok());
    }
}
