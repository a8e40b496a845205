// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily synchronized GPU resources.
//!
//! A [`GpuResource`] owns the authoritative bytes for one buffer or texture.
//! Writes touch only that local copy and bump a generation counter; the GPU
//! object is created and refreshed on [`bind`](GpuResource::bind), and only
//! when the generation it last uploaded is out of date.

use alloc::vec::Vec;

use crate::context::{BindTarget, GpuObjectId, GraphicsContext, ResourceKind};
use crate::error::RenderError;

/// What a [`GpuResource::bind`] call had to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BindOutcome {
    /// A new GPU object was allocated.
    pub created: bool,
    /// Bytes uploaded, `0` when the GPU copy was already current.
    pub uploaded: usize,
}

/// A buffer or texture with a CPU-side copy and lazy GPU synchronization.
///
/// `is_synced()` holds exactly when the GPU copy reflects the latest write.
/// Every write clears it; a bind restores it with one full upload.
#[derive(Debug)]
pub struct GpuResource {
    kind: ResourceKind,
    data: Vec<u8>,
    capacity: usize,
    resizable: bool,
    /// Texture extent; `(0, 0)` for buffers.
    extent: (u32, u32),
    generation: u64,
    gpu_generation: Option<u64>,
    object: Option<GpuObjectId>,
    /// The GPU object no longer matches the local size and must be replaced.
    recreate: bool,
    released: bool,
    upload_count: u64,
}

impl GpuResource {
    /// Creates a fixed-capacity buffer. Writes past `capacity` fail.
    #[must_use]
    pub fn fixed(kind: ResourceKind, capacity: usize) -> Self {
        Self::with_parts(kind, capacity, false)
    }

    /// Creates an empty buffer that grows to fit whatever is written.
    #[must_use]
    pub fn growable(kind: ResourceKind) -> Self {
        Self::with_parts(kind, 0, true)
    }

    /// Creates an empty RGBA8 texture. Use [`write_texture`](Self::write_texture)
    /// to fill it.
    #[must_use]
    pub fn texture() -> Self {
        Self::with_parts(ResourceKind::Texture, 0, true)
    }

    fn with_parts(kind: ResourceKind, capacity: usize, resizable: bool) -> Self {
        Self {
            kind,
            data: alloc::vec![0; capacity],
            capacity,
            resizable,
            extent: (0, 0),
            generation: 0,
            gpu_generation: None,
            object: None,
            recreate: false,
            released: false,
            upload_count: 0,
        }
    }

    /// What the resource holds.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The authoritative local bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Current size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the resource holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Texture extent in texels; `(0, 0)` for buffers.
    #[must_use]
    pub fn extent(&self) -> (u32, u32) {
        self.extent
    }

    /// Local generation, bumped by every write.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if the GPU copy matches the local generation.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.gpu_generation == Some(self.generation) && !self.recreate
    }

    /// Returns `true` once [`release`](Self::release) has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// The GPU object, once created by a bind.
    #[must_use]
    pub fn object(&self) -> Option<GpuObjectId> {
        self.object
    }

    /// How many uploads this resource has performed.
    #[must_use]
    pub fn upload_count(&self) -> u64 {
        self.upload_count
    }

    /// Copies `bytes` into the local buffer at `offset`.
    ///
    /// A growable resource extends to fit and schedules its GPU object for
    /// replacement, forcing a full resync.
    ///
    /// # Errors
    ///
    /// - [`RenderError::Released`] after release.
    /// - [`RenderError::SizeMismatch`] if a fixed resource is too small. The
    ///   local data is unchanged.
    pub fn write(&mut self, bytes: &[u8], offset: usize) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released(self.kind));
        }
        let required = offset + bytes.len();
        if required > self.capacity {
            if !self.resizable {
                return Err(RenderError::SizeMismatch {
                    kind: self.kind,
                    capacity: self.capacity,
                    required,
                });
            }
            self.data.resize(required, 0);
            self.capacity = required;
            self.recreate = true;
        }
        self.data[offset..required].copy_from_slice(bytes);
        self.generation += 1;
        Ok(())
    }

    /// Replaces the whole contents. A growable resource also shrinks to the
    /// new length.
    ///
    /// # Errors
    ///
    /// Same as [`write`](Self::write).
    pub fn replace(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        if self.resizable && !self.released && bytes.len() != self.data.len() {
            self.data.clear();
            self.capacity = 0;
        }
        self.write(bytes, 0)
    }

    /// Replaces the texels of a texture. A change of extent replaces the
    /// GPU texture.
    ///
    /// # Errors
    ///
    /// - [`RenderError::Released`] after release.
    /// - [`RenderError::SizeMismatch`] if `rgba` is not `width * height * 4`
    ///   bytes.
    pub fn write_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released(self.kind));
        }
        let required = width as usize * height as usize * 4;
        if rgba.len() != required {
            return Err(RenderError::SizeMismatch {
                kind: self.kind,
                capacity: rgba.len(),
                required,
            });
        }
        if self.extent != (width, height) {
            self.extent = (width, height);
            self.recreate = true;
        }
        self.data.clear();
        self.data.extend_from_slice(rgba);
        self.capacity = required;
        self.generation += 1;
        Ok(())
    }

    /// Flags the GPU copy as out of date without touching the local bytes.
    ///
    /// Used when the owner will re-encode the contents before the next bind.
    /// Has no effect after release.
    pub fn mark_stale(&mut self) {
        if !self.released {
            self.generation += 1;
        }
    }

    /// Makes the GPU copy current and attaches it to `target`.
    ///
    /// Creates the GPU object on first use (or after a resize), uploads the
    /// full local buffer when out of date, then binds. Binding a synced
    /// resource again only binds.
    ///
    /// If the upload fails the resource stays unsynced and the next bind
    /// retries.
    ///
    /// # Errors
    ///
    /// [`RenderError::Released`] after release, or whatever the context
    /// reports.
    pub fn bind(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        target: BindTarget,
    ) -> Result<BindOutcome, RenderError> {
        if self.released {
            return Err(RenderError::Released(self.kind));
        }
        let mut outcome = BindOutcome::default();

        let object = match (self.object, self.recreate) {
            (Some(object), false) => object,
            (stale, _) => {
                if let Some(old) = stale {
                    ctx.destroy(old);
                    self.object = None;
                }
                let object = match self.kind {
                    ResourceKind::Texture => ctx.create_texture(self.extent.0, self.extent.1)?,
                    kind => ctx.create_buffer(kind, self.data.len())?,
                };
                self.object = Some(object);
                self.recreate = false;
                self.gpu_generation = None;
                outcome.created = true;
                object
            }
        };

        if self.gpu_generation != Some(self.generation) {
            ctx.upload(object, 0, &self.data)?;
            self.gpu_generation = Some(self.generation);
            self.upload_count += 1;
            outcome.uploaded = self.data.len();
        }

        ctx.bind(object, target)?;
        Ok(outcome)
    }

    /// Frees the GPU object. Must be called exactly once.
    ///
    /// # Errors
    ///
    /// [`RenderError::DoubleRelease`] on a second call; the first release
    /// stands.
    pub fn release(&mut self, ctx: &mut dyn GraphicsContext) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::DoubleRelease(self.kind));
        }
        if let Some(object) = self.object.take() {
            ctx.destroy(object);
        }
        self.released = true;
        self.gpu_generation = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{Command, HeadlessContext};

    #[test]
    fn bind_uploads_once_per_write() {
        let mut ctx = HeadlessContext::new();
        let mut res = GpuResource::fixed(ResourceKind::Vertex, 8);
        res.write(&[1, 2, 3, 4], 0).unwrap();
        assert!(!res.is_synced());

        let first = res.bind(&mut ctx, BindTarget::Vertex(0)).unwrap();
        assert!(first.created);
        assert_eq!(first.uploaded, 8);
        let second = res.bind(&mut ctx, BindTarget::Vertex(0)).unwrap();
        assert_eq!(second, BindOutcome::default());
        assert!(res.is_synced());

        let id = res.object().unwrap();
        assert_eq!(ctx.uploads_to(id), 1);

        res.write(&[9; 4], 4).unwrap();
        assert!(!res.is_synced());
        res.bind(&mut ctx, BindTarget::Vertex(0)).unwrap();
        res.bind(&mut ctx, BindTarget::Vertex(0)).unwrap();
        assert_eq!(ctx.uploads_to(id), 2);
        assert_eq!(ctx.contents(id), Some(&[1, 2, 3, 4, 9, 9, 9, 9][..]));
    }

    #[test]
    fn mark_stale_forces_one_reupload() {
        let mut ctx = HeadlessContext::new();
        let mut res = GpuResource::fixed(ResourceKind::Vertex, 4);
        res.write(&[7; 4], 0).unwrap();
        res.bind(&mut ctx, BindTarget::Vertex(0)).unwrap();
        assert!(res.is_synced());

        res.mark_stale();
        assert!(!res.is_synced());
        assert_eq!(res.data(), &[7; 4]);
        let outcome = res.bind(&mut ctx, BindTarget::Vertex(0)).unwrap();
        assert!(!outcome.created);
        assert_eq!(outcome.uploaded, 4);
        assert!(res.is_synced());
        assert_eq!(res.upload_count(), 2);
    }

    #[test]
    fn fixed_resource_rejects_overflow() {
        let mut res = GpuResource::fixed(ResourceKind::Uniform, 16);
        let generation = res.generation();
        assert_eq!(
            res.write(&[0; 8], 12),
            Err(RenderError::SizeMismatch {
                kind: ResourceKind::Uniform,
                capacity: 16,
                required: 20,
            })
        );
        assert_eq!(res.generation(), generation);
        assert_eq!(res.len(), 16);
    }

    #[test]
    fn growing_recreates_the_gpu_object() {
        let mut ctx = HeadlessContext::new();
        let mut res = GpuResource::growable(ResourceKind::Index);
        res.write(&[1; 4], 0).unwrap();
        res.bind(&mut ctx, BindTarget::Index).unwrap();
        let old = res.object().unwrap();

        res.write(&[2; 4], 4).unwrap();
        let outcome = res.bind(&mut ctx, BindTarget::Index).unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.uploaded, 8);
        let new = res.object().unwrap();
        assert_ne!(old, new);
        assert!(ctx.commands().contains(&Command::Destroy(old)));
        assert_eq!(ctx.contents(new), Some(&[1, 1, 1, 1, 2, 2, 2, 2][..]));
    }

    #[test]
    fn replace_shrinks_growable_buffers() {
        let mut res = GpuResource::growable(ResourceKind::Vertex);
        res.replace(&[1; 12]).unwrap();
        res.replace(&[2; 4]).unwrap();
        assert_eq!(res.data(), &[2; 4]);
    }

    #[test]
    fn double_release_is_reported() {
        let mut ctx = HeadlessContext::new();
        let mut res = GpuResource::growable(ResourceKind::Vertex);
        res.write(&[0; 4], 0).unwrap();
        res.bind(&mut ctx, BindTarget::Vertex(0)).unwrap();

        res.release(&mut ctx).unwrap();
        assert_eq!(ctx.live_objects(), 0);
        assert_eq!(
            res.release(&mut ctx),
            Err(RenderError::DoubleRelease(ResourceKind::Vertex))
        );
        assert!(res.is_released());
        assert_eq!(ctx.live_objects(), 0);
        assert_eq!(
            res.write(&[0; 4], 0),
            Err(RenderError::Released(ResourceKind::Vertex))
        );
        assert_eq!(
            res.bind(&mut ctx, BindTarget::Vertex(0)),
            Err(RenderError::Released(ResourceKind::Vertex))
        );
    }

    #[test]
    fn failed_upload_is_retried() {
        let mut ctx = HeadlessContext::new();
        let mut res = GpuResource::growable(ResourceKind::Vertex);
        res.write(&[7; 4], 0).unwrap();
        ctx.fail_next_uploads(1);
        assert!(res.bind(&mut ctx, BindTarget::Vertex(0)).is_err());
        assert!(!res.is_synced());

        let outcome = res.bind(&mut ctx, BindTarget::Vertex(0)).unwrap();
        assert!(!outcome.created);
        assert_eq!(outcome.uploaded, 4);
        assert!(res.is_synced());
    }

    #[test]
    fn texture_extent_change_recreates() {
        let mut ctx = HeadlessContext::new();
        let mut tex = GpuResource::texture();
        tex.write_texture(1, 1, &[255; 4]).unwrap();
        tex.bind(&mut ctx, BindTarget::Texture(2)).unwrap();
        let first = tex.object().unwrap();

        tex.write_texture(1, 1, &[0; 4]).unwrap();
        assert!(!tex.bind(&mut ctx, BindTarget::Texture(2)).unwrap().created);
        assert_eq!(tex.object(), Some(first));

        tex.write_texture(2, 1, &[0; 8]).unwrap();
        assert!(tex.bind(&mut ctx, BindTarget::Texture(2)).unwrap().created);
        assert_eq!(tex.extent(), (2, 1));
        assert!(matches!(
            tex.write_texture(2, 2, &[0; 4]),
            Err(RenderError::SizeMismatch { .. })
        ));
    }
}
