// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The graphics-context boundary.
//!
//! Everything in this crate talks to the GPU through [`GraphicsContext`].
//! Implementations own the native objects and hand out opaque
//! [`GpuObjectId`]s; the rest of the crate never interprets them.

use core::fmt;
use core::ops::Range;

use crate::error::RenderError;

/// An opaque handle to a context-managed buffer or texture.
///
/// Assigned by the context and passed back to it without interpretation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GpuObjectId(pub u64);

impl fmt::Debug for GpuObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GpuObjectId({})", self.0)
    }
}

/// An opaque handle to a context-managed shader program.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramId(pub u32);

impl fmt::Debug for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProgramId({})", self.0)
    }
}

/// What a GPU resource holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Per-vertex attribute data.
    Vertex,
    /// `u32` element indices.
    Index,
    /// RGBA8 texels.
    Texture,
    /// A uniform block.
    Uniform,
}

/// The built-in shader programs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Position (`vec3<f32>`) at vertex slot 0, RGBA color (`vec4<f32>`) at
    /// slot 1.
    Colored,
    /// Position at vertex slot 0, texture coordinate (`vec2<f32>`) at slot 1,
    /// a style uniform at binding 1 and a texture at binding 2.
    Textured,
}

impl ProgramKind {
    /// Number of built-in programs.
    pub const COUNT: usize = 2;

    /// Dense index for per-program tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Colored => 0,
            Self::Textured => 1,
        }
    }
}

/// Where a resource is attached for the next draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindTarget {
    /// Vertex buffer slot.
    Vertex(u32),
    /// The index buffer.
    Index,
    /// Uniform block binding.
    Uniform(u32),
    /// Texture binding.
    Texture(u32),
}

/// Primitive assembly for a draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Every three indices form a triangle.
    Triangles,
    /// Every two indices form a line segment.
    Lines,
}

/// A single indexed draw using whatever is currently bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawCall {
    /// Program to draw with.
    pub program: ProgramId,
    /// How indices are assembled.
    pub primitive: Primitive,
    /// Range into the bound index buffer.
    pub indices: Range<u32>,
}

/// A retained-mode graphics device.
///
/// Binding state (vertex slots, index buffer, uniforms, textures, and the
/// transform) persists across draw calls until rebound, as in a classic
/// OpenGL-style context.
pub trait GraphicsContext {
    /// Allocates a buffer of at least `size` bytes.
    ///
    /// # Errors
    ///
    /// Implementation-specific allocation failures.
    fn create_buffer(&mut self, kind: ResourceKind, size: usize) -> Result<GpuObjectId, RenderError>;

    /// Allocates an RGBA8 texture.
    ///
    /// # Errors
    ///
    /// Implementation-specific allocation failures.
    fn create_texture(&mut self, width: u32, height: u32) -> Result<GpuObjectId, RenderError>;

    /// Creates (or looks up) a built-in program.
    ///
    /// # Errors
    ///
    /// Implementation-specific compilation failures.
    fn create_program(&mut self, kind: ProgramKind) -> Result<ProgramId, RenderError>;

    /// Copies `data` into an object at byte `offset`. For textures the data
    /// always covers the whole image.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownObject`] for a destroyed or foreign id, or an
    /// implementation-specific failure.
    fn upload(&mut self, object: GpuObjectId, offset: usize, data: &[u8]) -> Result<(), RenderError>;

    /// Attaches an object for subsequent draw calls.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownObject`] for a destroyed or foreign id.
    fn bind(&mut self, object: GpuObjectId, target: BindTarget) -> Result<(), RenderError>;

    /// Sets the column-major local-to-root matrix for subsequent draw calls.
    ///
    /// # Errors
    ///
    /// Implementation-specific failures.
    fn set_transform(&mut self, matrix: &[f32; 16]) -> Result<(), RenderError>;

    /// Issues a draw call with the current bindings.
    ///
    /// # Errors
    ///
    /// Implementation-specific failures, e.g. missing bindings.
    fn draw_call(&mut self, call: &DrawCall) -> Result<(), RenderError>;

    /// Frees an object. Destroying an unknown id is a no-op.
    fn destroy(&mut self, object: GpuObjectId);
}
