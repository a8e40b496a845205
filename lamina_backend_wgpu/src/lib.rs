// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! wgpu backend for Lamina.
//!
//! [`WgpuContext`] implements [`GraphicsContext`](lamina_render::GraphicsContext)
//! on a caller-provided `wgpu::Device` and `wgpu::Queue`:
//!
//! - Buffers and RGBA8 textures are device objects. Uploads go through the
//!   queue.
//! - The two built-in programs are WGSL pipelines, one per primitive
//!   topology.
//! - Draw calls are recorded and replayed into a render pass by
//!   [`WgpuContext::render`]. Per-draw transforms live in one
//!   dynamic-offset uniform buffer.
//!
//! The context does not own a surface. Render into a surface texture view
//! or an offscreen target alike.

mod context;
mod pipeline;
pub mod projection;

pub use context::WgpuContext;
