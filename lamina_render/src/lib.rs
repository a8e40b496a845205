// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU resource handles, visuals, and the draw scheduler for Lamina.
//!
//! This crate sits between [`lamina_core`]'s scene tree and a graphics device.
//! It never calls a native API itself; everything goes through the
//! [`GraphicsContext`] trait.
//!
//! # Architecture
//!
//! ```text
//!   Visual::set_attribute ──► dirty handle roles (no GPU work)
//!                                 │
//!   DrawScheduler::draw           ▼
//!     draw_order ─► chain ─► Visual::update ─► GpuResource::bind ─► draw_call
//!                                               (upload iff stale)
//! ```
//!
//! - [`GpuResource`]: a buffer or texture with an authoritative CPU copy,
//!   uploaded lazily on bind.
//! - [`Visual`]: a typed attribute bag ([`Shape`]) plus the handles derived
//!   from it. Mesh, ellipse, markers, line and image kinds are built in.
//! - [`DrawScheduler`]: the per-frame traversal producing a [`DrawPlan`].
//! - [`Canvas`]: owns a scene, its visuals and a scheduler.
//! - [`HeadlessContext`]: a recording context for tests and offline use.
//! - [`trace`]: the [`TraceSink`](trace::TraceSink) hooks the scheduler
//!   reports to.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables [`Tracer`](trace::Tracer)
//!   dispatch.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod canvas;
mod config;
mod context;
mod error;
mod headless;
mod plan;
mod resource;
mod scheduler;
pub mod trace;
pub mod visual;

pub use canvas::Canvas;
pub use config::DrawConfig;
pub use context::{
    BindTarget, DrawCall, GpuObjectId, GraphicsContext, Primitive, ProgramId, ProgramKind,
    ResourceKind,
};
pub use error::{AttributeIssue, RenderError};
pub use headless::{Command, HeadlessContext};
pub use plan::{DrawItem, DrawPlan, FrameStats};
pub use resource::{BindOutcome, GpuResource};
pub use scheduler::DrawScheduler;
pub use visual::{AttributeValue, Shape, Visual, VisualKind, Visuals};
