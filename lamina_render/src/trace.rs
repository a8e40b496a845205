// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the draw pass.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`DrawScheduler`](crate::DrawScheduler) calls as it walks the scene. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies.

use lamina_core::transform::TransformKind;

use crate::context::ResourceKind;
use crate::plan::FrameStats;
use crate::visual::{HandleRole, VisualKind};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted before the traversal starts.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Slot index of the root node.
    pub root_index: u32,
    /// Nodes in the draw order.
    pub node_count: u32,
}

/// Emitted when a transform chain had to rebuild its combined transform.
#[derive(Clone, Copy, Debug)]
pub struct ChainRecomputeEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the chain's node.
    pub node_index: u32,
    /// Number of links folded.
    pub links: u32,
    /// Kind of the resulting transform.
    pub kind: TransformKind,
}

/// Emitted when a visual rebuilt its geometry.
#[derive(Clone, Copy, Debug)]
pub struct GeometryRebuildEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the visual's node.
    pub node_index: u32,
    /// Visual kind.
    pub kind: VisualKind,
    /// Element count after the rebuild.
    pub elements: u32,
}

/// Emitted for every upload a bind had to perform.
#[derive(Clone, Copy, Debug)]
pub struct ResourceUploadEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the owning node.
    pub node_index: u32,
    /// Handle role.
    pub role: HandleRole,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Bytes uploaded.
    pub bytes: u64,
}

/// Emitted after a visual's draw calls were issued.
#[derive(Clone, Copy, Debug)]
pub struct NodeDrawnEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the node.
    pub node_index: u32,
    /// Visual kind.
    pub kind: VisualKind,
    /// Draw calls issued.
    pub draw_calls: u32,
}

/// Emitted when a frame is abandoned because of an error.
#[derive(Clone, Copy, Debug)]
pub struct FrameAbortEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the node being drawn when the error occurred.
    pub node_index: u32,
}

/// Per-frame summary emitted at the end of a successful frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Counters collected during the frame.
    pub stats: FrameStats,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the draw pass.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called before the traversal starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called when a chain rebuilt its combined transform.
    fn on_chain_recompute(&mut self, e: &ChainRecomputeEvent) {
        _ = e;
    }

    /// Called when a visual rebuilt its geometry.
    fn on_geometry_rebuild(&mut self, e: &GeometryRebuildEvent) {
        _ = e;
    }

    /// Called for every upload.
    fn on_resource_upload(&mut self, e: &ResourceUploadEvent) {
        _ = e;
    }

    /// Called after a visual was drawn.
    fn on_node_drawn(&mut self, e: &NodeDrawnEvent) {
        _ = e;
    }

    /// Called when a frame is abandoned.
    fn on_frame_abort(&mut self, e: &FrameAbortEvent) {
        _ = e;
    }

    /// Called with the summary of a successful frame.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ChainRecomputeEvent`].
    #[inline]
    pub fn chain_recompute(&mut self, e: &ChainRecomputeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_chain_recompute(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`GeometryRebuildEvent`].
    #[inline]
    pub fn geometry_rebuild(&mut self, e: &GeometryRebuildEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_geometry_rebuild(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ResourceUploadEvent`].
    #[inline]
    pub fn resource_upload(&mut self, e: &ResourceUploadEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_resource_upload(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodeDrawnEvent`].
    #[inline]
    pub fn node_drawn(&mut self, e: &NodeDrawnEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_node_drawn(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameAbortEvent`].
    #[inline]
    pub fn frame_abort(&mut self, e: &FrameAbortEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_abort(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
