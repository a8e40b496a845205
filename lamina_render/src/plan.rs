// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw plan: what one pass of the scheduler drew, in order.

use alloc::vec::Vec;

use lamina_core::scene::{NodeId, VisualKey};

use crate::context::DrawCall;

/// One visual drawn during a frame.
///
/// Items are produced in back-to-front order, matching the scene's draw
/// order.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    /// The node the visual hangs off.
    pub node: NodeId,
    /// The visual drawn.
    pub visual: VisualKey,
    /// Local-to-root transform (column-major 4x4).
    pub world_transform: [f32; 16],
    /// The draw calls issued, in order.
    pub draw_calls: Vec<DrawCall>,
}

/// Counters for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Nodes visited by the traversal.
    pub nodes_visited: u32,
    /// Visuals that issued at least one draw call.
    pub visuals_drawn: u32,
    /// Visuals skipped because they had nothing to draw.
    pub visuals_culled: u32,
    /// Draw calls issued.
    pub draw_calls: u32,
    /// Resource uploads performed while binding.
    pub uploads: u32,
    /// Bytes uploaded.
    pub bytes_uploaded: u64,
    /// Transform chains whose combined transform was rebuilt.
    pub chain_recomputes: u32,
    /// Visuals whose geometry was rebuilt.
    pub geometry_rebuilds: u32,
    /// Live nodes whose composite transform moved since the previous frame.
    pub nodes_moved: u32,
    /// Nodes destroyed since the previous frame.
    pub nodes_removed: u32,
}

/// An ordered record of a successful frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawPlan {
    /// Frame counter.
    pub frame_index: u64,
    /// Drawn visuals in back-to-front order.
    pub items: Vec<DrawItem>,
    /// Frame counters.
    pub stats: FrameStats,
}

impl DrawPlan {
    /// Creates an empty plan for the given frame.
    #[must_use]
    pub fn new(frame_index: u64) -> Self {
        Self {
            frame_index,
            items: Vec::new(),
            stats: FrameStats::default(),
        }
    }

    /// Returns the item drawn for `node`, if any.
    #[must_use]
    pub fn item(&self, node: NodeId) -> Option<&DrawItem> {
        self.items.iter().find(|i| i.node == node)
    }
}
