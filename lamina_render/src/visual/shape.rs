// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-kind state behind a [`Visual`](super::Visual).

use alloc::vec::Vec;
use core::ops::Range;

use super::attribute::{AttributeDescriptor, AttributeValue};
use super::role::{HandleRole, RoleSet};
use super::{ellipse::Ellipse, image::Image, line::Line, markers::Markers, mesh::Mesh};
use crate::context::{Primitive, ProgramKind};
use crate::error::AttributeIssue;

/// New contents for one handle.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Payload {
    /// Buffer bytes.
    Bytes(Vec<u8>),
    /// Texture texels.
    Texture {
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    },
}

impl Payload {
    pub(crate) fn cast<T: bytemuck::Pod>(items: &[T]) -> Self {
        Self::Bytes(bytemuck::cast_slice(items).to_vec())
    }
}

/// One draw issued for a visual: a primitive over a range of its indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawRange {
    /// Primitive assembly.
    pub primitive: Primitive,
    /// Range into the visual's index buffer.
    pub indices: Range<u32>,
}

/// Behavior every visual kind provides.
///
/// Attribute values reaching [`assign`](Self::assign) have already passed
/// descriptor validation; implementations only check cross-attribute
/// consistency and must leave their state untouched when they reject.
pub(crate) trait ShapeData {
    fn descriptors(&self) -> &'static [AttributeDescriptor];
    fn roles(&self) -> RoleSet;
    fn program(&self) -> ProgramKind;
    fn assign(&mut self, index: usize, value: AttributeValue) -> Result<(), AttributeIssue>;
    fn get(&self, index: usize) -> Option<AttributeValue>;
    fn encode(&self, role: HandleRole) -> Payload;
    fn draws(&self) -> Vec<DrawRange>;
    fn element_count(&self) -> usize;
}

/// The kind of a visual together with its attribute state.
#[derive(Clone, Debug)]
pub enum Shape {
    /// Triangle mesh.
    Mesh(Mesh),
    /// Filled and/or outlined ellipse or arc.
    Ellipse(Ellipse),
    /// Square point markers.
    Markers(Markers),
    /// Polyline or disjoint segments.
    Line(Line),
    /// Textured quad.
    Image(Image),
}

/// Kind tag of a [`Shape`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// See [`Shape::Mesh`].
    Mesh,
    /// See [`Shape::Ellipse`].
    Ellipse,
    /// See [`Shape::Markers`].
    Markers,
    /// See [`Shape::Line`].
    Line,
    /// See [`Shape::Image`].
    Image,
}

impl VisualKind {
    /// The attribute table for this kind.
    #[must_use]
    pub fn descriptors(self) -> &'static [AttributeDescriptor] {
        match self {
            Self::Mesh => Mesh::DESCRIPTORS,
            Self::Ellipse => Ellipse::DESCRIPTORS,
            Self::Markers => Markers::DESCRIPTORS,
            Self::Line => Line::DESCRIPTORS,
            Self::Image => Image::DESCRIPTORS,
        }
    }
}

impl Shape {
    /// A shape of the given kind with default attributes.
    #[must_use]
    pub fn new(kind: VisualKind) -> Self {
        match kind {
            VisualKind::Mesh => Self::Mesh(Mesh::default()),
            VisualKind::Ellipse => Self::Ellipse(Ellipse::default()),
            VisualKind::Markers => Self::Markers(Markers::default()),
            VisualKind::Line => Self::Line(Line::default()),
            VisualKind::Image => Self::Image(Image::default()),
        }
    }

    /// Kind tag.
    #[must_use]
    pub fn kind(&self) -> VisualKind {
        match self {
            Self::Mesh(_) => VisualKind::Mesh,
            Self::Ellipse(_) => VisualKind::Ellipse,
            Self::Markers(_) => VisualKind::Markers,
            Self::Line(_) => VisualKind::Line,
            Self::Image(_) => VisualKind::Image,
        }
    }

    pub(crate) fn data(&self) -> &dyn ShapeData {
        match self {
            Self::Mesh(s) => s,
            Self::Ellipse(s) => s,
            Self::Markers(s) => s,
            Self::Line(s) => s,
            Self::Image(s) => s,
        }
    }

    pub(crate) fn data_mut(&mut self) -> &mut dyn ShapeData {
        match self {
            Self::Mesh(s) => s,
            Self::Ellipse(s) => s,
            Self::Markers(s) => s,
            Self::Line(s) => s,
            Self::Image(s) => s,
        }
    }
}

/// Vertex colors for `count` vertices of one color.
pub(crate) fn solid_colors(color: [f32; 4], count: usize) -> Vec<[f32; 4]> {
    alloc::vec![color; count]
}

/// Narrows an index for the `u32` index buffer, saturating.
pub(crate) fn index_u32(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}
