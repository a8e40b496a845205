// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ellipses, circles, and arcs.

use alloc::vec::Vec;

use kurbo::{Point, Vec2};

use super::attribute::{AttributeDescriptor, AttributeType, AttributeValue};
use super::role::{HandleRole, RoleSet};
use super::shape::{DrawRange, Payload, ShapeData, index_u32, solid_colors};
use crate::context::{Primitive, ProgramKind};
use crate::error::AttributeIssue;

const POSITION: RoleSet = RoleSet::only(HandleRole::Position);
const COLOR: RoleSet = RoleSet::only(HandleRole::Color);
const GEOMETRY: RoleSet = POSITION.with(HandleRole::Color).with(HandleRole::Index);

/// A filled ellipse with an optional outline, or an arc of one.
///
/// | attribute      | type    | notes                                  |
/// |----------------|---------|----------------------------------------|
/// | `center`       | `Vec2`  |                                        |
/// | `radius`       | `Vec2`  | per-axis, positive                     |
/// | `color`        | `Color` | fill; alpha `0` skips the fill         |
/// | `border_color` | `Color` | outline; alpha `0` skips the outline   |
/// | `num_segments` | `Count` | `3..=4096`, topology                   |
/// | `start_angle`  | `Float` | degrees, counter-clockwise from +x     |
/// | `span_angle`   | `Float` | degrees, `-360..=360`                  |
///
/// An arc (span below a full turn) fills as a pie slice.
#[derive(Clone, Debug, PartialEq)]
pub struct Ellipse {
    center: [f32; 2],
    radius: [f32; 2],
    color: [f32; 4],
    border_color: [f32; 4],
    num_segments: u32,
    start_angle: f32,
    span_angle: f32,
}

impl Default for Ellipse {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            radius: [0.1, 0.1],
            color: [0.0, 0.0, 0.0, 1.0],
            border_color: [0.0, 0.0, 0.0, 0.0],
            num_segments: 100,
            start_angle: 0.0,
            span_angle: 360.0,
        }
    }
}

impl Ellipse {
    pub(crate) const DESCRIPTORS: &'static [AttributeDescriptor] = &[
        AttributeDescriptor::new("center", AttributeType::Vec2, POSITION),
        AttributeDescriptor::new("radius", AttributeType::Vec2, POSITION)
            .range(f32::MIN_POSITIVE, f32::MAX),
        AttributeDescriptor::new("color", AttributeType::Color, COLOR),
        AttributeDescriptor::new("border_color", AttributeType::Color, COLOR),
        AttributeDescriptor::new("num_segments", AttributeType::Count, GEOMETRY)
            .range(3.0, 4096.0)
            .topology(),
        AttributeDescriptor::new("start_angle", AttributeType::Float, POSITION),
        AttributeDescriptor::new("span_angle", AttributeType::Float, POSITION)
            .range(-360.0, 360.0),
    ];

    fn segments(&self) -> usize {
        self.num_segments as usize
    }

    /// Points along the perimeter, `num_segments + 1` of them.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "vertex data is single precision"
    )]
    fn perimeter(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        let n = self.segments();
        let center = Point::new(f64::from(self.center[0]), f64::from(self.center[1]));
        let start = f64::from(self.start_angle).to_radians();
        let span = f64::from(self.span_angle).to_radians();
        let (rx, ry) = (f64::from(self.radius[0]), f64::from(self.radius[1]));
        (0..=n).map(move |i| {
            let t = i as f64 / n as f64;
            let dir = Vec2::from_angle(start + span * t);
            let p = center + Vec2::new(dir.x * rx, dir.y * ry);
            [p.x as f32, p.y as f32, 0.0]
        })
    }
}

impl ShapeData for Ellipse {
    fn descriptors(&self) -> &'static [AttributeDescriptor] {
        Self::DESCRIPTORS
    }

    fn roles(&self) -> RoleSet {
        GEOMETRY
    }

    fn program(&self) -> ProgramKind {
        ProgramKind::Colored
    }

    fn assign(&mut self, index: usize, value: AttributeValue) -> Result<(), AttributeIssue> {
        match (index, value) {
            (0, AttributeValue::Vec2(v)) => self.center = v,
            (1, AttributeValue::Vec2(v)) => self.radius = v,
            (2, AttributeValue::Color(c)) => self.color = c,
            (3, AttributeValue::Color(c)) => self.border_color = c,
            (4, AttributeValue::Count(n)) => self.num_segments = n,
            (5, AttributeValue::Float(a)) => self.start_angle = a,
            (6, AttributeValue::Float(a)) => self.span_angle = a,
            _ => return Err(AttributeIssue::Malformed),
        }
        Ok(())
    }

    fn get(&self, index: usize) -> Option<AttributeValue> {
        Some(match index {
            0 => AttributeValue::Vec2(self.center),
            1 => AttributeValue::Vec2(self.radius),
            2 => AttributeValue::Color(self.color),
            3 => AttributeValue::Color(self.border_color),
            4 => AttributeValue::Count(self.num_segments),
            5 => AttributeValue::Float(self.start_angle),
            6 => AttributeValue::Float(self.span_angle),
            _ => return None,
        })
    }

    // Vertex layout: center, fill perimeter (n + 1), outline perimeter (n + 1).
    fn encode(&self, role: HandleRole) -> Payload {
        let n = self.segments();
        match role {
            HandleRole::Position => {
                let mut positions = Vec::with_capacity(2 * n + 3);
                positions.push([self.center[0], self.center[1], 0.0]);
                positions.extend(self.perimeter());
                positions.extend(self.perimeter());
                Payload::cast(&positions)
            }
            HandleRole::Color => {
                let mut colors = solid_colors(self.color, n + 2);
                colors.extend(solid_colors(self.border_color, n + 1));
                Payload::cast(&colors)
            }
            HandleRole::Index => {
                let mut indices = Vec::with_capacity(5 * n);
                for i in 0..n {
                    indices.extend([0, index_u32(i + 1), index_u32(i + 2)]);
                }
                let outline = n + 2;
                for i in 0..n {
                    indices.extend([index_u32(outline + i), index_u32(outline + i + 1)]);
                }
                Payload::cast(&indices)
            }
            _ => Payload::Bytes(Vec::new()),
        }
    }

    fn draws(&self) -> Vec<DrawRange> {
        let n = index_u32(self.segments());
        let mut draws = Vec::new();
        if self.color[3] > 0.0 {
            draws.push(DrawRange {
                primitive: Primitive::Triangles,
                indices: 0..3 * n,
            });
        }
        if self.border_color[3] > 0.0 {
            draws.push(DrawRange {
                primitive: Primitive::Lines,
                indices: 3 * n..5 * n,
            });
        }
        draws
    }

    fn element_count(&self) -> usize {
        self.segments()
    }
}
