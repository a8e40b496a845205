// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point clouds drawn as square markers.

use alloc::vec::Vec;

use super::attribute::{AttributeDescriptor, AttributeType, AttributeValue};
use super::role::{HandleRole, RoleSet};
use super::shape::{DrawRange, Payload, ShapeData, index_u32, solid_colors};
use crate::context::{Primitive, ProgramKind};
use crate::error::AttributeIssue;

const POSITION: RoleSet = RoleSet::only(HandleRole::Position);
const COLOR: RoleSet = RoleSet::only(HandleRole::Color);
const GEOMETRY: RoleSet = POSITION.with(HandleRole::Color).with(HandleRole::Index);

/// One axis-aligned square per point, in the node's local units.
///
/// | attribute   | type     | notes                 |
/// |-------------|----------|-----------------------|
/// | `positions` | `Points` | marker centers, topology |
/// | `size`      | `Float`  | edge length, positive |
/// | `color`     | `Color`  |                       |
#[derive(Clone, Debug, PartialEq)]
pub struct Markers {
    positions: Vec<[f32; 3]>,
    size: f32,
    color: [f32; 4],
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            size: 0.01,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl Markers {
    pub(crate) const DESCRIPTORS: &'static [AttributeDescriptor] = &[
        AttributeDescriptor::new("positions", AttributeType::Points, GEOMETRY).topology(),
        AttributeDescriptor::new("size", AttributeType::Float, POSITION)
            .range(f32::MIN_POSITIVE, f32::MAX),
        AttributeDescriptor::new("color", AttributeType::Color, COLOR),
    ];
}

impl ShapeData for Markers {
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
            (0, AttributeValue::Points(p)) => self.positions = p,
            (1, AttributeValue::Float(s)) => self.size = s,
            (2, AttributeValue::Color(c)) => self.color = c,
            _ => return Err(AttributeIssue::Malformed),
        }
        Ok(())
    }

    fn get(&self, index: usize) -> Option<AttributeValue> {
        Some(match index {
            0 => AttributeValue::Points(self.positions.clone()),
            1 => AttributeValue::Float(self.size),
            2 => AttributeValue::Color(self.color),
            _ => return None,
        })
    }

    fn encode(&self, role: HandleRole) -> Payload {
        match role {
            HandleRole::Position => {
                let h = self.size * 0.5;
                let corners: Vec<[f32; 3]> = self
                    .positions
                    .iter()
                    .flat_map(|&[x, y, z]| {
                        [
                            [x - h, y - h, z],
                            [x + h, y - h, z],
                            [x + h, y + h, z],
                            [x - h, y + h, z],
                        ]
                    })
                    .collect();
                Payload::cast(&corners)
            }
            HandleRole::Color => {
                Payload::cast(&solid_colors(self.color, 4 * self.positions.len()))
            }
            HandleRole::Index => {
                let indices: Vec<u32> = (0..self.positions.len())
                    .flat_map(|i| {
                        let b = index_u32(4 * i);
                        [b, b + 1, b + 2, b, b + 2, b + 3]
                    })
                    .collect();
                Payload::cast(&indices)
            }
            _ => Payload::Bytes(Vec::new()),
        }
    }

    fn draws(&self) -> Vec<DrawRange> {
        alloc::vec![DrawRange {
            primitive: Primitive::Triangles,
            indices: 0..index_u32(6 * self.positions.len()),
        }]
    }

    fn element_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::visual::shape::test_util::{floats, u32s};

    #[test]
    fn each_point_becomes_a_quad() {
        let m = Markers {
            positions: vec![[0.0, 0.0, 0.0], [10.0, 0.0, 1.0]],
            size: 2.0,
            ..Markers::default()
        };
        let pos = floats(&m.encode(HandleRole::Position));
        assert_eq!(pos.len(), 2 * 4 * 3);
        assert_eq!(&pos[0..3], &[-1.0, -1.0, 0.0]);
        assert_eq!(&pos[18..21], &[11.0, 1.0, 1.0]);

        let idx = u32s(&m.encode(HandleRole::Index));
        assert_eq!(&idx[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(m.draws()[0].indices, 0..12);
    }
}
