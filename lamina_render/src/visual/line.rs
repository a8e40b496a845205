// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polylines and disjoint segments.

use alloc::string::String;
use alloc::vec::Vec;

use super::attribute::{AttributeDescriptor, AttributeType, AttributeValue};
use super::role::{HandleRole, RoleSet};
use super::shape::{DrawRange, Payload, ShapeData, index_u32, solid_colors};
use crate::context::{Primitive, ProgramKind};
use crate::error::AttributeIssue;

const COLOR: RoleSet = RoleSet::only(HandleRole::Color);
const INDEX: RoleSet = RoleSet::only(HandleRole::Index);
const GEOMETRY: RoleSet = COLOR.with(HandleRole::Position).with(HandleRole::Index);

/// How consecutive points are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connect {
    /// `p0-p1-p2-...`: one continuous polyline.
    #[default]
    Strip,
    /// `p0-p1, p2-p3, ...`: independent pairs. A trailing odd point is
    /// ignored.
    Segments,
}

impl Connect {
    const NAMES: &'static [&'static str] = &["strip", "segments"];

    fn name(self) -> &'static str {
        match self {
            Self::Strip => "strip",
            Self::Segments => "segments",
        }
    }
}

/// Lines through a list of points.
///
/// | attribute   | type     | notes                        |
/// |-------------|----------|------------------------------|
/// | `positions` | `Points` | topology                     |
/// | `color`     | `Color`  |                              |
/// | `connect`   | `Choice` | `"strip"` or `"segments"`    |
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    positions: Vec<[f32; 3]>,
    color: [f32; 4],
    connect: Connect,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            color: [1.0, 1.0, 1.0, 1.0],
            connect: Connect::Strip,
        }
    }
}

impl Line {
    pub(crate) const DESCRIPTORS: &'static [AttributeDescriptor] = &[
        AttributeDescriptor::new("positions", AttributeType::Points, GEOMETRY).topology(),
        AttributeDescriptor::new("color", AttributeType::Color, COLOR),
        AttributeDescriptor::new("connect", AttributeType::Choice(Connect::NAMES), INDEX),
    ];

    fn index_count(&self) -> usize {
        let n = self.positions.len();
        match self.connect {
            Connect::Strip => 2 * n.saturating_sub(1),
            Connect::Segments => n / 2 * 2,
        }
    }
}

impl ShapeData for Line {
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
            (1, AttributeValue::Color(c)) => self.color = c,
            (2, AttributeValue::Choice(s)) => {
                self.connect = match s.as_str() {
                    "strip" => Connect::Strip,
                    "segments" => Connect::Segments,
                    _ => return Err(AttributeIssue::UnknownChoice),
                };
            }
            _ => return Err(AttributeIssue::Malformed),
        }
        Ok(())
    }

    fn get(&self, index: usize) -> Option<AttributeValue> {
        Some(match index {
            0 => AttributeValue::Points(self.positions.clone()),
            1 => AttributeValue::Color(self.color),
            2 => AttributeValue::Choice(String::from(self.connect.name())),
            _ => return None,
        })
    }

    fn encode(&self, role: HandleRole) -> Payload {
        match role {
            HandleRole::Position => Payload::cast(&self.positions),
            HandleRole::Color => Payload::cast(&solid_colors(self.color, self.positions.len())),
            HandleRole::Index => {
                let indices: Vec<u32> = match self.connect {
                    Connect::Strip => (1..self.positions.len())
                        .flat_map(|i| [index_u32(i - 1), index_u32(i)])
                        .collect(),
                    Connect::Segments => (0..self.index_count()).map(index_u32).collect(),
                };
                Payload::cast(&indices)
            }
            _ => Payload::Bytes(Vec::new()),
        }
    }

    fn draws(&self) -> Vec<DrawRange> {
        alloc::vec![DrawRange {
            primitive: Primitive::Lines,
            indices: 0..index_u32(self.index_count()),
        }]
    }

    fn element_count(&self) -> usize {
        self.index_count() / 2
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::visual::shape::test_util::u32s;

    fn line(n: usize, connect: Connect) -> Line {
        Line {
            positions: vec![[0.0; 3]; n],
            connect,
            ..Line::default()
        }
    }

    #[test]
    fn strip_joins_neighbors() {
        let l = line(4, Connect::Strip);
        assert_eq!(u32s(&l.encode(HandleRole::Index)), &[0, 1, 1, 2, 2, 3]);
        assert_eq!(l.element_count(), 3);
    }

    #[test]
    fn segments_pair_points_and_drop_the_odd_one() {
        let l = line(5, Connect::Segments);
        assert_eq!(u32s(&l.encode(HandleRole::Index)), &[0, 1, 2, 3]);
        assert_eq!(l.draws()[0].indices, 0..4);
    }

    #[test]
    fn degenerate_lines_are_empty() {
        assert_eq!(line(1, Connect::Strip).element_count(), 0);
        assert_eq!(line(0, Connect::Segments).element_count(), 0);
    }
}
