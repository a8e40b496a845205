// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indexed triangle meshes.

use alloc::vec::Vec;

use super::attribute::{AttributeDescriptor, AttributeType, AttributeValue};
use super::role::{HandleRole, RoleSet};
use super::shape::{DrawRange, Payload, ShapeData, index_u32, solid_colors};
use crate::context::{Primitive, ProgramKind};
use crate::error::AttributeIssue;

const COLOR: RoleSet = RoleSet::only(HandleRole::Color);
const GEOMETRY: RoleSet = COLOR.with(HandleRole::Position).with(HandleRole::Index);

/// A triangle mesh with one flat color.
///
/// | attribute  | type     | notes                                  |
/// |------------|----------|----------------------------------------|
/// | `vertices` | `Points` | topology                               |
/// | `faces`    | `Faces`  | topology; indices must name a vertex   |
/// | `color`    | `Color`  |                                        |
///
/// Faces are checked against the vertex list in both directions: a face
/// naming a missing vertex is rejected, and so is a vertex list too short
/// for the current faces.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    vertices: Vec<[f32; 3]>,
    faces: Vec<[u32; 3]>,
    color: [f32; 4],
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            color: [0.5, 0.5, 1.0, 1.0],
        }
    }
}

impl Mesh {
    pub(crate) const DESCRIPTORS: &'static [AttributeDescriptor] = &[
        AttributeDescriptor::new("vertices", AttributeType::Points, GEOMETRY).topology(),
        AttributeDescriptor::new("faces", AttributeType::Faces, GEOMETRY).topology(),
        AttributeDescriptor::new("color", AttributeType::Color, COLOR),
    ];

    fn max_index(faces: &[[u32; 3]]) -> Option<u32> {
        faces.iter().flatten().copied().max()
    }
}

impl ShapeData for Mesh {
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
            (0, AttributeValue::Points(v)) => {
                if Self::max_index(&self.faces).is_some_and(|m| m as usize >= v.len()) {
                    return Err(AttributeIssue::Malformed);
                }
                self.vertices = v;
            }
            (1, AttributeValue::Faces(f)) => {
                if Self::max_index(&f).is_some_and(|m| m as usize >= self.vertices.len()) {
                    return Err(AttributeIssue::Malformed);
                }
                self.faces = f;
            }
            (2, AttributeValue::Color(c)) => self.color = c,
            _ => return Err(AttributeIssue::Malformed),
        }
        Ok(())
    }

    fn get(&self, index: usize) -> Option<AttributeValue> {
        Some(match index {
            0 => AttributeValue::Points(self.vertices.clone()),
            1 => AttributeValue::Faces(self.faces.clone()),
            2 => AttributeValue::Color(self.color),
            _ => return None,
        })
    }

    fn encode(&self, role: HandleRole) -> Payload {
        match role {
            HandleRole::Position => Payload::cast(&self.vertices),
            HandleRole::Color => Payload::cast(&solid_colors(self.color, self.vertices.len())),
            HandleRole::Index => Payload::cast(&self.faces),
            _ => Payload::Bytes(Vec::new()),
        }
    }

    fn draws(&self) -> Vec<DrawRange> {
        alloc::vec![DrawRange {
            primitive: Primitive::Triangles,
            indices: 0..index_u32(3 * self.faces.len()),
        }]
    }

    fn element_count(&self) -> usize {
        self.faces.len()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::visual::shape::test_util::u32s;

    #[test]
    fn faces_must_reference_vertices() {
        let mut m = Mesh::default();
        assert_eq!(
            m.assign(1, AttributeValue::Faces(vec![[0, 1, 2]])),
            Err(AttributeIssue::Malformed)
        );
        m.assign(0, AttributeValue::Points(vec![[0.0; 3]; 3])).unwrap();
        m.assign(1, AttributeValue::Faces(vec![[0, 1, 2]])).unwrap();

        // Shrinking the vertex list below the faces is rejected too.
        assert_eq!(
            m.assign(0, AttributeValue::Points(vec![[0.0; 3]; 2])),
            Err(AttributeIssue::Malformed)
        );
        assert_eq!(m.vertices.len(), 3);
    }

    #[test]
    fn faces_encode_as_flat_indices() {
        let mut m = Mesh::default();
        m.assign(0, AttributeValue::Points(vec![[0.0; 3]; 4])).unwrap();
        m.assign(1, AttributeValue::Faces(vec![[0, 1, 2], [0, 2, 3]]))
            .unwrap();
        assert_eq!(u32s(&m.encode(HandleRole::Index)), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(m.draws()[0].indices, 0..6);
    }
}
