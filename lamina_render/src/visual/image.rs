// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Textured quads.

use alloc::vec::Vec;

use bytemuck::{Pod, Zeroable};
use kurbo::Rect;

use super::attribute::{AttributeDescriptor, AttributeType, AttributeValue};
use super::role::{HandleRole, RoleSet};
use super::shape::{DrawRange, Payload, ShapeData};
use crate::context::{Primitive, ProgramKind};
use crate::error::AttributeIssue;

const POSITION: RoleSet = RoleSet::only(HandleRole::Position);
const UNIFORM: RoleSet = RoleSet::only(HandleRole::Uniform);
const TEXTURE: RoleSet = RoleSet::only(HandleRole::Texture);
const ALL: RoleSet = POSITION
    .with(HandleRole::TexCoord)
    .with(HandleRole::Index)
    .with(HandleRole::Uniform)
    .with(HandleRole::Texture);

/// Uniform block bound at binding 1 of the textured program.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ImageStyle {
    opacity: f32,
    _pad: [f32; 3],
}

/// Size of [`ImageStyle`] in bytes.
pub(crate) const STYLE_SIZE: usize = size_of::<ImageStyle>();

/// An RGBA8 image stretched over a rectangle anchored at the local origin.
///
/// | attribute | type     | notes                          |
/// |-----------|----------|--------------------------------|
/// | `pixels`  | `Pixels` | texture contents               |
/// | `size`    | `Vec2`   | extent in local units, positive |
/// | `opacity` | `Float`  | `0..=1`                        |
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    size: [f32; 2],
    opacity: f32,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: alloc::vec![255; 4],
            size: [1.0, 1.0],
            opacity: 1.0,
        }
    }
}

impl Image {
    pub(crate) const DESCRIPTORS: &'static [AttributeDescriptor] = &[
        AttributeDescriptor::new("pixels", AttributeType::Pixels, TEXTURE),
        AttributeDescriptor::new("size", AttributeType::Vec2, POSITION)
            .range(f32::MIN_POSITIVE, f32::MAX),
        AttributeDescriptor::new("opacity", AttributeType::Float, UNIFORM).range(0.0, 1.0),
    ];

    #[expect(
        clippy::cast_possible_truncation,
        reason = "vertex data is single precision"
    )]
    fn corners(&self) -> [[f32; 3]; 4] {
        let r = Rect::from_origin_size((0.0, 0.0), (f64::from(self.size[0]), f64::from(self.size[1])));
        [
            [r.x0 as f32, r.y0 as f32, 0.0],
            [r.x1 as f32, r.y0 as f32, 0.0],
            [r.x1 as f32, r.y1 as f32, 0.0],
            [r.x0 as f32, r.y1 as f32, 0.0],
        ]
    }
}

impl ShapeData for Image {
    fn descriptors(&self) -> &'static [AttributeDescriptor] {
        Self::DESCRIPTORS
    }

    fn roles(&self) -> RoleSet {
        ALL
    }

    fn program(&self) -> ProgramKind {
        ProgramKind::Textured
    }

    fn assign(&mut self, index: usize, value: AttributeValue) -> Result<(), AttributeIssue> {
        match (index, value) {
            (
                0,
                AttributeValue::Pixels {
                    width,
                    height,
                    rgba,
                },
            ) => {
                self.width = width;
                self.height = height;
                self.rgba = rgba;
            }
            (1, AttributeValue::Vec2(s)) => self.size = s,
            (2, AttributeValue::Float(o)) => self.opacity = o,
            _ => return Err(AttributeIssue::Malformed),
        }
        Ok(())
    }

    fn get(&self, index: usize) -> Option<AttributeValue> {
        Some(match index {
            0 => AttributeValue::Pixels {
                width: self.width,
                height: self.height,
                rgba: self.rgba.clone(),
            },
            1 => AttributeValue::Vec2(self.size),
            2 => AttributeValue::Float(self.opacity),
            _ => return None,
        })
    }

    fn encode(&self, role: HandleRole) -> Payload {
        match role {
            HandleRole::Position => Payload::cast(&self.corners()),
            // Row 0 of the image sits at y = 0.
            HandleRole::TexCoord => {
                Payload::cast(&[[0.0_f32, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
            }
            HandleRole::Index => Payload::cast(&[0_u32, 1, 2, 0, 2, 3]),
            HandleRole::Uniform => Payload::Bytes(
                bytemuck::bytes_of(&ImageStyle {
                    opacity: self.opacity,
                    _pad: [0.0; 3],
                })
                .to_vec(),
            ),
            HandleRole::Texture => Payload::Texture {
                width: self.width,
                height: self.height,
                rgba: self.rgba.clone(),
            },
            HandleRole::Color => Payload::Bytes(Vec::new()),
        }
    }

    fn draws(&self) -> Vec<DrawRange> {
        alloc::vec![DrawRange {
            primitive: Primitive::Triangles,
            indices: 0..6,
        }]
    }

    fn element_count(&self) -> usize {
        1
    }
}
