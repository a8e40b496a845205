// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute values and the per-kind descriptor tables that validate them.

use alloc::string::String;
use alloc::vec::Vec;

use super::role::RoleSet;
use crate::error::AttributeIssue;

/// The shape an attribute value must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeType {
    /// A single `f32`.
    Float,
    /// Two `f32` components.
    Vec2,
    /// Linear RGBA, each component in `0.0..=1.0`.
    Color,
    /// A non-negative integer.
    Count,
    /// A list of 3-D points.
    Points,
    /// A list of triangles as vertex index triples.
    Faces,
    /// One of a fixed set of names.
    Choice(&'static [&'static str]),
    /// An RGBA8 image.
    Pixels,
}

/// A value assigned to a visual attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// See [`AttributeType::Float`].
    Float(f32),
    /// See [`AttributeType::Vec2`].
    Vec2([f32; 2]),
    /// See [`AttributeType::Color`].
    Color([f32; 4]),
    /// See [`AttributeType::Count`].
    Count(u32),
    /// See [`AttributeType::Points`].
    Points(Vec<[f32; 3]>),
    /// See [`AttributeType::Faces`].
    Faces(Vec<[u32; 3]>),
    /// See [`AttributeType::Choice`].
    Choice(String),
    /// See [`AttributeType::Pixels`].
    Pixels {
        /// Width in texels.
        width: u32,
        /// Height in texels.
        height: u32,
        /// `width * height * 4` bytes, row-major.
        rgba: Vec<u8>,
    },
}

impl From<f32> for AttributeValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<[f32; 2]> for AttributeValue {
    fn from(v: [f32; 2]) -> Self {
        Self::Vec2(v)
    }
}

impl From<[f32; 4]> for AttributeValue {
    fn from(v: [f32; 4]) -> Self {
        Self::Color(v)
    }
}

impl From<u32> for AttributeValue {
    fn from(v: u32) -> Self {
        Self::Count(v)
    }
}

impl From<Vec<[f32; 3]>> for AttributeValue {
    fn from(v: Vec<[f32; 3]>) -> Self {
        Self::Points(v)
    }
}

impl From<Vec<[u32; 3]>> for AttributeValue {
    fn from(v: Vec<[u32; 3]>) -> Self {
        Self::Faces(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::Choice(String::from(v))
    }
}

impl From<kurbo::Point> for AttributeValue {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "vertex data is single precision"
    )]
    fn from(p: kurbo::Point) -> Self {
        Self::Vec2([p.x as f32, p.y as f32])
    }
}

/// Static description of one attribute of a visual kind.
#[derive(Clone, Copy, Debug)]
pub struct AttributeDescriptor {
    /// Name used with [`Visual::set_attribute`](super::Visual::set_attribute).
    pub name: &'static str,
    /// Required value shape.
    pub ty: AttributeType,
    /// Inclusive bounds for `Float`, `Vec2` components, and `Count`.
    pub range: Option<(f32, f32)>,
    /// Handles whose payload is derived from this attribute.
    pub roles: RoleSet,
    /// Changing it alters element counts, so every geometry handle is
    /// rebuilt.
    pub topology: bool,
}

impl AttributeDescriptor {
    pub(crate) const fn new(name: &'static str, ty: AttributeType, roles: RoleSet) -> Self {
        Self {
            name,
            ty,
            range: None,
            roles,
            topology: false,
        }
    }

    pub(crate) const fn range(mut self, min: f32, max: f32) -> Self {
        self.range = Some((min, max));
        self
    }

    pub(crate) const fn topology(mut self) -> Self {
        self.topology = true;
        self
    }

    /// Checks shape, range, and finiteness of `value`.
    pub(crate) fn validate(&self, value: &AttributeValue) -> Result<(), AttributeIssue> {
        let wrong_type = AttributeIssue::WrongType { expected: self.ty };
        let in_range = |v: f32| match self.range {
            Some((min, max)) => v >= min && v <= max,
            None => v.is_finite(),
        };
        let ok = match (self.ty, value) {
            (AttributeType::Float, AttributeValue::Float(v)) => in_range(*v),
            (AttributeType::Vec2, AttributeValue::Vec2(v)) => v.iter().all(|c| in_range(*c)),
            (AttributeType::Color, AttributeValue::Color(c)) => {
                c.iter().all(|c| (0.0..=1.0).contains(c))
            }
            (AttributeType::Count, AttributeValue::Count(n)) => {
                self.range.is_none_or(|(min, max)| (*n as f32) >= min && (*n as f32) <= max)
            }
            (AttributeType::Points, AttributeValue::Points(ps)) => {
                ps.iter().flatten().all(|c| c.is_finite())
            }
            (AttributeType::Faces, AttributeValue::Faces(_)) => true,
            (AttributeType::Choice(names), AttributeValue::Choice(s)) => {
                if !names.contains(&s.as_str()) {
                    return Err(AttributeIssue::UnknownChoice);
                }
                true
            }
            (
                AttributeType::Pixels,
                AttributeValue::Pixels {
                    width,
                    height,
                    rgba,
                },
            ) => {
                if *width == 0
                    || *height == 0
                    || rgba.len() != *width as usize * *height as usize * 4
                {
                    return Err(AttributeIssue::Malformed);
                }
                true
            }
            _ => return Err(wrong_type),
        };
        if ok {
            Ok(())
        } else {
            Err(AttributeIssue::OutOfRange)
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::visual::role::HandleRole;

    const SIZE: AttributeDescriptor =
        AttributeDescriptor::new("size", AttributeType::Float, RoleSet::only(HandleRole::Position))
            .range(0.0, 100.0);

    #[test]
    fn type_and_range_are_checked() {
        assert_eq!(SIZE.validate(&AttributeValue::Float(4.0)), Ok(()));
        assert_eq!(
            SIZE.validate(&AttributeValue::Float(-1.0)),
            Err(AttributeIssue::OutOfRange)
        );
        assert_eq!(
            SIZE.validate(&AttributeValue::Float(f32::NAN)),
            Err(AttributeIssue::OutOfRange)
        );
        assert_eq!(
            SIZE.validate(&AttributeValue::Count(4)),
            Err(AttributeIssue::WrongType {
                expected: AttributeType::Float
            })
        );
    }

    #[test]
    fn colors_are_normalized() {
        let d = AttributeDescriptor::new("color", AttributeType::Color, RoleSet::EMPTY);
        assert!(d.validate(&[1.0, 0.5, 0.0, 1.0].into()).is_ok());
        assert_eq!(
            d.validate(&[1.5, 0.0, 0.0, 1.0].into()),
            Err(AttributeIssue::OutOfRange)
        );
    }

    #[test]
    fn choices_and_pixels() {
        let connect = AttributeDescriptor::new(
            "connect",
            AttributeType::Choice(&["strip", "segments"]),
            RoleSet::EMPTY,
        );
        assert!(connect.validate(&"segments".into()).is_ok());
        assert_eq!(
            connect.validate(&"loop".into()),
            Err(AttributeIssue::UnknownChoice)
        );

        let pixels = AttributeDescriptor::new("pixels", AttributeType::Pixels, RoleSet::EMPTY);
        let good = AttributeValue::Pixels {
            width: 2,
            height: 1,
            rgba: vec![0; 8],
        };
        let short = AttributeValue::Pixels {
            width: 2,
            height: 2,
            rgba: vec![0; 8],
        };
        assert!(pixels.validate(&good).is_ok());
        assert_eq!(pixels.validate(&short), Err(AttributeIssue::Malformed));
    }
}
