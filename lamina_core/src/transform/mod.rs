// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate transforms and their composition.
//!
//! A [`Transform`] is a tagged value: the kind decides whether the transform
//! has a matrix representation at all. Matrix kinds ([`Identity`],
//! [`ScaleTranslate`], [`Affine`], [`Perspective`]) are closed under
//! [`compose`](Transform::compose). Nonlinear kinds ([`Log`], [`Polar`])
//! only map points; composing with them yields a [`Chain`] that evaluates
//! its steps one after another.
//!
//! # Composition order
//!
//! `a.compose(&b)` applies `b` first, then `a`:
//!
//! ```
//! # use lamina_core::transform::Transform;
//! let a = Transform::scale(2.0, 2.0, 2.0);
//! let b = Transform::translation(3.0, 0.0, 0.0);
//! let p = [0.0, 0.0, 0.0];
//! assert_eq!(a.compose(&b).map(p), a.map(b.map(p)));
//! assert_eq!(a.compose(&b).map(p), [6.0, 0.0, 0.0]);
//! ```
//!
//! For matrices this is `A * B` acting on column vectors.
//!
//! [`Identity`]: Transform::Identity
//! [`ScaleTranslate`]: Transform::ScaleTranslate
//! [`Affine`]: Transform::Affine
//! [`Perspective`]: Transform::Perspective
//! [`Log`]: Transform::Log
//! [`Polar`]: Transform::Polar
//! [`Chain`]: Transform::Chain

mod chain;

pub use chain::TransformChain;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::error::Error;
use crate::matrix::Transform3d;

/// A 3-D point `[x, y, z]`.
pub type Point3 = [f64; 3];

/// Kind tag of a [`Transform`], used in error reports and traces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// No-op mapping.
    Identity,
    /// Per-axis scale followed by translation.
    ScaleTranslate,
    /// General affine matrix.
    Affine,
    /// Projective matrix.
    Perspective,
    /// Per-axis logarithm.
    Log,
    /// Polar to cartesian.
    Polar,
    /// Sequence of steps evaluated lazily.
    Chain,
}

/// A single coordinate mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Transform {
    /// Maps every point to itself.
    #[default]
    Identity,
    /// `p * scale + translate`, per axis.
    ScaleTranslate {
        /// Per-axis scale factors.
        scale: [f64; 3],
        /// Per-axis offsets, applied after scaling.
        translate: [f64; 3],
    },
    /// An affine matrix (bottom row `[0, 0, 0, 1]`).
    Affine(Transform3d),
    /// A projective matrix; mapped points are divided by `w`.
    Perspective(Transform3d),
    /// Per-axis `log(x) / log(base)`.
    ///
    /// An axis whose base is not a positive number other than `1` passes
    /// through unchanged. Non-positive inputs on a logarithmic axis map to
    /// NaN.
    Log {
        /// Logarithm base per axis.
        base: [f64; 3],
    },
    /// Interprets `x` as an angle (radians) and `y` as a radius; `z` passes
    /// through.
    Polar,
    /// Steps in application order: `steps[0]` is applied first.
    Chain(Vec<Self>),
}

impl Transform {
    /// A pure translation.
    #[must_use]
    pub const fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::ScaleTranslate {
            scale: [1.0, 1.0, 1.0],
            translate: [x, y, z],
        }
    }

    /// A pure per-axis scale.
    #[must_use]
    pub const fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self::ScaleTranslate {
            scale: [sx, sy, sz],
            translate: [0.0, 0.0, 0.0],
        }
    }

    /// Scale followed by translation.
    #[must_use]
    pub const fn scale_translate(scale: [f64; 3], translate: [f64; 3]) -> Self {
        Self::ScaleTranslate { scale, translate }
    }

    /// Wraps a matrix, choosing [`Affine`](Self::Affine) or
    /// [`Perspective`](Self::Perspective) from its bottom row.
    #[must_use]
    pub fn from_matrix(m: Transform3d) -> Self {
        if m.is_affine() {
            Self::Affine(m)
        } else {
            Self::Perspective(m)
        }
    }

    /// A perspective projection; see [`Transform3d::from_perspective`].
    #[must_use]
    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self::Perspective(Transform3d::from_perspective(fov_y, aspect, near, far))
    }

    /// A per-axis logarithmic transform.
    #[must_use]
    pub const fn log(base: [f64; 3]) -> Self {
        Self::Log { base }
    }

    /// A chain of steps in application order.
    ///
    /// Adjacent matrix steps are folded together.
    #[must_use]
    pub fn chain(steps: impl IntoIterator<Item = Self>) -> Self {
        let mut out = Vec::new();
        for step in steps {
            push_step(&mut out, step);
        }
        finish_chain(out)
    }

    /// Returns the kind tag.
    #[must_use]
    pub const fn kind(&self) -> TransformKind {
        match self {
            Self::Identity => TransformKind::Identity,
            Self::ScaleTranslate { .. } => TransformKind::ScaleTranslate,
            Self::Affine(_) => TransformKind::Affine,
            Self::Perspective(_) => TransformKind::Perspective,
            Self::Log { .. } => TransformKind::Log,
            Self::Polar => TransformKind::Polar,
            Self::Chain(_) => TransformKind::Chain,
        }
    }

    /// Returns `true` if [`as_matrix`](Self::as_matrix) succeeds.
    #[must_use]
    pub fn is_matrix_representable(&self) -> bool {
        match self {
            Self::Identity | Self::ScaleTranslate { .. } | Self::Affine(_) | Self::Perspective(_) => {
                true
            }
            Self::Log { .. } | Self::Polar => false,
            Self::Chain(steps) => steps.iter().all(Self::is_matrix_representable),
        }
    }

    /// Returns the 4×4 matrix for matrix-representable kinds.
    ///
    /// # Errors
    ///
    /// [`Error::NotMatrixRepresentable`] for nonlinear kinds, or for a chain
    /// containing one (reporting the first such step).
    pub fn as_matrix(&self) -> Result<Transform3d, Error> {
        match self {
            Self::Identity => Ok(Transform3d::IDENTITY),
            Self::ScaleTranslate { scale, translate } => Ok(Transform3d::from_translation(
                translate[0],
                translate[1],
                translate[2],
            ) * Transform3d::from_scale(scale[0], scale[1], scale[2])),
            Self::Affine(m) | Self::Perspective(m) => Ok(*m),
            Self::Log { .. } | Self::Polar => Err(Error::NotMatrixRepresentable { kind: self.kind() }),
            Self::Chain(steps) => steps
                .iter()
                .try_fold(Transform3d::IDENTITY, |acc, step| -> Result<_, Error> {
                    Ok(step.as_matrix()? * acc)
                }),
        }
    }

    /// Maps a point forward.
    #[must_use]
    pub fn map(&self, p: Point3) -> Point3 {
        match self {
            Self::Identity => p,
            Self::ScaleTranslate { scale, translate } => [
                p[0] * scale[0] + translate[0],
                p[1] * scale[1] + translate[1],
                p[2] * scale[2] + translate[2],
            ],
            Self::Affine(m) | Self::Perspective(m) => m.map_point(p),
            Self::Log { base } => {
                let mut out = p;
                for (v, &b) in out.iter_mut().zip(base) {
                    if is_log_base(b) {
                        *v = v.ln() / b.ln();
                    }
                }
                out
            }
            Self::Polar => {
                let (theta, r) = (p[0], p[1]);
                [r * theta.cos(), r * theta.sin(), p[2]]
            }
            Self::Chain(steps) => steps.iter().fold(p, |acc, step| step.map(acc)),
        }
    }

    /// Maps a point backward.
    ///
    /// # Errors
    ///
    /// [`Error::NonInvertible`] if the transform (or any chain step) is
    /// singular.
    pub fn imap(&self, p: Point3) -> Result<Point3, Error> {
        match self {
            Self::Identity => Ok(p),
            Self::ScaleTranslate { scale, translate } => {
                if scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                    return Err(Error::NonInvertible { kind: self.kind() });
                }
                Ok([
                    (p[0] - translate[0]) / scale[0],
                    (p[1] - translate[1]) / scale[1],
                    (p[2] - translate[2]) / scale[2],
                ])
            }
            Self::Affine(m) | Self::Perspective(m) => m
                .inverse()
                .map(|inv| inv.map_point(p))
                .ok_or(Error::NonInvertible { kind: self.kind() }),
            Self::Log { base } => {
                let mut out = p;
                for (v, &b) in out.iter_mut().zip(base) {
                    if is_log_base(b) {
                        *v = b.powf(*v);
                    }
                }
                Ok(out)
            }
            Self::Polar => Ok([p[1].atan2(p[0]), p[0].hypot(p[1]), p[2]]),
            Self::Chain(steps) => steps.iter().rev().try_fold(p, |acc, step| step.imap(acc)),
        }
    }

    /// Returns `self ∘ other`: the transform that applies `other` first, then
    /// `self`.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Identity, _) => other.clone(),
            (_, Self::Identity) => self.clone(),
            (
                Self::ScaleTranslate {
                    scale: sa,
                    translate: ta,
                },
                Self::ScaleTranslate {
                    scale: sb,
                    translate: tb,
                },
            ) => Self::ScaleTranslate {
                scale: [sa[0] * sb[0], sa[1] * sb[1], sa[2] * sb[2]],
                translate: [
                    sa[0] * tb[0] + ta[0],
                    sa[1] * tb[1] + ta[1],
                    sa[2] * tb[2] + ta[2],
                ],
            },
            (a, b) if a.is_plain_matrix() && b.is_plain_matrix() => {
                let m = a.plain_matrix() * b.plain_matrix();
                if matches!(a, Self::Perspective(_)) || matches!(b, Self::Perspective(_)) {
                    Self::Perspective(m)
                } else {
                    Self::Affine(m)
                }
            }
            _ => {
                let mut steps = Vec::new();
                append_flattened(&mut steps, other);
                append_flattened(&mut steps, self);
                finish_chain(steps)
            }
        }
    }

    /// Replaces the scale, keeping the translation of a
    /// [`ScaleTranslate`](Self::ScaleTranslate).
    ///
    /// Any other kind is replaced by a scale-translate with zero offset.
    pub fn set_scale(&mut self, scale: [f64; 3]) {
        match self {
            Self::ScaleTranslate { scale: s, .. } => *s = scale,
            _ => *self = Self::scale_translate(scale, [0.0; 3]),
        }
    }

    /// Replaces the translation, keeping the scale of a
    /// [`ScaleTranslate`](Self::ScaleTranslate).
    ///
    /// Any other kind is replaced by a scale-translate with unit scale.
    pub fn set_translate(&mut self, translate: [f64; 3]) {
        match self {
            Self::ScaleTranslate { translate: t, .. } => *t = translate,
            _ => *self = Self::scale_translate([1.0; 3], translate),
        }
    }

    /// Replaces the logarithm bases; any other kind becomes a
    /// [`Log`](Self::Log) transform.
    pub fn set_base(&mut self, base: [f64; 3]) {
        *self = Self::Log { base };
    }

    /// Post-applies a translation.
    pub fn translate_by(&mut self, x: f64, y: f64, z: f64) {
        *self = Self::translation(x, y, z).compose(self);
    }

    /// Post-applies a per-axis scale.
    pub fn scale_by(&mut self, sx: f64, sy: f64, sz: f64) {
        *self = Self::scale(sx, sy, sz).compose(self);
    }

    /// Post-applies a rotation around the Z axis (radians).
    pub fn rotate_z(&mut self, radians: f64) {
        *self = Self::Affine(Transform3d::from_rotation_z(radians)).compose(self);
    }

    /// Matrix kinds other than chains.
    fn is_plain_matrix(&self) -> bool {
        matches!(
            self,
            Self::Identity | Self::ScaleTranslate { .. } | Self::Affine(_) | Self::Perspective(_)
        )
    }

    fn plain_matrix(&self) -> Transform3d {
        match self {
            Self::ScaleTranslate { scale, translate } => {
                Transform3d::from_translation(translate[0], translate[1], translate[2])
                    * Transform3d::from_scale(scale[0], scale[1], scale[2])
            }
            Self::Affine(m) | Self::Perspective(m) => *m,
            _ => Transform3d::IDENTITY,
        }
    }
}

fn is_log_base(b: f64) -> bool {
    b > 0.0 && b != 1.0 && b.is_finite()
}

fn append_flattened(steps: &mut Vec<Transform>, t: &Transform) {
    match t {
        Transform::Chain(inner) => {
            for step in inner {
                push_step(steps, step.clone());
            }
        }
        other => push_step(steps, other.clone()),
    }
}

/// Appends `step`, merging it into the previous step when both are matrices.
fn push_step(steps: &mut Vec<Transform>, step: Transform) {
    if let Transform::Chain(inner) = step {
        for s in inner {
            push_step(steps, s);
        }
        return;
    }
    if step == Transform::Identity {
        return;
    }
    if let Some(last) = steps.last_mut() {
        if last.is_plain_matrix() && step.is_plain_matrix() {
            *last = step.compose(last);
            return;
        }
    }
    steps.push(step);
}

fn finish_chain(mut steps: Vec<Transform>) -> Transform {
    match steps.len() {
        0 => Transform::Identity,
        1 => steps.pop().unwrap_or_default(),
        _ => Transform::Chain(steps),
    }
}
