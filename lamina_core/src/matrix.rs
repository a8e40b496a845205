// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 matrix used by every matrix-representable transform.
//!
//! Points are treated as column vectors `[x, y, z, 1]`, so `a * b` applies
//! `b` first and `a` second. This is the same convention the
//! [`Transform::compose`](crate::transform::Transform::compose) contract uses.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Relative singularity threshold for [`Transform3d::inverse`].
///
/// A matrix is singular when `|det|` is at or below this fraction of the
/// product of its column lengths (the largest determinant columns of those
/// lengths can have). The test is independent of overall scale, so a
/// uniform `1e-6` scale inverts as well as the identity does.
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the memory layout
/// GPU shader uniforms expect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a right-handed perspective projection.
    ///
    /// `fov_y` is the vertical field of view in radians; depth is mapped to
    /// `[-1, 1]` between `near` and `far`.
    #[must_use]
    pub fn from_perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        let half = fov_y * 0.5;
        let f = half.cos() / half.sin();
        let nf = 1.0 / (near - far);
        Self {
            cols: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, (far + near) * nf, -1.0],
                [0.0, 0.0, 2.0 * far * near * nf, 0.0],
            ],
        }
    }

    /// Returns `true` if the bottom row is `[0, 0, 0, 1]`, i.e. the matrix
    /// has no projective component.
    #[must_use]
    pub fn is_affine(&self) -> bool {
        let c = &self.cols;
        c[0][3] == 0.0 && c[1][3] == 0.0 && c[2][3] == 0.0 && c[3][3] == 1.0
    }

    /// Multiplies the homogeneous point `[x, y, z, 1]` by this matrix.
    #[must_use]
    pub fn transform_homogeneous(&self, p: [f64; 3]) -> [f64; 4] {
        let c = &self.cols;
        let mut out = [0.0; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = c[0][i] * p[0] + c[1][i] * p[1] + c[2][i] * p[2] + c[3][i];
        }
        out
    }

    /// Maps a point through the matrix, dividing by `w` for projective
    /// matrices.
    #[must_use]
    pub fn map_point(&self, p: [f64; 3]) -> [f64; 3] {
        let [x, y, z, w] = self.transform_homogeneous(p);
        if w == 1.0 {
            [x, y, z]
        } else {
            [x / w, y / w, z / w]
        }
    }

    /// Flattens the columns into a single column-major array.
    #[must_use]
    pub fn to_cols_array(self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for (j, col) in self.cols.iter().enumerate() {
            out[j * 4..j * 4 + 4].copy_from_slice(col);
        }
        out
    }

    /// Builds a matrix from a column-major array.
    #[must_use]
    pub fn from_cols_array(m: [f64; 16]) -> Self {
        let mut cols = [[0.0; 4]; 4];
        for (j, col) in cols.iter_mut().enumerate() {
            col.copy_from_slice(&m[j * 4..j * 4 + 4]);
        }
        Self { cols }
    }

    /// Narrows to `f32` for upload as a shader uniform.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "GPU uniforms are single precision"
    )]
    #[must_use]
    pub fn to_cols_array_f32(self) -> [f32; 16] {
        self.to_cols_array().map(|v| v as f32)
    }

    /// Returns the determinant.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        let (inv, m) = self.adjugate();
        m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12]
    }

    /// Returns the inverse, or `None` if the matrix is singular.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let (mut inv, m) = self.adjugate();
        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        let bound: f64 = self
            .cols
            .iter()
            .map(|c| (c[0] * c[0] + c[1] * c[1] + c[2] * c[2] + c[3] * c[3]).sqrt())
            .product();
        if !det.is_finite() || det.abs() <= SINGULAR_TOLERANCE * bound {
            return None;
        }
        let r = 1.0 / det;
        for v in &mut inv {
            *v *= r;
        }
        Some(Self::from_cols_array(inv))
    }

    /// Cofactor expansion shared by [`determinant`](Self::determinant) and
    /// [`inverse`](Self::inverse). Returns `(adjugate, flattened self)`.
    fn adjugate(&self) -> ([f64; 16], [f64; 16]) {
        let m = self.to_cols_array();
        let mut inv = [0.0; 16];
        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14]
            + m[13] * m[6] * m[11]
            - m[13] * m[7] * m[10];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14]
            - m[12] * m[6] * m[11]
            + m[12] * m[7] * m[10];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13]
            + m[12] * m[5] * m[11]
            - m[12] * m[7] * m[9];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13]
            - m[12] * m[5] * m[10]
            + m[12] * m[6] * m[9];
        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];
        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];
        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];
        (inv, m)
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    /// Is any coefficient [NaN]?
    ///
    /// [NaN]: f64::is_nan
    #[inline]
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.cols.iter().flatten().any(|v| v.is_nan())
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    #[cfg(not(feature = "std"))]
    use kurbo::common::FloatFuncs as _;

    use super::*;

    fn assert_close(a: Transform3d, b: Transform3d) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert!((x - y).abs() < 1e-9, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    }

    #[test]
    fn identity_multiply() {
        let t = Transform3d::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Transform3d::IDENTITY * t, t);
        assert_eq!(t * Transform3d::IDENTITY, t);
    }

    #[test]
    fn scale_then_translate_maps_points() {
        let s = Transform3d::from_scale(2.0, 2.0, 1.0);
        let t = Transform3d::from_translation(3.0, 4.0, 0.0);
        // Scale first, then translate: T * S
        let combined = t * s;
        assert_eq!(combined.map_point([1.0, 1.0, 0.0]), [5.0, 6.0, 0.0]);
        assert_eq!(combined.col(3), [3.0, 4.0, 0.0, 1.0]);
    }

    #[test]
    fn rotation_z_ninety_degrees() {
        let r = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
        let p = r.map_point([1.0, 0.0, 0.0]);
        assert!(p[0].abs() < 1e-9);
        assert!((p[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn inverse_of_product_undoes_it() {
        let m = Transform3d::from_translation(5.0, -2.0, 1.0)
            * Transform3d::from_rotation_z(0.7)
            * Transform3d::from_scale(2.0, 3.0, 4.0);
        let inv = m.inverse().expect("invertible");
        assert_close(inv * m, Transform3d::IDENTITY);
        assert_close(m * inv, Transform3d::IDENTITY);
    }

    #[test]
    fn determinant_of_scale() {
        let m = Transform3d::from_scale(2.0, 3.0, 4.0);
        assert!((m.determinant() - 24.0).abs() < 1e-12);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Transform3d::from_scale(1.0, 0.0, 1.0);
        assert!(m.inverse().is_none());
    }

    #[test]
    fn tiny_scales_still_invert() {
        for m in [
            Transform3d::from_scale(1e-4, 1e-4, 1e-4),
            Transform3d::from_translation(3.0, -1.0, 0.0) * Transform3d::from_scale(1e-6, 1e-6, 1.0),
            Transform3d::from_scale(1e-8, 2e-8, 1e-8) * Transform3d::from_rotation_z(0.3),
        ] {
            let inv = m.inverse().expect("tiny but invertible");
            let p = [2.5, -4.0, 1.0];
            let q = inv.map_point(m.map_point(p));
            for (a, b) in p.iter().zip(q.iter()) {
                assert!((a - b).abs() < 1e-6, "{p:?} -> {q:?}");
            }
        }
    }

    #[test]
    fn tiny_perspective_still_inverts() {
        let m = Transform3d::from_scale(1e-5, 1e-5, 1e-5)
            * Transform3d::from_perspective(1.0, 1.5, 0.1, 100.0);
        let inv = m.inverse().expect("invertible");
        let q = inv.map_point(m.map_point([0.3, -0.2, -5.0]));
        assert!((q[0] - 0.3).abs() < 1e-9);
        assert!((q[1] + 0.2).abs() < 1e-9);
        assert!((q[2] + 5.0).abs() < 1e-9);
    }

    #[test]
    fn nearly_parallel_columns_are_singular() {
        // Columns 0 and 1 agree to 1e-14, at any overall scale.
        for scale in [1.0, 1e-6, 1e6] {
            let m = Transform3d::from_cols(
                [scale, scale, 0.0, 0.0],
                [scale, scale * (1.0 + 1e-14), 0.0, 0.0],
                [0.0, 0.0, scale, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            );
            assert!(m.inverse().is_none(), "scale {scale}");
        }
    }

    #[test]
    fn perspective_is_not_affine_but_invertible() {
        let p = Transform3d::from_perspective(1.0, 1.5, 0.1, 100.0);
        assert!(!p.is_affine());
        let inv = p.inverse().expect("perspective is invertible");
        let q = inv.map_point(p.map_point([0.3, -0.2, -5.0]));
        assert!((q[0] - 0.3).abs() < 1e-9);
        assert!((q[1] + 0.2).abs() < 1e-9);
        assert!((q[2] + 5.0).abs() < 1e-9);
    }

    #[test]
    fn cols_array_round_trip() {
        let t = Transform3d::from_translation(5.0, 6.0, 7.0);
        assert_eq!(Transform3d::from_cols_array(t.to_cols_array()), t);
        assert_eq!(t.to_cols_array_f32()[12], 5.0);
    }

    #[test]
    fn nan_detected() {
        let mut t = Transform3d::IDENTITY;
        t.cols[2][1] = f64::NAN;
        assert!(!t.is_finite());
        assert!(t.is_nan());
    }

    #[test]
    fn infinity_detected() {
        let mut t = Transform3d::IDENTITY;
        t.cols[0][3] = f64::INFINITY;
        assert!(!t.is_finite());
        assert!(!t.is_nan());
    }
}
