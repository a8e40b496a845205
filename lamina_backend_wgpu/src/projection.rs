// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root-space to clip-space mapping.

/// The identity matrix: root space is clip space.
pub const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Orthographic projection for a pixel-like root space.
///
/// Maps `(0, 0)` to the top-left corner of the target and
/// `(width, height)` to the bottom-right, with `y` growing downward. `z` is
/// flattened to `0.5` so depth never clips.
#[must_use]
pub fn pixel_ortho(width: f32, height: f32) -> [f32; 16] {
    [
        2.0 / width, 0.0, 0.0, 0.0, //
        0.0, -2.0 / height, 0.0, 0.0, //
        0.0, 0.0, 0.0, 0.0, //
        -1.0, 1.0, 0.5, 1.0,
    ]
}

/// Column-major product `a * b` (applies `b` first).
pub(crate) fn multiply(a: &[f32; 16], b: &[f32; 16]) -> [f32; 16] {
    let mut out = [0.0; 16];
    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(m: &[f32; 16], p: [f32; 3]) -> [f32; 4] {
        let v = [p[0], p[1], p[2], 1.0];
        let mut out = [0.0; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|k| m[k * 4 + row] * v[k]).sum();
        }
        out
    }

    #[test]
    fn pixel_corners_reach_clip_corners() {
        let m = pixel_ortho(256.0, 128.0);
        assert_eq!(apply(&m, [0.0, 0.0, 0.0]), [-1.0, 1.0, 0.5, 1.0]);
        assert_eq!(apply(&m, [256.0, 128.0, 7.0]), [1.0, -1.0, 0.5, 1.0]);
    }

    #[test]
    fn multiply_applies_right_operand_first() {
        let mut translate = IDENTITY;
        translate[12] = 3.0;
        let mut scale = IDENTITY;
        scale[0] = 2.0;
        // Scale then translate: x' = 2x + 3.
        let m = multiply(&translate, &scale);
        assert_eq!(apply(&m, [1.0, 0.0, 0.0])[0], 5.0);
        assert_eq!(multiply(&IDENTITY, &m), m);
    }
}
