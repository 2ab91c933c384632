//! Conversion from sRGB to the CIELAB color space.
//!
//! The conversion goes sRGB → linear RGB → CIE XYZ → CIELAB using the sRGB primaries
//! and the D65 reference white. All math is done in `f32`, one pixel at a time,
//! so the batch functions give exactly the same results as converting each color by itself.
//!
//! # Examples
//! ```
//! # use labmatch::lab::rgb_to_lab;
//! let [l, a, b] = rgb_to_lab([1.0, 1.0, 1.0]);
//! assert!((l - 100.0).abs() < 1e-3 && a.abs() < 1e-3 && b.abs() < 1e-3);
//! ```

use crate::Sample;
use palette::{cast, Lab, Srgb};
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Values at or below this threshold are in the linear segment of the sRGB transfer function.
const SRGB_LINEAR_THRESHOLD: f32 = 0.04045;

/// Rows map linear `[r, g, b]` to `X`, `Y`, and `Z`.
const XYZ_FROM_LINEAR_SRGB: [[f32; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// The D65 reference white `(Xn, Yn, Zn)`.
const D65_WHITE: [f32; 3] = [0.95047, 1.00000, 1.08883];

/// `(6/29)^3`
const EPSILON: f32 = 216.0 / 24389.0;

/// `(1/3) * (29/6)^2`
const KAPPA: f32 = 841.0 / 108.0;

/// `4/29`
const OFFSET: f32 = 4.0 / 29.0;

/// Removes the sRGB transfer function from a component in `0.0..=1.0`.
#[must_use]
#[inline]
pub fn srgb_to_linear(u: f32) -> f32 {
    if u <= SRGB_LINEAR_THRESHOLD {
        u / 12.92
    } else {
        ((u + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts linear sRGB to CIE XYZ.
#[must_use]
#[inline]
pub fn linear_to_xyz(rgb: [f32; 3]) -> [f32; 3] {
    XYZ_FROM_LINEAR_SRGB.map(|[r, g, b]| r * rgb[0] + g * rgb[1] + b * rgb[2])
}

/// The CIELAB companding function.
#[inline]
fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        t * KAPPA + OFFSET
    }
}

/// Converts CIE XYZ (relative to the D65 white) to CIELAB as `[L, a, b]`.
#[must_use]
#[inline]
pub fn xyz_to_lab(xyz: [f32; 3]) -> [f32; 3] {
    let [fx, fy, fz] = [0, 1, 2].map(|i| lab_f(xyz[i] / D65_WHITE[i]));
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Converts an sRGB color with components in `0.0..=1.0` to CIELAB as `[L, a, b]`.
///
/// Components at exactly `0.0` or `1.0` (or slightly outside the range) are handled
/// without producing `NAN`.
#[must_use]
#[inline]
pub fn rgb_to_lab(rgb: [f32; 3]) -> [f32; 3] {
    xyz_to_lab(linear_to_xyz(rgb.map(srgb_to_linear)))
}

/// Converts an sRGB color with components in `0.0..=1.0` to a [`Lab`] color.
#[must_use]
#[inline]
pub fn srgb_to_lab(color: Srgb<f32>) -> Lab {
    cast::from_array(rgb_to_lab(cast::into_array(color)))
}

/// Converts an 8-bit sRGB color to a [`Lab`] color.
///
/// The components are normalized the same way as `u8` image samples,
/// so a pixel with the exact color of a palette entry converts to the exact same [`Lab`] value.
#[must_use]
#[inline]
pub fn srgb_u8_to_lab(color: Srgb<u8>) -> Lab {
    cast::from_array(rgb_to_lab(cast::into_array(color).map(Sample::to_unit)))
}

/// Converts a slice of sRGB colors to [`Lab`] colors.
#[must_use]
pub fn srgb_to_lab_slice(colors: &[Srgb<f32>]) -> Vec<Lab> {
    colors.iter().copied().map(srgb_to_lab).collect()
}

/// Converts a slice of sRGB colors to [`Lab`] colors in parallel.
#[cfg(feature = "threads")]
#[must_use]
pub fn srgb_to_lab_slice_par(colors: &[Srgb<f32>]) -> Vec<Lab> {
    colors.par_iter().copied().map(srgb_to_lab).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn assert_close(actual: [f32; 3], expected: [f32; 3], tolerance: f32) {
        for (a, e) in actual.into_iter().zip(expected) {
            assert!((a - e).abs() <= tolerance, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn known_values() {
        assert_close(rgb_to_lab([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0], 1e-4);
        assert_close(rgb_to_lab([1.0, 1.0, 1.0]), [100.0, 0.0, 0.0], 1e-3);
        assert_close(rgb_to_lab([1.0, 0.0, 0.0]), [53.24, 80.09, 67.20], 0.1);
        assert_close(rgb_to_lab([0.0, 1.0, 0.0]), [87.73, -86.18, 83.18], 0.1);
        assert_close(rgb_to_lab([0.0, 0.0, 1.0]), [32.30, 79.19, -107.86], 0.1);
        assert_close(rgb_to_lab([0.5, 0.5, 0.5]), [53.39, 0.0, 0.0], 0.01);
    }

    #[test]
    fn transfer_function_segments() {
        #[allow(clippy::float_cmp)]
        {
            assert_eq!(srgb_to_linear(0.0), 0.0);
            assert_eq!(srgb_to_linear(SRGB_LINEAR_THRESHOLD), SRGB_LINEAR_THRESHOLD / 12.92);
        }
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);

        // continuous across the threshold
        let below = srgb_to_linear(SRGB_LINEAR_THRESHOLD);
        let above = srgb_to_linear(SRGB_LINEAR_THRESHOLD + 1e-6);
        assert!((above - below).abs() < 1e-5);
    }

    #[test]
    fn companding_is_continuous() {
        let below = lab_f(EPSILON);
        let above = lab_f(EPSILON * (1.0 + 1e-6));
        assert!((above - below).abs() < 1e-4);
    }

    #[test]
    fn out_of_range_inputs_stay_finite() {
        for rgb in [[-0.1, 0.0, 0.0], [1.1, 1.0, 1.0], [-1.0, 2.0, 0.5]] {
            assert!(rgb_to_lab(rgb).iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn lightness_is_monotonic_for_grays() {
        let mut prev = f32::NEG_INFINITY;
        for v in 0..=u8::MAX {
            let l = srgb_u8_to_lab(Srgb::new(v, v, v)).l;
            assert!(l > prev);
            prev = l;
        }
    }

    #[test]
    fn batch_matches_single() {
        let colors = test_data_1024()
            .into_iter()
            .map(|c| c.into_format())
            .collect::<Vec<Srgb<f32>>>();

        let expected = colors.iter().copied().map(srgb_to_lab).collect::<Vec<_>>();
        assert_eq!(srgb_to_lab_slice(&colors), expected);

        #[cfg(feature = "threads")]
        assert_eq!(srgb_to_lab_slice_par(&colors), expected);

        assert!(srgb_to_lab_slice(&[]).is_empty());
    }
}
