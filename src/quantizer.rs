//! Contains the [`PaletteQuantizer`] which remaps images to their nearest palette colors.

use crate::{
    lab::{srgb_to_lab, srgb_to_lab_slice, srgb_u8_to_lab},
    AboveMaxLen, Channels, ImageView, QuantizeError, QuantizedImage, Sample, MAX_COLORS, MAX_K,
};
use palette::{
    cast::{self, IntoComponents},
    Lab, Srgb, Srgba,
};
#[cfg(feature = "threads")]
use {crate::lab::srgb_to_lab_slice_par, rayon::prelude::*};
use std::array;
use wide::{f32x8, u32x8, CmpLt};

/// Squared euclidean distance between two points.
#[inline]
pub(crate) fn squared_euclidean_distance<const N: usize>(x: [f32; N], y: [f32; N]) -> f32 {
    let mut dist = 0.0;
    for c in 0..N {
        let d = x[c] - y[c];
        dist += d * d;
    }
    dist
}

/// Returns the index of the point nearest to `query`.
///
/// `points` holds the palette in chunks of 8, with each lane of the last chunk
/// past the end of the palette set to `INFINITY`.
/// If several points are equally near, the lowest index is returned.
#[inline]
fn simd_argmin<const N: usize>(points: &[[f32x8; N]], query: [f32; N]) -> u8 {
    let incr = u32x8::ONE;
    let mut cur_chunk = u32x8::ZERO;
    let mut min_chunk = cur_chunk;
    let mut min_distance = f32x8::splat(f32::INFINITY);

    let query = query.map(f32x8::splat);

    for chunk in points {
        let mut distance = f32x8::splat(0.0);
        for (q, c) in query.iter().zip(chunk) {
            let diff = *q - *c;
            distance += diff * diff;
        }

        // strict comparison keeps the earliest chunk on ties
        let mask = u32x8::new(distance.cmp_lt(min_distance).to_array().map(f32::to_bits));
        min_chunk = mask.blend(cur_chunk, min_chunk);
        min_distance = min_distance.fast_min(distance);
        cur_chunk += incr;
    }

    let mut min_index = 0;
    let mut min_dist = f32::INFINITY;
    let chunks = min_chunk.as_array_ref();
    for (lane, &dist) in min_distance.as_array_ref().iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let index = chunks[lane] * 8 + lane as u32;
        #[allow(clippy::float_cmp)]
        if dist < min_dist || (dist == min_dist && index < min_index) {
            min_dist = dist;
            min_index = index;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    {
        min_index as u8
    }
}

/// Lays out the palette's [`Lab`] colors in chunks of 8 for [`simd_argmin`].
fn simd_components(lab: &[Lab]) -> Vec<[f32x8; 3]> {
    let arrays: &[[f32; 3]] = cast::into_array_slice(lab);
    let chunks = arrays.chunks_exact(8);

    let mut components = Vec::with_capacity(arrays.len().div_ceil(8));
    components.extend(
        chunks
            .clone()
            .map(|chunk| array::from_fn(|i| f32x8::new(array::from_fn(|j| chunk[j][i])))),
    );

    if !chunks.remainder().is_empty() {
        let mut arr = [[f32::INFINITY; 8]; 3];
        for (i, color) in chunks.remainder().iter().enumerate() {
            for (arr, &c) in arr.iter_mut().zip(color) {
                arr[i] = c;
            }
        }
        components.push(arr.map(f32x8::new));
    }

    components
}

/// Normalizes the RGB samples of a pixel to an sRGB color in `0.0..=1.0`.
#[inline]
fn pixel_to_srgb<S: Sample>(pixel: &[S]) -> Srgb<f32> {
    Srgb::new(pixel[0].to_unit(), pixel[1].to_unit(), pixel[2].to_unit())
}

/// Rejects images with a `NAN` or infinite sample.
#[inline]
fn check_finite<S: Sample>(image: ImageView<'_, S>) -> Result<(), QuantizeError> {
    match image.first_non_finite() {
        Some(index) => Err(QuantizeError::NonFiniteSample { index }),
        None => Ok(()),
    }
}

/// Assembles a [`QuantizedImage`] with the dimensions of `image`.
fn output<S>(image: ImageView<'_, S>, indices: Vec<u8>, samples: Vec<u8>) -> QuantizedImage {
    let (width, height) = image.dimensions();
    QuantizedImage {
        width,
        height,
        channels: image.channels(),
        indices,
        samples,
    }
}

/// Maps each pixel of an image to the nearest color of a fixed palette,
/// measured by squared euclidean distance in the CIELAB color space.
///
/// The palette's CIELAB colors are computed once on construction and never change afterwards,
/// so a single [`PaletteQuantizer`] can be shared freely across threads and reused for many images.
///
/// If two palette colors are equally near to a pixel, the one with the lower index is chosen.
///
/// # Examples
/// ```
/// # use labmatch::{ImageView, PaletteQuantizer, QuantizeError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), QuantizeError> {
/// let palette = [Srgb::new(0, 0, 0), Srgb::new(255, 255, 255), Srgb::new(255, 0, 0)];
/// let quantizer = PaletteQuantizer::new(&palette)?;
///
/// let samples = [0.9f32, 0.1, 0.2, 0.8, 0.8, 0.8];
/// let quantized = quantizer.quantize(ImageView::new(&samples, 2, 1, 3)?)?;
///
/// assert_eq!(quantized.indices(), [2, 1]);
/// assert_eq!(quantized.samples(), [255, 0, 0, 255, 255, 255]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PaletteQuantizer {
    /// The original 8-bit palette colors.
    palette: Vec<Srgb<u8>>,
    /// The palette colors converted to [`Lab`].
    lab: Vec<Lab>,
    /// The [`Lab`] palette in chunks of 8.
    components: Vec<[f32x8; 3]>,
}

impl PaletteQuantizer {
    /// Creates a new [`PaletteQuantizer`] for the given palette.
    ///
    /// The palette colors need not be unique.
    ///
    /// # Errors
    /// Returns [`QuantizeError::EmptyPalette`] if `palette` is empty
    /// and [`QuantizeError::PaletteTooLarge`] if it has more than [`MAX_COLORS`] colors.
    pub fn new(palette: &[Srgb<u8>]) -> Result<Self, QuantizeError> {
        if palette.is_empty() {
            return Err(QuantizeError::EmptyPalette);
        }
        if palette.len() > MAX_K {
            return Err(QuantizeError::PaletteTooLarge(AboveMaxLen(MAX_COLORS)));
        }

        let lab = palette.iter().copied().map(srgb_u8_to_lab).collect::<Vec<_>>();
        let components = simd_components(&lab);

        Ok(Self { palette: palette.to_vec(), lab, components })
    }

    /// The palette colors.
    #[must_use]
    pub fn palette(&self) -> &[Srgb<u8>] {
        &self.palette
    }

    /// The palette colors converted to [`Lab`].
    #[must_use]
    pub fn lab_palette(&self) -> &[Lab] {
        &self.lab
    }

    /// The number of colors in the palette (at least `1`).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn num_colors(&self) -> u16 {
        self.palette.len() as u16
    }

    /// Returns the index of the palette color nearest to `color`.
    #[must_use]
    #[inline]
    pub fn nearest_index(&self, color: Lab) -> u8 {
        simd_argmin(&self.components, cast::into_array(color))
    }

    /// Returns the palette color nearest to the given sRGB color.
    ///
    /// Components are clamped to `0.0..=1.0` first.
    #[must_use]
    pub fn nearest_color(&self, color: Srgb<f32>) -> Srgb<u8> {
        let color = cast::from_array(cast::into_array(color).map(Sample::to_unit));
        self.palette[usize::from(self.nearest_index(srgb_to_lab(color)))]
    }

    /// Returns the index of the nearest palette color for each [`Lab`] color.
    #[must_use]
    pub fn indices(&self, colors: &[Lab]) -> Vec<u8> {
        colors.iter().map(|&color| self.nearest_index(color)).collect()
    }

    /// Returns the index of the nearest palette color for each 8-bit sRGB color.
    #[must_use]
    pub fn indices_srgb(&self, colors: &[Srgb<u8>]) -> Vec<u8> {
        colors
            .iter()
            .map(|&color| self.nearest_index(srgb_u8_to_lab(color)))
            .collect()
    }

    /// Remaps each pixel of `image` to its nearest palette color.
    ///
    /// The output has the same dimensions and channel layout as `image`.
    /// Float samples outside `0.0..=1.0` are clamped to that range.
    /// Alpha samples do not affect the choice of color and are copied to the output,
    /// converted to 8 bits if needed.
    ///
    /// # Errors
    /// Returns [`QuantizeError::NonFiniteSample`] if any sample is `NAN` or infinite.
    pub fn quantize<S: Sample>(
        &self,
        image: ImageView<'_, S>,
    ) -> Result<QuantizedImage, QuantizeError> {
        check_finite(image)?;

        let channels = image.channels();
        let colors = image
            .samples()
            .chunks_exact(channels.count())
            .map(pixel_to_srgb)
            .collect::<Vec<_>>();

        let lab = srgb_to_lab_slice(&colors);
        let indices = self.indices(&lab);
        let samples = self.remapped_samples(image, &indices);

        Ok(output(image, indices, samples))
    }

    /// Builds the interleaved output samples for the given palette indices.
    fn remapped_samples<S: Sample>(&self, image: ImageView<'_, S>, indices: &[u8]) -> Vec<u8> {
        let palette = self.palette.as_slice();
        match image.channels() {
            Channels::Rgb => indices
                .iter()
                .map(|&i| palette[usize::from(i)])
                .collect::<Vec<_>>()
                .into_components(),
            Channels::Rgba => indices
                .iter()
                .zip(image.samples().chunks_exact(4))
                .map(|(&i, pixel)| Srgba {
                    color: palette[usize::from(i)],
                    alpha: pixel[3].to_alpha_u8(),
                })
                .collect::<Vec<_>>()
                .into_components(),
        }
    }
}

#[cfg(feature = "threads")]
impl PaletteQuantizer {
    /// Returns the index of the nearest palette color for each [`Lab`] color in parallel.
    #[must_use]
    pub fn indices_par(&self, colors: &[Lab]) -> Vec<u8> {
        colors.par_iter().map(|&color| self.nearest_index(color)).collect()
    }

    /// Returns the index of the nearest palette color for each 8-bit sRGB color in parallel.
    #[must_use]
    pub fn indices_srgb_par(&self, colors: &[Srgb<u8>]) -> Vec<u8> {
        colors
            .par_iter()
            .map(|&color| self.nearest_index(srgb_u8_to_lab(color)))
            .collect()
    }

    /// Remaps each pixel of `image` to its nearest palette color in parallel.
    ///
    /// Gives the same output as [`PaletteQuantizer::quantize`].
    ///
    /// # Errors
    /// Returns [`QuantizeError::NonFiniteSample`] if any sample is `NAN` or infinite.
    pub fn quantize_par<S: Sample>(
        &self,
        image: ImageView<'_, S>,
    ) -> Result<QuantizedImage, QuantizeError> {
        check_finite(image)?;

        let channels = image.channels();
        let colors = image
            .samples()
            .par_chunks_exact(channels.count())
            .map(pixel_to_srgb)
            .collect::<Vec<_>>();

        let lab = srgb_to_lab_slice_par(&colors);
        let indices = self.indices_par(&lab);
        let samples = self.remapped_samples_par(image, &indices);

        Ok(output(image, indices, samples))
    }

    /// Builds the interleaved output samples for the given palette indices in parallel.
    fn remapped_samples_par<S: Sample>(&self, image: ImageView<'_, S>, indices: &[u8]) -> Vec<u8> {
        let palette = self.palette.as_slice();
        match image.channels() {
            Channels::Rgb => indices
                .par_iter()
                .map(|&i| palette[usize::from(i)])
                .collect::<Vec<_>>()
                .into_components(),
            Channels::Rgba => indices
                .par_iter()
                .zip(image.samples().par_chunks_exact(4))
                .map(|(&i, pixel)| Srgba {
                    color: palette[usize::from(i)],
                    alpha: pixel[3].to_alpha_u8(),
                })
                .collect::<Vec<_>>()
                .into_components(),
        }
    }
}
