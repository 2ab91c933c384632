//! Contains the image buffer types needed across the crate.

use crate::{QuantizeError, Sample, MAX_PIXELS};
use std::{
    error::Error,
    fmt::{Debug, Display},
};

/// An error type for when the length of an input (e.g., `Vec` or slice)
/// is above the maximum supported value.
///
/// The inner value is the maximum supported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AboveMaxLen<T>(pub T);

impl<T: Display> Display for AboveMaxLen<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "above the maximum length of {}", self.0)
    }
}

impl<T: Debug + Display> Error for AboveMaxLen<T> {}

/// The channel layout of an image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channels {
    /// Three samples per pixel: red, green, blue.
    Rgb,
    /// Four samples per pixel: red, green, blue, alpha.
    Rgba,
}

impl Channels {
    /// The number of samples per pixel.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        }
    }

    /// Whether the layout carries an alpha channel.
    #[must_use]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Channels::Rgba)
    }
}

impl TryFrom<usize> for Channels {
    type Error = QuantizeError;

    fn try_from(count: usize) -> Result<Self, Self::Error> {
        match count {
            3 => Ok(Channels::Rgb),
            4 => Ok(Channels::Rgba),
            n => Err(QuantizeError::InvalidChannelCount(n)),
        }
    }
}

/// Returns `width * height` if it does not exceed [`MAX_PIXELS`].
fn checked_pixels(width: usize, height: usize) -> Result<u32, QuantizeError> {
    width
        .checked_mul(height)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(QuantizeError::TooManyPixels(AboveMaxLen(MAX_PIXELS)))
}

/// A borrowed, validated image: a dense `height x width` grid of pixels
/// stored row-major as a flat slice of interleaved samples.
///
/// The invariant `samples.len() == width * height * channels` is checked on construction.
///
/// # Examples
/// ```
/// # use labmatch::{ImageView, Channels, QuantizeError};
/// # fn main() -> Result<(), QuantizeError> {
/// let samples = vec![0.0f32; 2 * 3 * 4];
/// let image = ImageView::new(&samples, 2, 3, 4)?;
/// assert_eq!(image.channels(), Channels::Rgba);
/// assert_eq!(image.num_pixels(), 6);
///
/// assert!(ImageView::new(&samples, 2, 3, 3).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct ImageView<'a, S> {
    /// The interleaved samples.
    samples: &'a [S],
    /// The width of the image in pixels.
    width: u32,
    /// The height of the image in pixels.
    height: u32,
    /// The channel layout.
    channels: Channels,
}

impl<'a, S> Clone for ImageView<'a, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S> Copy for ImageView<'a, S> {}

impl<'a, S: Sample> ImageView<'a, S> {
    /// Creates a new [`ImageView`] over `samples`, which must hold
    /// `width * height * channels` samples with `channels` being `3` or `4`.
    ///
    /// # Errors
    /// Returns [`QuantizeError::InvalidChannelCount`] or [`QuantizeError::BufferSize`]
    /// if the buffer does not match the given shape, and [`QuantizeError::TooManyPixels`]
    /// if the image is larger than [`MAX_PIXELS`].
    pub fn new(
        samples: &'a [S],
        width: u32,
        height: u32,
        channels: usize,
    ) -> Result<Self, QuantizeError> {
        let channels = Channels::try_from(channels)?;
        let pixels = checked_pixels(width as usize, height as usize)?;
        let expected = pixels as usize * channels.count();
        if samples.len() == expected {
            Ok(Self { samples, width, height, channels })
        } else {
            Err(QuantizeError::BufferSize { expected, actual: samples.len() })
        }
    }

    /// Returns the index of the first sample that is `NAN` or infinite, if any.
    #[must_use]
    pub fn first_non_finite(&self) -> Option<usize> {
        self.samples.iter().position(|&s| !s.is_finite())
    }
}

impl<'a, S> ImageView<'a, S> {
    /// The interleaved samples.
    #[must_use]
    pub const fn samples(&self) -> &'a [S] {
        self.samples
    }

    /// The width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The `(width, height)` of the image.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The channel layout.
    #[must_use]
    pub const fn channels(&self) -> Channels {
        self.channels
    }

    /// The number of pixels in the image.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn num_pixels(&self) -> u32 {
        (self.samples.len() / self.channels.count()) as u32
    }

    /// Whether the image has no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// An owned image buffer, used to build an [`ImageView`] from separate rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer<S> {
    /// The interleaved samples.
    samples: Vec<S>,
    /// The width of the image in pixels.
    width: u32,
    /// The height of the image in pixels.
    height: u32,
    /// The channel layout.
    channels: Channels,
}

impl<S: Sample> SampleBuffer<S> {
    /// Flattens a sequence of rows, each holding `width * channels` interleaved samples.
    ///
    /// The width is taken from the first row.
    ///
    /// # Errors
    /// Returns [`QuantizeError::InvalidChannelCount`] if `channels` is not `3` or `4`,
    /// and [`QuantizeError::RaggedRows`] if a row does not contain a whole number of pixels
    /// or is not as long as the first row.
    ///
    /// # Examples
    /// ```
    /// # use labmatch::{SampleBuffer, QuantizeError};
    /// let rows = [vec![0u8; 6], vec![0; 6]];
    /// let buffer = SampleBuffer::from_rows(&rows, 3).unwrap();
    /// assert_eq!(buffer.view().dimensions(), (2, 2));
    ///
    /// let ragged = [vec![0u8; 6], vec![0; 3]];
    /// assert_eq!(
    ///     SampleBuffer::from_rows(&ragged, 3),
    ///     Err(QuantizeError::RaggedRows { row: 1, expected: 6, actual: 3 }),
    /// );
    /// ```
    pub fn from_rows<Row: AsRef<[S]>>(rows: &[Row], channels: usize) -> Result<Self, QuantizeError> {
        let channels = Channels::try_from(channels)?;

        let row_len = rows.first().map_or(0, |row| row.as_ref().len());
        let width = row_len / channels.count();
        let expected = width * channels.count();

        for (row, samples) in rows.iter().enumerate() {
            let actual = samples.as_ref().len();
            if actual != expected {
                return Err(QuantizeError::RaggedRows { row, expected, actual });
            }
        }

        let pixels = checked_pixels(width, rows.len())?;
        let mut samples = Vec::with_capacity(pixels as usize * channels.count());
        for row in rows {
            samples.extend_from_slice(row.as_ref());
        }

        #[allow(clippy::cast_possible_truncation)]
        {
            // width * height <= MAX_PIXELS = u32::MAX
            Ok(Self {
                samples,
                width: width as u32,
                height: rows.len() as u32,
                channels,
            })
        }
    }
}

impl<S> SampleBuffer<S> {
    /// Borrows the buffer as an [`ImageView`].
    #[must_use]
    pub fn view(&self) -> ImageView<'_, S> {
        ImageView {
            samples: &self.samples,
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }

    /// Returns the flat interleaved samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<S> {
        self.samples
    }
}

/// The output of [`PaletteQuantizer::quantize`](crate::PaletteQuantizer::quantize).
///
/// Holds, for each pixel, the index of the chosen palette color and the 8-bit output samples:
/// the palette color's red, green, and blue followed by the pixel's alpha if the input had one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedImage {
    /// The width of the image in pixels.
    pub(crate) width: u32,
    /// The height of the image in pixels.
    pub(crate) height: u32,
    /// The channel layout, matching the input image.
    pub(crate) channels: Channels,
    /// The palette index chosen for each pixel.
    pub(crate) indices: Vec<u8>,
    /// The interleaved output samples.
    pub(crate) samples: Vec<u8>,
}

impl QuantizedImage {
    /// The width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The `(width, height)` of the image.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The channel layout, which is the same as the input image's.
    #[must_use]
    pub const fn channels(&self) -> Channels {
        self.channels
    }

    /// The palette index chosen for each pixel, in row-major order.
    #[must_use]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// The interleaved 8-bit output samples.
    #[must_use]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Borrows the output as an [`ImageView`], e.g., to quantize it again.
    #[must_use]
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            samples: &self.samples,
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }

    /// Consumes the image, returning the palette indices and the output samples.
    #[must_use]
    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>) {
        (self.indices, self.samples)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn channel_counts() {
        assert_eq!(Channels::try_from(3), Ok(Channels::Rgb));
        assert_eq!(Channels::try_from(4), Ok(Channels::Rgba));
        for n in [0, 1, 2, 5] {
            assert_eq!(Channels::try_from(n), Err(QuantizeError::InvalidChannelCount(n)));
        }
    }

    #[test]
    fn view_rejects_mismatched_buffer() {
        let samples = [0u8; 12];
        assert!(ImageView::new(&samples, 2, 2, 3).is_ok());
        assert!(ImageView::new(&samples, 3, 1, 4).is_ok());
        assert_eq!(
            ImageView::new(&samples, 2, 2, 4),
            Err(QuantizeError::BufferSize { expected: 16, actual: 12 })
        );
        assert_eq!(
            ImageView::new(&samples, 2, 2, 2),
            Err(QuantizeError::InvalidChannelCount(2))
        );
    }

    #[test]
    fn empty_view() {
        let view = ImageView::<f32>::new(&[], 0, 5, 3).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.num_pixels(), 0);
        assert_eq!(view.dimensions(), (0, 5));
    }

    #[test]
    fn view_rejects_too_many_pixels() {
        fn too_many<'a, S>() -> Result<ImageView<'a, S>, QuantizeError> {
            Err(QuantizeError::TooManyPixels(AboveMaxLen(MAX_PIXELS)))
        }
        assert_eq!(ImageView::<u8>::new(&[], u32::MAX, 2, 3), too_many());
        assert_eq!(ImageView::<f32>::new(&[], 2, u32::MAX, 4), too_many());
        assert_eq!(ImageView::<u8>::new(&[], u32::MAX, u32::MAX, 3), too_many());

        let view = ImageView::<u8>::new(&[], u32::MAX, 0, 3).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.dimensions(), (u32::MAX, 0));
    }

    #[test]
    fn view_finds_non_finite_samples() {
        let samples = [0.0, 0.5, 1.0, 0.2, f32::NAN, 0.3];
        let view = ImageView::new(&samples, 2, 1, 3).unwrap();
        assert_eq!(view.first_non_finite(), Some(4));

        let samples = [0.0, 0.5, 1.0];
        let view = ImageView::new(&samples, 1, 1, 3).unwrap();
        assert_eq!(view.first_non_finite(), None);
    }

    #[test]
    fn rows_flatten_in_order() {
        let rows = [[1u8, 2, 3, 4], [5, 6, 7, 8], [9, 10, 11, 12]];
        let buffer = SampleBuffer::from_rows(&rows, 4).unwrap();
        let view = buffer.view();
        assert_eq!(view.dimensions(), (1, 3));
        assert_eq!(view.channels(), Channels::Rgba);
        assert_eq!(buffer.into_samples(), (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn rows_must_hold_whole_pixels() {
        let rows = [vec![0u8; 7]];
        assert_eq!(
            SampleBuffer::from_rows(&rows, 3),
            Err(QuantizeError::RaggedRows { row: 0, expected: 6, actual: 7 })
        );
    }

    #[test]
    fn no_rows() {
        let rows: [Vec<u8>; 0] = [];
        let buffer = SampleBuffer::from_rows(&rows, 3).unwrap();
        assert!(buffer.view().is_empty());
        assert_eq!(buffer.view().dimensions(), (0, 0));
    }
}
