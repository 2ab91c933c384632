//! Integration with the [`image`] crate.

use crate::{Channels, ImageView, PaletteQuantizer, QuantizeError, QuantizedImage};
use image::{
    DynamicImage, ImageBuffer, Rgb, Rgb32FImage, RgbImage, Rgba, Rgba32FImage, RgbaImage,
};

/// Implements `TryFrom<&Image>` for [`ImageView`] over the image's flat sample buffer.
macro_rules! impl_try_from_image {
    ($image: ty, $sample: ty, $channels: literal) => {
        impl<'a> TryFrom<&'a $image> for ImageView<'a, $sample> {
            type Error = QuantizeError;

            fn try_from(image: &'a $image) -> Result<Self, Self::Error> {
                let len = image.pixels().len() * $channels;
                ImageView::new(&image.as_raw()[..len], image.width(), image.height(), $channels)
            }
        }
    };
}

impl_try_from_image!(RgbImage, u8, 3);
impl_try_from_image!(RgbaImage, u8, 4);
impl_try_from_image!(ImageBuffer<Rgb<u16>, Vec<u16>>, u16, 3);
impl_try_from_image!(ImageBuffer<Rgba<u16>, Vec<u16>>, u16, 4);
impl_try_from_image!(Rgb32FImage, f32, 3);
impl_try_from_image!(Rgba32FImage, f32, 4);

/// Quantizes each [`DynamicImage`] variant at its native sample precision.
macro_rules! quantize_dynamic {
    ($quantizer: ident . $method: ident ( $image: ident )) => {
        match $image {
            DynamicImage::ImageRgb8(image) => $quantizer.$method(ImageView::<u8>::try_from(image)?),
            DynamicImage::ImageRgba8(image) => {
                $quantizer.$method(ImageView::<u8>::try_from(image)?)
            }
            DynamicImage::ImageRgb16(image) => {
                $quantizer.$method(ImageView::<u16>::try_from(image)?)
            }
            DynamicImage::ImageRgba16(image) => {
                $quantizer.$method(ImageView::<u16>::try_from(image)?)
            }
            DynamicImage::ImageRgb32F(image) => {
                $quantizer.$method(ImageView::<f32>::try_from(image)?)
            }
            DynamicImage::ImageRgba32F(image) => {
                $quantizer.$method(ImageView::<f32>::try_from(image)?)
            }
            DynamicImage::ImageLuma8(_) => {
                $quantizer.$method(ImageView::<u8>::try_from(&$image.to_rgb8())?)
            }
            DynamicImage::ImageLumaA8(_) => {
                $quantizer.$method(ImageView::<u8>::try_from(&$image.to_rgba8())?)
            }
            DynamicImage::ImageLuma16(_) => {
                $quantizer.$method(ImageView::<u16>::try_from(&$image.to_rgb16())?)
            }
            DynamicImage::ImageLumaA16(_) => {
                $quantizer.$method(ImageView::<u16>::try_from(&$image.to_rgba16())?)
            }
            image if image.color().has_alpha() => {
                $quantizer.$method(ImageView::<f32>::try_from(&image.to_rgba32f())?)
            }
            image => $quantizer.$method(ImageView::<f32>::try_from(&image.to_rgb32f())?),
        }
    };
}

impl PaletteQuantizer {
    /// Remaps each pixel of a [`DynamicImage`] to its nearest palette color.
    ///
    /// 8-bit, 16-bit, and floating point images are read at their native precision.
    /// Grayscale images are expanded to RGB first.
    /// The returned image is [`DynamicImage::ImageRgba8`] if the input has an alpha channel
    /// and [`DynamicImage::ImageRgb8`] otherwise.
    ///
    /// # Errors
    /// Returns [`QuantizeError::NonFiniteSample`] if a floating point sample is `NAN` or infinite,
    /// and [`QuantizeError::TooManyPixels`] if the image has more than
    /// [`MAX_PIXELS`](crate::MAX_PIXELS) pixels.
    pub fn quantize_image(&self, image: &DynamicImage) -> Result<DynamicImage, QuantizeError> {
        let quantized = quantize_dynamic!(self.quantize(image))?;
        Ok(quantized.into_dynamic_image())
    }

    /// Remaps each pixel of an [`RgbImage`] to its nearest palette color.
    ///
    /// # Errors
    /// Returns [`QuantizeError::TooManyPixels`] if the image has more than
    /// [`MAX_PIXELS`](crate::MAX_PIXELS) pixels.
    pub fn quantize_rgbimage(&self, image: &RgbImage) -> Result<RgbImage, QuantizeError> {
        Ok(self.quantize(ImageView::<u8>::try_from(image)?)?.into_rgb_image())
    }
}

#[cfg(feature = "threads")]
impl PaletteQuantizer {
    /// Remaps each pixel of a [`DynamicImage`] to its nearest palette color in parallel.
    ///
    /// Gives the same output as [`PaletteQuantizer::quantize_image`].
    ///
    /// # Errors
    /// See [`PaletteQuantizer::quantize_image`].
    pub fn quantize_image_par(&self, image: &DynamicImage) -> Result<DynamicImage, QuantizeError> {
        let quantized = quantize_dynamic!(self.quantize_par(image))?;
        Ok(quantized.into_dynamic_image())
    }

    /// Remaps each pixel of an [`RgbImage`] to its nearest palette color in parallel.
    ///
    /// # Errors
    /// See [`PaletteQuantizer::quantize_rgbimage`].
    pub fn quantize_rgbimage_par(&self, image: &RgbImage) -> Result<RgbImage, QuantizeError> {
        Ok(self.quantize_par(ImageView::<u8>::try_from(image)?)?.into_rgb_image())
    }
}

impl QuantizedImage {
    /// Converts the output to an [`RgbImage`], dropping the alpha channel if there is one.
    #[must_use]
    pub fn into_rgb_image(self) -> RgbImage {
        let Self { width, height, channels, samples, .. } = self;

        let buf = match channels {
            Channels::Rgb => samples,
            Channels::Rgba => samples
                .chunks_exact(4)
                .flat_map(|pixel| [pixel[0], pixel[1], pixel[2]])
                .collect(),
        };

        #[allow(clippy::expect_used)]
        {
            // samples.len() is width * height * channels by construction
            RgbImage::from_vec(width, height, buf).expect("large enough buffer")
        }
    }

    /// Converts the output to an [`RgbaImage`], using an opaque alpha if there is no alpha channel.
    #[must_use]
    pub fn into_rgba_image(self) -> RgbaImage {
        let Self { width, height, channels, samples, .. } = self;

        let buf = match channels {
            Channels::Rgb => samples
                .chunks_exact(3)
                .flat_map(|pixel| [pixel[0], pixel[1], pixel[2], u8::MAX])
                .collect(),
            Channels::Rgba => samples,
        };

        #[allow(clippy::expect_used)]
        {
            // samples.len() is width * height * channels by construction
            RgbaImage::from_vec(width, height, buf).expect("large enough buffer")
        }
    }

    /// Converts the output to a [`DynamicImage`], choosing RGB or RGBA to match the input.
    #[must_use]
    pub fn into_dynamic_image(self) -> DynamicImage {
        match self.channels {
            Channels::Rgb => DynamicImage::ImageRgb8(self.into_rgb_image()),
            Channels::Rgba => DynamicImage::ImageRgba8(self.into_rgba_image()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;
    use image::{GrayImage, Luma};
    use palette::{cast, Srgb};

    fn rgbimage(colors: &[Srgb<u8>], width: u32, height: u32) -> RgbImage {
        RgbImage::from_vec(width, height, cast::into_component_slice(colors).to_vec()).unwrap()
    }

    #[test]
    fn views_match_buffers() {
        let image = rgbimage(&test_data_1024(), 32, 32);
        let view = ImageView::<u8>::try_from(&image).unwrap();
        assert_eq!(view.dimensions(), (32, 32));
        assert_eq!(view.channels(), Channels::Rgb);
        assert_eq!(view.samples(), image.as_raw().as_slice());

        let image = RgbaImage::from_vec(32, 32, test_rgba(1024, 3)).unwrap();
        let view = ImageView::<u8>::try_from(&image).unwrap();
        assert_eq!(view.channels(), Channels::Rgba);
        assert_eq!(view.num_pixels(), 1024);
    }

    #[test]
    fn rgb_stays_rgb() {
        let quantizer = PaletteQuantizer::new(&test_data(31, 1)).unwrap();
        let image = rgbimage(&test_data_1024(), 16, 64);

        let output = quantizer.quantize_image(&DynamicImage::ImageRgb8(image.clone())).unwrap();
        let DynamicImage::ImageRgb8(output) = output else {
            panic!("expected an RGB image");
        };
        assert_eq!(output.dimensions(), (16, 64));
        assert_eq!(output, quantizer.quantize_rgbimage(&image).unwrap());

        for pixel in output.pixels() {
            assert!(quantizer.palette().contains(&Srgb::from(pixel.0)));
        }

        #[cfg(feature = "threads")]
        assert_eq!(output, quantizer.quantize_rgbimage_par(&image).unwrap());
    }

    #[test]
    fn rgba_keeps_alpha() {
        let quantizer = PaletteQuantizer::new(&test_data(63, 2)).unwrap();
        let image = RgbaImage::from_vec(32, 32, test_rgba(1024, 5)).unwrap();

        let output = quantizer.quantize_image(&DynamicImage::ImageRgba8(image.clone())).unwrap();
        let DynamicImage::ImageRgba8(output) = output else {
            panic!("expected an RGBA image");
        };

        for (input, output) in image.pixels().zip(output.pixels()) {
            assert_eq!(input.0[3], output.0[3]);
        }

        #[cfg(feature = "threads")]
        assert_eq!(
            quantizer.quantize_image_par(&DynamicImage::ImageRgba8(image)).unwrap(),
            DynamicImage::ImageRgba8(output)
        );
    }

    #[test]
    fn float_images_match_8_bit() {
        let quantizer = PaletteQuantizer::new(&test_data(63, 3)).unwrap();
        let image = rgbimage(&test_data_1024(), 32, 32);
        let float = image.as_raw().iter().map(|&s| f32::from(s) / 255.0).collect();
        let float = Rgb32FImage::from_vec(32, 32, float).unwrap();

        assert_eq!(
            quantizer.quantize_image(&DynamicImage::ImageRgb8(image)).unwrap(),
            quantizer.quantize_image(&DynamicImage::ImageRgb32F(float)).unwrap()
        );
    }

    #[test]
    fn grayscale_is_expanded() {
        let quantizer = PaletteQuantizer::new(&[Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)])
            .unwrap();
        let image = GrayImage::from_fn(16, 1, |x, _| Luma([u8::try_from(x * 16).unwrap()]));

        let output = quantizer.quantize_image(&DynamicImage::ImageLuma8(image)).unwrap();
        let DynamicImage::ImageRgb8(output) = output else {
            panic!("expected an RGB image");
        };
        assert_eq!(output.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(output.get_pixel(15, 0).0, [255, 255, 255]);
    }

    #[test]
    fn channel_conversions() {
        let quantizer = PaletteQuantizer::new(&test_data(8, 4)).unwrap();
        let samples = test_rgba(64, 6);
        let output = quantizer.quantize(ImageView::new(&samples, 8, 8, 4).unwrap()).unwrap();

        let rgb = output.clone().into_rgb_image();
        let rgba = output.into_rgba_image();
        for (rgb, rgba) in rgb.pixels().zip(rgba.pixels()) {
            assert_eq!(rgb.0, [rgba.0[0], rgba.0[1], rgba.0[2]]);
        }

        let samples = cast::into_component_slice(&test_data(64, 8)).to_vec();
        let output = quantizer.quantize(ImageView::new(&samples, 8, 8, 3).unwrap()).unwrap();
        assert!(output.into_rgba_image().pixels().all(|p| p.0[3] == u8::MAX));
    }
}
