use num_traits::{AsPrimitive, Float};

/// A numeric sample type that image buffers can hold.
///
/// Integer samples span their full range (`0..=255` for `u8`, `0..=65535` for `u16`),
/// while float samples are expected to be normalized to `0.0..=1.0`
/// and are clamped to that range when read.
pub trait Sample: AsPrimitive<f32> + Send + Sync {
    /// The sample value that represents full intensity.
    const FULL_SCALE: f32;

    /// Normalizes the sample to `0.0..=1.0`.
    #[inline]
    fn to_unit(self) -> f32 {
        self.as_() / Self::FULL_SCALE
    }

    /// Converts an alpha sample to 8 bits via `round(clamp(alpha * 255, 0, 255))`.
    #[inline]
    fn to_alpha_u8(self) -> u8 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (self.to_unit() * 255.0).clamp(0.0, 255.0).round() as u8
        }
    }

    /// Whether the sample is a finite number. Always `true` for integers.
    #[inline]
    fn is_finite(self) -> bool {
        true
    }
}

impl Sample for u8 {
    const FULL_SCALE: f32 = 255.0;

    #[inline]
    fn to_alpha_u8(self) -> u8 {
        self
    }
}

impl Sample for u16 {
    const FULL_SCALE: f32 = 65535.0;
}

impl Sample for f32 {
    const FULL_SCALE: f32 = 1.0;

    #[inline]
    fn to_unit(self) -> f32 {
        self.clamp(0.0, 1.0)
    }

    #[inline]
    fn is_finite(self) -> bool {
        Float::is_finite(self)
    }
}

impl Sample for f64 {
    const FULL_SCALE: f32 = 1.0;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn to_unit(self) -> f32 {
        // clamp before narrowing so values above `f32::MAX` stay finite
        self.clamp(0.0, 1.0) as f32
    }

    #[inline]
    fn is_finite(self) -> bool {
        Float::is_finite(self)
    }
}
