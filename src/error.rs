//! Error types returned when a palette or an image buffer is rejected.

use crate::AboveMaxLen;
use std::{
    error::Error,
    fmt::{self, Display},
};

/// The error type for palette construction and image quantization.
///
/// All validation happens before any output buffer is allocated,
/// so a returned error never leaves a partially written result behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantizeError {
    /// The palette has no colors, so there is nothing to match against.
    EmptyPalette,
    /// The palette has more than [`MAX_COLORS`](crate::MAX_COLORS) colors.
    PaletteTooLarge(AboveMaxLen<u16>),
    /// The number of samples per pixel is not `3` (RGB) or `4` (RGBA).
    InvalidChannelCount(usize),
    /// A row does not have the same number of samples as the first row.
    RaggedRows {
        /// The index of the offending row.
        row: usize,
        /// The number of samples expected in the row.
        expected: usize,
        /// The number of samples found in the row.
        actual: usize,
    },
    /// The length of a flat sample buffer does not equal `width * height * channels`.
    BufferSize {
        /// The number of samples implied by the image dimensions.
        expected: usize,
        /// The length of the provided buffer.
        actual: usize,
    },
    /// The image has more than [`MAX_PIXELS`](crate::MAX_PIXELS) pixels.
    TooManyPixels(AboveMaxLen<u32>),
    /// A sample is `NAN` or infinite.
    NonFiniteSample {
        /// The index of the offending sample in the flat sample buffer.
        index: usize,
    },
}

impl Display for QuantizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantizeError::EmptyPalette => write!(f, "the palette must contain at least one color"),
            QuantizeError::PaletteTooLarge(max) => write!(f, "palette is {max} colors"),
            QuantizeError::InvalidChannelCount(channels) => {
                write!(f, "expected 3 or 4 channels per pixel, got {channels}")
            }
            QuantizeError::RaggedRows { row, expected, actual } => {
                write!(f, "row {row} has {actual} samples, expected {expected}")
            }
            QuantizeError::BufferSize { expected, actual } => {
                write!(f, "buffer has {actual} samples, expected {expected}")
            }
            QuantizeError::TooManyPixels(max) => write!(f, "image is {max} pixels"),
            QuantizeError::NonFiniteSample { index } => {
                write!(f, "sample {index} is not a finite number")
            }
        }
    }
}

impl Error for QuantizeError {}

impl From<AboveMaxLen<u32>> for QuantizeError {
    fn from(err: AboveMaxLen<u32>) -> Self {
        Self::TooManyPixels(err)
    }
}

impl From<AboveMaxLen<u16>> for QuantizeError {
    fn from(err: AboveMaxLen<u16>) -> Self {
        Self::PaletteTooLarge(err)
    }
}

/// The error type for parsing hex color codes like `#ed1c24`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseHexError {
    /// The code does not have exactly six hex digits (after an optional leading `#`).
    InvalidLength(String),
    /// The code contains a character that is not a hex digit.
    InvalidDigit(String),
}

impl Display for ParseHexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseHexError::InvalidLength(code) => {
                write!(f, "`{code}` is not a six digit hex color code")
            }
            ParseHexError::InvalidDigit(code) => write!(f, "`{code}` contains a non-hex digit"),
        }
    }
}

impl Error for ParseHexError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_COLORS, MAX_PIXELS};

    #[test]
    fn messages_name_the_problem() {
        assert_eq!(
            QuantizeError::PaletteTooLarge(AboveMaxLen(MAX_COLORS)).to_string(),
            "palette is above the maximum length of 256 colors"
        );
        assert_eq!(
            QuantizeError::from(AboveMaxLen(MAX_PIXELS)),
            QuantizeError::TooManyPixels(AboveMaxLen(MAX_PIXELS))
        );
        assert_eq!(
            QuantizeError::RaggedRows { row: 2, expected: 12, actual: 9 }.to_string(),
            "row 2 has 9 samples, expected 12"
        );
        assert_eq!(
            QuantizeError::InvalidChannelCount(2).to_string(),
            "expected 3 or 4 channels per pixel, got 2"
        );
    }
}
