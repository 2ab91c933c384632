//! A library for remapping images onto a fixed color palette.
//!
//! `labmatch` converts every pixel into the CIELAB color space and replaces it with the
//! palette color at the smallest Euclidean distance, so that the chosen colors follow
//! perceived similarity rather than raw sRGB distance.
//!
//! # Features
//! To reduce dependencies and compile times, `labmatch` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: exposes parallel versions of most functions via [`rayon`].
//! - `image`: enables integration with the [`image`] crate.
//!
//! # Example
//! ```
//! # use labmatch::{ImageView, PaletteQuantizer, PalettePreset, QuantizeError};
//! # fn main() -> Result<(), QuantizeError> {
//! let quantizer = PaletteQuantizer::new(&PalettePreset::Restricted.colors())?;
//!
//! // a 2x1 RGBA image with 8-bit samples
//! let samples: [u8; 8] = [250, 10, 10, 255, 12, 12, 12, 128];
//! let image = ImageView::new(&samples, 2, 1, 4)?;
//!
//! let quantized = quantizer.quantize(image)?;
//! assert_eq!(&quantized.samples()[4..], &[0, 0, 0, 128]);
//! # Ok(())
//! # }
//! ```
//!
//! With the `image` feature, [`PaletteQuantizer::quantize_image`] takes a
//! [`DynamicImage`](::image::DynamicImage) directly.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod error;
mod palettes;
mod quantizer;
mod traits;
mod types;

#[cfg(feature = "image")]
mod image_support;

pub mod lab;

pub use error::*;
pub use palettes::*;
pub use quantizer::PaletteQuantizer;
pub use traits::*;
pub use types::*;

/// The maximum supported image size in number of pixels is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;

/// The maximum supported number of palette colors is `256`.
pub const MAX_COLORS: u16 = u8::MAX as u16 + 1;

/// `MAX_COLORS` as a `usize` for array and `Vec` lengths.
pub(crate) const MAX_K: usize = MAX_COLORS as usize;

#[cfg(test)]
pub(crate) mod tests {
    //! Deterministic test data shared by the unit tests.

    use palette::Srgb;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;

    /// Generates `len` pseudo-random colors from the given seed.
    pub fn test_data(len: usize, seed: u64) -> Vec<Srgb<u8>> {
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
        (0..len)
            .map(|_| Srgb::new(rng.gen(), rng.gen(), rng.gen()))
            .collect()
    }

    pub fn test_data_256() -> Vec<Srgb<u8>> {
        test_data(256, 42)
    }

    pub fn test_data_1024() -> Vec<Srgb<u8>> {
        test_data(1024, 7)
    }

    /// Generates an interleaved RGBA sample buffer with pseudo-random alpha.
    pub fn test_rgba(len: usize, seed: u64) -> Vec<u8> {
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
        test_data(len, seed)
            .into_iter()
            .flat_map(|c| [c.red, c.green, c.blue, rng.gen()])
            .collect()
    }
}
