//! Built-in palettes and hex color parsing.

use crate::ParseHexError;
use palette::Srgb;

/// The restricted 31 color palette.
pub const RESTRICTED: [&str; 31] = [
    "#000000", "#3c3c3c", "#787878", "#d2d2d2", "#ffffff", "#600018", "#ed1c24", "#ff7f27",
    "#f6aa09", "#f9dd3b", "#fffabc", "#0eb968", "#13e67b", "#87ff5e", "#0c816e", "#10aea6",
    "#13e1be", "#28509e", "#4093e4", "#60f7f2", "#6b50f6", "#99b1fb", "#780c99", "#aa38b9",
    "#e09ff9", "#cb007a", "#ec1f80", "#f38da9", "#684634", "#95682a", "#f8b277",
];

/// The full 63 color palette, a superset of [`RESTRICTED`].
#[rustfmt::skip]
pub const FULL: [&str; 63] = [
    "#000000", "#3c3c3c", "#787878", "#aaaaaa", "#d2d2d2", "#ffffff",
    "#600018", "#a50e1e", "#ed1c24", "#fa8072",
    "#e45c1a", "#ff7f27", "#f6aa09", "#f9dd3b", "#fffabc",
    "#9c8431", "#c5ad31", "#e8d45f",
    "#4a6b3a", "#5a944a", "#84c573", "#0eb968", "#13e67b", "#87ff5e",
    "#0c816e", "#10aea6", "#13e1be",
    "#0f799f", "#60f7f2", "#bbfaf2",
    "#28509e", "#4093e4", "#7dc7ff",
    "#4d31b8", "#6b50f6", "#99b1fb",
    "#4a4284", "#7a71c4", "#b5aef1",
    "#780c99", "#aa38b9", "#e09ff9",
    "#cb007a", "#ec1f80", "#f38da9",
    "#9b5249", "#d18078", "#fab6a4",
    "#684634", "#95682a", "#dba463",
    "#7b6352", "#9c846b", "#d6b594",
    "#d18051", "#f8b277", "#ffc5a5",
    "#6d643f", "#948c6b", "#cdc59e",
    "#333941", "#6d758d", "#b3b9d1",
];

/// Selects one of the built-in palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PalettePreset {
    /// The 31 color [`RESTRICTED`] palette.
    #[default]
    Restricted,
    /// The 63 color [`FULL`] palette.
    Full,
}

impl PalettePreset {
    /// The hex codes of the palette's colors.
    #[must_use]
    pub const fn hex_codes(self) -> &'static [&'static str] {
        match self {
            PalettePreset::Restricted => &RESTRICTED,
            PalettePreset::Full => &FULL,
        }
    }

    /// The palette's colors, in order.
    #[must_use]
    pub fn colors(self) -> Vec<Srgb<u8>> {
        #[allow(clippy::expect_used)]
        self.hex_codes()
            .iter()
            .map(|code| parse_hex_color(code).expect("built-in palettes are valid hex"))
            .collect()
    }
}

/// Parses a color code of the form `#rrggbb` (the leading `#` is optional).
///
/// # Errors
/// Returns a [`ParseHexError`] if the code is not six hex digits.
///
/// # Examples
/// ```
/// # use labmatch::parse_hex_color;
/// # use palette::Srgb;
/// assert_eq!(parse_hex_color("#ed1c24"), Ok(Srgb::new(237, 28, 36)));
/// assert_eq!(parse_hex_color("FFFFFF"), Ok(Srgb::new(255, 255, 255)));
/// assert!(parse_hex_color("#fff").is_err());
/// ```
pub fn parse_hex_color(code: &str) -> Result<Srgb<u8>, ParseHexError> {
    let digits = code.strip_prefix('#').unwrap_or(code);
    if digits.len() != 6 {
        return Err(ParseHexError::InvalidLength(code.to_owned()));
    }
    // `from_str_radix` also accepts a leading `+`
    match u32::from_str_radix(digits, 16) {
        Ok(value) if digits.bytes().all(|b| b.is_ascii_hexdigit()) => {
            let [_, r, g, b] = value.to_be_bytes();
            Ok(Srgb::new(r, g, b))
        }
        _ => Err(ParseHexError::InvalidDigit(code.to_owned())),
    }
}

/// Parses a list of hex color codes separated by whitespace or commas.
///
/// Lines starting with `;` are skipped as comments.
///
/// # Errors
/// Returns the first [`ParseHexError`] encountered.
///
/// # Examples
/// ```
/// # use labmatch::parse_hex_palette;
/// # use palette::Srgb;
/// let palette = parse_hex_palette("; grays\n#000000, #ffffff\n3c3c3c").unwrap();
/// assert_eq!(
///     palette,
///     [Srgb::new(0u8, 0, 0), Srgb::new(255, 255, 255), Srgb::new(60, 60, 60)],
/// );
/// ```
pub fn parse_hex_palette(text: &str) -> Result<Vec<Srgb<u8>>, ParseHexError> {
    text.lines()
        .filter(|line| !line.trim_start().starts_with(';'))
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|code| !code.is_empty())
        .map(parse_hex_color)
        .collect()
}
