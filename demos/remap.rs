#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{fmt::Display, path::PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use labmatch::{parse_hex_palette, PalettePreset, PaletteQuantizer};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, ValueEnum)]
enum CliPalette {
    Restricted,
    Full,
}

impl From<CliPalette> for PalettePreset {
    fn from(value: CliPalette) -> Self {
        match value {
            CliPalette::Restricted => PalettePreset::Restricted,
            CliPalette::Full => PalettePreset::Full,
        }
    }
}

impl Display for CliPalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CliPalette::Restricted => "restricted",
                CliPalette::Full => "full",
            }
        )
    }
}

/// Remaps every pixel of an image to its nearest palette color in CIELAB.
#[derive(Parser)]
pub struct Options {
    /// Built-in palette to remap onto.
    #[arg(long, default_value_t = CliPalette::Restricted)]
    palette: CliPalette,

    /// File of hex color codes to use instead of a built-in palette.
    #[arg(long)]
    palette_file: Option<PathBuf>,

    /// Worker threads: 0 uses all cores, 1 runs on the current thread.
    #[arg(short, long, default_value_t = 0)]
    threads: u8,

    /// Log the time taken by each step.
    #[arg(long)]
    verbose: bool,

    input: PathBuf,

    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let Options { palette, palette_file, threads, verbose, input, output } = Options::parse();

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    macro_rules! timed {
        ($name: literal, $val: expr) => {{
            let time = std::time::Instant::now();
            let value = $val;
            debug!("{} took {}ms", $name, time.elapsed().as_millis());
            value
        }};
    }

    let colors = match palette_file {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read palette file {}", path.display()))?;
            parse_hex_palette(&text)
                .with_context(|| format!("invalid palette file {}", path.display()))?
        }
        None => PalettePreset::from(palette).colors(),
    };

    let quantizer = timed!("palette setup", PaletteQuantizer::new(&colors)?);
    info!(colors = quantizer.num_colors(), "loaded palette");

    let image = timed!(
        "read image",
        image::open(&input).with_context(|| format!("failed to open {}", input.display()))?
    );
    info!(width = image.width(), height = image.height(), "read {}", input.display());

    let image = timed!(
        "remapping",
        match threads {
            0 => quantizer.quantize_image_par(&image),
            1 => quantizer.quantize_image(&image),
            t => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(t.into())
                    .build()
                    .context("failed to build thread pool")?;

                pool.install(|| quantizer.quantize_image_par(&image))
            }
        }?
    );

    timed!(
        "write image",
        image
            .save(&output)
            .with_context(|| format!("failed to write {}", output.display()))?
    );
    info!("wrote {}", output.display());

    Ok(())
}
