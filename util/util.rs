#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use image::{RgbImage, RgbaImage};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// Set this to a directory of images to benchmark on real photos instead of generated ones.
pub const IMAGE_DIR_VAR: &str = "LABMATCH_BENCH_IMAGES";

pub fn load_images(images: &[PathBuf]) -> Vec<(String, RgbImage)> {
    images
        .iter()
        .map(|path| {
            image::open(path).map(|image| {
                (
                    path.file_name().unwrap().to_owned().into_string().unwrap(),
                    image.into_rgb8(),
                )
            })
        })
        .collect::<Result<_, _>>()
        .expect("loaded each image")
}

pub fn load_image_dir(dir: impl AsRef<Path>) -> Vec<(String, RgbImage)> {
    let mut paths = std::fs::read_dir(dir)
        .expect("read img directory")
        .collect::<Result<Vec<_>, _>>()
        .expect("read each file")
        .iter()
        .map(std::fs::DirEntry::path)
        .collect::<Vec<_>>();

    paths.sort();

    load_images(&paths)
}

/// A smooth gradient with per-pixel noise, so nearby pixels map to different palette entries.
pub fn generated_image(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = ((x + y) * 255 / (width + height).max(1)) as u8;
        let noise = |c: u8, n: i16| (i16::from(c) + n).clamp(0, 255) as u8;
        image::Rgb([
            noise(r, rng.gen_range(-24..=24)),
            noise(g, rng.gen_range(-24..=24)),
            noise(b, rng.gen_range(-24..=24)),
        ])
    })
}

pub fn generated_images() -> Vec<(String, RgbImage)> {
    [(640, 480, 1), (1920, 1080, 2), (3840, 2160, 3)]
        .into_iter()
        .map(|(width, height, seed)| {
            (format!("{width}x{height}"), generated_image(width, height, seed))
        })
        .collect()
}

pub fn load_bench_images() -> Vec<(String, RgbImage)> {
    match std::env::var_os(IMAGE_DIR_VAR) {
        Some(dir) => load_image_dir(dir),
        None => generated_images(),
    }
}

static BENCH_IMAGES: OnceLock<Vec<(String, RgbImage)>> = OnceLock::new();

pub fn bench_images() -> &'static [(String, RgbImage)] {
    BENCH_IMAGES.get_or_init(load_bench_images)
}

/// Adds an alpha channel that sweeps from transparent to opaque across each row.
pub fn with_alpha(image: &RgbImage) -> RgbaImage {
    let width = image.width();
    RgbaImage::from_fn(width, image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        image::Rgba([r, g, b, (x * 255 / width.max(1)) as u8])
    })
}
