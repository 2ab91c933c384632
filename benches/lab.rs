#[path = "../util/util.rs"]
mod util;

use util::bench_images;

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode};
use labmatch::{lab, PalettePreset, PaletteQuantizer};
use palette::{cast, Lab, Srgb};

fn srgb_pixels() -> Vec<(String, Vec<Srgb<f32>>)> {
    bench_images()
        .iter()
        .map(|(path, image)| {
            let colors = cast::from_component_slice::<Srgb<u8>>(image.as_raw())
                .iter()
                .map(|c| c.into_format())
                .collect();
            (path.clone(), colors)
        })
        .collect()
}

fn lab_pixels() -> Vec<(String, Vec<Lab>)> {
    srgb_pixels()
        .into_iter()
        .map(|(path, colors)| (path, lab::srgb_to_lab_slice_par(&colors)))
        .collect()
}

fn to_lab(c: &mut Criterion) {
    let pixels = srgb_pixels();

    let mut group = c.benchmark_group("to_lab");
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3));

    for (path, colors) in &pixels {
        group.bench_with_input(BenchmarkId::new("single", path), colors, |b, colors| {
            b.iter(|| lab::srgb_to_lab_slice(colors))
        });
        group.bench_with_input(BenchmarkId::new("par", path), colors, |b, colors| {
            b.iter(|| lab::srgb_to_lab_slice_par(colors))
        });
    }
}

fn nearest(c: &mut Criterion) {
    let pixels = lab_pixels();

    let mut group = c.benchmark_group("nearest");
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3));

    for preset in [PalettePreset::Restricted, PalettePreset::Full] {
        let quantizer = PaletteQuantizer::new(&preset.colors()).unwrap();
        for (path, colors) in &pixels {
            group.bench_with_input(
                BenchmarkId::new(format!("{preset:?}"), path),
                colors,
                |b, colors| b.iter(|| quantizer.indices_par(colors)),
            );
        }
    }
}

criterion_group!(benches, to_lab, nearest);
criterion_main!(benches);
