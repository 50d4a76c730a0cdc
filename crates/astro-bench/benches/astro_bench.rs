//! Benchmarks for the astro imaging hot loops.
//!
//! Run with: `cargo bench -p astro-bench`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use astro_core::{Image, ImagePointF, ParallelConfig};
use astro_ops::process::{apply_map, Binarize};
use astro_ops::{resize, InterpolationKind, Interpolator};
use astro_stats::{Histogram, ImageStatistics};

fn gradient_u16(size: u32, channels: u32) -> Image<u16> {
    Image::from_fn(size, size, channels, |x, y, c| ((x * 37 + y * 91 + c * 1000) % 65536) as u16).unwrap()
}

/// Single-sample lookups for every kernel.
fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate");
    let img = gradient_u16(256, 1);
    let points: Vec<ImagePointF> = (0..10_000)
        .map(|i| ImagePointF::new(3.0 + (i % 250) as f64 * 0.99, 3.0 + (i / 250) as f64 * 4.1, 0))
        .collect();
    group.throughput(Throughput::Elements(points.len() as u64));

    for kind in InterpolationKind::ALL {
        let interp = Interpolator::new(kind);
        group.bench_with_input(BenchmarkId::new("pixel", kind.name()), &points, |b, pts| {
            b.iter(|| {
                pts.iter()
                    .map(|&p| interp.interpolate_pixel(black_box(&img), p) as u64)
                    .sum::<u64>()
            })
        });
    }

    group.finish();
}

/// Whole-image resampling, sequential vs row-parallel.
fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize");
    let img = gradient_u16(512, 3);
    let interp = Interpolator::new(InterpolationKind::Lanczos3);
    group.throughput(Throughput::Elements(384 * 384 * 3));

    for (name, parallel) in [
        ("sequential", ParallelConfig::sequential()),
        ("2_threads", ParallelConfig::default()),
        ("global_pool", ParallelConfig::with_threads(0)),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| resize(black_box(&img), 384, 384, &interp, &parallel))
        });
    }

    group.finish();
}

/// Histogram construction and order statistics.
fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    for size in [256u32, 1024] {
        let img = gradient_u16(size, 1);
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("histogram", size), &img, |b, img| {
            b.iter(|| Histogram::from_channel(black_box(img), 0))
        });
        group.bench_with_input(BenchmarkId::new("median", size), &img, |b, img| {
            b.iter(|| black_box(img).compute_median(0, true))
        });
        group.bench_with_input(BenchmarkId::new("mad", size), &img, |b, img| {
            b.iter(|| black_box(img).compute_mad(0, true))
        });
    }

    group.finish();
}

/// Elementwise transforms.
fn bench_elementwise(c: &mut Criterion) {
    let mut group = c.benchmark_group("elementwise");
    let img = gradient_u16(1024, 3);
    group.throughput(Throughput::Elements(1024 * 1024 * 3));

    for (name, parallel) in [
        ("rgb_to_gray_sequential", ParallelConfig::sequential()),
        ("rgb_to_gray_parallel", ParallelConfig::default()),
    ] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || img.clone(),
                |mut i| {
                    i.rgb_to_gray_with(&parallel);
                    i
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.bench_function("binarize", |b| {
        b.iter_batched(
            || img.clone(),
            |mut i| {
                apply_map(&mut i, &Binarize::new(0.5), &ParallelConfig::default());
                i
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_interpolate,
    bench_resize,
    bench_statistics,
    bench_elementwise,
);

criterion_main!(benches);
