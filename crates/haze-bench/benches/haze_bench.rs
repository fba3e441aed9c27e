//! Benchmarks for haze-rs operations.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use haze_core::{Buffer, Plane};
use haze_ops::boxfilter::box_mean;
use haze_ops::dark::{dark_channel, dark_channel_reference};
use haze_ops::dehaze::{dehaze, DehazeConfig};
use haze_ops::guided::guided_filter;

fn lcg_bytes(count: usize, mut seed: u64) -> Vec<u8> {
    (0..count)
        .map(|_| {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (seed >> 56) as u8
        })
        .collect()
}

/// Benchmark the windowed-mean accelerator across radii.
///
/// The whole point of the column-accumulator scheme is radius-independent
/// cost; the sweep makes that visible.
fn bench_box_mean(c: &mut Criterion) {
    let mut group = c.benchmark_group("box_mean");

    let (width, height) = (512, 512);
    let data: Vec<f64> = lcg_bytes(width * height, 3).into_iter().map(f64::from).collect();
    let src: Plane = Buffer::from_data(width, height, 1, data).unwrap();

    group.throughput(Throughput::Elements((width * height) as u64));
    for radius in [1usize, 4, 16, 64].iter() {
        group.bench_with_input(BenchmarkId::new("radius", radius), radius, |b, &r| {
            b.iter(|| box_mean(black_box(&src), r, r).unwrap())
        });
    }

    group.finish();
}

/// Benchmark the separable dark channel against the brute-force scan.
fn bench_dark_channel(c: &mut Criterion) {
    let mut group = c.benchmark_group("dark_channel");

    let (width, height) = (512, 512);
    let img = Buffer::from_data(width, height, 3, lcg_bytes(width * height * 3, 5)).unwrap();

    group.throughput(Throughput::Elements((width * height) as u64));
    for radius in [1usize, 7].iter() {
        group.bench_with_input(BenchmarkId::new("separable", radius), radius, |b, &r| {
            b.iter(|| dark_channel(black_box(&img), r).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("brute_force", radius), radius, |b, &r| {
            b.iter(|| dark_channel_reference(black_box(&img), r).unwrap())
        });
    }

    group.finish();
}

/// Benchmark self-guided filtering (denoising configuration).
fn bench_guided_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("guided_filter");

    let (width, height) = (256, 256);
    let img = Buffer::from_data(width, height, 1, lcg_bytes(width * height, 7)).unwrap();

    group.throughput(Throughput::Elements((width * height) as u64));
    for radius in [2usize, 8, 32].iter() {
        group.bench_with_input(BenchmarkId::new("self_guided", radius), radius, |b, &r| {
            b.iter(|| guided_filter(black_box(&img), black_box(&img), r, r, 0.01).unwrap())
        });
    }

    group.finish();
}

/// Benchmark the full dehazing pipeline with and without refinement.
fn bench_dehaze(c: &mut Criterion) {
    let mut group = c.benchmark_group("dehaze");
    group.sample_size(20);

    let (width, height) = (256, 256);
    let img = Buffer::from_data(width, height, 3, lcg_bytes(width * height * 3, 11)).unwrap();

    group.throughput(Throughput::Elements((width * height) as u64));
    for refine in [false, true] {
        let config = DehazeConfig {
            top_percent: 0.001,
            refine,
            ..DehazeConfig::default()
        };
        let name = if refine { "refined" } else { "raw" };
        group.bench_function(name, |b| {
            b.iter(|| dehaze(black_box(&img), black_box(&config)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_box_mean,
    bench_dark_channel,
    bench_guided_filter,
    bench_dehaze
);
criterion_main!(benches);
