//! Benchmarks for the tracking lowpass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lapland_dsp::dsp::filter::TrackingFilter;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let mut filter = TrackingFilter::new();
        filter.prepare(48_000.0, size, 1);
        filter.set_cutoff(440.0, 0.707);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("process", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.process(0, black_box(&mut buffer));
            })
        });

        // Coefficient recompute every block, as under fast automation
        let mut filter = TrackingFilter::new();
        filter.prepare(48_000.0, size, 1);
        let mut buffer = input.clone();
        let mut cutoff = 100.0f32;
        group.bench_with_input(BenchmarkId::new("retune_and_process", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 10_000.0 { 100.0 } else { cutoff * 1.01 };
                filter.set_cutoff(black_box(cutoff), 2.0);
                buffer.copy_from_slice(&input);
                filter.process(0, black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
