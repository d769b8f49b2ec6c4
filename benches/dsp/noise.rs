//! Benchmarks for the white noise source.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lapland_dsp::dsp::noise::NoiseSource;

use crate::BLOCK_SIZES;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut noise = NoiseSource::new(1);

        group.bench_with_input(BenchmarkId::new("render", size), &size, |b, _| {
            b.iter(|| {
                noise.render(black_box(&mut buffer), 0.01);
            })
        });
    }

    group.finish();
}
