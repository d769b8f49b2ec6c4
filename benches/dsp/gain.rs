//! Benchmarks for banded gain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lapland_dsp::dsp::gain::GainStage;

use crate::BLOCK_SIZES;

pub fn bench_gain(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/gain");

    for &size in BLOCK_SIZES {
        let mut buffer: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut stage = GainStage::new();
        stage.set_volume(0.8, 440.0);

        group.bench_with_input(BenchmarkId::new("process", size), &size, |b, _| {
            b.iter(|| {
                stage.process(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
