//! Benchmarks for the voice's ADSR envelope, including the retrigger path.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lapland_dsp::dsp::envelope::EnvelopeGenerator;

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = EnvelopeGenerator::adsr(0.1, 0.1, 0.7, 0.3);
        env.prepare(48_000.0);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Sustain phase (holding steady)
        let mut env = EnvelopeGenerator::adsr(0.001, 0.001, 0.7, 0.3);
        env.prepare(48_000.0);
        env.note_on();
        for _ in 0..200 {
            env.next_sample();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Release phase (ramping down)
        let mut env = EnvelopeGenerator::adsr(0.001, 0.001, 0.7, 10.0);
        env.prepare(48_000.0);
        env.note_on();
        for _ in 0..200 {
            env.next_sample();
        }
        env.note_off();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Release after a retrigger caught the previous tail halfway down
        let mut env = EnvelopeGenerator::adsr(0.001, 0.001, 0.7, 10.0);
        env.prepare(48_000.0);
        env.note_on();
        for _ in 0..200 {
            env.next_sample();
        }
        env.note_off();
        for _ in 0..240_000 {
            env.next_sample();
        }
        env.note_on();
        for _ in 0..10 {
            env.next_sample();
        }
        env.note_off();
        group.bench_with_input(BenchmarkId::new("retrigger_release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
