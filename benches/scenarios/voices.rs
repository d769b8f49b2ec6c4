//! Benchmarks for complete noise voices.
//!
//! A single voice in sustain is the baseline; the stacked case approximates
//! a pool rendering a chord into one shared buffer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lapland_dsp::{
    dsp::envelope::AdsrParams,
    synth::{NoiseVoice, VoiceConfig},
    AudioBuffer,
};

use crate::BLOCK_SIZES;

fn sustained_voice(seed: u64, hz: f32, block: usize, channels: usize) -> NoiseVoice {
    let mut voice = NoiseVoice::new(VoiceConfig {
        seed,
        envelope: AdsrParams::new(0.01, 0.1, 0.7, 0.3),
        ..Default::default()
    });
    voice
        .prepare(48_000.0, block, channels)
        .expect("valid bench setup");
    voice.activate(hz, 1.0);
    voice
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        // === SINGLE VOICE, MONO ===
        let mut voice = sustained_voice(1, 440.0, size, 1);
        let mut out = AudioBuffer::new(1, size);
        group.bench_with_input(BenchmarkId::new("mono", size), &size, |b, _| {
            b.iter(|| {
                voice
                    .render_into(black_box(&mut out), 0, size)
                    .expect("prepared");
            })
        });

        // === SINGLE VOICE, STEREO ===
        let mut voice = sustained_voice(2, 440.0, size, 2);
        let mut out = AudioBuffer::new(2, size);
        group.bench_with_input(BenchmarkId::new("stereo", size), &size, |b, _| {
            b.iter(|| {
                voice
                    .render_into(black_box(&mut out), 0, size)
                    .expect("prepared");
            })
        });

        // === EIGHT-VOICE CHORD, STEREO ===
        let mut voices: Vec<NoiseVoice> = [110.0, 165.0, 220.0, 330.0, 440.0, 660.0, 880.0, 1320.0]
            .iter()
            .enumerate()
            .map(|(i, &hz)| sustained_voice(i as u64, hz, size, 2))
            .collect();
        let mut out = AudioBuffer::new(2, size);
        group.bench_with_input(BenchmarkId::new("chord_8", size), &size, |b, _| {
            b.iter(|| {
                out.clear();
                for voice in &mut voices {
                    voice
                        .render_into(black_box(&mut out), 0, size)
                        .expect("prepared");
                }
            })
        });
    }

    group.finish();
}
