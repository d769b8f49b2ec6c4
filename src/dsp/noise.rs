use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/*
White Noise
===========

White noise is a sequence of independent random samples. Every frequency
is present with equal average power, which is what makes it useful as raw
material for a pitched noise voice: a lowpass filter carves a register out
of it, and the envelope turns that into a note.

Each voice owns its own generator. Two voices seeded differently never share
state, and a fixed seed reproduces the same block bit for bit, which keeps
rendering testable.

PCG32 has a period of 2^64, so there is no audible repetition within any
realistic note length.
*/

/// Uniform white noise in `[-1.0, 1.0)`.
pub struct NoiseSource {
    rng: Pcg32,
}

impl NoiseSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        // gen::<f32>() is in [0, 1)
        self.rng.gen::<f32>() * 2.0 - 1.0
    }

    /// Fill `buffer` with noise scaled by `level`.
    pub fn render(&mut self, buffer: &mut [f32], level: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample() * level;
        }
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(0)
    }
}
