use std::f64::consts::PI;

use tracing::debug;

/*
Pitch-Tracking Lowpass
======================

The voice starts from broadband noise. A lowpass whose cutoff sits on the
played pitch turns that hiss into something with a register: low notes
rumble, high notes hiss.

| parameter      | meaning                         | source                        |
| -------------- | ------------------------------- | ----------------------------- |
| cutoff         | corner frequency in Hz          | key frequency (+ micro-tune)  |
| cleaning level | Q of the biquad                 | parameter layer               |
| sample rate    | converts Hz into radians/sample | prepare()                     |

Low cleaning levels give a soft, wide rolloff. Higher levels narrow the
passband into a resonant peak around the cutoff, so the noise reads more
like a pitch.

Coefficients
------------

RBJ cookbook lowpass:

    w0    = 2π · cutoff / sample_rate
    alpha = sin(w0) / (2 · Q)

    b0 = (1 - cos w0) / 2      a0 = 1 + alpha
    b1 =  1 - cos w0           a1 = -2 cos w0
    b2 = (1 - cos w0) / 2      a2 = 1 - alpha

normalised by a0. The math runs in f64 and the result is stored as f32.

Coefficients are never edited in place. Every change computes a fresh
`BiquadCoeffs` from the full (cutoff, Q, sample rate) triple and assigns it
over the old one, so the same inputs always give bit-identical
coefficients and no half-updated set is ever processed.

State
-----

Transposed direct form II. Each channel keeps two history values (z1, z2)
that survive across blocks. Coefficients are shared by all channels.
History is cleared by prepare()/reset() only; wiping it when a note starts
would pop.

    y  = b0·x + z1
    z1 = b1·x - a1·y + z2
    z2 = b2·x - a2·y

Clamping
--------

Cutoffs are clamped into [MIN_CUTOFF_HZ, MAX_CUTOFF_RATIO · sample_rate]
and Q into [MIN_Q, MAX_Q]. Out-of-range input is never an error.
*/

pub const MIN_CUTOFF_HZ: f32 = 10.0;
/// Upper cutoff bound as a fraction of the sample rate (just under Nyquist).
pub const MAX_CUTOFF_RATIO: f32 = 0.49;
pub const BUTTERWORTH_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;
pub const MIN_Q: f32 = 0.1;
pub const MAX_Q: f32 = 20.0;

/// Normalised biquad coefficients (a0 == 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoeffs {
    /// Pass-through coefficients.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Lowpass coefficients. Inputs are expected to be clamped already.
    pub fn lowpass(cutoff_hz: f32, q: f32, sample_rate: f32) -> Self {
        let omega = 2.0 * PI * cutoff_hz as f64 / sample_rate as f64;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q as f64);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self {
            b0: (b0 / a0) as f32,
            b1: (b1 / a0) as f32,
            b2: (b2 / a0) as f32,
            a1: (a1 / a0) as f32,
            a2: (a2 / a0) as f32,
        }
    }
}

/// Per-channel filter memory.
#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    z1: f32,
    z2: f32,
}

impl BiquadState {
    #[inline]
    fn next_sample(&mut self, x: f32, c: &BiquadCoeffs) -> f32 {
        let y = c.b0 * x + self.z1;
        self.z1 = c.b1 * x - c.a1 * y + self.z2;
        self.z2 = c.b2 * x - c.a2 * y;
        y
    }
}

/// Biquad lowpass whose cutoff follows the played pitch.
pub struct TrackingFilter {
    coeffs: BiquadCoeffs,
    states: Vec<BiquadState>,
    sample_rate: f32,
    cutoff_hz: f32,
    q: f32,
}

impl TrackingFilter {
    pub fn new() -> Self {
        Self {
            coeffs: BiquadCoeffs::IDENTITY,
            states: Vec::new(),
            sample_rate: 0.0,
            cutoff_hz: 1_000.0,
            q: BUTTERWORTH_Q,
        }
    }

    /// Size channel history and recompute coefficients for `sample_rate`.
    ///
    /// Safe to call repeatedly; history is cleared each time.
    pub fn prepare(&mut self, sample_rate: f32, block_size: usize, channels: usize) {
        self.sample_rate = sample_rate;
        self.states.clear();
        self.states.resize(channels, BiquadState::default());
        self.coeffs = self.compute();

        debug!(sample_rate, block_size, channels, "tracking filter prepared");
    }

    pub fn is_prepared(&self) -> bool {
        self.sample_rate > 0.0
    }

    /// Re-derive coefficients for a new cutoff and cleaning level.
    ///
    /// Before `prepare` the values are stored and the filter passes audio
    /// through unchanged.
    pub fn set_cutoff(&mut self, frequency: f32, shape: f32) {
        self.cutoff_hz = frequency;
        self.q = shape;
        self.coeffs = self.compute();
    }

    fn compute(&self) -> BiquadCoeffs {
        if !self.is_prepared() {
            return BiquadCoeffs::IDENTITY;
        }

        BiquadCoeffs::lowpass(
            clamp_cutoff(self.cutoff_hz, self.sample_rate),
            clamp_q(self.q),
            self.sample_rate,
        )
    }

    /// Filter one channel in place. Channels beyond the prepared count are
    /// left untouched.
    pub fn process(&mut self, channel: usize, buffer: &mut [f32]) {
        let coeffs = self.coeffs;
        let Some(state) = self.states.get_mut(channel) else {
            return;
        };

        for sample in buffer.iter_mut() {
            *sample = state.next_sample(*sample, &coeffs);
        }
    }

    /// Clear history on every channel.
    pub fn reset(&mut self) {
        for state in &mut self.states {
            *state = BiquadState::default();
        }
    }

    pub fn coefficients(&self) -> BiquadCoeffs {
        self.coeffs
    }

    /// Cutoff as requested, before clamping.
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

}

impl Default for TrackingFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp a cutoff into the range the coefficient formula is stable for.
pub fn clamp_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let max = (sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ);
    if cutoff_hz.is_nan() {
        return MIN_CUTOFF_HZ;
    }
    cutoff_hz.clamp(MIN_CUTOFF_HZ, max)
}

pub fn clamp_q(q: f32) -> f32 {
    if q.is_nan() {
        return BUTTERWORTH_Q;
    }
    q.clamp(MIN_Q, MAX_Q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (TAU * freq * n as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(256);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn prepared(cutoff: f32, q: f32) -> TrackingFilter {
        let mut filter = TrackingFilter::new();
        filter.prepare(SAMPLE_RATE, 512, 1);
        filter.set_cutoff(cutoff, q);
        filter
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut filter = prepared(500.0, BUTTERWORTH_Q);
        let mut buffer = vec![1.0; 2048];
        filter.process(0, &mut buffer);

        assert!((buffer[2047] - 1.0).abs() < 1e-3, "got {}", buffer[2047]);
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let mut filter = prepared(500.0, BUTTERWORTH_Q);
        let mut buffer = sine(5_000.0, 2048);
        filter.process(0, &mut buffer);

        // Two octaves and a bit above cutoff: 12dB/oct gives well under 0.05
        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.05, "expected attenuation, got peak {peak}");
    }

    #[test]
    fn test_higher_q_boosts_cutoff() {
        let mut soft = prepared(1_000.0, 0.5);
        let mut sharp = prepared(1_000.0, 4.0);

        let mut a = sine(1_000.0, 4096);
        let mut b = a.clone();
        soft.process(0, &mut a);
        sharp.process(0, &mut b);

        assert!(peak_after_transient(&b) > peak_after_transient(&a) * 3.0);
    }

    #[test]
    fn test_coefficients_are_deterministic() {
        let mut filter = prepared(440.0, 2.0);
        let first = filter.coefficients();

        filter.set_cutoff(3_000.0, 0.3);
        assert_ne!(filter.coefficients(), first);

        filter.set_cutoff(440.0, 2.0);
        assert_eq!(filter.coefficients(), first);
    }

    #[test]
    fn test_cutoff_clamped_to_nyquist_and_floor() {
        let mut filter = prepared(1e9, 1.0);
        let ceiling = BiquadCoeffs::lowpass(SAMPLE_RATE * MAX_CUTOFF_RATIO, 1.0, SAMPLE_RATE);
        assert_eq!(filter.coefficients(), ceiling);

        filter.set_cutoff(-100.0, 1.0);
        let floor = BiquadCoeffs::lowpass(MIN_CUTOFF_HZ, 1.0, SAMPLE_RATE);
        assert_eq!(filter.coefficients(), floor);

        filter.set_cutoff(f32::NAN, f32::NAN);
        let c = filter.coefficients();
        for v in [c.b0, c.b1, c.b2, c.a1, c.a2] {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_state_persists_across_blocks() {
        let input = sine(700.0, 512);

        let mut whole = prepared(300.0, 1.0);
        let mut one = input.clone();
        whole.process(0, &mut one);

        let mut split = prepared(300.0, 1.0);
        let mut two = input;
        let (head, tail) = two.split_at_mut(200);
        split.process(0, head);
        split.process(0, tail);

        assert_eq!(one, two);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut filter = prepared(300.0, 1.0);
        let mut buffer = vec![1.0; 64];
        filter.process(0, &mut buffer);

        filter.reset();
        let mut silence = vec![0.0; 64];
        filter.process(0, &mut silence);
        assert!(silence.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_unprepared_passes_through() {
        let mut filter = TrackingFilter::new();
        filter.set_cutoff(100.0, 1.0);
        assert_eq!(filter.coefficients(), BiquadCoeffs::IDENTITY);

        let mut buffer = [0.5, -0.5];
        filter.process(0, &mut buffer);
        assert_eq!(buffer, [0.5, -0.5]);
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let mut filter = prepared(800.0, 1.5);
        let before = filter.coefficients();
        filter.prepare(SAMPLE_RATE, 512, 1);
        filter.prepare(SAMPLE_RATE, 512, 1);

        assert_eq!(filter.coefficients(), before);
    }

    #[test]
    fn test_channels_have_independent_history() {
        let mut filter = TrackingFilter::new();
        filter.prepare(SAMPLE_RATE, 64, 2);
        filter.set_cutoff(300.0, 1.0);

        let mut left = vec![1.0; 64];
        filter.process(0, &mut left);

        let mut right = vec![0.0; 64];
        filter.process(1, &mut right);
        assert!(right.iter().all(|&s| s == 0.0));
    }
}
