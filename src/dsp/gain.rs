//! Register-banded gain compensation.

/*
Gain Banding
============

Broadband noise pushed through a lowpass that tracks the played pitch gets
darker and fuller as the note goes down, and thinner as it goes up. The
perceived loudness follows. A single volume control therefore sounds
uneven across the keyboard.

The compensation is deliberately coarse: three bands, one multiplier each.

    reference freq        multiplier
    ---------------       ----------
    f >= 880 Hz           volume * 0.5
    220 <= f < 880 Hz     volume * 1.0
    f < 220 Hz            volume * 1.5

Band edges are closed below and open above, so 880 Hz belongs to the top
band and 220 Hz to the middle one.

The multiplier is chosen when `set_volume` is called, not per block. The
voice calls it again whenever the reference frequency it cares about moves.
*/

pub const HIGH_BAND_HZ: f32 = 880.0;
pub const LOW_BAND_HZ: f32 = 220.0;

const HIGH_BAND_SCALE: f32 = 0.5;
const MID_BAND_SCALE: f32 = 1.0;
const LOW_BAND_SCALE: f32 = 1.5;

/// Linear gain whose multiplier depends on a reference frequency band.
#[derive(Debug, Clone, Copy)]
pub struct GainStage {
    gain: f32,
}

impl GainStage {
    pub fn new() -> Self {
        Self { gain: 1.0 }
    }

    /// Select the gain for `master_volume` at `reference_hz`.
    pub fn set_volume(&mut self, master_volume: f32, reference_hz: f32) {
        self.gain = master_volume * band_scale(reference_hz);
    }

    /// Current linear multiplier.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Scale `buffer` in place.
    #[inline]
    pub fn process(&self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample *= self.gain;
        }
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Band multiplier for `reference_hz`.
#[inline]
pub fn band_scale(reference_hz: f32) -> f32 {
    if reference_hz >= HIGH_BAND_HZ {
        HIGH_BAND_SCALE
    } else if reference_hz >= LOW_BAND_HZ {
        MID_BAND_SCALE
    } else {
        LOW_BAND_SCALE
    }
}
