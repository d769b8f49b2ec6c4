#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{envelope::AdsrParams, filter::BUTTERWORTH_Q};

/// Construction-time settings for a [`NoiseVoice`](super::voice::NoiseVoice).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    /// Seed for the voice's noise generator.
    pub seed: u64,
    /// Scale applied to raw noise before gain and filtering.
    pub noise_level: f32,
    /// Initial filter Q.
    pub cleaning_level: f32,
    /// Initial master volume (linear).
    pub volume: f32,
    pub envelope: AdsrParams,
}

impl VoiceConfig {
    /// Same config with a different noise seed, for giving each pool slot
    /// its own stream.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            noise_level: 0.01,
            cleaning_level: BUTTERWORTH_Q,
            volume: 1.0,
            envelope: AdsrParams::default(),
        }
    }
}

/// Full parameter snapshot as delivered by the parameter layer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub micro_tune: f32,
    pub cleaning_level: f32,
    pub envelope: AdsrParams,
    pub volume: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            micro_tune: 0.0,
            cleaning_level: BUTTERWORTH_Q,
            envelope: AdsrParams::default(),
            volume: 1.0,
        }
    }
}
