//! Low-level DSP primitives owned by each voice.
//!
//! Everything here is allocation-free once prepared and safe to run on the
//! audio thread. The voice layer wires them together.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Pitch-tracking biquad lowpass.
pub mod filter;
/// Register-banded gain compensation.
pub mod gain;
/// Seeded white noise source.
pub mod noise;
/// Frequency helpers (MIDI note, micro-tuning).
pub mod tuning;

pub use envelope::{AdsrParams, EnvelopeGenerator, EnvelopeStage};
pub use filter::TrackingFilter;
pub use gain::GainStage;
pub use noise::NoiseSource;
