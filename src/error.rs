//! Error types for voice preparation and rendering.

use thiserror::Error;

/// Result type for voice operations.
pub type VoiceResult<T> = Result<T, VoiceError>;

/// Programming-error class failures. Parameter values never produce these;
/// they are clamped instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VoiceError {
    /// `render_into` was called before a successful `prepare`.
    #[error("voice rendered before prepare(): no sample rate")]
    NotPrepared,

    /// Sample rate given to `prepare` was not a positive finite number.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The rejected sample rate.
        rate: f32,
    },

    /// Block size given to `prepare` was zero.
    #[error("invalid block size: {size}")]
    InvalidBlockSize {
        /// The rejected block size.
        size: usize,
    },

    /// Channel count given to `prepare` was zero.
    #[error("invalid channel count: {channels}")]
    InvalidChannelCount {
        /// The rejected channel count.
        channels: usize,
    },
}
