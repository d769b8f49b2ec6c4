pub mod dsp;
pub mod error;
pub mod io;
pub mod synth; // Voice orchestration and life-cycle

pub use error::{VoiceError, VoiceResult};
pub use io::AudioBuffer;
pub use synth::{config::VoiceConfig, voice::NoiseVoice};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
