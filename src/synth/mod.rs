// Purpose: one note's rendering unit and the plumbing around it.
// The pool that routes notes to voices lives outside this crate.

pub mod config;
pub mod message;
pub mod sound;
pub mod voice;

pub use config::{VoiceConfig, VoiceParams};
#[cfg(feature = "rtrb")]
pub use message::{VoiceHandle, VoiceReceiver};
pub use message::{MessageReceiver, VoiceMessage};
pub use sound::SoundDescriptor;
pub use voice::{NoiseVoice, VoiceState};
