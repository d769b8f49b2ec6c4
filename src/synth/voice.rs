use tracing::{debug, error};

use crate::{
    dsp::{
        envelope::{AdsrParams, EnvelopeGenerator, EnvelopeStage},
        filter::{BiquadCoeffs, TrackingFilter},
        gain::GainStage,
        noise::NoiseSource,
        tuning::micro_tuned_frequency,
    },
    error::{VoiceError, VoiceResult},
    io::AudioBuffer,
    MAX_BLOCK_SIZE,
};

#[cfg(feature = "rtrb")]
use super::message::{VoiceHandle, VOICE_QUEUE_SIZE};
use super::{
    config::{VoiceConfig, VoiceParams},
    message::{MessageReceiver, VoiceMessage},
    sound::{self, SoundDescriptor},
};

/*
Noise Voice
===========

One note of the synth: white noise, scaled, register-compensated, lowpassed
at the played pitch and shaped by an ADSR.

    noise ──→ × noise_level ──→ gain band ──→ tracking LP ──→ × envelope ──→ += output

Life-cycle
----------

    Idle ──activate──→ Active ──release(tail)──→ Releasing ──envelope off──→ Idle
                         │                          │
                         └── release(no tail) ──────┴────────────────────→ Idle

The voice is built once, prepared, then reused for note after note. After
each render it checks its envelope once; when the envelope has finished the
voice drops back to Idle so the pool can hand it a new note.

Cutoff derivation
-----------------

Three setters move the filter and they do not all see the same frequency:

    set_key_frequency(f)   cutoff = f                       Q = cleaning
    set_micro_tune(m)      cutoff = key · 2^(m/12)          Q = cleaning
    set_cleaning_level(c)  cutoff = key                     Q = c

Changing the cleaning level (or the key) drops any micro-tune offset from
the cutoff until the next set_micro_tune. Tests pin this behaviour.

Gain banding follows the base key frequency, never the micro-tuned one, and
is re-selected whenever the key or the volume changes.
*/

/// Life-cycle stage of a voice as seen by the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,      // Available for allocation
    Active,    // Playing, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release phase
}

/// Key frequency a voice is parked on after `prepare`.
pub const PREPARED_KEY_HZ: f32 = 20.0;

pub struct NoiseVoice {
    state: VoiceState,
    velocity: f32,

    key_frequency: f32,
    micro_tune: f32,
    cleaning_level: f32,
    volume: f32,
    noise_level: f32,

    sample_rate: f32,
    block_size: usize,

    noise: NoiseSource,
    filter: TrackingFilter,
    envelope: EnvelopeGenerator,
    gain: GainStage,

    // One scratch channel per prepared output channel, plus the envelope
    // curve shared by all of them.
    scratch: Vec<Vec<f32>>,
    env_buffer: Vec<f32>,

    rx: Option<Box<dyn MessageReceiver>>,
    logged_extra_channels: bool,
}

/// Upper bound on messages applied per drain, so a flooding control thread
/// cannot stall the audio thread. Leftovers wait for the next drain.
const MAX_MESSAGES_PER_DRAIN: usize = 256;

impl NoiseVoice {
    pub fn new(config: VoiceConfig) -> Self {
        let mut voice = Self {
            state: VoiceState::Idle,
            velocity: 0.0,
            key_frequency: PREPARED_KEY_HZ,
            micro_tune: 0.0,
            cleaning_level: config.cleaning_level,
            volume: config.volume,
            noise_level: config.noise_level,
            sample_rate: 0.0,
            block_size: 0,
            noise: NoiseSource::new(config.seed),
            filter: TrackingFilter::new(),
            envelope: EnvelopeGenerator::new(config.envelope),
            gain: GainStage::new(),
            scratch: Vec::new(),
            env_buffer: Vec::new(),
            rx: None,
            logged_extra_channels: false,
        };
        voice.set_volume(config.volume);
        voice
    }

    /// Build a voice plus a handle for updating it from another thread.
    #[cfg(feature = "rtrb")]
    pub fn with_handle(config: VoiceConfig) -> (Self, VoiceHandle) {
        let (handle, rx) = VoiceHandle::channel(VOICE_QUEUE_SIZE);
        let mut voice = Self::new(config);
        voice.attach_receiver(Box::new(rx));

        debug!(capacity = VOICE_QUEUE_SIZE, "voice control handle created");
        (voice, handle)
    }

    /// Drain `rx` before every render and note event from now on.
    pub fn attach_receiver(&mut self, rx: Box<dyn MessageReceiver>) {
        self.rx = Some(rx);
    }

    /// Allocate scratch space and set up the DSP chain for a session.
    ///
    /// Clears filter history and parks the voice on a 20 Hz key with no
    /// micro-tune. Call from the host's prepare hook, not the audio thread.
    pub fn prepare(
        &mut self,
        sample_rate: f32,
        block_size: usize,
        channels: usize,
    ) -> VoiceResult<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(VoiceError::InvalidSampleRate { rate: sample_rate });
        }
        if block_size == 0 {
            return Err(VoiceError::InvalidBlockSize { size: block_size });
        }
        if channels == 0 {
            return Err(VoiceError::InvalidChannelCount { channels });
        }

        self.drain_messages();

        self.sample_rate = sample_rate;
        self.block_size = block_size.min(MAX_BLOCK_SIZE);

        self.scratch = vec![vec![0.0; self.block_size]; channels];
        self.logged_extra_channels = false;
        self.env_buffer = vec![0.0; self.block_size];

        self.filter.prepare(sample_rate, self.block_size, channels);
        self.filter.reset();
        self.envelope.prepare(sample_rate);

        self.set_key_frequency(PREPARED_KEY_HZ);
        self.set_micro_tune(0.0);

        debug!(sample_rate, block_size = self.block_size, channels, "noise voice prepared");
        Ok(())
    }

    pub fn is_prepared(&self) -> bool {
        self.sample_rate > 0.0
    }

    pub fn can_handle(&self, sound: &SoundDescriptor) -> bool {
        sound::can_handle(sound)
    }

    /// Start a note at `frequency_hz`.
    ///
    /// Velocity is recorded but does not change the level.
    pub fn activate(&mut self, frequency_hz: f32, velocity: f32) {
        self.drain_messages();
        self.velocity = velocity;
        self.set_key_frequency(frequency_hz);
        self.envelope.note_on();
        self.state = VoiceState::Active;
    }

    /// Key released.
    ///
    /// With `allow_tail_off` the envelope plays its release and the voice
    /// frees itself once that finishes. Without it, or if the envelope is
    /// already silent, the voice is cleared before this returns.
    pub fn release(&mut self, allow_tail_off: bool) {
        self.drain_messages();
        self.envelope.note_off();

        if !allow_tail_off || !self.envelope.is_active() {
            self.clear_current_note();
        } else if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
        }
    }

    /// Drop the note immediately and silence the envelope.
    pub fn clear_current_note(&mut self) {
        self.envelope.reset();
        self.state = VoiceState::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.state != VoiceState::Idle
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Set the base key frequency, re-deriving cutoff and gain band from it.
    ///
    /// The stored micro-tune is not reapplied to the cutoff.
    pub fn set_key_frequency(&mut self, hz: f32) {
        self.key_frequency = hz;
        self.filter.set_cutoff(hz, self.cleaning_level);
        self.gain.set_volume(self.volume, hz);
    }

    /// Offset the cutoff from the key by a fractional number of semitones.
    pub fn set_micro_tune(&mut self, semitones: f32) {
        self.micro_tune = semitones;
        let tuned = micro_tuned_frequency(self.key_frequency, semitones);
        self.filter.set_cutoff(tuned, self.cleaning_level);
    }

    /// Change filter Q. The cutoff goes back to the untuned key frequency.
    pub fn set_cleaning_level(&mut self, level: f32) {
        self.cleaning_level = level;
        self.filter.set_cutoff(self.key_frequency, level);
    }

    pub fn set_envelope(&mut self, params: AdsrParams) {
        self.envelope.set_parameters(params);
    }

    pub fn set_envelope_params(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.set_envelope(AdsrParams::new(attack, decay, sustain, release));
    }

    /// Master volume; the gain band is picked from the base key frequency.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.gain.set_volume(volume, self.key_frequency);
    }

    /// Apply a whole parameter snapshot.
    ///
    /// Cleaning level goes first so the micro-tune offset survives in the
    /// resulting cutoff.
    pub fn apply_params(&mut self, params: &VoiceParams) {
        self.set_cleaning_level(params.cleaning_level);
        self.set_micro_tune(params.micro_tune);
        self.set_envelope(params.envelope);
        self.set_volume(params.volume);
    }

    pub fn apply_message(&mut self, msg: VoiceMessage) {
        match msg {
            VoiceMessage::KeyFrequency(hz) => self.set_key_frequency(hz),
            VoiceMessage::MicroTune(semitones) => self.set_micro_tune(semitones),
            VoiceMessage::CleaningLevel(level) => self.set_cleaning_level(level),
            VoiceMessage::Envelope(params) => self.set_envelope(params),
            VoiceMessage::Volume(volume) => self.set_volume(volume),
            VoiceMessage::Params(params) => self.apply_params(&params),
        }
    }

    fn drain_messages(&mut self) {
        // Taken out for the loop so messages can go through &mut self setters
        if let Some(mut rx) = self.rx.take() {
            for _ in 0..MAX_MESSAGES_PER_DRAIN {
                match rx.pop() {
                    Some(msg) => self.apply_message(msg),
                    None => break,
                }
            }
            self.rx = Some(rx);
        }
    }

    /// Render `num_samples` of this voice and add them into `output` at
    /// `start_sample`.
    ///
    /// Pending parameter messages are applied first. Inactive voices add
    /// nothing. The prepared channel count is a cap: output channels beyond
    /// it, and samples past the end of `output`, are left untouched.
    pub fn render_into(
        &mut self,
        output: &mut AudioBuffer,
        start_sample: usize,
        num_samples: usize,
    ) -> VoiceResult<()> {
        if !self.is_prepared() {
            error!("render_into called on a voice that was never prepared");
            return Err(VoiceError::NotPrepared);
        }

        self.drain_messages();

        if !self.is_active() {
            return Ok(());
        }

        let channels = output.num_channels().min(self.scratch.len());
        if output.num_channels() > channels && !self.logged_extra_channels {
            self.logged_extra_channels = true;
            debug!(
                prepared = channels,
                requested = output.num_channels(),
                "output has more channels than the voice was prepared for, extra channels skipped"
            );
        }
        let mut offset = 0;

        while offset < num_samples {
            let len = self.block_size.min(num_samples - offset);

            let env = &mut self.env_buffer[..len];
            self.envelope.render(env);

            for (ch, scratch) in self.scratch.iter_mut().take(channels).enumerate() {
                let buf = &mut scratch[..len];
                buf.fill(0.0);

                self.noise.render(buf, self.noise_level);
                self.gain.process(buf);
                self.filter.process(ch, buf);

                for (s, &e) in buf.iter_mut().zip(env.iter()) {
                    *s *= e;
                }

                output.add_from(ch, start_sample + offset, buf);
            }

            offset += len;
        }

        if !self.envelope.is_active() {
            self.clear_current_note();
        }

        Ok(())
    }

    pub fn key_frequency(&self) -> f32 {
        self.key_frequency
    }

    /// Frequency the filter cutoff was last derived from.
    pub fn effective_frequency(&self) -> f32 {
        self.filter.cutoff_hz()
    }

    pub fn micro_tune(&self) -> f32 {
        self.micro_tune
    }

    pub fn cleaning_level(&self) -> f32 {
        self.cleaning_level
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Linear gain currently applied, after banding.
    pub fn gain(&self) -> f32 {
        self.gain.gain()
    }

    pub fn filter_coefficients(&self) -> BiquadCoeffs {
        self.filter.coefficients()
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn envelope_stage(&self) -> EnvelopeStage {
        self.envelope.stage()
    }

    pub fn envelope_params(&self) -> AdsrParams {
        self.envelope.parameters()
    }
}

impl Default for NoiseVoice {
    fn default() -> Self {
        Self::new(VoiceConfig::default())
    }
}
