use crate::MIN_TIME;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Implementation
============================

A linear ADSR envelope generator shaping the amplitude of one noise voice.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). This multiplies
              the audio signal to control its amplitude over time.

  stage       Which phase of the envelope we're in: Off, Attack, Decay,
              Sustain, or Release. A state machine governs transitions.

  gate        The note on/off signal. Gate high (note_on) triggers Attack.
              Gate low (note_off) triggers Release from wherever we are.

  increment   How much `level` changes per sample. Calculated from the stage
              duration and sample rate when the stage is entered.


The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)

    increment = target_change / (time_seconds * sample_rate)

Attack always uses the full-scale rate 1 / (attack · sr). A retrigger from a
partially released level therefore reaches the peak sooner, on the same slope.


The State Machine
-----------------

    Off ──note_on──→ Attack ──level=1──→ Decay ──level=S──→ Sustain
     ↑                 │ ↑                 │                  │
     │                 │ └──── note_on ────┴──── note_on ─────┤
     │                 └──────── note_off ─────────┬──────────┘
     │                                             ↓
     └──────────────── level=0 ─────────────── Release ──note_on──→ Attack

note_on always enters Attack, whatever the current stage. note_off enters
Release from every stage except Off.


Continuity
----------

No transition ever moves `level`:

  - note_on keeps the current level and ramps up from there. Restarting
    from zero would click when a note is retriggered during its release.
  - Release snapshots the current level at note_off and interpolates
    linearly from it to 0 over exactly `release · sr` samples.
  - Sustain holds the level Decay actually arrived at.

Parameter changes (`set_parameters`) are picked up at the next transition.
The ramp that is already running keeps its slope and target.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Off,     // Gate low, envelope inactive, level = 0
    Attack,  // Gate high, ramping up to 1.0
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding while gate is high
    Release, // Gate went low, ramping down to 0
}

/// Attack, decay and release in seconds; sustain as a level in 0.0-1.0.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl AdsrParams {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Durations floored to one sample at 48kHz, sustain clamped to 0.0-1.0.
    pub fn sanitized(self) -> Self {
        let sustain = if self.sustain.is_nan() {
            0.0
        } else {
            self.sustain.clamp(0.0, 1.0)
        };

        Self {
            attack: self.attack.max(MIN_TIME),
            decay: self.decay.max(MIN_TIME),
            sustain,
            release: self.release.max(MIN_TIME),
        }
    }
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self {
            attack: 0.01,  // 10ms
            decay: 0.1,    // 100ms
            sustain: 0.7,  // 70% level
            release: 0.3,  // 300ms
        }
    }
}

pub struct EnvelopeGenerator {
    params: AdsrParams,
    sample_rate: f32,

    // Runtime state (changes every sample)
    stage: EnvelopeStage,
    level: f32,

    // Per-stage slopes, captured on entry
    attack_increment: f32,
    decay_decrement: f32,
    decay_target: f32,

    // Release bookkeeping (pre-calculated at note_off for precision)
    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl EnvelopeGenerator {
    pub fn new(params: AdsrParams) -> Self {
        Self {
            params: params.sanitized(),
            sample_rate: 48_000.0,

            stage: EnvelopeStage::Off,
            level: 0.0,
            attack_increment: 0.0,
            decay_decrement: 0.0,
            decay_target: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self::new(AdsrParams::new(attack, decay, sustain, release))
    }

    /// Set the sample rate used to turn durations into per-sample steps.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Replace the ADSR shape without touching stage or level.
    pub fn set_parameters(&mut self, params: AdsrParams) {
        self.params = params.sanitized();
    }

    pub fn parameters(&self) -> AdsrParams {
        self.params
    }

    /// Gate high: (re)enter Attack from the current level.
    pub fn note_on(&mut self) {
        self.attack_increment = 1.0 / (self.params.attack * self.sample_rate);
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate low: start the release phase from current level.
    pub fn note_off(&mut self) {
        if self.stage == EnvelopeStage::Off {
            return;
        }

        // Snapshot current level - we'll interpolate from here to 0
        self.release_start_level = self.level;
        self.release_total_samples =
            (self.params.release * self.sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeStage::Release;
    }

    fn enter_decay(&mut self) {
        self.level = 1.0;
        self.decay_target = self.params.sustain;
        self.decay_decrement = (1.0 - self.decay_target) / (self.params.decay * self.sample_rate);
        self.stage = EnvelopeStage::Decay;
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Off => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                self.level += self.attack_increment;

                if self.level >= 1.0 {
                    self.enter_decay();
                }
            }

            EnvelopeStage::Decay => {
                self.level -= self.decay_decrement;

                if self.level <= self.decay_target {
                    self.level = self.decay_target;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {}

            EnvelopeStage::Release => {
                // level = start * (1 - elapsed/total)
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Off;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// True in every stage except Off.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Off
    }

    /// Force the envelope off.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Off;
        self.level = 0.0;
        self.release_elapsed_samples = 0;
        self.release_start_level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Samples a release started now would take.
    pub fn release_samples(&self) -> u32 {
        (self.params.release * self.sample_rate).round().max(1.0) as u32
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new(AdsrParams::default())
    }
}
