#[cfg(feature = "rtrb")]
use std::sync::{
    atomic::{AtomicU32, AtomicU64, Ordering},
    Arc,
};

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::dsp::envelope::AdsrParams;

use super::config::VoiceParams;

/*
Voice Control
=============

Parameter updates travel from a control thread to the audio thread through
two paths that together behave like one ordered stream.

    VoiceHandle ──push──→ rtrb queue ─────────────┐
         │                                        ├──→ voice drain
         └──queue full──→ latest-wins slots ──────┘

The queue is the normal path. When it is full (an idle voice is not being
rendered, so nobody drains it) updates go to one slot per parameter instead.
A slot keeps only the newest value, so a flood of updates never loses the
last one.

Ordering rules:

  - Once any slot is pending, every further update also goes to a slot,
    until the voice has emptied them all. Queued messages are therefore
    always older than pending slot values.
  - The receiver pops the queue first, then slots oldest-stamp-first.
  - Replaying the newest value of each parameter in stamp order ends in the
    same voice state as replaying every update, because each setter only
    reads the latest values of the others.

A slot is written under a stamp of WRITING. The reader only clears a slot
whose stamp did not change while it read the values, so a half-written
envelope is never applied.
*/

/// Parameter update sent from a control thread to a voice.
///
/// Messages are drained before the next render or note event, in the order
/// they were sent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VoiceMessage {
    KeyFrequency(f32),
    MicroTune(f32),
    CleaningLevel(f32),
    Envelope(AdsrParams),
    Volume(f32),
    Params(VoiceParams),
}

pub trait MessageReceiver: Send {
    fn pop(&mut self) -> Option<VoiceMessage>;
}

#[cfg(feature = "rtrb")]
pub const VOICE_QUEUE_SIZE: usize = 64;

#[cfg(feature = "rtrb")]
const EMPTY: u64 = 0;
#[cfg(feature = "rtrb")]
const WRITING: u64 = u64::MAX;

#[cfg(feature = "rtrb")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamSlot {
    KeyFrequency,
    MicroTune,
    CleaningLevel,
    Envelope,
    Volume,
}

#[cfg(feature = "rtrb")]
impl ParamSlot {
    const ALL: [ParamSlot; 5] = [
        ParamSlot::KeyFrequency,
        ParamSlot::MicroTune,
        ParamSlot::CleaningLevel,
        ParamSlot::Envelope,
        ParamSlot::Volume,
    ];

    fn message(self, values: [f32; 4]) -> VoiceMessage {
        let [a, b, c, d] = values;
        match self {
            ParamSlot::KeyFrequency => VoiceMessage::KeyFrequency(a),
            ParamSlot::MicroTune => VoiceMessage::MicroTune(a),
            ParamSlot::CleaningLevel => VoiceMessage::CleaningLevel(a),
            ParamSlot::Envelope => VoiceMessage::Envelope(AdsrParams::new(a, b, c, d)),
            ParamSlot::Volume => VoiceMessage::Volume(a),
        }
    }
}

#[cfg(feature = "rtrb")]
#[derive(Default)]
struct Slot {
    stamp: AtomicU64,
    values: [AtomicU32; 4],
}

/// Newest value per parameter, for updates that did not fit the queue.
#[cfg(feature = "rtrb")]
#[derive(Default)]
struct PendingParams {
    slots: [Slot; 5],
}

#[cfg(feature = "rtrb")]
impl PendingParams {
    fn is_empty(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| slot.stamp.load(Ordering::SeqCst) == EMPTY)
    }

    // Single writer: only the handle calls this.
    fn store(&self, param: ParamSlot, values: [f32; 4], stamp: u64) {
        let slot = &self.slots[param as usize];
        slot.stamp.store(WRITING, Ordering::SeqCst);
        for (cell, value) in slot.values.iter().zip(values) {
            cell.store(value.to_bits(), Ordering::SeqCst);
        }
        slot.stamp.store(stamp, Ordering::SeqCst);
    }

    /// Take the pending value with the oldest stamp.
    ///
    /// Returns `None` if that slot was rewritten mid-read; the newer value
    /// is picked up on the next drain.
    fn take_oldest(&self) -> Option<VoiceMessage> {
        let mut oldest: Option<(ParamSlot, u64)> = None;
        for param in ParamSlot::ALL {
            let stamp = self.slots[param as usize].stamp.load(Ordering::SeqCst);
            if stamp == EMPTY || stamp == WRITING {
                continue;
            }
            if oldest.map_or(true, |(_, s)| stamp < s) {
                oldest = Some((param, stamp));
            }
        }

        let (param, stamp) = oldest?;
        let slot = &self.slots[param as usize];
        let values = [
            f32::from_bits(slot.values[0].load(Ordering::SeqCst)),
            f32::from_bits(slot.values[1].load(Ordering::SeqCst)),
            f32::from_bits(slot.values[2].load(Ordering::SeqCst)),
            f32::from_bits(slot.values[3].load(Ordering::SeqCst)),
        ];

        slot.stamp
            .compare_exchange(stamp, EMPTY, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| param.message(values))
    }
}

/// Audio-thread side of a [`VoiceHandle`].
#[cfg(feature = "rtrb")]
pub struct VoiceReceiver {
    rx: Consumer<VoiceMessage>,
    pending: Arc<PendingParams>,
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for VoiceReceiver {
    fn pop(&mut self) -> Option<VoiceMessage> {
        match self.rx.pop() {
            Ok(msg) => Some(msg),
            Err(_) => self.pending.take_oldest(),
        }
    }
}

/// Control-thread side of a voice's parameter stream.
///
/// Updates are never dropped. When the queue is full the newest value of
/// each parameter is kept until the voice drains it.
#[cfg(feature = "rtrb")]
pub struct VoiceHandle {
    tx: Producer<VoiceMessage>,
    pending: Arc<PendingParams>,
    next_stamp: u64,
}

#[cfg(feature = "rtrb")]
impl VoiceHandle {
    /// Create a handle and the matching receiver.
    pub fn channel(capacity: usize) -> (Self, VoiceReceiver) {
        let (tx, rx) = RingBuffer::<VoiceMessage>::new(capacity);
        let pending = Arc::new(PendingParams::default());
        let handle = Self {
            tx,
            pending: Arc::clone(&pending),
            next_stamp: EMPTY + 1,
        };
        (handle, VoiceReceiver { rx, pending })
    }

    pub fn send(&mut self, msg: VoiceMessage) {
        if self.pending.is_empty() && self.tx.push(msg).is_ok() {
            return;
        }

        match msg {
            VoiceMessage::KeyFrequency(hz) => self.overflow(ParamSlot::KeyFrequency, [hz; 4]),
            VoiceMessage::MicroTune(st) => self.overflow(ParamSlot::MicroTune, [st; 4]),
            VoiceMessage::CleaningLevel(c) => self.overflow(ParamSlot::CleaningLevel, [c; 4]),
            VoiceMessage::Envelope(p) => self.overflow_envelope(p),
            VoiceMessage::Volume(v) => self.overflow(ParamSlot::Volume, [v; 4]),
            VoiceMessage::Params(p) => {
                // Same order as NoiseVoice::apply_params
                self.overflow(ParamSlot::CleaningLevel, [p.cleaning_level; 4]);
                self.overflow(ParamSlot::MicroTune, [p.micro_tune; 4]);
                self.overflow_envelope(p.envelope);
                self.overflow(ParamSlot::Volume, [p.volume; 4]);
            }
        }
    }

    fn overflow(&mut self, param: ParamSlot, values: [f32; 4]) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        self.pending.store(param, values, stamp);
    }

    fn overflow_envelope(&mut self, params: AdsrParams) {
        let values = [params.attack, params.decay, params.sustain, params.release];
        self.overflow(ParamSlot::Envelope, values);
    }

    pub fn set_key_frequency(&mut self, hz: f32) {
        self.send(VoiceMessage::KeyFrequency(hz));
    }

    pub fn set_micro_tune(&mut self, semitones: f32) {
        self.send(VoiceMessage::MicroTune(semitones));
    }

    pub fn set_cleaning_level(&mut self, level: f32) {
        self.send(VoiceMessage::CleaningLevel(level));
    }

    pub fn set_envelope(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.send(VoiceMessage::Envelope(AdsrParams::new(attack, decay, sustain, release)));
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.send(VoiceMessage::Volume(volume));
    }

    pub fn set_params(&mut self, params: VoiceParams) {
        self.send(VoiceMessage::Params(params));
    }

    /// Whether updates are currently parked in the overflow slots.
    pub fn is_overflowing(&self) -> bool {
        !self.pending.is_empty()
    }
}
