//! Pitch helpers shared by the voice and its callers.

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Shift `base_hz` by a fractional number of semitones.
///
/// An offset of exactly zero returns `base_hz` unchanged.
#[inline]
pub fn micro_tuned_frequency(base_hz: f32, semitones: f32) -> f32 {
    if semitones == 0.0 {
        return base_hz;
    }
    base_hz * 2.0_f32.powf(semitones / 12.0)
}
