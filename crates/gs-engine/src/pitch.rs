//! Equal-tempered pitch conversion.

/// Frequency of A4 (MIDI note 69).
const A4_HZ: f32 = 440.0;

/// Convert a (possibly fractional) MIDI note number to a frequency in Hz.
pub fn note_to_hz(note: f32) -> f32 {
    A4_HZ * ((note - 69.0) / 12.0).exp2()
}
