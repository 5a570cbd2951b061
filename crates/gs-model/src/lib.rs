//! Domain types for gridseq.
//!
//! This crate defines the model shared by every layer: the MIDI event
//! representation handed to the engines each block, the atomic parameter
//! cells bridging the control thread and the audio thread, the persisted
//! preset format, and the musical note-division table used to label the
//! sequencer rate knob.

mod divisions;
mod event;
mod params;
mod preset;

pub use divisions::{musical_label, nearest_division, NoteDivision, DEFAULT_BPM, NOTE_DIVISIONS};
pub use event::{BlockEvents, MidiEvent, MidiMessage, MAX_BLOCK_EVENTS};
pub use params::{
    AtomicF32, RemapControls, RemapParams, SeqControls, SeqParams, CURVE_EXP_MAX, CURVE_EXP_MIN,
    GATE_MAX, GATE_MIN, GLIDE_MS_MAX, GLIDE_MS_MIN, NUM_STEPS, RATE_MS_MAX, RATE_MS_MIN,
    STEP_SEMITONES, VELOCITY_MAX, VELOCITY_MIN,
};
pub use preset::{Preset, RemapPreset, SeqPreset};
