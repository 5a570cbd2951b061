//! Standalone host plumbing for the gridseq engines.
//!
//! Wires a `Processor` into a cpal output stream and connects it to midir
//! MIDI I/O through lock-free SPSC rings, so the audio callback never blocks.

mod cpal_backend;
mod error;
mod midi_io;

pub use cpal_backend::{CpalHost, MAX_BLOCK_FRAMES};
pub use error::HostError;
pub use midi_io::{input_ports, output_ports, spawn_sender, MidiInputDevice, MidiOutputDevice};
