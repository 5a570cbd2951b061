//! MIDI event model for block processing.
//!
//! Every event carries a frame offset into the current block; engines consume
//! events in ascending-offset order, interleaved with rendering, so state
//! changes land on the exact sample they were stamped with.

use heapless::Vec;

/// Maximum MIDI events per processing block.
pub const MAX_BLOCK_EVENTS: usize = 128;

/// Bounded event list for one block.
///
/// Fixed capacity keeps the realtime path allocation-free; overflow is
/// dropped at the host boundary, never inside an engine.
pub type BlockEvents = Vec<MidiEvent, MAX_BLOCK_EVENTS>;

/// A single MIDI message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note on (velocity is always nonzero after parsing).
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note off, keeping the release velocity for byte-faithful forwarding.
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Any other message, carried verbatim.
    Raw([u8; 3]),
}

impl MidiMessage {
    /// Note on, channel 0.
    pub fn note_on(note: u8, velocity: u8) -> Self {
        Self::NoteOn {
            channel: 0,
            note,
            velocity,
        }
    }

    /// Note off, channel 0.
    pub fn note_off(note: u8) -> Self {
        Self::NoteOff {
            channel: 0,
            note,
            velocity: 0,
        }
    }

    /// Parse a raw 3-byte message. A note-on with velocity 0 is a note-off,
    /// per the MIDI running convention.
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        let channel = bytes[0] & 0x0f;
        let note = bytes[1] & 0x7f;
        match bytes[0] & 0xf0 {
            0x90 if bytes[2] & 0x7f > 0 => Self::NoteOn {
                channel,
                note,
                velocity: bytes[2] & 0x7f,
            },
            0x90 => Self::NoteOff {
                channel,
                note,
                velocity: 0,
            },
            0x80 => Self::NoteOff {
                channel,
                note,
                velocity: bytes[2] & 0x7f,
            },
            _ => Self::Raw(bytes),
        }
    }

    /// Wire form of the message.
    pub fn to_bytes(self) -> [u8; 3] {
        match self {
            Self::NoteOn {
                channel,
                note,
                velocity,
            } => [0x90 | channel, note, velocity],
            Self::NoteOff {
                channel,
                note,
                velocity,
            } => [0x80 | channel, note, velocity],
            Self::Raw(bytes) => bytes,
        }
    }

    /// The note number, for note on/off messages.
    pub fn note(&self) -> Option<u8> {
        match *self {
            Self::NoteOn { note, .. } | Self::NoteOff { note, .. } => Some(note),
            Self::Raw(_) => None,
        }
    }
}

/// A MIDI message stamped with its sample offset within the block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    /// Sample offset into the current block.
    pub frame: u32,
    pub message: MidiMessage,
}

impl MidiEvent {
    pub fn new(frame: u32, message: MidiMessage) -> Self {
        Self { frame, message }
    }
}
