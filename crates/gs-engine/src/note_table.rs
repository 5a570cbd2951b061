//! Lock-free per-note velocity table shared with the display layer.

use std::sync::atomic::{AtomicU8, Ordering};

/// Last-applied output velocity per MIDI note; 0 means the note is off.
///
/// Written only by the audio thread, read concurrently by the display layer.
/// Fixed size, no locks: one atomic slot per note.
pub struct NoteVelocityTable {
    slots: [AtomicU8; 128],
}

impl NoteVelocityTable {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| AtomicU8::new(0)),
        }
    }

    pub fn set(&self, note: u8, velocity: u8) {
        if let Some(slot) = self.slots.get(note as usize) {
            slot.store(velocity, Ordering::Relaxed);
        }
    }

    pub fn clear(&self, note: u8) {
        self.set(note, 0);
    }

    pub fn get(&self, note: u8) -> u8 {
        self.slots
            .get(note as usize)
            .map_or(0, |slot| slot.load(Ordering::Relaxed))
    }

    pub fn clear_all(&self) {
        for slot in &self.slots {
            slot.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for NoteVelocityTable {
    fn default() -> Self {
        Self::new()
    }
}
