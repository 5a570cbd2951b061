//! Lock-guarded mirror of the most recent block's outgoing MIDI events.
//!
//! The audio thread publishes with `try_lock` and simply skips a contended
//! block; the display thread holds the lock only long enough to copy the
//! bounded snapshot. No lock is ever held across processing.

use std::sync::Mutex;

use gs_model::BlockEvents;

pub struct MidiMirror {
    events: Mutex<BlockEvents>,
}

impl MidiMirror {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(BlockEvents::new()),
        }
    }

    /// Replace the snapshot with this block's outgoing events. Never blocks.
    pub fn publish(&self, events: &BlockEvents) {
        if let Ok(mut guard) = self.events.try_lock() {
            guard.clear();
            let _ = guard.extend_from_slice(events);
        }
    }

    /// Copy the snapshot (display thread).
    pub fn snapshot(&self) -> BlockEvents {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Default for MidiMirror {
    fn default() -> Self {
        Self::new()
    }
}
