//! The note-velocity remap engine.
//!
//! Stateless per event beyond the velocity table: each note-on is rewritten
//! through a power-law curve keyed on the note number, note-offs and all
//! other messages pass through untouched. Audio is an unmodified
//! pass-through.

use std::sync::Arc;

use gs_model::{BlockEvents, MidiEvent, MidiMessage, RemapControls, RemapParams, RemapPreset};

use crate::mirror::MidiMirror;
use crate::note_table::NoteVelocityTable;
use crate::processor::{BlockContext, Processor};

/// Map a note number through the power curve into the configured range.
fn curve_velocity(note: u8, controls: &RemapControls) -> u8 {
    let normalized = f32::from(note.min(127)) / 127.0;
    let shaped = normalized.powf(controls.curve_exponent);
    let span = f32::from(controls.max_velocity) - f32::from(controls.min_velocity);
    let velocity = f32::from(controls.min_velocity) + span * shaped;
    (velocity.round() as i32).clamp(1, 127) as u8
}

pub struct VelocityRemap {
    params: Arc<RemapParams>,
    table: Arc<NoteVelocityTable>,
    mirror: Arc<MidiMirror>,
}

impl VelocityRemap {
    pub fn new(params: Arc<RemapParams>) -> Self {
        Self {
            params,
            table: Arc::new(NoteVelocityTable::new()),
            mirror: Arc::new(MidiMirror::new()),
        }
    }

    /// Per-note velocity table handle for the display layer.
    pub fn table(&self) -> Arc<NoteVelocityTable> {
        Arc::clone(&self.table)
    }

    /// Outgoing-event mirror handle for the display layer.
    pub fn mirror(&self) -> Arc<MidiMirror> {
        Arc::clone(&self.mirror)
    }
}

impl Processor for VelocityRemap {
    fn prepare(&mut self, _sample_rate: f64, _max_block_frames: usize) {
        self.reset();
    }

    fn reset(&mut self) {
        self.table.clear_all();
        self.mirror.publish(&BlockEvents::new());
    }

    fn supports_channels(&self, _channels: u16) -> bool {
        // Pure MIDI transform; any audio layout passes through.
        true
    }

    fn process(
        &mut self,
        _ctx: &BlockContext,
        events: &[MidiEvent],
        _audio: &mut [f32],
        midi_out: &mut BlockEvents,
    ) {
        let controls = self.params.controls();

        for event in events {
            let rewritten = if controls.bypass {
                *event
            } else {
                match event.message {
                    MidiMessage::NoteOn { channel, note, .. } => {
                        let velocity = curve_velocity(note, &controls);
                        self.table.set(note, velocity);
                        MidiEvent::new(
                            event.frame,
                            MidiMessage::NoteOn {
                                channel,
                                note,
                                velocity,
                            },
                        )
                    }
                    MidiMessage::NoteOff { note, .. } => {
                        self.table.clear(note);
                        *event
                    }
                    MidiMessage::Raw(_) => *event,
                }
            };
            if midi_out.push(rewritten).is_err() {
                break;
            }
        }

        self.mirror.publish(midi_out);
    }

    fn save_state(&self) -> Vec<u8> {
        RemapPreset::capture(&self.params).to_json()
    }

    fn load_state(&mut self, bytes: &[u8]) {
        RemapPreset::from_json(bytes).apply(&self.params);
        self.reset();
    }
}
