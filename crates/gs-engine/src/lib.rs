//! Realtime engines for gridseq.
//!
//! Two sibling block processors sharing no state: the 8-step monophonic saw
//! sequencer and the note-velocity remapper. Both run inside a host audio
//! callback and follow the realtime rules: one parameter read per block, no
//! allocation, and no lock ever held across processing.

mod mirror;
mod note_table;
mod pitch;
pub mod processor;
mod step_seq;
mod velocity;

pub use mirror::MidiMirror;
pub use note_table::NoteVelocityTable;
pub use pitch::note_to_hz;
pub use processor::{BlockContext, Processor, DEFAULT_BPM};
pub use step_seq::{SeqDisplay, StepSequencer};
pub use velocity::VelocityRemap;
