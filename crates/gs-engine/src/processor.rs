//! Block-processor contract between the host and the engines.

use gs_model::{BlockEvents, MidiEvent};

pub use gs_model::DEFAULT_BPM;

/// Host-provided context for one processing block.
#[derive(Clone, Copy, Debug)]
pub struct BlockContext {
    /// Output sample rate in Hz.
    pub sample_rate: f64,
    /// Host tempo in BPM, if the host reports one.
    pub bpm: Option<f64>,
}

impl BlockContext {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            bpm: None,
        }
    }

    pub fn with_bpm(sample_rate: f64, bpm: f64) -> Self {
        Self {
            sample_rate,
            bpm: Some(bpm),
        }
    }

    pub fn effective_bpm(&self) -> f64 {
        self.bpm.unwrap_or(DEFAULT_BPM)
    }
}

/// A realtime block processor.
///
/// `process` runs on the audio thread and must not block, allocate, or do
/// unbounded work. Everything else runs at setup time on the control thread.
pub trait Processor: Send {
    /// Called before streaming starts, or again after a sample-rate change.
    fn prepare(&mut self, sample_rate: f64, max_block_frames: usize);

    /// Reset runtime state (step position, gate, phase) without touching
    /// parameters.
    fn reset(&mut self);

    /// Capability check for the host's channel layout. A `false` return is
    /// the only way a layout problem is reported; processing never errors.
    fn supports_channels(&self, channels: u16) -> bool;

    /// Process one block. `events` arrive in ascending frame order; the
    /// engine fills or passes through `audio` and appends outgoing MIDI to
    /// `midi_out`.
    fn process(
        &mut self,
        ctx: &BlockContext,
        events: &[MidiEvent],
        audio: &mut [f32],
        midi_out: &mut BlockEvents,
    );

    /// Serialize parameters (never runtime state) for persistence.
    fn save_state(&self) -> Vec<u8>;

    /// Restore parameters from persisted bytes. Malformed data falls back to
    /// defaults; runtime state resets either way.
    fn load_state(&mut self, bytes: &[u8]);
}
