//! The 8-step monophonic saw sequencer.
//!
//! Owns all sequencer timing, gate, glide, and oscillator state, which
//! carries over exactly across block boundaries. Parameters are read once per
//! block from the shared atomic cells; note events are consumed at their
//! frame offsets, interleaved with rendering, so gate and pitch changes land
//! sample-accurately.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use gs_model::{AtomicF32, BlockEvents, MidiEvent, MidiMessage, SeqControls, SeqParams, SeqPreset, NUM_STEPS};

use crate::pitch::note_to_hz;
use crate::processor::{BlockContext, Processor};

/// Fixed headroom applied to the saw output.
const SAW_LEVEL: f32 = 0.3;

/// Residual below which glide snaps to the target frequency.
const GLIDE_EPSILON_HZ: f32 = 0.1;

/// Sequencer state readable by the display layer.
///
/// Written by the audio thread at the end of every block; the display thread
/// polls it at its own cadence.
pub struct SeqDisplay {
    current_step: AtomicI32,
    note_held: AtomicBool,
    bpm: AtomicF32,
}

impl SeqDisplay {
    fn new() -> Self {
        Self {
            current_step: AtomicI32::new(-1),
            note_held: AtomicBool::new(false),
            bpm: AtomicF32::new(120.0),
        }
    }

    /// Current step index: -1 before the first trigger, else 0..7.
    pub fn current_step(&self) -> i32 {
        self.current_step.load(Ordering::Relaxed)
    }

    pub fn note_held(&self) -> bool {
        self.note_held.load(Ordering::Relaxed)
    }

    /// Last tempo seen by the engine, for the rate label.
    pub fn bpm(&self) -> f32 {
        self.bpm.load()
    }
}

/// The sequencer engine. Strictly monophonic: a new note-on always
/// retriggers the sequence from step 0.
pub struct StepSequencer {
    params: Arc<SeqParams>,
    display: Arc<SeqDisplay>,
    sample_rate: f64,

    // Note gate
    note_held: bool,
    base_note: u8,

    // Step timing
    current_step: i32,
    samples_until_step: f64,
    step_len_samples: f64,
    gate_remaining: f64,
    gate_open: bool,

    // Pitch glide
    current_hz: f32,
    target_hz: f32,
    glide_step_hz: f32,
    glide_window: f64,

    // Oscillator
    phase: f32,
}

impl StepSequencer {
    pub fn new(params: Arc<SeqParams>) -> Self {
        Self {
            params,
            display: Arc::new(SeqDisplay::new()),
            sample_rate: 44100.0,
            note_held: false,
            base_note: 60,
            current_step: -1,
            samples_until_step: 0.0,
            step_len_samples: 0.0,
            gate_remaining: 0.0,
            gate_open: false,
            current_hz: 440.0,
            target_hz: 440.0,
            glide_step_hz: 0.0,
            glide_window: 0.0,
            phase: 0.0,
        }
    }

    /// Handle for the display layer.
    pub fn display(&self) -> Arc<SeqDisplay> {
        Arc::clone(&self.display)
    }

    fn handle_event(&mut self, message: &MidiMessage) {
        match *message {
            MidiMessage::NoteOn { note, .. } => {
                self.note_held = true;
                self.base_note = note;
                // Destructive retrigger: back to "about to fire step 0".
                self.current_step = -1;
                self.samples_until_step = 0.0;
            }
            MidiMessage::NoteOff { .. } => {
                self.note_held = false;
                self.gate_open = false;
            }
            MidiMessage::Raw(_) => {}
        }
    }

    fn advance_step(&mut self, controls: &SeqControls) {
        self.current_step = (self.current_step + 1).rem_euclid(NUM_STEPS as i32);
        let pitch = controls.steps[self.current_step as usize];
        self.target_hz = note_to_hz(f32::from(self.base_note) + pitch);
        if self.glide_window <= 0.0 {
            self.current_hz = self.target_hz;
            self.glide_step_hz = 0.0;
        } else {
            // Linear ramp sized to cover the full distance in the glide window.
            self.glide_step_hz = (self.target_hz - self.current_hz) / self.glide_window as f32;
        }
    }

    fn advance_glide(&mut self) {
        if self.current_hz == self.target_hz {
            return;
        }
        self.current_hz += self.glide_step_hz;
        let residual = self.target_hz - self.current_hz;
        // Snap once close enough or once the ramp overshoots.
        if residual.abs() < GLIDE_EPSILON_HZ || residual.signum() != self.glide_step_hz.signum() {
            self.current_hz = self.target_hz;
        }
    }

    fn render_sample(&mut self, controls: &SeqControls) -> f32 {
        if self.samples_until_step <= 0.0 {
            self.advance_step(controls);
            self.samples_until_step = self.step_len_samples;
            self.gate_remaining = self.step_len_samples * f64::from(controls.gate);
            self.gate_open = true;
        }

        if self.gate_remaining <= 0.0 {
            self.gate_open = false;
        }

        self.advance_glide();

        let output = if self.gate_open {
            (self.phase * 2.0 - 1.0) * SAW_LEVEL
        } else {
            0.0
        };

        // Phase stays continuous across step changes; only frequency moves.
        self.phase += self.current_hz / self.sample_rate as f32;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        self.samples_until_step -= 1.0;
        self.gate_remaining -= 1.0;
        output
    }
}

impl Processor for StepSequencer {
    fn prepare(&mut self, sample_rate: f64, _max_block_frames: usize) {
        self.sample_rate = sample_rate;
        self.reset();
    }

    fn reset(&mut self) {
        self.note_held = false;
        self.base_note = 60;
        self.current_step = -1;
        self.samples_until_step = 0.0;
        self.gate_remaining = 0.0;
        self.gate_open = false;
        self.current_hz = 440.0;
        self.target_hz = 440.0;
        self.glide_step_hz = 0.0;
        self.phase = 0.0;
    }

    fn supports_channels(&self, channels: u16) -> bool {
        channels == 1
    }

    fn process(
        &mut self,
        ctx: &BlockContext,
        events: &[MidiEvent],
        audio: &mut [f32],
        _midi_out: &mut BlockEvents,
    ) {
        self.sample_rate = ctx.sample_rate;
        let controls = self.params.controls();

        // Fixed for the whole block; blocks are short enough that a
        // mid-block tempo or rate change can wait for the next one.
        self.step_len_samples = f64::from(controls.rate_ms) / 1000.0 * ctx.sample_rate;
        self.glide_window = if controls.glide_enabled && controls.glide_time_ms > 0.0 {
            f64::from(controls.glide_time_ms) / 1000.0 * ctx.sample_rate
        } else {
            0.0
        };

        let mut next_event = 0usize;
        for (index, sample) in audio.iter_mut().enumerate() {
            // Best-effort ordering: anything stamped at or before this
            // sample applies now.
            while next_event < events.len() && events[next_event].frame as usize <= index {
                self.handle_event(&events[next_event].message);
                next_event += 1;
            }
            *sample = if self.note_held {
                self.render_sample(&controls)
            } else {
                0.0
            };
        }
        // Events stamped past the block end still take effect before the
        // next block starts.
        for event in &events[next_event..] {
            self.handle_event(&event.message);
        }

        self.display
            .current_step
            .store(self.current_step, Ordering::Relaxed);
        self.display.note_held.store(self.note_held, Ordering::Relaxed);
        self.display.bpm.store(ctx.effective_bpm() as f32);
    }

    fn save_state(&self) -> Vec<u8> {
        SeqPreset::capture(&self.params).to_json()
    }

    fn load_state(&mut self, bytes: &[u8]) {
        SeqPreset::from_json(bytes).apply(&self.params);
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48000.0;

    fn engine_with(configure: impl FnOnce(&SeqParams)) -> StepSequencer {
        let params = Arc::new(SeqParams::default());
        configure(&params);
        let mut seq = StepSequencer::new(params);
        seq.prepare(SR, 512);
        seq
    }

    fn run(seq: &mut StepSequencer, events: &[MidiEvent], frames: usize) -> Vec<f32> {
        let mut audio = vec![0.0f32; frames];
        let mut midi_out = BlockEvents::new();
        let ctx = BlockContext::new(SR);
        seq.process(&ctx, events, &mut audio, &mut midi_out);
        audio
    }

    fn note_on(frame: u32, note: u8) -> MidiEvent {
        MidiEvent::new(frame, MidiMessage::note_on(note, 100))
    }

    fn note_off(frame: u32, note: u8) -> MidiEvent {
        MidiEvent::new(frame, MidiMessage::note_off(note))
    }

    #[test]
    fn silent_when_no_note_held() {
        let mut seq = engine_with(|_| {});
        let audio = run(&mut seq, &[], 512);
        assert!(audio.iter().all(|s| *s == 0.0));
        assert_eq!(seq.display.current_step(), -1);
    }

    #[test]
    fn note_on_triggers_step_zero_immediately() {
        let mut seq = engine_with(|_| {});
        let audio = run(&mut seq, &[note_on(0, 60)], 64);
        assert_eq!(seq.display.current_step(), 0);
        assert!(seq.display.note_held());
        // Gate opens at sample 0; the saw starts at -0.3.
        assert!(audio[0] != 0.0);
    }

    #[test]
    fn gate_scenario_at_48k() {
        // 250 ms steps = 12000 samples, gate 0.5 => open [0, 6000).
        let mut seq = engine_with(|p| {
            p.set_rate_ms(250.0);
            p.set_gate(0.5);
        });
        let audio = run(&mut seq, &[note_on(0, 60)], 12000);
        assert!(audio[..6000].iter().any(|s| *s != 0.0));
        assert!(audio[6000..].iter().all(|s| *s == 0.0));
        assert_eq!(seq.current_step, 0);

        // The step advances exactly at sample 12000.
        let _ = run(&mut seq, &[], 1);
        assert_eq!(seq.current_step, 1);
    }

    #[test]
    fn note_off_mid_block_silences_rest_of_block() {
        let mut seq = engine_with(|p| p.set_gate(1.0));
        let audio = run(&mut seq, &[note_on(0, 60), note_off(100, 60)], 512);
        assert!(audio[..100].iter().any(|s| *s != 0.0));
        assert!(audio[100..].iter().all(|s| *s == 0.0));
        assert!(!seq.display.note_held());
    }

    #[test]
    fn retrigger_resets_to_step_zero() {
        let mut seq = engine_with(|p| p.set_rate_ms(10.0)); // 480-sample steps
        let _ = run(&mut seq, &[note_on(0, 60)], 2000);
        assert_eq!(seq.display.current_step(), 4);

        let _ = run(&mut seq, &[note_on(0, 64)], 1);
        assert_eq!(seq.display.current_step(), 0);
        assert_eq!(seq.base_note, 64);
    }

    #[test]
    fn step_index_wraps_mod_8() {
        let mut seq = engine_with(|p| p.set_rate_ms(10.0)); // 480-sample steps
        let _ = run(&mut seq, &[note_on(0, 60)], 1);
        let mut last = seq.current_step;
        for _ in 0..40 {
            let _ = run(&mut seq, &[], 480);
            let step = seq.current_step;
            assert_eq!(step, (last + 1) % 8);
            last = step;
        }
    }

    #[test]
    fn timers_freeze_while_no_note_is_held() {
        let mut seq = engine_with(|p| p.set_rate_ms(10.0));
        let _ = run(&mut seq, &[note_on(0, 60), note_off(10, 60)], 100);
        let step = seq.current_step;
        let remaining = seq.samples_until_step;
        let _ = run(&mut seq, &[], 48000);
        assert_eq!(seq.current_step, step);
        assert_eq!(seq.samples_until_step, remaining);
    }

    #[test]
    fn gate_above_one_never_closes_between_steps() {
        // Gate 1.25 outlasts the 480-sample step, so each advance reopens
        // the gate before it can close.
        let mut seq = engine_with(|p| {
            p.set_rate_ms(10.0);
            p.set_gate(1.25);
        });
        let audio = run(&mut seq, &[note_on(0, 60)], 4800); // ten steps
        assert!(seq.gate_open);

        // The saw itself may cross zero, but the gate never mutes a run of
        // samples.
        let mut zero_run = 0usize;
        let mut longest = 0usize;
        for sample in &audio {
            if *sample == 0.0 {
                zero_run += 1;
                longest = longest.max(zero_run);
            } else {
                zero_run = 0;
            }
        }
        assert!(longest <= 1, "gate closed for {} samples", longest);
    }

    #[test]
    fn glide_disabled_snaps_on_step_advance() {
        let mut seq = engine_with(|p| {
            p.set_rate_ms(10.0);
            p.set_step(1, 12.0);
        });
        let _ = run(&mut seq, &[note_on(0, 60)], 1);
        let first = seq.current_hz;
        let _ = run(&mut seq, &[], 480); // into step 1
        assert_eq!(seq.current_hz, seq.target_hz);
        assert!((seq.current_hz - first * 2.0).abs() < 1e-2);
    }

    #[test]
    fn glide_reaches_target_within_configured_window() {
        // 100 ms glide at 48 kHz = 4800 samples; 500 ms steps.
        let mut seq = engine_with(|p| {
            p.set_rate_ms(500.0);
            p.set_step(1, 12.0);
            p.set_glide_enabled(true);
            p.set_glide_time_ms(100.0);
        });
        let _ = run(&mut seq, &[note_on(0, 60)], 24000); // step 0 complete
        let _ = run(&mut seq, &[], 1); // step 1 triggers, glide begins
        let target = seq.target_hz;
        assert_ne!(seq.current_hz, target);

        // Halfway through the window the ramp is still in flight.
        let _ = run(&mut seq, &[], 2400);
        assert_ne!(seq.current_hz, target);

        // By the end of the window (plus rounding slack) it has snapped.
        let _ = run(&mut seq, &[], 2403);
        assert_eq!(seq.current_hz, target);
    }

    #[test]
    fn unsorted_events_are_tolerated() {
        let mut seq = engine_with(|_| {});
        // Off stamped before on, out of order; both apply, last wins.
        let audio = run(&mut seq, &[note_off(50, 60), note_on(10, 60)], 512);
        assert!(seq.display.note_held());
        assert!(audio[10..].iter().any(|s| *s != 0.0));
    }

    #[test]
    fn load_state_resets_runtime_but_keeps_parameters() {
        let mut seq = engine_with(|p| p.set_rate_ms(10.0));
        let _ = run(&mut seq, &[note_on(0, 60)], 2000);
        let saved = seq.save_state();
        assert!(seq.current_step > 0);

        seq.load_state(&saved);
        assert_eq!(seq.current_step, -1);
        assert_eq!(seq.phase, 0.0);
        assert_eq!(seq.params.controls().rate_ms, 10.0);
    }

    #[test]
    fn mono_only_layout() {
        let seq = engine_with(|_| {});
        assert!(seq.supports_channels(1));
        assert!(!seq.supports_channels(2));
    }
}
