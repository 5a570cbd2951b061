//! Block-size invariance tests.
//!
//! The sequencer's timing state lives entirely in the engine, so the audio
//! it produces must not depend on how the host slices time into blocks.
//! These tests render the same timeline under different chunkings and
//! require bit-identical output.

use gs_engine::{BlockContext, Processor, StepSequencer};
use gs_model::{BlockEvents, MidiEvent, MidiMessage, SeqParams};
use std::sync::Arc;

const SR: f64 = 48000.0;

fn make_sequencer(configure: impl FnOnce(&SeqParams)) -> StepSequencer {
    let params = Arc::new(SeqParams::default());
    configure(&params);
    let mut seq = StepSequencer::new(params);
    seq.prepare(SR, 8192);
    seq
}

/// Render `total` frames in blocks of `block_len`, delivering each event at
/// its absolute frame offset, and collect the audio plus the step index
/// observed after every block.
fn render_chunked(
    seq: &mut StepSequencer,
    timeline: &[(usize, MidiMessage)],
    total: usize,
    block_len: usize,
) -> (Vec<f32>, Vec<i32>) {
    let display = seq.display();
    let mut audio = vec![0.0f32; total];
    let mut steps = Vec::new();
    let mut midi_out = BlockEvents::new();
    let ctx = BlockContext::new(SR);

    let mut start = 0;
    while start < total {
        let end = (start + block_len).min(total);
        let mut events = BlockEvents::new();
        for (frame, message) in timeline {
            if (start..end).contains(frame) {
                events
                    .push(MidiEvent::new((frame - start) as u32, *message))
                    .unwrap();
            }
        }
        midi_out.clear();
        seq.process(&ctx, &events, &mut audio[start..end], &mut midi_out);
        steps.push(display.current_step());
        start = end;
    }
    (audio, steps)
}

#[test]
fn audio_is_identical_across_chunkings() {
    let timeline = [
        (0usize, MidiMessage::note_on(60, 100)),
        (30000, MidiMessage::note_off(60)),
        (40000, MidiMessage::note_on(67, 90)),
    ];
    let configure = |p: &SeqParams| {
        p.set_rate_ms(50.0);
        p.set_gate(0.8);
        p.set_glide_enabled(true);
        p.set_glide_time_ms(20.0);
        p.set_step(1, 3.0);
        p.set_step(2, -5.0);
        p.set_step(5, 12.0);
    };
    let total = 96000;

    let mut reference = make_sequencer(configure);
    let (ref_audio, _) = render_chunked(&mut reference, &timeline, total, total);

    for block_len in [64usize, 480, 512, 1000, 8192] {
        let mut seq = make_sequencer(configure);
        let (audio, _) = render_chunked(&mut seq, &timeline, total, block_len);
        assert_eq!(audio, ref_audio, "chunking at {} frames diverged", block_len);
    }
}

#[test]
fn step_progression_is_identical_across_chunkings() {
    let timeline = [(0usize, MidiMessage::note_on(48, 100))];
    let configure = |p: &SeqParams| p.set_rate_ms(10.0); // 480-sample steps
    let total = 48000;

    let mut coarse = make_sequencer(configure);
    let (_, coarse_steps) = render_chunked(&mut coarse, &timeline, total, 480);

    let mut fine = make_sequencer(configure);
    let (_, fine_steps) = render_chunked(&mut fine, &timeline, total, 48);

    // Each coarse block covers ten fine blocks and must land on the same
    // step index as the last of them.
    for (index, step) in coarse_steps.iter().enumerate() {
        assert_eq!(*step, fine_steps[index * 10 + 9]);
    }
}

#[test]
fn note_off_at_absolute_offset_silences_from_there() {
    let timeline = [
        (0usize, MidiMessage::note_on(60, 100)),
        (10000, MidiMessage::note_off(60)),
    ];
    let configure = |p: &SeqParams| p.set_gate(1.0);

    let mut seq = make_sequencer(configure);
    let (audio, _) = render_chunked(&mut seq, &timeline, 20000, 512);

    assert!(audio[..10000].iter().any(|s| *s != 0.0));
    assert!(audio[10000..].iter().all(|s| *s == 0.0));
}
