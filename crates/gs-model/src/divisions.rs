//! Musical note-division labels for the sequencer rate knob.
//!
//! The rate parameter the user edits is milliseconds; the tempo is only used
//! to annotate that value with the nearest musical division for display.

/// Tempo assumed whenever the host reports none (or a nonsensical one).
pub const DEFAULT_BPM: f64 = 120.0;

/// A musical note division, in beats relative to a quarter note.
pub struct NoteDivision {
    pub label: &'static str,
    pub beats: f32,
}

/// Note divisions from 1/64 up to one bar, including triplets.
pub const NOTE_DIVISIONS: [NoteDivision; 13] = [
    NoteDivision { label: "1/64", beats: 0.0625 },
    NoteDivision { label: "1/64T", beats: 0.0417 },
    NoteDivision { label: "1/32", beats: 0.125 },
    NoteDivision { label: "1/32T", beats: 0.0833 },
    NoteDivision { label: "1/16", beats: 0.25 },
    NoteDivision { label: "1/16T", beats: 0.1667 },
    NoteDivision { label: "1/8", beats: 0.5 },
    NoteDivision { label: "1/8T", beats: 0.333 },
    NoteDivision { label: "1/4", beats: 1.0 },
    NoteDivision { label: "1/4T", beats: 0.666 },
    NoteDivision { label: "1/2", beats: 2.0 },
    NoteDivision { label: "1/2T", beats: 1.333 },
    NoteDivision { label: "1 bar", beats: 4.0 },
];

/// The division closest to a step length of `ms` at the given tempo.
pub fn nearest_division(ms: f32, bpm: f32) -> &'static NoteDivision {
    let bpm = if bpm > 0.0 { bpm } else { DEFAULT_BPM as f32 };
    let beat_ms = 60_000.0 / bpm;
    let beats = ms / beat_ms;

    let mut closest = &NOTE_DIVISIONS[0];
    let mut min_error = f32::MAX;
    for division in &NOTE_DIVISIONS {
        let error = (division.beats - beats).abs();
        if error < min_error {
            min_error = error;
            closest = division;
        }
    }
    closest
}

/// Format a rate value for display, e.g. `"250.0 ms (1/8)"`.
pub fn musical_label(ms: f32, bpm: f32) -> String {
    format!("{:.1} ms ({})", ms, nearest_division(ms, bpm).label)
}
