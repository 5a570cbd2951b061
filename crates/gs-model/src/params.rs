//! Control-plane parameter cells.
//!
//! Parameters are owned by the control thread; the realtime thread reads them
//! exactly once per block through `controls()`, which returns a plain snapshot
//! with every value clamped to its legal range. Out-of-range or non-finite
//! values are clamped at the point of read, never rejected — the audio
//! callback has no way to surface an error.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// f32 stored as its bit pattern in an `AtomicU32`.
///
/// Single writer (control thread), any number of readers. Relaxed ordering is
/// enough: each cell is an independent scalar with no cross-cell invariants.
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Number of sequencer steps.
pub const NUM_STEPS: usize = 8;

/// Step pitch offset range, in semitones.
pub const STEP_SEMITONES: f32 = 12.0;

/// Step rate range in milliseconds.
pub const RATE_MS_MIN: f32 = 10.0;
pub const RATE_MS_MAX: f32 = 500.0;

/// Gate fraction range. Values above 1.0 let the gate overlap the next step.
pub const GATE_MIN: f32 = 0.01;
pub const GATE_MAX: f32 = 1.25;

/// Glide time range in milliseconds.
pub const GLIDE_MS_MIN: f32 = 1.0;
pub const GLIDE_MS_MAX: f32 = 1000.0;

/// Output velocity bounds for the remap curve.
pub const VELOCITY_MIN: u8 = 1;
pub const VELOCITY_MAX: u8 = 127;

/// Velocity curve exponent range.
pub const CURVE_EXP_MIN: f32 = 0.01;
pub const CURVE_EXP_MAX: f32 = 10.0;

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Sequencer parameters, one atomic cell each.
pub struct SeqParams {
    steps: [AtomicF32; NUM_STEPS],
    rate_ms: AtomicF32,
    gate: AtomicF32,
    glide_enabled: AtomicBool,
    glide_time_ms: AtomicF32,
}

impl SeqParams {
    pub fn set_step(&self, index: usize, semitones: f32) {
        if let Some(cell) = self.steps.get(index) {
            cell.store(semitones);
        }
    }

    pub fn set_rate_ms(&self, ms: f32) {
        self.rate_ms.store(ms);
    }

    pub fn set_gate(&self, fraction: f32) {
        self.gate.store(fraction);
    }

    pub fn set_glide_enabled(&self, enabled: bool) {
        self.glide_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn set_glide_time_ms(&self, ms: f32) {
        self.glide_time_ms.store(ms);
    }

    /// Clamped snapshot for one block of processing.
    pub fn controls(&self) -> SeqControls {
        let mut steps = [0.0f32; NUM_STEPS];
        for (value, cell) in steps.iter_mut().zip(&self.steps) {
            *value = clamp_finite(cell.load(), -STEP_SEMITONES, STEP_SEMITONES, 0.0);
        }
        SeqControls {
            steps,
            rate_ms: clamp_finite(self.rate_ms.load(), RATE_MS_MIN, RATE_MS_MAX, 100.0),
            gate: clamp_finite(self.gate.load(), GATE_MIN, GATE_MAX, 0.5),
            glide_enabled: self.glide_enabled.load(Ordering::Relaxed),
            glide_time_ms: clamp_finite(self.glide_time_ms.load(), GLIDE_MS_MIN, GLIDE_MS_MAX, 50.0),
        }
    }
}

impl Default for SeqParams {
    fn default() -> Self {
        Self {
            steps: std::array::from_fn(|_| AtomicF32::new(0.0)),
            rate_ms: AtomicF32::new(100.0),
            gate: AtomicF32::new(0.5),
            glide_enabled: AtomicBool::new(false),
            glide_time_ms: AtomicF32::new(50.0),
        }
    }
}

/// Plain per-block snapshot of the sequencer parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeqControls {
    pub steps: [f32; NUM_STEPS],
    pub rate_ms: f32,
    pub gate: f32,
    pub glide_enabled: bool,
    pub glide_time_ms: f32,
}

/// Velocity remap parameters, one atomic cell each.
pub struct RemapParams {
    min_velocity: AtomicU32,
    max_velocity: AtomicU32,
    curve_exponent: AtomicF32,
    bypass: AtomicBool,
}

impl RemapParams {
    pub fn set_min_velocity(&self, velocity: u8) {
        self.min_velocity.store(velocity as u32, Ordering::Relaxed);
    }

    pub fn set_max_velocity(&self, velocity: u8) {
        self.max_velocity.store(velocity as u32, Ordering::Relaxed);
    }

    pub fn set_curve_exponent(&self, exponent: f32) {
        self.curve_exponent.store(exponent);
    }

    pub fn set_bypass(&self, bypass: bool) {
        self.bypass.store(bypass, Ordering::Relaxed);
    }

    /// Clamped snapshot for one block of processing.
    pub fn controls(&self) -> RemapControls {
        let clamp_vel = |raw: u32| -> u8 {
            raw.clamp(VELOCITY_MIN as u32, VELOCITY_MAX as u32) as u8
        };
        RemapControls {
            min_velocity: clamp_vel(self.min_velocity.load(Ordering::Relaxed)),
            max_velocity: clamp_vel(self.max_velocity.load(Ordering::Relaxed)),
            curve_exponent: clamp_finite(self.curve_exponent.load(), CURVE_EXP_MIN, CURVE_EXP_MAX, 1.0),
            bypass: self.bypass.load(Ordering::Relaxed),
        }
    }
}

impl Default for RemapParams {
    fn default() -> Self {
        Self {
            min_velocity: AtomicU32::new(VELOCITY_MIN as u32),
            max_velocity: AtomicU32::new(VELOCITY_MAX as u32),
            curve_exponent: AtomicF32::new(1.0),
            bypass: AtomicBool::new(false),
        }
    }
}

/// Plain per-block snapshot of the remap parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RemapControls {
    pub min_velocity: u8,
    pub max_velocity: u8,
    pub curve_exponent: f32,
    pub bypass: bool,
}
