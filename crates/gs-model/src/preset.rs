//! Persisted parameter presets.
//!
//! A preset is a flat set of named scalars and booleans, each independently
//! round-trippable. Engine runtime state (step index, phase, gate timers) is
//! never persisted — every session starts with the sequencer reset and the
//! gate closed. Corrupt data fails safe by falling back to defaults.

use serde::{Deserialize, Serialize};

use crate::params::{RemapParams, SeqParams, NUM_STEPS};

/// Sequencer parameter preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeqPreset {
    pub steps: [f32; NUM_STEPS],
    pub rate_ms: f32,
    pub gate: f32,
    pub glide_enabled: bool,
    pub glide_time_ms: f32,
}

impl Default for SeqPreset {
    fn default() -> Self {
        Self {
            steps: [0.0; NUM_STEPS],
            rate_ms: 100.0,
            gate: 0.5,
            glide_enabled: false,
            glide_time_ms: 50.0,
        }
    }
}

impl SeqPreset {
    /// Snapshot the current (clamped) parameter values.
    pub fn capture(params: &SeqParams) -> Self {
        let controls = params.controls();
        Self {
            steps: controls.steps,
            rate_ms: controls.rate_ms,
            gate: controls.gate,
            glide_enabled: controls.glide_enabled,
            glide_time_ms: controls.glide_time_ms,
        }
    }

    /// Write the preset into the live parameter cells.
    pub fn apply(&self, params: &SeqParams) {
        for (index, value) in self.steps.iter().enumerate() {
            params.set_step(index, *value);
        }
        params.set_rate_ms(self.rate_ms);
        params.set_gate(self.gate);
        params.set_glide_enabled(self.glide_enabled);
        params.set_glide_time_ms(self.glide_time_ms);
    }

    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn from_json(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_else(|err| {
            log::warn!("malformed sequencer preset, using defaults: {err}");
            Self::default()
        })
    }
}

/// Velocity remap parameter preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemapPreset {
    pub min_velocity: u8,
    pub max_velocity: u8,
    pub curve_exponent: f32,
    pub bypass: bool,
}

impl Default for RemapPreset {
    fn default() -> Self {
        Self {
            min_velocity: 1,
            max_velocity: 127,
            curve_exponent: 1.0,
            bypass: false,
        }
    }
}

impl RemapPreset {
    pub fn capture(params: &RemapParams) -> Self {
        let controls = params.controls();
        Self {
            min_velocity: controls.min_velocity,
            max_velocity: controls.max_velocity,
            curve_exponent: controls.curve_exponent,
            bypass: controls.bypass,
        }
    }

    pub fn apply(&self, params: &RemapParams) {
        params.set_min_velocity(self.min_velocity);
        params.set_max_velocity(self.max_velocity);
        params.set_curve_exponent(self.curve_exponent);
        params.set_bypass(self.bypass);
    }

    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn from_json(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_else(|err| {
            log::warn!("malformed remap preset, using defaults: {err}");
            Self::default()
        })
    }
}

/// Combined preset covering both engines, as stored on disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub sequencer: SeqPreset,
    pub remap: RemapPreset,
}

impl Preset {
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec_pretty(self).unwrap_or_default()
    }

    pub fn from_json(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_else(|err| {
            log::warn!("malformed preset, using defaults: {err}");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_preset_roundtrips_exactly() {
        let preset = SeqPreset {
            steps: [0.0, 2.0, 3.5, -7.0, 12.0, -12.0, 0.01, 5.0],
            rate_ms: 250.0,
            gate: 0.75,
            glide_enabled: true,
            glide_time_ms: 80.0,
        };
        let reloaded = SeqPreset::from_json(&preset.to_json());
        assert_eq!(reloaded, preset);
    }

    #[test]
    fn remap_preset_roundtrips_exactly() {
        let preset = RemapPreset {
            min_velocity: 10,
            max_velocity: 120,
            curve_exponent: 2.5,
            bypass: true,
        };
        assert_eq!(RemapPreset::from_json(&preset.to_json()), preset);
    }

    #[test]
    fn corrupt_preset_falls_back_to_defaults() {
        assert_eq!(Preset::from_json(b"not json at all"), Preset::default());
        assert_eq!(SeqPreset::from_json(b"{\"rate_ms\": \"oops\"}"), SeqPreset::default());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let preset = SeqPreset::from_json(b"{\"rate_ms\": 200.0}");
        assert_eq!(preset.rate_ms, 200.0);
        assert_eq!(preset.gate, 0.5);
    }

    #[test]
    fn apply_then_capture_is_identity_for_in_range_values() {
        let params = SeqParams::default();
        let preset = SeqPreset {
            steps: [1.0; NUM_STEPS],
            rate_ms: 42.0,
            gate: 1.25,
            glide_enabled: true,
            glide_time_ms: 1000.0,
        };
        preset.apply(&params);
        assert_eq!(SeqPreset::capture(&params), preset);
    }

    #[test]
    fn capture_clamps_out_of_range_values() {
        let params = RemapParams::default();
        RemapPreset {
            min_velocity: 0,
            max_velocity: 200,
            curve_exponent: 99.0,
            bypass: false,
        }
        .apply(&params);
        let captured = RemapPreset::capture(&params);
        assert_eq!(captured.min_velocity, 1);
        assert_eq!(captured.max_velocity, 127);
        assert_eq!(captured.curve_exponent, 10.0);
    }
}
