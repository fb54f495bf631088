//! `EngineConfig`: the one mutable, persisted surface. Round-trips through
//! `serde_json` without ever failing — a missing or malformed field falls
//! back to its own default rather than rejecting the whole blob.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::audio_frontend::{MAX_GAIN, MIN_GAIN};
use crate::error::EngineError;

pub const DEFAULT_RMS_THRESHOLD: f32 = 5e-4;
/// Permissive fallback clarity threshold used before any calibration has run.
pub const DEFAULT_CLARITY_THRESHOLD: f32 = 0.01;
/// Stricter profile a successful note-calibration pass moves the config to.
pub const CALIBRATED_CLARITY_THRESHOLD_MAX: f32 = 0.3;
pub const DEFAULT_HOLD_DURATION_MS: u32 = 100;
pub const DEFAULT_GAIN: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub rms_threshold: f32,
    pub clarity_threshold: f32,
    pub hold_duration_ms: u32,
    pub gain: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rms_threshold: DEFAULT_RMS_THRESHOLD,
            clarity_threshold: DEFAULT_CLARITY_THRESHOLD,
            hold_duration_ms: DEFAULT_HOLD_DURATION_MS,
            gain: DEFAULT_GAIN,
        }
    }
}

impl EngineConfig {
    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Never fails. A blob that isn't a JSON object yields
    /// `EngineConfig::default()` alongside a `ConfigLoadFailed`; otherwise
    /// every field is recovered independently, falling back to its default
    /// if absent or the wrong JSON type.
    pub fn from_json_value(value: &Value) -> (Self, Option<EngineError>) {
        let Some(obj) = value.as_object() else {
            let message = "persisted config was not a JSON object".to_string();
            log::warn!("config load failed: {message}");
            return (Self::default(), Some(EngineError::ConfigLoadFailed(message)));
        };

        let defaults = Self::default();
        let config = Self {
            rms_threshold: field_f32(obj, "rmsThreshold").unwrap_or(defaults.rms_threshold),
            clarity_threshold: field_f32(obj, "clarityThreshold").unwrap_or(defaults.clarity_threshold),
            hold_duration_ms: field_u32(obj, "holdDurationMs").unwrap_or(defaults.hold_duration_ms),
            gain: field_f32(obj, "gain")
                .map(|g| g.clamp(MIN_GAIN, MAX_GAIN))
                .unwrap_or(defaults.gain),
        };
        (config, None)
    }
}

fn field_f32(obj: &Map<String, Value>, key: &str) -> Option<f32> {
    obj.get(key)?.as_f64().map(|v| v as f32)
}

fn field_u32(obj: &Map<String, Value>, key: &str) -> Option<u32> {
    obj.get(key)?.as_u64().map(|v| v as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_a_full_config() {
        let config = EngineConfig {
            rms_threshold: 0.002,
            clarity_threshold: 0.2,
            hold_duration_ms: 150,
            gain: 2.0,
        };
        let (back, error) = EngineConfig::from_json_value(&config.to_json_value());
        assert!(error.is_none());
        assert_eq!(back, config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let (config, error) = EngineConfig::from_json_value(&json!({ "gain": 2.5 }));
        assert!(error.is_none());
        assert_eq!(config.gain, 2.5);
        assert_eq!(config.rms_threshold, DEFAULT_RMS_THRESHOLD);
        assert_eq!(config.clarity_threshold, DEFAULT_CLARITY_THRESHOLD);
        assert_eq!(config.hold_duration_ms, DEFAULT_HOLD_DURATION_MS);
    }

    #[test]
    fn wrong_typed_field_falls_back_without_rejecting_the_rest() {
        let (config, error) =
            EngineConfig::from_json_value(&json!({ "rmsThreshold": "not a number", "gain": 3.0 }));
        assert!(error.is_none());
        assert_eq!(config.rms_threshold, DEFAULT_RMS_THRESHOLD);
        assert_eq!(config.gain, 3.0);
    }

    #[test]
    fn non_object_blob_yields_all_defaults_and_an_error() {
        let (config, error) = EngineConfig::from_json_value(&json!("not an object"));
        assert_eq!(config, EngineConfig::default());
        assert!(matches!(error, Some(EngineError::ConfigLoadFailed(_))));
    }

    #[test]
    fn gain_is_clamped_on_load() {
        let (config, _) = EngineConfig::from_json_value(&json!({ "gain": 100.0 }));
        assert_eq!(config.gain, MAX_GAIN);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let (config, error) = EngineConfig::from_json_value(&json!({ "somethingElse": 1, "gain": 1.0 }));
        assert!(error.is_none());
        assert_eq!(config.gain, 1.0);
    }
}
