//! The crate's one closed error enum. Numeric edge cases never surface here —
//! they're absorbed locally by the module that hits them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("audio capture unavailable: the host's device layer reported a failure")]
    CaptureUnavailable,
    #[error("config load failed, falling back to defaults: {0}")]
    ConfigLoadFailed(String),
    #[error("calibration failed: no note was detected during the sampling window")]
    CalibrationFailedNoNote,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable_strings() {
        assert_eq!(
            EngineError::CaptureUnavailable.to_string(),
            "audio capture unavailable: the host's device layer reported a failure"
        );
        assert_eq!(
            EngineError::CalibrationFailedNoNote.to_string(),
            "calibration failed: no note was detected during the sampling window"
        );
        assert!(EngineError::ConfigLoadFailed("bad json".into())
            .to_string()
            .contains("bad json"));
    }
}
