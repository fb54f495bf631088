//! Top-level `Engine`: wires the front-end, pitch estimator, feature
//! extractor, noise floor, gating classifier and temporal smoother into the
//! single synchronous pull API a host drives once per frame.

use serde::Serialize;

use crate::audio_frontend::{AudioFrontEnd, SPECTRUM_LEN};
use crate::calibration::{self, NoiseCalibration};
use crate::classifier::{self, ClassifierInput};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::features;
use crate::noise_floor::NoiseFloor;
use crate::pitch;
use crate::smoother::TemporalSmoother;

/// One frame's fully resolved output: either a lyre-set note name, or empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionFrame {
    pub note: String,
    pub frequency: f32,
    pub clarity: f32,
    pub volume: f32,
}

pub struct Engine {
    pub rms_threshold: f32,
    pub clarity_threshold: f32,
    hold_duration_ms: u32,
    sample_rate: u32,
    front_end: AudioFrontEnd,
    noise_floor: NoiseFloor,
    smoother: TemporalSmoother,
    noise_calibration: Option<NoiseCalibration>,
    note_calibration_saved: Option<(f32, f32)>,
}

impl Engine {
    pub fn new(sample_rate: u32) -> Self {
        let config = EngineConfig::default();
        Self {
            rms_threshold: config.rms_threshold,
            clarity_threshold: config.clarity_threshold,
            hold_duration_ms: config.hold_duration_ms,
            sample_rate,
            front_end: AudioFrontEnd::new(sample_rate),
            noise_floor: NoiseFloor::new(),
            smoother: TemporalSmoother::new(),
            noise_calibration: None,
            note_calibration_saved: None,
        }
    }

    pub fn hold_duration_ms(&self) -> u32 {
        self.hold_duration_ms
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            rms_threshold: self.rms_threshold,
            clarity_threshold: self.clarity_threshold,
            hold_duration_ms: self.hold_duration_ms,
            gain: self.front_end.gain(),
        }
    }

    pub fn apply_config(&mut self, config: EngineConfig) {
        self.rms_threshold = config.rms_threshold;
        self.clarity_threshold = config.clarity_threshold;
        self.hold_duration_ms = config.hold_duration_ms;
        self.front_end.set_gain(config.gain);
    }

    /// Idempotent, infallible: the front-end has no device of its own to fail on.
    pub fn start(&mut self) {
        self.front_end.start();
    }

    /// Idempotent: releases DSP resources and resets histories and the noise
    /// floor to its default.
    pub fn stop(&mut self) {
        self.front_end.stop();
        self.noise_floor.reset();
        self.smoother.reset();
    }

    /// Called by the host when its own capture device layer fails. Stops the
    /// front-end and hands back the error the host should surface.
    pub fn report_capture_unavailable(&mut self) -> EngineError {
        log::error!("capture unavailable, stopping front-end");
        self.front_end.stop();
        EngineError::CaptureUnavailable
    }

    pub fn push_samples(&mut self, samples: &[f32]) {
        self.front_end.push_samples(samples);
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.front_end.set_gain(gain);
    }

    pub fn spectrum_snapshot(&self) -> &[f32; SPECTRUM_LEN] {
        self.front_end.spectrum_db()
    }

    /// Runs the full pipeline on the current window. `None` if the front-end
    /// isn't running yet.
    pub fn detect_pitch(&mut self) -> Option<DetectionFrame> {
        if !self.front_end.is_running() {
            return None;
        }

        let start = std::time::Instant::now();

        let window: Vec<f32> = self.front_end.time_window().to_vec();
        let spectrum = *self.front_end.magnitude_spectrum_db();

        let estimate = pitch::estimate_pitch(&window, self.sample_rate);
        let extracted = features::extract(&window, &spectrum, self.sample_rate, estimate.frequency);

        self.noise_floor.update(extracted.rms);
        let effective_rms_threshold = self.noise_floor.effective_threshold(self.rms_threshold);

        let raw_note = classifier::classify(&ClassifierInput {
            frequency: estimate.frequency,
            clarity: estimate.clarity,
            features: &extracted,
            effective_rms_threshold,
            clarity_threshold: self.clarity_threshold,
        });

        self.smoother.push(raw_note, estimate.frequency);
        let stable_note = self.smoother.stable_note();
        let stable_frequency = self.smoother.stable_frequency();

        // This frame's own rejection always wins: a sustained note that just
        // dropped into silence must not keep reporting its stable note on the
        // very frame that went quiet, even if the smoothing window still has
        // a majority of votes for it.
        let emitted_note = raw_note.and(stable_note);

        log::debug!(
            "detect_pitch: raw={:?} stable={:?} emitted={:?} clarity={:.3} rms={:.5} noise_floor={:.5} elapsed={:?}",
            raw_note,
            stable_note,
            emitted_note,
            estimate.clarity,
            extracted.rms,
            self.noise_floor.floor(),
            start.elapsed(),
        );

        Some(DetectionFrame {
            note: emitted_note.unwrap_or("").to_string(),
            frequency: stable_frequency,
            clarity: estimate.clarity,
            volume: extracted.rms,
        })
    }

    pub fn begin_noise_calibration(&mut self) {
        log::info!("noise calibration started");
        self.noise_calibration = Some(NoiseCalibration::new());
    }

    /// Feeds the current frame's RMS into the in-progress noise calibration.
    /// No-op if a noise calibration isn't running.
    pub fn sample_noise_calibration(&mut self, rms: f32) {
        if let Some(calibration) = self.noise_calibration.as_mut() {
            calibration.sample(rms);
        }
    }

    pub fn end_noise_calibration(&mut self) {
        if let Some(calibration) = self.noise_calibration.take() {
            self.rms_threshold = calibration.finish();
            log::info!("noise calibration finished, rms_threshold={}", self.rms_threshold);
        }
    }

    /// Temporarily relaxes the gates so even a weak note clears them.
    pub fn begin_note_calibration(&mut self) {
        log::info!("note calibration started");
        self.note_calibration_saved = Some((self.rms_threshold, self.clarity_threshold));
        let relaxed = calibration::note_calibration_thresholds();
        self.rms_threshold = relaxed.rms_threshold;
        self.clarity_threshold = relaxed.clarity_threshold;
    }

    /// Concludes note calibration using the last stable clarity observed (if
    /// any), restoring thresholds to the new config on success and to the
    /// pre-calibration values on failure.
    pub fn run_calibration_note_phase(&mut self, stable_clarity: Option<f32>) -> Result<(), EngineError> {
        let saved = self.note_calibration_saved.take();
        match calibration::finish_note_calibration(stable_clarity) {
            Ok(clarity_threshold) => {
                self.clarity_threshold = clarity_threshold;
                if let Some((rms_threshold, _)) = saved {
                    self.rms_threshold = rms_threshold;
                }
                Ok(())
            }
            Err(error) => {
                if let Some((rms_threshold, clarity_threshold)) = saved {
                    self.rms_threshold = rms_threshold;
                    self.clarity_threshold = clarity_threshold;
                }
                Err(error)
            }
        }
    }
}
