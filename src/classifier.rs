//! Fuses the pitch estimate and extracted features into a gating decision,
//! then maps an accepted frequency to the nearest lyre note.

use crate::features::{Features, LYRE_BAND_MAX_HZ, LYRE_BAND_MIN_HZ};
use crate::note_table::LYRE_LOOKUP;

/// Widest cents deviation from a lyre note still accepted as that note.
pub const CENTS_TOLERANCE: f32 = 50.0;
const ZCR_MAX: f32 = 0.3;
const FLATNESS_MAX: f32 = 0.3;

/// Everything the gating cascade needs for one frame's decision.
pub struct ClassifierInput<'a> {
    pub frequency: f32,
    pub clarity: f32,
    pub features: &'a Features,
    pub effective_rms_threshold: f32,
    pub clarity_threshold: f32,
}

/// Runs the full gate cascade and, if it passes, the nearest-note match.
/// Returns `None` (the frame's raw note is empty) unless every gate and the
/// cents tolerance both pass.
pub fn classify(input: &ClassifierInput) -> Option<&'static str> {
    if input.features.rms <= input.effective_rms_threshold {
        return None;
    }
    if input.clarity <= input.clarity_threshold {
        return None;
    }
    if input.features.zcr > ZCR_MAX {
        return None;
    }
    if !(LYRE_BAND_MIN_HZ..=LYRE_BAND_MAX_HZ).contains(&input.frequency) {
        return None;
    }
    if !(input.features.spectral_flatness < FLATNESS_MAX || input.features.harmonic_present) {
        return None;
    }

    let (name, cents) = LYRE_LOOKUP.nearest(input.frequency)?;
    (cents <= CENTS_TOLERANCE).then_some(name)
}
