//! Adaptive ambient-noise floor: a bounded ring of recent quiet-frame RMS
//! readings, whose median raises the classifier's effective gate above
//! whatever the room actually sounds like.

use std::collections::VecDeque;

/// Ring capacity; large enough to average out short bursts without reacting
/// to a single loud frame, small enough to track a room's noise changing.
pub const WINDOW: usize = 50;
const MIN_SAMPLES_BEFORE_GATING: usize = 10;
const APPEND_RATIO: f32 = 3.0;
const GATE_RATIO: f32 = 2.0;
const DEFAULT_FLOOR: f32 = 0.001;

pub struct NoiseFloor {
    samples: VecDeque<f32>,
    floor: f32,
}

impl NoiseFloor {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(WINDOW),
            floor: DEFAULT_FLOOR,
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.floor = DEFAULT_FLOOR;
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    /// Feeds one frame's RMS in. Only frames that look like ambience (quiet
    /// relative to the current floor, or while still warming up) are folded
    /// into the estimate, so a sustained loud note doesn't drag the floor up.
    pub fn update(&mut self, rms: f32) {
        let warming_up = self.samples.len() < MIN_SAMPLES_BEFORE_GATING;
        if warming_up || rms < APPEND_RATIO * self.floor {
            if self.samples.len() == WINDOW {
                self.samples.pop_front();
            }
            self.samples.push_back(rms);
        }
        self.floor = median(&self.samples).unwrap_or(DEFAULT_FLOOR);
    }

    /// The RMS gate the classifier should actually use: never below the
    /// configured threshold, but raised if the room is noisier than that.
    pub fn effective_threshold(&self, rms_threshold: f32) -> f32 {
        rms_threshold.max(GATE_RATIO * self.floor)
    }
}

impl Default for NoiseFloor {
    fn default() -> Self {
        Self::new()
    }
}

fn median(samples: &VecDeque<f32>) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted: Vec<f32> = samples.iter().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_default_floor() {
        let floor = NoiseFloor::new();
        assert_eq!(floor.floor(), DEFAULT_FLOOR);
    }

    #[test]
    fn tracks_quiet_ambience() {
        let mut floor = NoiseFloor::new();
        for _ in 0..20 {
            floor.update(0.0002);
        }
        assert!((floor.floor() - 0.0002).abs() < 1e-6);
    }

    #[test]
    fn sustained_loud_signal_does_not_drag_floor_up() {
        let mut floor = NoiseFloor::new();
        for _ in 0..20 {
            floor.update(0.0002);
        }
        let before = floor.floor();
        for _ in 0..100 {
            floor.update(0.5);
        }
        assert_eq!(floor.floor(), before);
    }

    #[test]
    fn ring_never_exceeds_window_capacity() {
        let mut floor = NoiseFloor::new();
        for i in 0..500 {
            floor.update(0.0001 * (1.0 + (i % 3) as f32));
        }
        assert!(floor.samples.len() <= WINDOW);
    }

    #[test]
    fn effective_threshold_is_never_below_configured() {
        let floor = NoiseFloor::new();
        assert_eq!(floor.effective_threshold(5e-4), 5e-4);
    }

    #[test]
    fn effective_threshold_rises_with_floor() {
        let mut floor = NoiseFloor::new();
        for _ in 0..20 {
            floor.update(0.01);
        }
        assert!(floor.effective_threshold(5e-4) > 5e-4);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut floor = NoiseFloor::new();
        for _ in 0..20 {
            floor.update(0.01);
        }
        floor.reset();
        assert_eq!(floor.floor(), DEFAULT_FLOOR);
    }
}
