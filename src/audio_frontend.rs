//! Filter chain, gain stage, rolling analysis window and magnitude spectrum.
//!
//! This does not touch a capture device: the host pushes already-captured mono
//! samples in via [`AudioFrontEnd::push_samples`]. Device access, permissions
//! and echo-cancellation configuration are the host's responsibility.

use std::collections::VecDeque;
use std::sync::Mutex;

use num_complex::Complex;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use rustfft::FftPlanner;

use crate::biquad::Biquad;

/// Size of the rolling time-domain analysis window, and the FFT size.
pub const FFT_SIZE: usize = 8192;
/// Length of the magnitude spectrum (half the FFT size).
pub const SPECTRUM_LEN: usize = FFT_SIZE / 2;

pub(crate) const MIN_GAIN: f32 = 0.5;
pub(crate) const MAX_GAIN: f32 = 5.0;
const DEFAULT_GAIN: f32 = 1.5;

const HIGH_PASS_HZ: f32 = 150.0;
const LOW_PASS_HZ: f32 = 1200.0;
const FILTER_Q: f32 = 0.7;

/// Shared across front-ends: planning an 8192-point FFT repeatedly is expensive,
/// so it is done once and reused.
static FFT_PLANNER: Lazy<Mutex<FftPlanner<f32>>> = Lazy::new(|| Mutex::new(FftPlanner::new()));

fn hann_window(signal: &[f32]) -> Vec<f32> {
    let n_minus_1 = (signal.len() as f32 - 1.0).max(1.0);
    let windowed = |i: usize, sample: f32| {
        let w = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos());
        sample * w
    };

    if signal.len() > 2048 {
        signal
            .par_iter()
            .enumerate()
            .map(|(i, &s)| windowed(i, s))
            .collect()
    } else {
        signal
            .iter()
            .enumerate()
            .map(|(i, &s)| windowed(i, s))
            .collect()
    }
}

pub struct AudioFrontEnd {
    sample_rate: u32,
    gain: f32,
    high_pass: Biquad,
    low_pass: Biquad,
    window: VecDeque<f32>,
    spectrum_db: [f32; SPECTRUM_LEN],
    running: bool,
}

impl AudioFrontEnd {
    pub fn new(sample_rate: u32) -> Self {
        let mut window = VecDeque::with_capacity(FFT_SIZE);
        window.extend(std::iter::repeat(0.0).take(FFT_SIZE));

        Self {
            sample_rate,
            gain: DEFAULT_GAIN,
            high_pass: Biquad::high_pass(sample_rate as f32, HIGH_PASS_HZ, FILTER_Q),
            low_pass: Biquad::low_pass(sample_rate as f32, LOW_PASS_HZ, FILTER_Q),
            window,
            spectrum_db: [0.0; SPECTRUM_LEN],
            running: false,
        }
    }

    /// Idempotent: (re)initializes filter state and the rolling window.
    pub fn start(&mut self) {
        self.high_pass.reset();
        self.low_pass.reset();
        self.window.clear();
        self.window.extend(std::iter::repeat(0.0).take(FFT_SIZE));
        self.spectrum_db = [0.0; SPECTRUM_LEN];
        self.running = true;
    }

    /// Idempotent: clears buffers and filter state, stops accepting samples.
    pub fn stop(&mut self) {
        self.high_pass.reset();
        self.low_pass.reset();
        self.window.clear();
        self.window.extend(std::iter::repeat(0.0).take(FFT_SIZE));
        self.spectrum_db = [0.0; SPECTRUM_LEN];
        self.running = false;
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(MIN_GAIN, MAX_GAIN);
    }

    pub const fn gain(&self) -> f32 {
        self.gain
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Runs pushed samples through the filter+gain chain and appends them to the
    /// rolling analysis window. No-op while stopped.
    pub fn push_samples(&mut self, samples: &[f32]) {
        if !self.running {
            return;
        }
        for &raw in samples {
            let filtered = self.low_pass.process(self.high_pass.process(raw)) * self.gain;
            if self.window.len() == FFT_SIZE {
                self.window.pop_front();
            }
            self.window.push_back(filtered);
        }
    }

    /// The current rolling time-domain window, oldest sample first.
    pub fn time_window(&mut self) -> &[f32] {
        self.window.make_contiguous()
    }

    /// The most recently computed magnitude spectrum, without recomputing it.
    pub const fn spectrum_db(&self) -> &[f32; SPECTRUM_LEN] {
        &self.spectrum_db
    }

    /// Recomputes the magnitude spectrum (in dB) of the current window and returns it.
    pub fn magnitude_spectrum_db(&mut self) -> &[f32; SPECTRUM_LEN] {
        let windowed = hann_window(self.window.make_contiguous());

        let mut buffer: Vec<Complex<f32>> =
            windowed.iter().map(|&s| Complex { re: s, im: 0.0 }).collect();

        let fft = {
            let mut planner = FFT_PLANNER.lock().unwrap_or_else(|e| e.into_inner());
            planner.plan_fft_forward(FFT_SIZE)
        };
        fft.process(&mut buffer);

        let scale = FFT_SIZE as f32;
        for (i, bin) in self.spectrum_db.iter_mut().enumerate() {
            let magnitude = buffer[i].norm() / scale;
            *bin = 20.0 * magnitude.max(1e-12).log10();
        }

        &self.spectrum_db
    }
}
