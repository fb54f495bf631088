//! Real-time monophonic pitch detection and note-tracking core for a
//! diatonic lyre-harp instrument tutor.
//!
//! This crate has no device or network surface: a host pushes captured
//! mono `f32` samples in via [`Engine::push_samples`] and pulls a resolved
//! [`DetectionFrame`] once per display frame via [`Engine::detect_pitch`].
//! Everything else — song progression, calibration, persisted config — is
//! built on top of that single pipeline.

pub mod audio_frontend;
pub mod biquad;
pub mod calibration;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod noise_floor;
pub mod note_table;
pub mod pitch;
pub mod smoother;
pub mod song;
pub mod tutor;

pub use config::EngineConfig;
pub use engine::{DetectionFrame, Engine};
pub use error::EngineError;
pub use note_table::LYRE_SET;
pub use song::{Difficulty, NoteEvent, Song};
pub use tutor::{Tutor, TutorState};
