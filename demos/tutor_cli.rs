// Manual smoke-test harness: feeds synthetic sine-wave frames through the
// engine and tutor and prints what comes out. Not part of the public API;
// exists to eyeball pipeline behavior without a real microphone.
#![allow(clippy::print_stdout)]

use std::time::{Duration, Instant};

use lyrehero_core::song::{Difficulty, NoteEvent, Song};
use lyrehero_core::{note_table, Engine, Tutor, TutorState};

const SAMPLE_RATE: u32 = 48_000;
const CHUNK_SAMPLES: usize = 1024;

fn sine_chunk(frequency: f32, phase_offset: usize) -> Vec<f32> {
    (0..CHUNK_SAMPLES)
        .map(|i| {
            let t = (i + phase_offset) as f32 / SAMPLE_RATE as f32;
            0.2 * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

fn demo_song() -> Song {
    let note = |name: &str| NoteEvent {
        note: name.to_string(),
        bass_note: None,
        lyric: None,
        duration: None,
    };
    Song {
        title: "Smoke Test".into(),
        artist: None,
        difficulty: Difficulty::Easy,
        notes: vec![note("C4"), note("D4"), note("E4")],
    }
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let song = demo_song();
    let mut engine = Engine::new(SAMPLE_RATE);
    let mut tutor = Tutor::new(song.clone());

    engine.start();
    tutor.start();

    println!("lyrehero-demo: feeding {} notes through the pipeline", song.notes.len());

    let mut phase_offset = 0usize;
    for note_event in &song.notes {
        let frequency = note_table::note_frequency(&note_event.note).unwrap_or(0.0);
        println!("\n-- target {} ({:.2} Hz) --", note_event.note, frequency);

        let now_base = Instant::now();
        for frame_index in 0u64..40 {
            let chunk = sine_chunk(frequency, phase_offset);
            phase_offset += CHUNK_SAMPLES;
            engine.push_samples(&chunk);

            let Some(frame) = engine.detect_pitch() else {
                continue;
            };
            let now = now_base + Duration::from_millis(frame_index * 16);
            tutor.tick(Some(frame.note.as_str()).filter(|n| !n.is_empty()), engine.hold_duration_ms(), now);

            println!(
                "  frame {frame_index:02}: note={:<3} freq={:7.2} clarity={:.2} volume={:.4} progress={:.2}",
                frame.note,
                frame.frequency,
                frame.clarity,
                frame.volume,
                tutor.progress(),
            );

            if tutor.state() == TutorState::Finished {
                break;
            }
        }

        if tutor.state() == TutorState::Finished {
            break;
        }
    }

    println!("\nfinal tutor state: {:?}, index={}", tutor.state(), tutor.current_index());
}
