//! Song data model: the host hands these in as JSON, no bespoke parser needed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Note durations the song format recognizes. Presentation-only: detection
/// only ever matches against `NoteEvent::note`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duration {
    #[serde(rename = "1")]
    Whole,
    #[serde(rename = "1/2")]
    Half,
    #[serde(rename = "1/4")]
    Quarter,
    #[serde(rename = "1/8")]
    Eighth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    /// Note name to match against detection, e.g. `"C4"`.
    pub note: String,
    /// Accompaniment note, displayed only, never matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bass_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    pub difficulty: Difficulty,
    pub notes: Vec<NoteEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_round_trips_through_json() {
        let song = Song {
            title: "Twinkle".into(),
            artist: Some("Traditional".into()),
            difficulty: Difficulty::Easy,
            notes: vec![
                NoteEvent {
                    note: "C4".into(),
                    bass_note: Some("C3".into()),
                    lyric: Some("Twin-".into()),
                    duration: Some(Duration::Quarter),
                },
                NoteEvent {
                    note: "C4".into(),
                    bass_note: None,
                    lyric: None,
                    duration: None,
                },
            ],
        };

        let json = serde_json::to_value(&song).unwrap();
        let back: Song = serde_json::from_value(json).unwrap();
        assert_eq!(back.title, song.title);
        assert_eq!(back.notes.len(), 2);
        assert_eq!(back.notes[0].note, "C4");
        assert_eq!(back.notes[0].bass_note.as_deref(), Some("C3"));
    }

    #[test]
    fn minimal_note_event_needs_only_note_field() {
        let json = serde_json::json!({ "note": "D4" });
        let event: NoteEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.note, "D4");
        assert!(event.bass_note.is_none());
        assert!(event.duration.is_none());
    }
}
