//! Equal-tempered note name <-> frequency conversion and the fixed lyre note set.

use once_cell::sync::Lazy;

/// A4 reference frequency in Hz.
const A4_FREQUENCY: f32 = 440.0;
/// MIDI note number of A4.
const A4_MIDI: i32 = 69;

/// Lowest note covered by the full note table (C3).
const TABLE_MIN_MIDI: i32 = 48;
/// Highest note covered by the full note table (D6).
const TABLE_MAX_MIDI: i32 = 86;

/// The 19 diatonic lyre strings, low to high. No sharps or flats.
pub const LYRE_SET: [&str; 19] = [
    "F3", "G3", "A3", "B3", "C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5", "D5", "E5", "F5",
    "G5", "A5", "B5", "C6",
];

fn base_semitone(letter: char) -> Option<i32> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Parses a note name of the form `<letter><optional accidental><octave>`, e.g. `"C4"`,
/// `"F#3"`, `"Bb5"`. Returns the MIDI note number.
fn note_name_to_midi(name: &str) -> Option<i32> {
    let mut chars = name.chars();
    let letter = chars.next()?;
    let base = base_semitone(letter)?;

    let rest: String = chars.collect();
    let (accidental, octave_str) = match rest.strip_prefix('#') {
        Some(r) => (1, r),
        None => match rest.strip_prefix('b') {
            Some(r) => (-1, r),
            None => (0, rest.as_str()),
        },
    };

    let octave: i32 = octave_str.parse().ok()?;
    Some((octave * 12) + base + accidental + 12)
}

/// Looks up the equal-tempered frequency of a note name, for names within C3..D6.
pub fn note_frequency(name: &str) -> Option<f32> {
    let midi = note_name_to_midi(name)?;
    if !(TABLE_MIN_MIDI..=TABLE_MAX_MIDI).contains(&midi) {
        return None;
    }
    let semitones_from_a4 = (midi - A4_MIDI) as f32;
    Some(A4_FREQUENCY * (semitones_from_a4 / 12.0).exp2())
}

/// Cents distance between two frequencies. Always non-negative.
pub fn cents_distance(a: f32, b: f32) -> f32 {
    (1200.0 * (a / b).log2()).abs()
}

/// Binary-search-free nearest-neighbor lookup restricted to the 19-entry lyre set.
pub struct LyreLookup {
    table: Vec<(&'static str, f32)>,
}

impl LyreLookup {
    fn new() -> Self {
        let mut table: Vec<(&'static str, f32)> = LYRE_SET
            .iter()
            .filter_map(|&name| note_frequency(name).map(|freq| (name, freq)))
            .collect();
        table.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        Self { table }
    }

    /// Returns the nearest lyre note name and the cents distance to it.
    pub fn nearest(&self, frequency: f32) -> Option<(&'static str, f32)> {
        self.table
            .iter()
            .map(|&(name, freq)| (name, cents_distance(frequency, freq)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }
}

pub static LYRE_LOOKUP: Lazy<LyreLookup> = Lazy::new(LyreLookup::new);
