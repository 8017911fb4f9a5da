//! Listener taste profile inferred from local play history.
//!
//! The mirrors expose no audio features, so the vector is derived from
//! textual evidence in the history entries. Recomputed on every read; never
//! persisted on its own.

use serde::{Deserialize, Serialize};

use crate::catalog::models::Track;

/// Fixed-size taste vector, both dimensions in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TasteProfile {
    pub energy: f32,
    pub valence: f32,
}

impl Default for TasteProfile {
    fn default() -> Self {
        Self {
            energy: 0.5,
            valence: 0.5,
        }
    }
}

const ENERGETIC: &[&str] = &[
    "remix", "club", "dance", "party", "edm", "techno", "metal", "rock", "workout", "power",
    "hype", "banger",
];
const CALM: &[&str] = &[
    "acoustic", "chill", "piano", "ambient", "sleep", "lofi", "lo-fi", "ballad", "slow", "calm",
    "relax",
];
const BRIGHT: &[&str] = &[
    "happy", "love", "sun", "summer", "smile", "good", "joy", "feel", "alive",
];
const DARK: &[&str] = &[
    "sad", "cry", "alone", "rain", "blue", "dark", "tears", "goodbye", "hurt",
];

/// -1, 0 or +1 depending on which keyword family dominates the text.
fn signal(text: &str, positive: &[&str], negative: &[&str]) -> f32 {
    let hits = |words: &[&str]| words.iter().filter(|w| text.contains(*w)).count() as i32;
    match hits(positive) - hits(negative) {
        d if d > 0 => 1.0,
        d if d < 0 => -1.0,
        _ => 0.0,
    }
}

/// Derive the taste vector from play history (newest first).
///
/// Newer plays weigh more; an empty history is a neutral 0.5/0.5 profile.
pub fn taste_from_history(history: &[Track]) -> TasteProfile {
    if history.is_empty() {
        return TasteProfile::default();
    }

    let mut energy_sum = 0.0f32;
    let mut valence_sum = 0.0f32;
    let mut weight_sum = 0.0f32;

    for (index, track) in history.iter().enumerate() {
        let weight = 1.0 / (1.0 + index as f32 * 0.1);
        let text = format!("{} {}", track.title, track.artist).to_lowercase();

        energy_sum += weight * signal(&text, ENERGETIC, CALM);
        valence_sum += weight * signal(&text, BRIGHT, DARK);
        weight_sum += weight;
    }

    TasteProfile {
        energy: (0.5 + 0.5 * energy_sum / weight_sum).clamp(0.0, 1.0),
        valence: (0.5 + 0.5 * valence_sum / weight_sum).clamp(0.0, 1.0),
    }
}
