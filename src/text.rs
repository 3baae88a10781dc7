//! Word normalization and the character-level similarity check shared by the
//! sentence drill and the falling-words game.
//!
//! Similarity is prefix aligned: character `i` of one word is only ever
//! compared with character `i` of the other. An inserted or dropped letter
//! shifts the rest of the word out of alignment and every following position
//! counts as a mismatch ("helo" vs "hello" scores 0.6, not 0.8). Edit distance
//! would be more forgiving; the thresholds below are tuned for this scorer.

/// Punctuation stripped by [`normalize`].
const STRIPPED_PUNCTUATION: [char; 4] = ['.', ',', '!', '?'];

/// How lenient [`is_similar`] is about near-miss words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sensitivity {
    Strict,
    #[default]
    Normal,
    Loose,
}

impl Sensitivity {
    pub const ALL: [Sensitivity; 3] = [Sensitivity::Strict, Sensitivity::Normal, Sensitivity::Loose];

    /// Minimum positional match ratio accepted at this level.
    pub fn threshold(self) -> f64 {
        match self {
            Sensitivity::Strict => 0.98,
            Sensitivity::Normal => 0.75,
            Sensitivity::Loose => 0.10,
        }
    }

    /// Parses the labels used by the page controls (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }

    pub fn label(self) -> &'static str {
        match self {
            Sensitivity::Strict => "Strict",
            Sensitivity::Normal => "Normal",
            Sensitivity::Loose => "Loose",
        }
    }
}

/// Lower-cases `text` and strips `. , ! ?`.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect()
}

/// Game-side normalization: lower-cased ASCII letters only.
pub fn normalize_game_word(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Normalizes a transcript and splits it into words.
pub fn spoken_words(transcript: &str) -> Vec<String> {
    normalize(transcript)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Positional match ratio of two already-normalized words, in `[0, 1]`.
pub fn positional_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }
    let matches = a.iter().zip(&b).filter(|(x, y)| x == y).count();
    matches as f64 / longest as f64
}

/// True when `a` and `b` are close enough at `sensitivity`. Empty input never matches.
pub fn is_similar(a: &str, b: &str, sensitivity: Sensitivity) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    positional_similarity(&a, &b) >= sensitivity.threshold()
}
