//! Per-word scoring of a transcript against a reference sentence.
//!
//! Alignment is strictly positional: reference word `i` is only compared with
//! spoken word `i`. A dropped or extra word in the transcript therefore
//! misaligns every later position; there is no resynchronization.

use crate::text::{Sensitivity, is_similar, normalize, spoken_words};

/// One reference word and its verdict.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WordToken {
    /// Reference word exactly as displayed.
    pub text: String,
    /// Transcript word aligned to this position (empty when none).
    pub spoken: String,
    /// `None` until evaluated, and always `None` for blank words.
    pub correct: Option<bool>,
}

impl WordToken {
    fn pending(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            spoken: String::new(),
            correct: None,
        }
    }

    /// Reference words that normalize to nothing (stray punctuation) are not scored.
    pub fn is_blank(&self) -> bool {
        normalize(&self.text).is_empty()
    }

    fn judge(&mut self, spoken: &str, sensitivity: Sensitivity) {
        self.spoken = spoken.to_owned();
        if self.is_blank() {
            self.correct = None;
            return;
        }
        let reference = normalize(&self.text);
        self.correct = Some(spoken == reference || is_similar(spoken, &reference, sensitivity));
    }
}

/// Unevaluated tokens for a freshly selected sentence.
pub fn pending_tokens(reference: &str) -> Vec<WordToken> {
    reference.split_whitespace().map(WordToken::pending).collect()
}

/// Scores every reference word against the transcript word at the same index.
/// Missing transcript words count as wrong.
pub fn evaluate_words(reference: &str, spoken: &str, sensitivity: Sensitivity) -> Vec<WordToken> {
    let heard = spoken_words(spoken);
    let mut tokens = pending_tokens(reference);
    for (i, token) in tokens.iter_mut().enumerate() {
        let word = heard.get(i).map(String::as_str).unwrap_or("");
        token.judge(word, sensitivity);
    }
    tokens
}

/// Rounded percentage of correct non-blank words; `None` when nothing is scorable.
pub fn accuracy(tokens: &[WordToken]) -> Option<u8> {
    let scored = tokens.iter().filter(|t| !t.is_blank()).count();
    if scored == 0 {
        return None;
    }
    let correct = tokens.iter().filter(|t| t.correct == Some(true)).count();
    Some(percent(correct, scored))
}

pub(crate) fn percent(part: usize, whole: usize) -> u8 {
    (100.0 * part as f64 / whole as f64).round() as u8
}

/// Formats an optional accuracy the way the result panels show it.
pub fn format_accuracy(accuracy: Option<u8>) -> String {
    match accuracy {
        Some(p) => format!("{p}%"),
        None => "-".to_owned(),
    }
}

/// Live scoring for recognizers that deliver partial transcripts.
///
/// Positions the speaker has not reached yet stay unevaluated until
/// [`StreamingEvaluation::finish`].
#[derive(Clone, Debug)]
pub struct StreamingEvaluation {
    reference: String,
    sensitivity: Sensitivity,
    tokens: Vec<WordToken>,
}

impl StreamingEvaluation {
    pub fn new(reference: &str, sensitivity: Sensitivity) -> Self {
        Self {
            reference: reference.to_owned(),
            sensitivity,
            tokens: pending_tokens(reference),
        }
    }

    /// Re-scores the prefix covered by `partial`.
    pub fn update(&mut self, partial: &str) {
        let heard = spoken_words(partial);
        for (i, token) in self.tokens.iter_mut().enumerate() {
            match heard.get(i) {
                Some(word) => token.judge(word, self.sensitivity),
                None => {
                    token.spoken.clear();
                    token.correct = None;
                }
            }
        }
    }

    /// End of turn: identical to a batch evaluation of the final transcript.
    pub fn finish(&mut self, transcript: &str) -> Option<u8> {
        self.tokens = evaluate_words(&self.reference, transcript, self.sensitivity);
        accuracy(&self.tokens)
    }

    pub fn tokens(&self) -> &[WordToken] {
        &self.tokens
    }
}
