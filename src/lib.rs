//! Pronounce Arcade core crate.
//!
//! Two speaking drills share one matching primitive: the sentence drill scores
//! a read-aloud sentence word by word, and the falling-words game clears
//! on-screen words as they are spoken. Engines are plain Rust driven through
//! the [`scheduler::Scheduler`] and [`speech::SpeechSource`] seams; the `web`
//! module binds them to the browser.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod drill;
pub mod error;
pub mod evaluator;
pub mod game;
mod logging;
pub mod scheduler;
pub mod speech;
pub mod text;
mod web;

pub use config::{DrillConfig, EvaluationMode, GameConfig};
pub use drill::{Difficulty, SentenceDrill, SentencePools};
pub use error::ArcadeError;
pub use evaluator::{StreamingEvaluation, WordToken, accuracy, evaluate_words, format_accuracy};
pub use game::{ColorClass, FallingWord, GameState, Phase, RenderItem, RoundSummary, WordClearanceGame};
pub use scheduler::{Cadence, Scheduler, Timer};
pub use speech::{ListenState, Recognizer, SessionEnd, SpeechEvent, SpeechSink, SpeechSource};
pub use text::{Sensitivity, is_similar, normalize, normalize_game_word};
pub use web::{
    GameHud, drill_accuracy, drill_init, drill_next_sentence, drill_read_sentence, drill_sentence,
    drill_set_difficulty, drill_set_sensitivity, drill_toggle_speaking, game_hud, reset_game,
    start_game,
};
#[cfg(feature = "serde_json")]
pub use web::{drill_feedback_json, game_summary_json};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

// -----------------------------------------------------------------------------
// Practice datasets
// -----------------------------------------------------------------------------

pub const BEGINNER_SENTENCES: &[&str] = &[
    "I like to read books.",
    "The sun is hot today.",
    "My cat sleeps on the bed.",
    "We eat lunch at noon.",
    "She has a red bike.",
    "Please open the door.",
    "The dog runs in the park.",
    "I drink milk every morning.",
];

pub const INTERMEDIATE_SENTENCES: &[&str] = &[
    "Could you tell me where the station is?",
    "I usually take the bus to work.",
    "The weather has been unusually warm this week.",
    "She practices the piano every evening after dinner.",
    "We are planning a trip to the mountains.",
    "Reading every day improves your vocabulary.",
    "He forgot his umbrella, so he got wet.",
    "The museum opens at nine on weekends.",
];

pub const ADVANCED_SENTENCES: &[&str] = &[
    "The thorough researcher thought through every hypothesis.",
    "Particularly peculiar pronunciations perplex many learners.",
    "Environmental regulations significantly influenced the committee's decision.",
    "Her enthusiasm was contagious, yet surprisingly understated.",
    "Statistically, the phenomenon occurs less frequently than anticipated.",
    "The architect's ambitious proposal was ultimately rejected.",
    "Comfortable clothing is essential for a successful marathon.",
    "Entrepreneurs frequently underestimate the necessary capital.",
];

/// Word pool for the falling-words game: letters only, chosen for tricky sounds.
pub const HARD_WORDS: &[&str] = &[
    "thorough", "through", "thought", "though", "squirrel", "rural", "world", "girl",
    "colonel", "island", "comfortable", "vegetable", "temperature", "february", "library",
    "sixth", "clothes", "months", "brewery", "mirror", "anemone", "worcestershire",
    "specific", "pacific", "phenomenon", "rhythm", "choir", "queue", "wednesday",
    "receipt", "salmon", "almond", "debt", "subtle", "yacht", "epitome", "hyperbole",
    "entrepreneur", "pronunciation", "onomatopoeia", "thesaurus", "schedule", "often",
    "sword", "knight", "doubt", "lettuce", "chaos", "ache", "mischievous",
];

// -----------------------------------------------------------------------------
// Shared pools handed to the engines
// -----------------------------------------------------------------------------

pub const SENTENCE_POOLS: SentencePools = SentencePools {
    beginner: BEGINNER_SENTENCES,
    intermediate: INTERMEDIATE_SENTENCES,
    advanced: ADVANCED_SENTENCES,
};
