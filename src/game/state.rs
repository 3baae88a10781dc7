use crate::evaluator::percent;

/// Round lifecycle of the falling-words game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Phase {
    #[default]
    Idle,
    Active,
    GameOver,
}

/// A word currently descending the play field.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FallingWord {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// How the renderer should paint a word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ColorClass {
    Matched,
    Missed,
    Pending,
}

/// Read-only view of one falling word for the renderer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderItem {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub color: ColorClass,
}

/// Everything the engine mutates during a round.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    /// Unique, in the order words first fell off the field.
    pub missed_words: Vec<String>,
    /// Unique, in the order words were first cleared.
    pub correct_words: Vec<String>,
    pub active: Vec<FallingWord>,
    /// Last final transcript, lower-cased, for the "you said" line.
    pub last_heard: String,
}

impl GameState {
    pub fn new(lives: u32) -> Self {
        Self {
            score: 0,
            level: 1,
            lives,
            missed_words: Vec::new(),
            correct_words: Vec::new(),
            active: Vec::new(),
            last_heard: String::new(),
        }
    }

    pub(crate) fn record_correct(&mut self, text: &str) {
        if !self.correct_words.iter().any(|w| w == text) {
            self.correct_words.push(text.to_owned());
        }
    }

    pub(crate) fn record_missed(&mut self, text: &str) {
        if !self.missed_words.iter().any(|w| w == text) {
            self.missed_words.push(text.to_owned());
        }
    }

    /// Adds `points`; returns true when the new score crossed a `level_step`
    /// boundary and a level was gained. At most one level per award.
    pub(crate) fn award(&mut self, points: u32, level_step: u32, max_level: u32) -> bool {
        let before = self.score;
        self.score = self.score.saturating_add(points);
        let crossed = level_step > 0 && self.score / level_step > before / level_step;
        if crossed && self.level < max_level {
            self.level += 1;
            return true;
        }
        false
    }

    /// Cleared share of all resolved words; `None` before anything resolved.
    pub fn accuracy(&self) -> Option<u8> {
        let resolved = self.correct_words.len() + self.missed_words.len();
        if resolved == 0 {
            return None;
        }
        Some(percent(self.correct_words.len(), resolved))
    }

    pub fn color_of(&self, text: &str) -> ColorClass {
        if self.correct_words.iter().any(|w| w == text) {
            ColorClass::Matched
        } else if self.missed_words.iter().any(|w| w == text) {
            ColorClass::Missed
        } else {
            ColorClass::Pending
        }
    }

    pub fn render_items(&self) -> Vec<RenderItem> {
        self.active
            .iter()
            .map(|w| RenderItem {
                text: w.text.clone(),
                x: w.x,
                y: w.y,
                color: self.color_of(&w.text),
            })
            .collect()
    }
}

/// Outcome of a round as shown on the results panel.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RoundSummary {
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    pub correct_words: Vec<String>,
    pub missed_words: Vec<String>,
    pub accuracy: Option<u8>,
    pub last_heard: String,
}

impl RoundSummary {
    pub(crate) fn of(phase: Phase, state: &GameState) -> Self {
        Self {
            phase,
            score: state.score,
            level: state.level,
            lives: state.lives,
            correct_words: state.correct_words.clone(),
            missed_words: state.missed_words.clone(),
            accuracy: state.accuracy(),
            last_heard: state.last_heard.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_level_up_lands_exactly_on_200() {
        let mut state = GameState::new(20);
        let mut levels = Vec::new();
        for _ in 0..60 {
            let before = state.level;
            state.award(10, 200, 10);
            assert!(state.level - before <= 1);
            levels.push((state.score, state.level));
        }
        assert!(levels.iter().filter(|(s, _)| *s < 200).all(|(_, l)| *l == 1));
        assert_eq!(levels.iter().find(|(_, l)| *l == 2).map(|(s, _)| *s), Some(200));
        assert_eq!(levels.iter().find(|(_, l)| *l == 3).map(|(s, _)| *s), Some(400));
        assert_eq!(state.level, 4);
    }

    #[test]
    fn crossing_without_landing_on_boundary_still_levels() {
        let mut state = GameState::new(20);
        state.score = 190;
        assert!(state.award(20, 200, 10));
        assert_eq!((state.score, state.level), (210, 2));
        // A single award never grants two levels.
        state.score = 390;
        state.award(500, 200, 10);
        assert_eq!(state.level, 3);
    }

    #[test]
    fn level_is_capped() {
        let mut state = GameState::new(20);
        state.level = 10;
        state.score = 1990;
        assert!(!state.award(10, 200, 10));
        assert_eq!((state.score, state.level), (2000, 10));
    }

    #[test]
    fn word_lists_stay_unique_and_ordered() {
        let mut state = GameState::new(20);
        for w in ["kiwi", "fig", "kiwi", "date", "fig"] {
            state.record_missed(w);
            state.record_correct(w);
        }
        assert_eq!(state.missed_words, vec!["kiwi", "fig", "date"]);
        assert_eq!(state.correct_words, vec!["kiwi", "fig", "date"]);
    }

    #[test]
    fn accuracy_and_colors() {
        let mut state = GameState::new(20);
        assert_eq!(state.accuracy(), None);
        state.record_correct("lemon");
        state.record_correct("melon");
        state.record_missed("mango");
        assert_eq!(state.accuracy(), Some(67));
        assert_eq!(state.color_of("lemon"), ColorClass::Matched);
        assert_eq!(state.color_of("mango"), ColorClass::Missed);
        assert_eq!(state.color_of("grape"), ColorClass::Pending);

        state.active.push(FallingWord {
            text: "mango".into(),
            x: 12.0,
            y: 3.0,
        });
        let items = state.render_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].color, ColorClass::Missed);
        assert_eq!((items[0].x, items[0].y), (12.0, 3.0));
    }
}
