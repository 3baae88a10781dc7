//! Falling-words clearance game.
//!
//! Words drop from the top of the play field; saying a word clears the first
//! matching one on screen. Words that reach the floor cost a life and the
//! round ends when lives run out.
//!
//! Three event sources drive the engine: the spawn timer, the frame clock and
//! final recognizer results. Each handler runs to completion before the next
//! one, so a word cleared by speech is gone before the next frame evicts
//! anything; a word is never both cleared and missed.

mod state;

pub use state::{ColorClass, FallingWord, GameState, Phase, RenderItem, RoundSummary};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::GameConfig;
use crate::error::ArcadeError;
use crate::scheduler::{Cadence, Scheduler, Timer};
use crate::speech::{Recognizer, SpeechEvent, SpeechSource};
use crate::text::normalize_game_word;

/// Upper bound on frames simulated for one clock tick (e.g. after a
/// backgrounded tab resumes), so words do not teleport off the field.
const MAX_CATCHUP_FRAMES: f64 = 4.0;

pub struct WordClearanceGame<S, L, R> {
    config: GameConfig,
    words: &'static [&'static str],
    scheduler: S,
    recognizer: Recognizer<L>,
    rng: R,
    phase: Phase,
    state: GameState,
    last_frame_ms: Option<f64>,
}

impl<S: Scheduler, L: SpeechSource, R: Rng> WordClearanceGame<S, L, R> {
    pub fn new(
        config: GameConfig,
        words: &'static [&'static str],
        scheduler: S,
        source: L,
        rng: R,
    ) -> Self {
        let state = GameState::new(config.starting_lives);
        Self {
            config,
            words,
            scheduler,
            recognizer: Recognizer::new(source),
            rng,
            phase: Phase::Idle,
            state,
            last_frame_ms: None,
        }
    }

    /// "Start Game": fresh state, listening, spawner and frame clock armed,
    /// first word dropped immediately.
    ///
    /// Nothing changes when the recognizer cannot start.
    pub fn start(&mut self) -> Result<(), ArcadeError> {
        if self.phase == Phase::Active {
            return Err(ArcadeError::RoundInProgress);
        }
        self.recognizer.start()?;

        self.state = GameState::new(self.config.starting_lives);
        self.last_frame_ms = None;
        self.phase = Phase::Active;
        self.scheduler
            .schedule(Timer::Spawn, Cadence::Every(self.config.spawn_interval));
        self.scheduler.schedule(Timer::Frame, Cadence::EveryFrame);
        log::info!(
            "round started: {} lives, {} words in pool",
            self.state.lives,
            self.words.len()
        );
        self.spawn();
        Ok(())
    }

    /// Stops everything and returns to `Idle` with a fresh state.
    pub fn reset(&mut self) {
        self.halt();
        self.state = GameState::new(self.config.starting_lives);
        self.last_frame_ms = None;
        self.phase = Phase::Idle;
        log::info!("game reset");
    }

    /// Host callback for an armed timer; `now_ms` is the host clock.
    pub fn on_timer(&mut self, timer: Timer, now_ms: f64) {
        match timer {
            Timer::Spawn => {
                self.spawn();
            }
            Timer::Frame => {
                let frames = match self.last_frame_ms {
                    Some(last) => ((now_ms - last) * self.config.frames_per_second / 1000.0)
                        .clamp(0.0, MAX_CATCHUP_FRAMES),
                    None => 1.0,
                };
                self.last_frame_ms = Some(now_ms);
                self.advance(frames);
            }
            Timer::SilenceCutoff => {}
        }
    }

    /// Host callback for recognizer output.
    pub fn on_speech(&mut self, event: SpeechEvent) {
        match event {
            SpeechEvent::Transcript { text, is_final } => {
                if is_final {
                    self.hear(&text);
                }
            }
            SpeechEvent::SessionEnded => {
                self.recognizer.on_session_end(self.phase == Phase::Active);
            }
            SpeechEvent::Error(reason) => {
                log::warn!("speech recognition error: {reason}");
            }
        }
    }

    /// Drops a random pool word unless the field is at capacity. Returns
    /// whether a word was added.
    pub fn spawn(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        let capacity = self.config.capacity(self.state.level);
        if self.state.active.len() >= capacity {
            log::debug!("spawn skipped: {capacity} words already falling");
            return false;
        }
        let Some(word) = self.words.choose(&mut self.rng) else {
            log::debug!("spawn skipped: empty word pool");
            return false;
        };
        let max_x = (self.config.field_width - self.config.glyph_margin).max(0.0);
        let x = if max_x > 0.0 {
            self.rng.gen_range(0.0..=max_x)
        } else {
            0.0
        };
        self.state.active.push(FallingWord {
            text: (*word).to_owned(),
            x,
            y: 0.0,
        });
        true
    }

    /// Moves every word down by `frames` frame steps, then evicts words that
    /// reached the floor.
    pub fn advance(&mut self, frames: f64) {
        if self.phase != Phase::Active {
            return;
        }
        let step = self.config.pixels_per_frame(self.state.level) * frames;
        for word in &mut self.state.active {
            word.y += step;
        }

        let floor = self.config.field_height;
        let mut idx = 0;
        while idx < self.state.active.len() {
            if self.state.active[idx].y < floor {
                idx += 1;
                continue;
            }
            let fallen = self.state.active.remove(idx);
            self.state.record_missed(&fallen.text);
            self.state.lives = self.state.lives.saturating_sub(1);
            log::debug!("missed {:?}, {} lives left", fallen.text, self.state.lives);
            if self.state.lives == 0 {
                self.game_over();
                return;
            }
        }
    }

    /// Clears falling words named in a transcript fragment. Returns how many
    /// were cleared.
    pub fn hear(&mut self, transcript: &str) -> usize {
        if self.phase != Phase::Active {
            return 0;
        }
        self.state.last_heard = transcript.trim().to_lowercase();

        let mut cleared = 0;
        for spoken in transcript.split_whitespace() {
            let spoken = normalize_game_word(spoken);
            if spoken.is_empty() {
                continue;
            }
            let Some(idx) = self
                .state
                .active
                .iter()
                .position(|w| normalize_game_word(&w.text) == spoken)
            else {
                continue;
            };
            let word = self.state.active.remove(idx);
            self.state.record_correct(&word.text);
            cleared += 1;
            let leveled = self.state.award(
                self.config.points_per_word,
                self.config.level_step,
                self.config.max_level,
            );
            if leveled {
                log::info!("level {} at score {}", self.state.level, self.state.score);
            }
        }
        cleared
    }

    /// Sets the play-field width (the canvas follows the window).
    pub fn set_field_width(&mut self, width: f64) {
        self.config.field_width = width.max(0.0);
    }

    fn game_over(&mut self) {
        self.halt();
        self.phase = Phase::GameOver;
        log::info!(
            "game over: score {}, level {}, {} cleared, {} missed",
            self.state.score,
            self.state.level,
            self.state.correct_words.len(),
            self.state.missed_words.len()
        );
    }

    fn halt(&mut self) {
        self.scheduler.cancel(Timer::Spawn);
        self.scheduler.cancel(Timer::Frame);
        self.recognizer.stop();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn render_items(&self) -> Vec<RenderItem> {
        self.state.render_items()
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary::of(self.phase, &self.state)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn recognizer(&self) -> &Recognizer<L> {
        &self.recognizer
    }
}
