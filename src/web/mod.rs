//! Browser host: owns the engines in thread-local slots and exposes them to
//! JavaScript. Timer and speech callbacks re-enter through plain `fn`
//! dispatchers that look the engine up again.

mod render;
mod scheduler;
mod speech;

use std::cell::RefCell;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::config::{DrillConfig, EvaluationMode, GameConfig};
use crate::drill::{Difficulty, SentenceDrill};
use crate::error::ArcadeError;
use crate::evaluator::format_accuracy;
use crate::game::{Phase, WordClearanceGame};
use crate::scheduler::Timer;
use crate::speech::SpeechEvent;
use crate::text::Sensitivity;
use crate::{HARD_WORDS, SENTENCE_POOLS};

use render::CanvasView;
use scheduler::WebScheduler;
use speech::{WebRecognition, WebSynthesis};

const GAME_CANVAS_ID: &str = "pa-game-canvas";

type BrowserGame = WordClearanceGame<WebScheduler, WebRecognition, ChaCha8Rng>;
type BrowserDrill = SentenceDrill<WebRecognition, WebSynthesis, WebScheduler>;

struct GameHost {
    engine: BrowserGame,
    view: CanvasView,
    on_resize: Closure<dyn FnMut()>,
}

impl GameHost {
    fn draw(&self) {
        let state = self.engine.state();
        self.view
            .draw(self.engine.phase(), state.level, &self.engine.render_items());
    }

    /// Matches the canvas and the spawn range to the current window width.
    fn refit(&mut self) {
        let width = self.view.fit_to_window();
        self.engine.set_field_width(width);
    }
}

impl Drop for GameHost {
    fn drop(&mut self) {
        let Some(win) = web_sys::window() else {
            return;
        };
        if let Err(e) =
            win.remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref())
        {
            log::debug!("{}", ArcadeError::js("removeEventListener", e));
        }
    }
}

thread_local! {
    static GAME: RefCell<Option<GameHost>> = RefCell::new(None);
    static DRILL: RefCell<Option<BrowserDrill>> = RefCell::new(None);
}

// --- Dispatchers --------------------------------------------------------------

fn game_timer(timer: Timer, now_ms: f64) {
    GAME.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            log::debug!("game busy, dropped {timer:?} tick");
            return;
        };
        if let Some(host) = slot.as_mut() {
            host.engine.on_timer(timer, now_ms);
            if timer == Timer::Frame {
                host.draw();
            }
        }
    });
}

fn game_speech(event: SpeechEvent) {
    GAME.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            log::debug!("game busy, dropped speech event");
            return;
        };
        if let Some(host) = slot.as_mut() {
            host.engine.on_speech(event);
        }
    });
}

fn game_resize() {
    GAME.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            log::debug!("game busy, dropped resize");
            return;
        };
        if let Some(host) = slot.as_mut() {
            host.refit();
            host.draw();
        }
    });
}

fn drill_timer(timer: Timer, now_ms: f64) {
    DRILL.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            log::debug!("drill busy, dropped {timer:?} tick");
            return;
        };
        if let Some(drill) = slot.as_mut() {
            drill.on_timer(timer, now_ms);
        }
    });
}

fn drill_speech(event: SpeechEvent) {
    DRILL.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            log::debug!("drill busy, dropped speech event");
            return;
        };
        if let Some(drill) = slot.as_mut() {
            drill.on_speech(event);
        }
    });
}

// --- Falling-words game -------------------------------------------------------

fn new_game_host() -> Result<GameHost, ArcadeError> {
    let view = CanvasView::attach(GAME_CANVAS_ID, GameConfig::DEFAULT_FIELD_HEIGHT)?;
    let source = WebRecognition::new(game_speech, true, false)?;
    let config = GameConfig {
        field_width: view.width(),
        ..GameConfig::default()
    };
    let engine = WordClearanceGame::new(
        config,
        HARD_WORDS,
        WebScheduler::new(game_timer),
        source,
        ChaCha8Rng::from_entropy(),
    );

    let win = web_sys::window().ok_or_else(|| ArcadeError::dom("window", "no global window"))?;
    let on_resize = Closure::wrap(Box::new(game_resize) as Box<dyn FnMut()>);
    win.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
        .map_err(|e| ArcadeError::js("addEventListener", e))?;
    Ok(GameHost {
        engine,
        view,
        on_resize,
    })
}

/// "Start Game": creates the canvas on first use and starts a round.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    GAME.with(|cell| -> Result<(), ArcadeError> {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(new_game_host()?);
        }
        let Some(host) = slot.as_mut() else {
            return Ok(());
        };
        host.refit();
        host.engine.start()?;
        host.draw();
        Ok(())
    })
    .map_err(JsValue::from)
}

/// Stops the round and clears the field.
#[wasm_bindgen]
pub fn reset_game() {
    GAME.with(|cell| {
        if let Some(host) = cell.borrow_mut().as_mut() {
            host.engine.reset();
            host.draw();
        }
    });
}

/// Numbers shown above the canvas.
#[wasm_bindgen(getter_with_clone)]
pub struct GameHud {
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    /// "67%" or "-".
    pub accuracy: String,
    /// Last thing the recognizer heard.
    pub heard: String,
    pub active: bool,
    pub game_over: bool,
}

#[wasm_bindgen]
pub fn game_hud() -> GameHud {
    GAME.with(|cell| {
        let slot = cell.borrow();
        match slot.as_ref() {
            Some(host) => {
                let state = host.engine.state();
                GameHud {
                    score: state.score,
                    level: state.level,
                    lives: state.lives,
                    accuracy: format_accuracy(state.accuracy()),
                    heard: state.last_heard.clone(),
                    active: host.engine.phase() == Phase::Active,
                    game_over: host.engine.phase() == Phase::GameOver,
                }
            }
            None => GameHud {
                score: 0,
                level: 1,
                lives: GameConfig::DEFAULT_LIVES,
                accuracy: format_accuracy(None),
                heard: String::new(),
                active: false,
                game_over: false,
            },
        }
    })
}

/// Round summary (words cleared and missed, accuracy) as JSON; `undefined`
/// before the first round.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn game_summary_json() -> Result<Option<String>, JsValue> {
    GAME.with(|cell| -> Result<Option<String>, JsValue> {
        let slot = cell.borrow();
        let Some(host) = slot.as_ref() else {
            return Ok(None);
        };
        serde_json::to_string(&host.engine.summary())
            .map(Some)
            .map_err(|_| JsValue::from(ArcadeError::Encode("round summary")))
    })
}

// --- Sentence drill -----------------------------------------------------------

fn with_drill<T>(f: impl FnOnce(&mut BrowserDrill) -> Result<T, ArcadeError>) -> Result<T, JsValue> {
    DRILL.with(|cell| -> Result<T, ArcadeError> {
        let mut slot = cell.borrow_mut();
        let drill = slot
            .as_mut()
            .ok_or(ArcadeError::NotInitialized("sentence drill"))?;
        f(drill)
    })
    .map_err(JsValue::from)
}

/// Sets up the drill; `streaming` scores while the learner is still talking.
/// Calling it again starts over.
#[wasm_bindgen]
pub fn drill_init(streaming: bool) -> Result<(), JsValue> {
    let mode = if streaming {
        EvaluationMode::Streaming
    } else {
        EvaluationMode::Batch
    };
    let source = WebRecognition::new(drill_speech, true, streaming)?;
    let drill = SentenceDrill::new(
        DrillConfig {
            mode,
            ..DrillConfig::default()
        },
        SENTENCE_POOLS,
        source,
        WebSynthesis::new(),
        WebScheduler::new(drill_timer),
    );
    let previous = DRILL.with(|cell| cell.borrow_mut().replace(drill));
    drop(previous);
    log::info!("sentence drill ready ({mode:?})");
    Ok(())
}

/// `"beginner"`, `"intermediate"` or `"advanced"`.
#[wasm_bindgen]
pub fn drill_set_difficulty(label: &str) -> Result<(), JsValue> {
    let difficulty = Difficulty::from_label(label).ok_or_else(|| ArcadeError::unknown("difficulty", label))?;
    with_drill(|d| {
        d.set_difficulty(difficulty);
        Ok(())
    })
}

/// `"strict"`, `"normal"` or `"loose"`.
#[wasm_bindgen]
pub fn drill_set_sensitivity(label: &str) -> Result<(), JsValue> {
    let sensitivity =
        Sensitivity::from_label(label).ok_or_else(|| ArcadeError::unknown("sensitivity", label))?;
    with_drill(|d| {
        d.set_sensitivity(sensitivity);
        Ok(())
    })
}

/// Advances to the next sentence and returns it.
#[wasm_bindgen]
pub fn drill_next_sentence() -> Result<String, JsValue> {
    with_drill(|d| {
        d.next_sentence();
        Ok(d.sentence().to_owned())
    })
}

/// Start/Stop speaking. Returns whether the drill is now listening.
#[wasm_bindgen]
pub fn drill_toggle_speaking() -> Result<bool, JsValue> {
    with_drill(|d| {
        d.toggle_speaking()?;
        Ok(d.is_listening())
    })
}

#[wasm_bindgen]
pub fn drill_read_sentence() -> Result<(), JsValue> {
    with_drill(|d| {
        d.read_sentence();
        Ok(())
    })
}

#[wasm_bindgen]
pub fn drill_sentence() -> Result<String, JsValue> {
    with_drill(|d| Ok(d.sentence().to_owned()))
}

/// "83%" after a scored turn, "-" otherwise.
#[wasm_bindgen]
pub fn drill_accuracy() -> Result<String, JsValue> {
    with_drill(|d| Ok(format_accuracy(d.accuracy())))
}

/// Per-word verdicts of the current turn as JSON.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn drill_feedback_json() -> Result<String, JsValue> {
    with_drill(|d| serde_json::to_string(d.tokens()).map_err(|_| ArcadeError::Encode("word feedback")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Re-entrant callbacks must give up quietly instead of panicking on the borrow.
    #[test]
    fn callbacks_into_a_busy_slot_are_dropped() {
        GAME.with(|cell| {
            let _held = cell.borrow_mut();
            game_timer(Timer::Frame, 16.0);
            game_timer(Timer::Spawn, 16.0);
            game_speech(SpeechEvent::SessionEnded);
            game_resize();
        });
        DRILL.with(|cell| {
            let _held = cell.borrow_mut();
            drill_timer(Timer::SilenceCutoff, 2_000.0);
            drill_speech(SpeechEvent::SessionEnded);
        });
    }

    #[test]
    fn callbacks_before_setup_do_nothing() {
        game_timer(Timer::Frame, 16.0);
        game_resize();
        drill_timer(Timer::SilenceCutoff, 2_000.0);
        GAME.with(|cell| assert!(cell.borrow().is_none()));
        DRILL.with(|cell| assert!(cell.borrow().is_none()));
    }
}
