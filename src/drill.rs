//! Sentence reading drill.
//!
//! The learner picks a difficulty, reads the shown sentence aloud and gets a
//! per-word verdict plus an accuracy score when the recognizer session ends.

use crate::config::{DrillConfig, EvaluationMode};
use crate::error::ArcadeError;
use crate::evaluator::{
    StreamingEvaluation, WordToken, accuracy, evaluate_words, format_accuracy, pending_tokens,
};
use crate::scheduler::{Cadence, Scheduler, Timer};
use crate::speech::{Recognizer, SessionEnd, SpeechEvent, SpeechSink, SpeechSource};
use crate::text::Sensitivity;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Reference sentences per difficulty.
#[derive(Clone, Copy, Debug)]
pub struct SentencePools {
    pub beginner: &'static [&'static str],
    pub intermediate: &'static [&'static str],
    pub advanced: &'static [&'static str],
}

impl SentencePools {
    pub fn get(&self, difficulty: Difficulty) -> &'static [&'static str] {
        match difficulty {
            Difficulty::Beginner => self.beginner,
            Difficulty::Intermediate => self.intermediate,
            Difficulty::Advanced => self.advanced,
        }
    }

    /// Cyclic pick: `list[index % len]`, empty string for an empty list.
    pub fn sentence(&self, difficulty: Difficulty, index: usize) -> &'static str {
        let list = self.get(difficulty);
        if list.is_empty() {
            return "";
        }
        list[index % list.len()]
    }
}

pub struct SentenceDrill<S, K, T> {
    config: DrillConfig,
    pools: SentencePools,
    recognizer: Recognizer<S>,
    sink: K,
    scheduler: T,
    difficulty: Difficulty,
    sensitivity: Sensitivity,
    index: usize,
    sentence: &'static str,
    tokens: Vec<WordToken>,
    transcript: String,
    accuracy: Option<u8>,
    listening: bool,
    live: Option<StreamingEvaluation>,
}

impl<S: SpeechSource, K: SpeechSink, T: Scheduler> SentenceDrill<S, K, T> {
    pub fn new(config: DrillConfig, pools: SentencePools, source: S, sink: K, scheduler: T) -> Self {
        let mut drill = Self {
            config,
            pools,
            recognizer: Recognizer::new(source),
            sink,
            scheduler,
            difficulty: Difficulty::Beginner,
            sensitivity: Sensitivity::default(),
            index: 0,
            sentence: "",
            tokens: Vec::new(),
            transcript: String::new(),
            accuracy: None,
            listening: false,
            live: None,
        };
        drill.select(0);
        drill
    }

    /// Switches pools and goes back to the first sentence, dropping any turn in flight.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.interrupt();
        self.difficulty = difficulty;
        self.select(0);
        log::info!("difficulty set to {}", difficulty.label());
    }

    /// Applies from the next evaluation on.
    pub fn set_sensitivity(&mut self, sensitivity: Sensitivity) {
        self.sensitivity = sensitivity;
    }

    pub fn next_sentence(&mut self) {
        let len = self.pools.get(self.difficulty).len().max(1);
        self.select((self.index + 1) % len);
    }

    /// The Start/Stop speaking button.
    pub fn toggle_speaking(&mut self) -> Result<(), ArcadeError> {
        if self.listening {
            self.recognizer.stop();
            return Ok(());
        }
        self.interrupt();
        self.recognizer.start()?;
        self.clear_result();
        self.listening = true;
        if self.config.mode == EvaluationMode::Streaming {
            self.live = Some(StreamingEvaluation::new(self.sentence, self.sensitivity));
        }
        Ok(())
    }

    /// Speaks the sentence through the synthesizer.
    pub fn read_sentence(&mut self) {
        self.interrupt();
        self.sink.speak(self.sentence);
    }

    pub fn on_speech(&mut self, event: SpeechEvent) {
        match event {
            SpeechEvent::Transcript { text, is_final } => self.on_transcript(&text, is_final),
            SpeechEvent::SessionEnded => self.on_session_end(),
            SpeechEvent::Error(reason) => {
                log::warn!("speech recognition error: {reason}");
            }
        }
    }

    pub fn on_timer(&mut self, timer: Timer, _now_ms: f64) {
        if timer == Timer::SilenceCutoff && self.listening {
            log::debug!("silence cut-off reached");
            self.recognizer.stop();
        }
    }

    fn on_transcript(&mut self, text: &str, is_final: bool) {
        // Results still draining from an aborted session belong to no turn.
        if !self.listening || self.recognizer.start_pending() {
            return;
        }
        let text = text.trim();
        if is_final && !text.is_empty() {
            if !self.transcript.is_empty() {
                self.transcript.push(' ');
            }
            self.transcript.push_str(text);
        }
        if let Some(live) = self.live.as_mut() {
            let partial = if is_final {
                self.transcript.clone()
            } else {
                format!("{} {}", self.transcript, text)
            };
            live.update(&partial);
            self.tokens = live.tokens().to_vec();
        }
        if self.difficulty == Difficulty::Beginner {
            self.scheduler
                .schedule(Timer::SilenceCutoff, Cadence::Once(self.config.silence_cutoff));
        }
    }

    fn on_session_end(&mut self) {
        if self.recognizer.on_session_end(false) == SessionEnd::Resumed {
            log::debug!("previous session closed, turn now listening");
            return;
        }
        if !self.listening {
            return;
        }
        self.listening = false;
        self.scheduler.cancel(Timer::SilenceCutoff);
        let live = self.live.take();
        if self.transcript.is_empty() {
            log::info!("turn ended without speech");
            return;
        }
        match live {
            Some(mut live) => {
                self.accuracy = live.finish(&self.transcript);
                self.tokens = live.tokens().to_vec();
            }
            None => {
                self.tokens = evaluate_words(self.sentence, &self.transcript, self.sensitivity);
                self.accuracy = accuracy(&self.tokens);
            }
        }
        log::info!(
            "turn scored {} over {} words",
            format_accuracy(self.accuracy),
            self.tokens.len()
        );
    }

    /// Drops any listening session and pending speech output.
    fn interrupt(&mut self) {
        if self.listening {
            self.recognizer.abort();
            self.listening = false;
            self.live = None;
            self.scheduler.cancel(Timer::SilenceCutoff);
        }
        self.sink.cancel();
    }

    fn select(&mut self, index: usize) {
        self.index = index;
        self.sentence = self.pools.sentence(self.difficulty, index);
        self.clear_result();
    }

    fn clear_result(&mut self) {
        self.tokens = pending_tokens(self.sentence);
        self.transcript.clear();
        self.accuracy = None;
    }

    pub fn sentence(&self) -> &str {
        self.sentence
    }

    pub fn tokens(&self) -> &[WordToken] {
        &self.tokens
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn accuracy(&self) -> Option<u8> {
        self.accuracy
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn sensitivity(&self) -> Sensitivity {
        self.sensitivity
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn recognizer(&self) -> &Recognizer<S> {
        &self.recognizer
    }

    pub fn source(&self) -> &S {
        self.recognizer.source()
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::scheduler::testing::ManualScheduler;
    use crate::speech::ListenState;
    use crate::speech::testing::{BrowserSource, FakeSink, FakeSource};

    const POOLS: SentencePools = SentencePools {
        beginner: &["I like tea.", "Good morning!"],
        intermediate: &["The cat sat on the mat."],
        advanced: &["Thoroughly thought through."],
    };

    type TestDrill = SentenceDrill<FakeSource, FakeSink, ManualScheduler>;

    fn drill(mode: EvaluationMode) -> TestDrill {
        SentenceDrill::new(
            DrillConfig {
                mode,
                ..DrillConfig::default()
            },
            POOLS,
            FakeSource::default(),
            FakeSink::default(),
            ManualScheduler::default(),
        )
    }

    fn say(d: &mut TestDrill, text: &str) {
        d.on_speech(SpeechEvent::Transcript {
            text: text.into(),
            is_final: true,
        });
    }

    #[test]
    fn starts_on_first_beginner_sentence() {
        let d = drill(EvaluationMode::Batch);
        assert_eq!(d.sentence(), "I like tea.");
        assert_eq!(d.tokens().len(), 3);
        assert!(d.tokens().iter().all(|t| t.correct.is_none()));
        assert_eq!(d.accuracy(), None);
    }

    #[test]
    fn next_sentence_cycles() {
        let mut d = drill(EvaluationMode::Batch);
        d.next_sentence();
        assert_eq!(d.sentence(), "Good morning!");
        d.next_sentence();
        assert_eq!(d.sentence(), "I like tea.");
        assert_eq!(d.index(), 0);
    }

    #[test]
    fn batch_turn_scores_at_session_end() {
        let mut d = drill(EvaluationMode::Batch);
        d.set_difficulty(Difficulty::Intermediate);
        d.toggle_speaking().unwrap();
        assert!(d.is_listening());
        say(&mut d, "the cat sat");
        say(&mut d, "on a mat");
        assert_eq!(d.transcript(), "the cat sat on a mat");
        assert!(d.tokens().iter().all(|t| t.correct.is_none()));

        d.on_speech(SpeechEvent::SessionEnded);
        assert!(!d.is_listening());
        // "a" vs "the" is the only miss.
        assert_eq!(d.accuracy(), Some(83));
        assert_eq!(d.tokens()[4].correct, Some(false));
    }

    #[test]
    fn silent_turn_leaves_accuracy_unavailable() {
        let mut d = drill(EvaluationMode::Batch);
        d.toggle_speaking().unwrap();
        d.on_speech(SpeechEvent::Error("no-speech".into()));
        d.on_speech(SpeechEvent::SessionEnded);
        assert_eq!(d.accuracy(), None);
        assert!(d.tokens().iter().all(|t| t.correct.is_none()));
    }

    #[test]
    fn toggle_stops_an_active_turn() {
        let mut d = drill(EvaluationMode::Batch);
        d.toggle_speaking().unwrap();
        d.toggle_speaking().unwrap();
        assert_eq!(d.source().stops, 1);
        // Still listening until the browser confirms the end of the session.
        say(&mut d, "I like tea");
        d.on_speech(SpeechEvent::SessionEnded);
        assert_eq!(d.accuracy(), Some(100));
    }

    #[test]
    fn unsupported_speech_fails_without_clearing_results() {
        let mut d = SentenceDrill::new(
            DrillConfig::default(),
            POOLS,
            FakeSource {
                unsupported: true,
                ..FakeSource::default()
            },
            FakeSink::default(),
            ManualScheduler::default(),
        );
        assert_eq!(d.toggle_speaking(), Err(ArcadeError::SpeechUnsupported));
        assert!(!d.is_listening());
    }

    #[test]
    fn beginner_turns_end_after_silence() {
        let mut d = drill(EvaluationMode::Batch);
        d.toggle_speaking().unwrap();
        say(&mut d, "I like");
        assert_eq!(
            d.scheduler().cadence(Timer::SilenceCutoff),
            Some(Cadence::Once(Duration::from_millis(2000)))
        );
        d.on_timer(Timer::SilenceCutoff, 0.0);
        assert_eq!(d.source().stops, 1);
        d.on_speech(SpeechEvent::SessionEnded);
        assert!(!d.scheduler().is_scheduled(Timer::SilenceCutoff));
        assert_eq!(d.accuracy(), Some(67));
    }

    #[test]
    fn other_difficulties_have_no_silence_cutoff() {
        let mut d = drill(EvaluationMode::Batch);
        d.set_difficulty(Difficulty::Advanced);
        d.toggle_speaking().unwrap();
        say(&mut d, "thoroughly");
        assert!(!d.scheduler().is_scheduled(Timer::SilenceCutoff));
    }

    #[test]
    fn difficulty_change_aborts_the_turn() {
        let mut d = drill(EvaluationMode::Batch);
        d.toggle_speaking().unwrap();
        say(&mut d, "I like tea");
        d.set_difficulty(Difficulty::Advanced);
        assert_eq!(d.source().aborts, 1);
        assert!(d.sink().cancels >= 1);
        assert_eq!(d.sentence(), "Thoroughly thought through.");
        // The aborted session still reports its end; it must not be scored.
        d.on_speech(SpeechEvent::SessionEnded);
        assert_eq!(d.accuracy(), None);
    }

    #[test]
    fn turn_after_an_abort_waits_for_the_aborted_session() {
        let mut d = SentenceDrill::new(
            DrillConfig::default(),
            POOLS,
            BrowserSource::default(),
            FakeSink::default(),
            ManualScheduler::default(),
        );
        let open = d.source().open.clone();
        d.toggle_speaking().unwrap();
        d.set_difficulty(Difficulty::Intermediate);
        assert_eq!(d.recognizer().state(), ListenState::Stopping);

        assert_eq!(d.toggle_speaking(), Ok(()));
        assert!(d.is_listening());
        assert_eq!(d.source().starts, 1);
        d.on_speech(SpeechEvent::Transcript {
            text: "I like tea".into(),
            is_final: true,
        });
        assert_eq!(d.transcript(), "");

        // End of the aborted session: not scored, the new turn starts listening.
        open.set(false);
        d.on_speech(SpeechEvent::SessionEnded);
        assert!(d.is_listening());
        assert_eq!(d.accuracy(), None);
        assert_eq!(d.source().starts, 2);
        assert_eq!(d.recognizer().state(), ListenState::Listening);

        d.on_speech(SpeechEvent::Transcript {
            text: "the cat sat on the mat".into(),
            is_final: true,
        });
        d.toggle_speaking().unwrap();
        open.set(false);
        d.on_speech(SpeechEvent::SessionEnded);
        assert!(!d.is_listening());
        assert_eq!(d.accuracy(), Some(100));
        assert_eq!(d.source().rejected, 0);
    }

    #[test]
    fn read_sentence_speaks_and_interrupts() {
        let mut d = drill(EvaluationMode::Batch);
        d.toggle_speaking().unwrap();
        d.read_sentence();
        assert_eq!(d.sink().spoken, vec!["I like tea."]);
        assert_eq!(d.source().aborts, 1);
        assert!(!d.is_listening());
    }

    #[test]
    fn sensitivity_applies_to_the_next_turn() {
        let mut d = drill(EvaluationMode::Batch);
        d.set_difficulty(Difficulty::Intermediate);
        d.set_sensitivity(Sensitivity::Strict);
        d.toggle_speaking().unwrap();
        say(&mut d, "the cut sat on the mat");
        d.on_speech(SpeechEvent::SessionEnded);
        assert_eq!(d.accuracy(), Some(83));

        d.set_sensitivity(Sensitivity::Loose);
        assert_eq!(d.accuracy(), Some(83));
        d.toggle_speaking().unwrap();
        say(&mut d, "the cut sat on the mat");
        d.on_speech(SpeechEvent::SessionEnded);
        assert_eq!(d.accuracy(), Some(100));
    }

    #[test]
    fn streaming_mode_updates_tokens_live() {
        let mut d = drill(EvaluationMode::Streaming);
        d.set_difficulty(Difficulty::Intermediate);
        d.toggle_speaking().unwrap();
        d.on_speech(SpeechEvent::Transcript {
            text: "the cat".into(),
            is_final: false,
        });
        let verdicts: Vec<_> = d.tokens().iter().map(|t| t.correct).collect();
        assert_eq!(verdicts[..3], [Some(true), Some(true), None]);
        assert_eq!(d.transcript(), "");

        say(&mut d, "the cat sat");
        d.on_speech(SpeechEvent::Transcript {
            text: "on".into(),
            is_final: false,
        });
        assert_eq!(d.tokens()[3].correct, Some(true));
        assert_eq!(d.accuracy(), None);

        d.on_speech(SpeechEvent::SessionEnded);
        assert_eq!(d.accuracy(), Some(50));
    }
}
