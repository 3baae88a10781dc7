//! Boundary with the browser's speech engines.
//!
//! The engines never talk to the Web Speech API directly: they drive a
//! [`SpeechSource`] / [`SpeechSink`] and receive [`SpeechEvent`]s from the host.

use crate::error::ArcadeError;

/// Recognition locale used for every session and utterance.
pub const SPEECH_LOCALE: &str = "en-US";

/// Something that turns microphone audio into transcript events.
pub trait SpeechSource {
    /// Begins a listening session. Fails with [`ArcadeError::SpeechUnsupported`]
    /// when the host has no recognizer.
    fn start(&mut self) -> Result<(), ArcadeError>;
    /// Ends the session; pending audio may still produce a final result.
    fn stop(&mut self);
    /// Ends the session and discards pending audio.
    fn abort(&mut self) {
        self.stop();
    }
}

/// Text-to-speech output. Fire and forget.
pub trait SpeechSink {
    fn speak(&mut self, text: &str);
    fn cancel(&mut self);
}

/// Observation reported by the host's recognizer.
#[derive(Clone, Debug, PartialEq)]
pub enum SpeechEvent {
    Transcript { text: String, is_final: bool },
    SessionEnded,
    Error(String),
}

/// Listening state of a supervised recognizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenState {
    Stopped,
    Listening,
    /// Stop or abort requested; the host has not reported the session end yet.
    Stopping,
}

/// What a reported session end meant to the owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// A new session was opened right away; the owner keeps listening.
    Resumed,
    /// Listening is over.
    Ended,
}

/// Keeps a recognizer alive for as long as its owner wants it.
///
/// Browsers end recognition sessions on their own (silence, network hiccups)
/// and refuse a new `start` until the previous session has reported its end.
/// The owner reports every session end and says whether listening should
/// continue; the restart decision never lives in the recognizer callbacks.
/// A `start` requested while the old session is still closing is deferred to
/// that session's end.
#[derive(Debug)]
pub struct Recognizer<S> {
    source: S,
    state: ListenState,
    start_pending: bool,
    restarts: u32,
}

impl<S: SpeechSource> Recognizer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: ListenState::Stopped,
            start_pending: false,
            restarts: 0,
        }
    }

    /// Opens a session, or queues one behind a session that is still closing.
    pub fn start(&mut self) -> Result<(), ArcadeError> {
        match self.state {
            ListenState::Listening => {}
            ListenState::Stopping => self.start_pending = true,
            ListenState::Stopped => {
                self.source.start()?;
                self.state = ListenState::Listening;
            }
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        self.start_pending = false;
        if self.state == ListenState::Listening {
            self.source.stop();
            self.state = ListenState::Stopping;
        }
    }

    /// Like [`Recognizer::stop`] but discards audio not yet transcribed.
    pub fn abort(&mut self) {
        self.start_pending = false;
        if self.state == ListenState::Listening {
            self.source.abort();
            self.state = ListenState::Stopping;
        }
    }

    /// Handles the end of a browser session.
    ///
    /// `keep_listening` only matters for sessions the browser closed on its
    /// own; ends of stopped sessions honour a queued `start` instead.
    pub fn on_session_end(&mut self, keep_listening: bool) -> SessionEnd {
        let reopen = match self.state {
            ListenState::Stopped => return SessionEnd::Ended,
            ListenState::Stopping => std::mem::take(&mut self.start_pending),
            ListenState::Listening => keep_listening,
        };
        if !reopen {
            self.state = ListenState::Stopped;
            return SessionEnd::Ended;
        }
        match self.source.start() {
            Ok(()) => {
                self.state = ListenState::Listening;
                self.restarts += 1;
                log::debug!("recognizer restarted ({} so far)", self.restarts);
                SessionEnd::Resumed
            }
            Err(err) => {
                log::warn!("recognizer restart failed: {err}");
                self.state = ListenState::Stopped;
                SessionEnd::Ended
            }
        }
    }

    /// True while a `start` waits for the previous session to close.
    pub fn start_pending(&self) -> bool {
        self.start_pending
    }

    pub fn state(&self) -> ListenState {
        self.state
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{BrowserSource, FakeSource};
    use super::*;

    #[test]
    fn restarts_only_while_wanted() {
        let mut rec = Recognizer::new(FakeSource::default());
        rec.start().unwrap();
        rec.on_session_end(true);
        assert_eq!(rec.state(), ListenState::Listening);
        assert_eq!(rec.source().starts, 2);
        assert_eq!(rec.restarts(), 1);

        rec.on_session_end(false);
        assert_eq!(rec.state(), ListenState::Stopped);
        assert_eq!(rec.source().starts, 2);
    }

    #[test]
    fn stopped_recognizer_is_not_revived() {
        let mut rec = Recognizer::new(FakeSource::default());
        rec.start().unwrap();
        rec.stop();
        assert_eq!(rec.state(), ListenState::Stopping);
        // The browser still fires `end` after an explicit stop.
        assert_eq!(rec.on_session_end(true), SessionEnd::Ended);
        assert_eq!(rec.state(), ListenState::Stopped);
        assert_eq!(rec.source().starts, 1);
        assert_eq!(rec.source().stops, 1);
    }

    #[test]
    fn start_while_closing_waits_for_the_session_end() {
        let mut rec = Recognizer::new(BrowserSource::default());
        let open = rec.source().open.clone();
        rec.start().unwrap();
        rec.stop();
        assert_eq!(rec.state(), ListenState::Stopping);

        rec.start().unwrap();
        assert!(rec.start_pending());
        assert_eq!(rec.source().starts, 1);

        open.set(false);
        assert_eq!(rec.on_session_end(false), SessionEnd::Resumed);
        assert_eq!(rec.state(), ListenState::Listening);
        assert_eq!(rec.source().starts, 2);
        assert_eq!(rec.source().rejected, 0);

        // The fresh session is supervised like any other.
        open.set(false);
        assert_eq!(rec.on_session_end(true), SessionEnd::Resumed);
        assert_eq!(rec.source().starts, 3);
        assert_eq!(rec.source().rejected, 0);
    }

    #[test]
    fn stop_cancels_a_queued_start() {
        let mut rec = Recognizer::new(BrowserSource::default());
        let open = rec.source().open.clone();
        rec.start().unwrap();
        rec.abort();
        rec.start().unwrap();
        rec.stop();
        assert!(!rec.start_pending());

        open.set(false);
        assert_eq!(rec.on_session_end(true), SessionEnd::Ended);
        assert_eq!(rec.state(), ListenState::Stopped);
        // A late duplicate end changes nothing.
        assert_eq!(rec.on_session_end(true), SessionEnd::Ended);
        assert_eq!(rec.source().starts, 1);
    }

    #[test]
    fn unsupported_source_stays_stopped() {
        let mut rec = Recognizer::new(FakeSource {
            unsupported: true,
            ..FakeSource::default()
        });
        assert_eq!(rec.start(), Err(ArcadeError::SpeechUnsupported));
        assert_eq!(rec.state(), ListenState::Stopped);
    }
}
