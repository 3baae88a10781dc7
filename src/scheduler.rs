//! Timers owned by the engines.
//!
//! Engines ask a [`Scheduler`] to fire a [`Timer`] and cancel it again when
//! they stop; the host delivers each firing back through the engine's
//! `on_timer` handler.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Falling-word spawner.
    Spawn,
    /// Per-display-refresh animation clock.
    Frame,
    /// Ends a beginner drill turn after a pause in speech.
    SilenceCutoff,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    Every(Duration),
    EveryFrame,
    Once(Duration),
}

pub trait Scheduler {
    /// Arms `timer`, replacing any previous schedule for it.
    fn schedule(&mut self, timer: Timer, cadence: Cadence);
    /// Disarms `timer`; a no-op when it is not scheduled.
    fn cancel(&mut self, timer: Timer);
    fn is_scheduled(&self, timer: Timer) -> bool;
}
