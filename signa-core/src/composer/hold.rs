//! Hold-time primitives.
//!
//! Every timed decision in the composer (hand stabilization, letter commit,
//! space confirm, two-hand reset) is a [`HoldTimer`]: armed when a condition
//! starts holding, cleared when it stops, and compared against a delay using
//! the caller's monotonic timestamps.

use std::time::{Duration, Instant};

use crate::classifier::Symbol;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldTimer {
    started: Option<Instant>,
}

impl HoldTimer {
    /// Arm the timer unless it is already running. Returns `true` if it was
    /// armed by this call.
    pub fn start_if_idle(&mut self, now: Instant) -> bool {
        if self.started.is_some() {
            return false;
        }
        self.started = Some(now);
        true
    }

    pub fn restart(&mut self, now: Instant) {
        self.started = Some(now);
    }

    pub fn clear(&mut self) {
        self.started = None;
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started
    }

    /// Time held so far; zero when idle or if `now` precedes the start.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started
            .map_or(Duration::ZERO, |start| now.saturating_duration_since(start))
    }

    pub fn has_elapsed(&self, now: Instant, delay: Duration) -> bool {
        self.is_running() && self.elapsed(now) >= delay
    }

    /// Time left until `delay` is reached, `None` when idle.
    pub fn remaining(&self, now: Instant, delay: Duration) -> Option<Duration> {
        self.is_running()
            .then(|| delay.saturating_sub(self.elapsed(now)))
    }
}

/// Tracks how long the same symbol has been classified in a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolDebouncer {
    current: Symbol,
    hold: HoldTimer,
}

impl SymbolDebouncer {
    /// Feed this tick's symbol. A different symbol (or the first one after a
    /// reset) restarts the hold clock and returns `true`.
    pub fn observe(&mut self, symbol: Symbol, now: Instant) -> bool {
        if symbol != self.current || !self.hold.is_running() {
            self.current = symbol;
            self.hold.restart(now);
            return true;
        }
        false
    }

    pub fn current(&self) -> Symbol {
        self.current
    }

    pub fn hold(&self) -> &HoldTimer {
        &self.hold
    }

    pub fn held_for(&self, now: Instant) -> Duration {
        self.hold.elapsed(now)
    }

    /// Start a fresh window for the same symbol (after a commit).
    pub fn rearm(&mut self, now: Instant) {
        self.hold.restart(now);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
