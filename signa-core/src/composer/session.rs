//! Composition session state.
//!
//! A [`Session`] is owned by exactly one [`super::Composer`] and only mutated
//! from its `tick`. Everything here is plain data; the transition rules live
//! in the composer.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::classifier::Symbol;
use crate::correction::{CorrectionResult, WordCandidates, WordCorrection};

use super::hold::{HoldTimer, SymbolDebouncer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// No hand yet (initial state and after a reset).
    #[default]
    AwaitingHand,
    /// A hand appeared; waiting for it to stay put before composing.
    Stabilizing,
    /// Classifying and committing letters.
    Composing,
    /// Open hand held while composing; a space commits when the hold completes.
    AwaitingSpaceConfirm,
    /// Phrase closed and corrected; only a reset starts a new one.
    Finalized,
    /// Two hands held; reported while the reset countdown runs.
    Resetting,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(super) phase: Phase,
    pub(super) letters: Vec<char>,
    pub(super) debouncer: SymbolDebouncer,
    pub(super) hand_presence: HoldTimer,
    pub(super) two_hands: HoldTimer,
    pub(super) space_hold: HoldTimer,
    pub(super) final_phrase: String,
    pub(super) corrected_phrase: String,
    pub(super) corrections: Vec<WordCorrection>,
    pub(super) candidates_by_word: Vec<WordCandidates>,
    /// Hands seen on the previous tick, capped at 2.
    pub(super) last_hand_count: usize,
}

impl Session {
    /// Phase as shown to users: `Resetting` while two hands are being held,
    /// otherwise the composition phase.
    pub fn phase(&self) -> Phase {
        if self.two_hands.is_running() {
            Phase::Resetting
        } else {
            self.phase
        }
    }

    /// Phase ignoring any reset in progress.
    pub fn composition_phase(&self) -> Phase {
        self.phase
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    /// Accumulated letters and spaces as a string.
    pub fn text(&self) -> String {
        self.letters.iter().collect()
    }

    pub fn last_symbol(&self) -> Symbol {
        self.debouncer.current()
    }

    pub fn symbol_hold_start(&self) -> Option<Instant> {
        self.debouncer.hold().started_at()
    }

    pub fn hand_presence_start(&self) -> Option<Instant> {
        self.hand_presence.started_at()
    }

    pub fn two_hand_start(&self) -> Option<Instant> {
        self.two_hands.started_at()
    }

    pub fn space_hold_start(&self) -> Option<Instant> {
        self.space_hold.started_at()
    }

    /// Empty until the session is finalized.
    pub fn final_phrase(&self) -> &str {
        &self.final_phrase
    }

    pub fn corrected_phrase(&self) -> &str {
        &self.corrected_phrase
    }

    pub fn corrections(&self) -> &[WordCorrection] {
        &self.corrections
    }

    pub fn candidates_by_word(&self) -> &[WordCandidates] {
        &self.candidates_by_word
    }

    pub fn is_finalized(&self) -> bool {
        self.phase == Phase::Finalized
    }

    pub(super) fn store_correction(&mut self, phrase: String, result: CorrectionResult) {
        self.final_phrase = phrase;
        self.corrected_phrase = result.corrected_phrase;
        self.corrections = result.corrections;
        self.candidates_by_word = result.candidates_by_word;
    }

    /// Drop every one-hand timer (hand presence, space hold, symbol hold).
    pub(super) fn clear_single_hand_timers(&mut self) {
        self.hand_presence.clear();
        self.space_hold.clear();
        self.debouncer.reset();
    }
}
