//! Composition state machine.
//!
//! ## Phases
//!
//! ```text
//!              one hand                 held ≥ hand_detection_delay
//! AwaitingHand ────────► Stabilizing ───────────────────────────► Composing ◄──► AwaitingSpaceConfirm
//!      ▲                      │ hand lost                             │ hand lost, letters non-empty
//!      │                      ▼                                       ▼
//!      │                 AwaitingHand                             Finalized ── one hand → refused
//!      │
//!      └──── two hands held ≥ reset_delay (from any phase; reported as Resetting meanwhile)
//! ```
//!
//! Each [`Composer::tick`] runs exactly one of the no-hand / one-hand /
//! two-hand branches. Letter, space and reset holds are independent
//! [`hold::HoldTimer`]s driven by the caller's timestamps, so the machine is
//! fully deterministic under test.

pub mod hold;
pub mod session;

pub use session::{Phase, Session};

use std::time::{Duration, Instant};

use tracing::{debug, info, info_span, Span};

use crate::classifier::{classify, Symbol};
use crate::correction::PhraseCorrector;
use crate::ipc::events::{ComposerEvent, Countdown, CountdownKind, SessionSnapshot};
use crate::pose::HandPose;
use crate::speech::Announcement;

use hold::HoldTimer;

/// Placeholder replaced by the phrase in announcement templates.
pub const PHRASE_PLACEHOLDER: &str = "{phrase}";

/// Configuration for `Composer`.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// A new hand must stay in view this long before letters are read.
    /// Default: 1.5 s.
    pub hand_detection_delay: Duration,
    /// The same letter must be held this long to commit. Default: 1.5 s.
    pub letter_save_delay: Duration,
    /// The open hand must be held this long to commit a space. Default: 1.2 s.
    pub space_delay: Duration,
    /// Two hands must be held this long to reset the session. Default: 2 s.
    pub reset_delay: Duration,
    /// Silence between the signed and the corrected phrase. Default: 300 ms.
    pub phrase_pause: Duration,
    /// Announces the phrase as signed when a correction follows.
    pub signed_template: String,
    /// Announces the corrected phrase.
    pub corrected_template: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            hand_detection_delay: Duration::from_millis(1_500),
            letter_save_delay: Duration::from_millis(1_500),
            space_delay: Duration::from_millis(1_200),
            reset_delay: Duration::from_millis(2_000),
            phrase_pause: Duration::from_millis(300),
            signed_template: "Ha composto: {phrase}".to_string(),
            corrected_template: "Forse intendeva: {phrase}".to_string(),
        }
    }
}

/// What one tick produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub events: Vec<ComposerEvent>,
    pub announcements: Vec<Announcement>,
}

impl TickOutcome {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.announcements.is_empty()
    }

    pub fn extend(&mut self, other: TickOutcome) {
        self.events.extend(other.events);
        self.announcements.extend(other.announcements);
    }
}

pub struct Composer {
    config: ComposerConfig,
    session: Session,
    corrector: PhraseCorrector,
    session_id: u64,
    span: Span,
}

impl Composer {
    pub fn new(config: ComposerConfig, corrector: PhraseCorrector) -> Self {
        Self {
            config,
            session: Session::default(),
            corrector,
            session_id: 1,
            span: info_span!("session", id = 1_u64),
        }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Starts at 1, incremented by every completed reset.
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn corrector_mut(&mut self) -> &mut PhraseCorrector {
        &mut self.corrector
    }

    /// Advance the machine by one frame.
    ///
    /// `hands` is every hand detected in the frame; `now` must not go
    /// backwards between calls.
    pub fn tick(&mut self, hands: &[HandPose], now: Instant) -> TickOutcome {
        let span = self.span.clone();
        let _entered = span.enter();

        let before = self.session.phase();
        let mut out = TickOutcome::default();

        match hands {
            [] => self.on_no_hand(&mut out),
            [hand] => self.on_single_hand(hand, now, &mut out),
            _ => self.on_two_hands(now, &mut out),
        }
        self.session.last_hand_count = hands.len().min(2);

        let after = self.session.phase();
        if before != after {
            debug!(from = ?before, to = ?after, "phase changed");
            out.events
                .insert(0, ComposerEvent::PhaseChanged { from: before, to: after });
        }
        out
    }

    /// Display state at `now`.
    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        let s = &self.session;
        let countdown = if s.two_hands.is_running() {
            countdown(CountdownKind::Reset, &s.two_hands, self.config.reset_delay, now)
        } else {
            match s.phase {
                Phase::Stabilizing => countdown(
                    CountdownKind::Stabilizing,
                    &s.hand_presence,
                    self.config.hand_detection_delay,
                    now,
                ),
                Phase::AwaitingSpaceConfirm => countdown(
                    CountdownKind::Space,
                    &s.space_hold,
                    self.config.space_delay,
                    now,
                ),
                Phase::Composing if s.last_symbol().as_letter().is_some() => countdown(
                    CountdownKind::Letter,
                    s.debouncer.hold(),
                    self.config.letter_save_delay,
                    now,
                ),
                _ => None,
            }
        };

        SessionSnapshot {
            phase: s.phase(),
            hands: s.last_hand_count,
            symbol: s.last_symbol(),
            countdown,
            text: s.text(),
            final_phrase: s.final_phrase.clone(),
            corrected_phrase: s.corrected_phrase.clone(),
        }
    }

    // ── Branches ─────────────────────────────────────────────────────────────

    fn on_no_hand(&mut self, out: &mut TickOutcome) {
        let s = &mut self.session;
        s.two_hands.clear();
        s.clear_single_hand_timers();

        match s.phase {
            Phase::Stabilizing => {
                debug!("hand lost before stabilizing");
                s.phase = Phase::AwaitingHand;
            }
            Phase::Composing | Phase::AwaitingSpaceConfirm => {
                s.phase = Phase::Composing;
                if !s.letters.is_empty() {
                    self.finalize(out);
                }
            }
            _ => {}
        }
    }

    fn on_single_hand(&mut self, hand: &HandPose, now: Instant, out: &mut TickOutcome) {
        let s = &mut self.session;
        s.two_hands.clear();

        match s.phase {
            Phase::Finalized => {
                if s.last_hand_count != 1 {
                    info!("hand shown after finalization; reset with two hands first");
                    out.events.push(ComposerEvent::CompositionRefused {
                        phrase: s.final_phrase.clone(),
                    });
                }
                return;
            }
            Phase::AwaitingHand => {
                debug!("hand detected; stabilizing");
                s.hand_presence.restart(now);
                s.phase = Phase::Stabilizing;
            }
            Phase::Stabilizing if !s.hand_presence.is_running() => {
                debug!("single hand back after two hands; stabilizing again");
                s.hand_presence.restart(now);
            }
            _ => {}
        }

        if s.phase == Phase::Stabilizing {
            if !s.hand_presence.has_elapsed(now, self.config.hand_detection_delay) {
                return;
            }
            s.hand_presence.clear();
            s.phase = Phase::Composing;
            info!("hand stable; composing");
        }

        self.compose(hand, now, out);
    }

    /// Runs the reset countdown without touching the composition phase or
    /// the symbol hold. The presence and space timers are the only state
    /// dropped, since at most one of them and the reset timer may run.
    fn on_two_hands(&mut self, now: Instant, out: &mut TickOutcome) {
        let s = &mut self.session;
        s.hand_presence.clear();
        s.space_hold.clear();

        if s.two_hands.start_if_idle(now) {
            info!(
                delay_ms = self.config.reset_delay.as_millis() as u64,
                "two hands detected; reset countdown started"
            );
        }
        if s.two_hands.has_elapsed(now, self.config.reset_delay) {
            self.reset(out);
        }
    }

    // ── Composition ──────────────────────────────────────────────────────────

    fn compose(&mut self, hand: &HandPose, now: Instant, out: &mut TickOutcome) {
        let symbol = classify(hand);
        let s = &mut self.session;

        if symbol == Symbol::Space {
            s.debouncer.observe(Symbol::Space, now);
            if s.space_hold.start_if_idle(now) {
                debug!("open hand; confirming space");
            }
            s.phase = Phase::AwaitingSpaceConfirm;

            if s.space_hold.has_elapsed(now, self.config.space_delay) {
                s.space_hold.clear();
                s.phase = Phase::Composing;
                if s.letters.last() == Some(&' ') {
                    debug!("space already pending; ignored");
                } else {
                    s.letters.push(' ');
                    let text = s.text();
                    info!(text = %text, "space committed");
                    out.events.push(ComposerEvent::SpaceCommitted { text });
                    out.announcements.push(Announcement::Space);
                }
            }
            return;
        }

        if s.space_hold.is_running() {
            debug!("open hand released before space confirmed");
            s.space_hold.clear();
        }
        s.phase = Phase::Composing;

        if s.debouncer.observe(symbol, now) {
            debug!(symbol = %symbol, "symbol changed");
            return;
        }
        let Symbol::Letter(letter) = symbol else {
            return;
        };
        if s.debouncer.held_for(now) >= self.config.letter_save_delay {
            s.letters.push(letter);
            s.debouncer.rearm(now);
            let text = s.text();
            info!(letter = %letter, text = %text, "letter committed");
            out.events.push(ComposerEvent::LetterCommitted { letter, text });
            out.announcements.push(Announcement::Letter(letter));
        }
    }

    fn finalize(&mut self, out: &mut TickOutcome) {
        let phrase = self.session.text();
        let result = self.corrector.correct(&phrase);

        if result.corrections.is_empty() {
            out.announcements.push(Announcement::Phrase(phrase.clone()));
        } else {
            out.announcements.push(Announcement::Phrase(render(
                &self.config.signed_template,
                &phrase,
            )));
            out.announcements
                .push(Announcement::Pause(self.config.phrase_pause));
            out.announcements.push(Announcement::Phrase(render(
                &self.config.corrected_template,
                &result.corrected_phrase,
            )));
        }

        info!(
            phrase = %phrase,
            corrected = %result.corrected_phrase,
            corrections = result.corrections.len(),
            "phrase finalized"
        );
        out.events.push(ComposerEvent::PhraseFinalized {
            phrase: phrase.clone(),
            corrected_phrase: result.corrected_phrase.clone(),
            corrections: result.corrections.clone(),
            candidates_by_word: result.candidates_by_word.clone(),
            backend_available: result.backend_available,
        });

        self.session.store_correction(phrase, result);
        self.session.phase = Phase::Finalized;
    }

    fn reset(&mut self, out: &mut TickOutcome) {
        let discarded = self.session.text();
        self.session = Session::default();
        info!(discarded = %discarded, "session reset");
        out.events.push(ComposerEvent::SessionReset { discarded });

        self.session_id += 1;
        self.span = info_span!("session", id = self.session_id);
    }
}

fn render(template: &str, phrase: &str) -> String {
    template.replace(PHRASE_PLACEHOLDER, phrase)
}

fn countdown(
    kind: CountdownKind,
    timer: &HoldTimer,
    delay: Duration,
    now: Instant,
) -> Option<Countdown> {
    timer.remaining(now, delay).map(|remaining| Countdown {
        kind,
        remaining_ms: remaining.as_millis() as u64,
        total_ms: delay.as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::frequency::FrequencyDictionary;
    use crate::pose::synth;

    const STEP_MS: u64 = 100;

    struct Harness {
        composer: Composer,
        t0: Instant,
    }

    impl Harness {
        fn new() -> Self {
            let mut dict = FrequencyDictionary::new();
            dict.extend_from_word_list("ciao 10\n").expect("word list");
            Self::with_corrector(PhraseCorrector::new(dict))
        }

        fn with_corrector(corrector: PhraseCorrector) -> Self {
            Self {
                composer: Composer::new(ComposerConfig::default(), corrector),
                t0: Instant::now(),
            }
        }

        fn at(&self, ms: u64) -> Instant {
            self.t0 + Duration::from_millis(ms)
        }

        fn tick(&mut self, hands: &[HandPose], ms: u64) -> TickOutcome {
            let now = self.at(ms);
            self.composer.tick(hands, now)
        }

        /// Tick every STEP_MS from `from` to `to` inclusive.
        fn hold(&mut self, hands: &[HandPose], from: u64, to: u64) -> TickOutcome {
            let mut merged = TickOutcome::default();
            let mut t = from;
            while t <= to {
                merged.extend(self.tick(hands, t));
                t += STEP_MS;
            }
            merged
        }

        fn session(&self) -> &Session {
            self.composer.session()
        }
    }

    fn pose(c: char) -> HandPose {
        synth::letter_pose(c).expect("letter fixture")
    }

    fn letters_committed(out: &TickOutcome) -> Vec<char> {
        out.events
            .iter()
            .filter_map(|e| match e {
                ComposerEvent::LetterCommitted { letter, .. } => Some(*letter),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn stabilizes_before_reading_letters() {
        let mut h = Harness::new();
        let a = [pose('A')];

        let out = h.tick(&a, 0);
        assert_eq!(h.session().phase(), Phase::Stabilizing);
        assert!(h.session().hand_presence_start().is_some());
        assert_eq!(
            out.events,
            vec![ComposerEvent::PhaseChanged {
                from: Phase::AwaitingHand,
                to: Phase::Stabilizing
            }]
        );

        h.hold(&a, 100, 1_400);
        assert_eq!(h.session().phase(), Phase::Stabilizing);

        h.tick(&a, 1_500);
        assert_eq!(h.session().phase(), Phase::Composing);
        assert_eq!(h.session().hand_presence_start(), None);
        assert_eq!(h.session().last_symbol(), Symbol::Letter('A'));
        assert_eq!(h.session().symbol_hold_start(), Some(h.at(1_500)));
    }

    #[test]
    fn letter_commits_after_hold_and_rearms() {
        let mut h = Harness::new();
        let a = [pose('A')];
        h.hold(&a, 0, 1_500);

        let early = h.hold(&a, 1_600, 2_900);
        assert!(letters_committed(&early).is_empty());

        let out = h.tick(&a, 3_000);
        assert_eq!(letters_committed(&out), vec!['A']);
        assert_eq!(out.announcements, vec![Announcement::Letter('A')]);
        assert_eq!(h.session().letters(), &['A']);

        let out = h.hold(&a, 3_100, 4_500);
        assert_eq!(letters_committed(&out), vec!['A']);
        assert_eq!(h.session().text(), "AA");
    }

    #[test]
    fn changing_symbol_restarts_the_hold() {
        let mut h = Harness::new();
        h.hold(&[pose('C')], 0, 2_500);
        let out = h.hold(&[pose('I')], 2_600, 4_000);
        assert!(letters_committed(&out).is_empty());
        let out = h.tick(&[pose('I')], 4_100);
        assert_eq!(letters_committed(&out), vec!['I']);
        assert_eq!(h.session().text(), "I");
    }

    #[test]
    fn unmatched_pose_never_commits() {
        let mut h = Harness::new();
        let none = [synth::unmatched_pose()];
        let out = h.hold(&none, 0, 8_000);
        assert!(letters_committed(&out).is_empty());
        assert!(h.session().letters().is_empty());
        assert_eq!(h.session().phase(), Phase::Composing);
        assert_eq!(h.session().last_symbol(), Symbol::None);
    }

    #[test]
    fn hand_lost_while_stabilizing_starts_over() {
        let mut h = Harness::new();
        let a = [pose('A')];
        h.hold(&a, 0, 1_000);
        h.tick(&[], 1_100);
        assert_eq!(h.session().phase(), Phase::AwaitingHand);
        assert_eq!(h.session().hand_presence_start(), None);

        h.hold(&a, 1_200, 2_600);
        assert_eq!(h.session().phase(), Phase::Stabilizing);
        h.tick(&a, 2_700);
        assert_eq!(h.session().phase(), Phase::Composing);
    }

    #[test]
    fn space_commits_once_per_gap() {
        let mut h = Harness::new();
        h.hold(&[pose('A')], 0, 3_000);
        assert_eq!(h.session().text(), "A");

        let open = [synth::space_pose()];
        h.tick(&open, 3_100);
        assert_eq!(h.session().phase(), Phase::AwaitingSpaceConfirm);
        assert_eq!(h.session().space_hold_start(), Some(h.at(3_100)));

        let out = h.hold(&open, 3_200, 7_000);
        assert_eq!(h.session().text(), "A ");
        let spaces = out
            .events
            .iter()
            .filter(|e| matches!(e, ComposerEvent::SpaceCommitted { .. }))
            .count();
        assert_eq!(spaces, 1);
        assert_eq!(
            out.announcements
                .iter()
                .filter(|a| **a == Announcement::Space)
                .count(),
            1
        );
    }

    #[test]
    fn releasing_open_hand_early_cancels_space() {
        let mut h = Harness::new();
        h.hold(&[pose('A')], 0, 3_000);
        h.hold(&[synth::space_pose()], 3_100, 4_000);
        h.tick(&[pose('B')], 4_100);
        assert_eq!(h.session().phase(), Phase::Composing);
        assert_eq!(h.session().space_hold_start(), None);
        assert_eq!(h.session().text(), "A");
    }

    #[test]
    fn letter_after_space_needs_a_full_hold() {
        let mut h = Harness::new();
        h.hold(&[pose('A')], 0, 3_000);
        h.hold(&[synth::space_pose()], 3_100, 4_300);
        assert_eq!(h.session().text(), "A ");
        let out = h.hold(&[pose('A')], 4_400, 5_800);
        assert!(letters_committed(&out).is_empty());
        h.tick(&[pose('A')], 5_900);
        assert_eq!(h.session().text(), "A A");
    }

    #[test]
    fn no_hand_with_empty_composition_keeps_composing() {
        let mut h = Harness::new();
        h.hold(&[synth::unmatched_pose()], 0, 2_000);
        let out = h.tick(&[], 2_100);
        assert_eq!(h.session().phase(), Phase::Composing);
        assert!(out.is_empty());
        assert_eq!(h.session().last_symbol(), Symbol::None);
        assert_eq!(h.session().symbol_hold_start(), None);
    }

    #[test]
    fn finalizes_without_correction_when_phrase_is_known() {
        let mut h = Harness::new();
        h.hold(&[pose('A')], 0, 3_000);
        let out = h.tick(&[], 3_100);

        assert_eq!(h.session().phase(), Phase::Finalized);
        assert_eq!(h.session().final_phrase(), "A");
        assert_eq!(h.session().corrected_phrase(), "A");
        assert_eq!(h.session().letters(), &['A']);
        assert_eq!(out.announcements, vec![Announcement::Phrase("A".into())]);
        assert!(matches!(
            out.events.last(),
            Some(ComposerEvent::PhraseFinalized { phrase, .. }) if phrase == "A"
        ));
    }

    #[test]
    fn finalize_with_correction_announces_both_phrases() {
        let mut h = Harness::new();
        let mut t = 0;
        h.hold(&[pose('C')], t, 3_000);
        t = 3_100;
        for c in ['I', 'A', 'X'] {
            h.hold(&[pose(c)], t, t + 1_500);
            t += 1_600;
        }
        assert_eq!(h.session().text(), "CIAX");

        let out = h.tick(&[], t);
        assert_eq!(h.session().final_phrase(), "CIAX");
        assert_eq!(h.session().corrected_phrase(), "CIAO");
        assert_eq!(h.session().corrections().len(), 1);
        assert_eq!(h.session().candidates_by_word()[0].word, "CIAX");
        assert_eq!(
            out.announcements,
            vec![
                Announcement::Phrase("Ha composto: CIAX".into()),
                Announcement::Pause(Duration::from_millis(300)),
                Announcement::Phrase("Forse intendeva: CIAO".into()),
            ]
        );
    }

    #[test]
    fn finalized_session_refuses_new_hand_once_per_appearance() {
        let mut h = Harness::new();
        h.hold(&[pose('A')], 0, 3_000);
        h.tick(&[], 3_100);

        let out = h.hold(&[pose('B')], 3_200, 6_000);
        let refusals = out
            .events
            .iter()
            .filter(|e| matches!(e, ComposerEvent::CompositionRefused { .. }))
            .count();
        assert_eq!(refusals, 1);
        assert_eq!(h.session().text(), "A");
        assert_eq!(h.session().phase(), Phase::Finalized);

        h.tick(&[], 6_100);
        let out = h.tick(&[pose('B')], 6_200);
        assert_eq!(
            out.events,
            vec![ComposerEvent::CompositionRefused { phrase: "A".into() }]
        );
    }

    #[test]
    fn two_hands_reset_after_delay() {
        let mut h = Harness::new();
        h.hold(&[pose('A')], 0, 3_000);
        h.tick(&[], 3_100);

        let both = [pose('A'), pose('B')];
        h.hold(&both, 3_200, 5_100);
        assert_eq!(h.session().phase(), Phase::Resetting);
        assert_eq!(h.session().composition_phase(), Phase::Finalized);
        assert_eq!(h.session().two_hand_start(), Some(h.at(3_200)));

        let out = h.tick(&both, 5_200);
        assert!(out
            .events
            .contains(&ComposerEvent::SessionReset { discarded: "A".into() }));
        assert_eq!(h.session().phase(), Phase::AwaitingHand);
        assert!(h.session().letters().is_empty());
        assert_eq!(h.session().final_phrase(), "");
        assert_eq!(h.composer.session_id(), 2);
    }

    #[test]
    fn interrupted_reset_leaves_composition_untouched() {
        let mut h = Harness::new();
        h.hold(&[pose('A')], 0, 3_000);
        let both = [pose('A'), pose('B')];
        h.hold(&both, 3_100, 4_900);
        assert_eq!(h.session().phase(), Phase::Resetting);

        h.tick(&[pose('B')], 5_000);
        assert_eq!(h.session().phase(), Phase::Composing);
        assert_eq!(h.session().two_hand_start(), None);
        assert_eq!(h.session().text(), "A");
        assert_eq!(h.session().final_phrase(), "");
        assert_eq!(h.composer.session_id(), 1);
    }

    #[test]
    fn two_hand_flicker_keeps_letter_hold() {
        let mut h = Harness::new();
        let a = [pose('A')];
        let out = h.hold(&a, 0, 4_000);
        assert_eq!(letters_committed(&out), vec!['A']);

        let symbol = h.session().last_symbol();
        let hold_start = h.session().symbol_hold_start();
        assert_eq!(symbol, Symbol::Letter('A'));
        assert_eq!(hold_start, Some(h.at(3_000)));

        h.tick(&[pose('A'), pose('B')], 4_100);
        assert_eq!(h.session().phase(), Phase::Resetting);
        assert_eq!(h.session().composition_phase(), Phase::Composing);
        assert_eq!(h.session().last_symbol(), symbol);
        assert_eq!(h.session().symbol_hold_start(), hold_start);

        let out = h.tick(&a, 4_200);
        assert!(letters_committed(&out).is_empty());
        assert_eq!(h.session().phase(), Phase::Composing);
        assert_eq!(h.session().symbol_hold_start(), hold_start);

        // The hold that began at 3000 ms completes on schedule.
        let out = h.hold(&a, 4_300, 4_500);
        assert_eq!(letters_committed(&out), vec!['A']);
        assert_eq!(h.session().text(), "AA");
    }

    #[test]
    fn two_hands_during_space_hold_keep_phase() {
        let mut h = Harness::new();
        h.hold(&[pose('A')], 0, 3_000);
        h.hold(&[synth::space_pose()], 3_100, 3_500);
        assert_eq!(h.session().phase(), Phase::AwaitingSpaceConfirm);

        h.tick(&[pose('A'), pose('B')], 3_600);
        assert_eq!(h.session().composition_phase(), Phase::AwaitingSpaceConfirm);
        assert_eq!(h.session().space_hold_start(), None);
        assert_eq!(h.session().two_hand_start(), Some(h.at(3_600)));

        h.tick(&[synth::space_pose()], 3_700);
        assert_eq!(h.session().phase(), Phase::AwaitingSpaceConfirm);
        assert_eq!(h.session().space_hold_start(), Some(h.at(3_700)));
        assert_eq!(h.session().two_hand_start(), None);
    }

    #[test]
    fn two_hands_while_stabilizing_discard_presence() {
        let mut h = Harness::new();
        h.hold(&[pose('A')], 0, 800);
        h.tick(&[pose('A'), pose('B')], 900);
        assert_eq!(h.session().hand_presence_start(), None);
        h.tick(&[pose('A')], 1_000);
        assert_eq!(h.session().phase(), Phase::Stabilizing);
        assert_eq!(h.session().hand_presence_start(), Some(h.at(1_000)));
    }

    #[test]
    fn snapshot_reports_active_countdown() {
        let mut h = Harness::new();
        let a = [pose('A')];

        h.tick(&a, 0);
        let snap = h.composer.snapshot(h.at(500));
        assert_eq!(snap.phase, Phase::Stabilizing);
        assert_eq!(
            snap.countdown,
            Some(Countdown {
                kind: CountdownKind::Stabilizing,
                remaining_ms: 1_000,
                total_ms: 1_500
            })
        );

        h.hold(&a, 100, 2_000);
        let snap = h.composer.snapshot(h.at(2_000));
        assert_eq!(snap.symbol, Symbol::Letter('A'));
        assert_eq!(
            snap.countdown.map(|c| (c.kind, c.remaining_ms)),
            Some((CountdownKind::Letter, 1_000))
        );

        h.tick(&[pose('A'), pose('B')], 2_100);
        let snap = h.composer.snapshot(h.at(2_600));
        assert_eq!(snap.phase, Phase::Resetting);
        assert_eq!(snap.hands, 2);
        assert_eq!(
            snap.countdown.map(|c| (c.kind, c.remaining_ms)),
            Some((CountdownKind::Reset, 1_500))
        );
    }

    #[test]
    fn unavailable_corrector_passes_phrase_through() {
        let mut h = Harness::with_corrector(PhraseCorrector::unavailable());
        h.hold(&[pose('C')], 0, 3_000);
        h.hold(&[pose('I')], 3_100, 4_600);
        h.hold(&[pose('A')], 4_700, 6_200);
        h.hold(&[pose('X')], 6_300, 7_800);
        let out = h.tick(&[], 7_900);
        assert_eq!(h.session().corrected_phrase(), "CIAX");
        assert_eq!(out.announcements, vec![Announcement::Phrase("CIAX".into())]);
        assert!(matches!(
            out.events.last(),
            Some(ComposerEvent::PhraseFinalized { backend_available: false, .. })
        ));
    }
}
