//! Events emitted by the composition engine.
//!
//! | Event | Broadcast channel |
//! |-------|-------------------|
//! | `SessionEvent` | `SignaEngine::subscribe_events` |
//! | `SessionSnapshot` | `SignaEngine::subscribe_snapshots` |
//! | `EngineStatusEvent` | `SignaEngine::subscribe_status` |

use serde::{Deserialize, Serialize};

use crate::classifier::Symbol;
use crate::composer::Phase;
use crate::correction::{WordCandidates, WordCorrection};

// ---------------------------------------------------------------------------
// Composition events
// ---------------------------------------------------------------------------

/// Something the composer decided on this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ComposerEvent {
    #[serde(rename_all = "camelCase")]
    PhaseChanged { from: Phase, to: Phase },
    /// A letter was appended. `text` is the accumulated text afterwards.
    #[serde(rename_all = "camelCase")]
    LetterCommitted { letter: char, text: String },
    #[serde(rename_all = "camelCase")]
    SpaceCommitted { text: String },
    /// The hand left the frame and the phrase was closed and corrected.
    #[serde(rename_all = "camelCase")]
    PhraseFinalized {
        phrase: String,
        corrected_phrase: String,
        corrections: Vec<WordCorrection>,
        candidates_by_word: Vec<WordCandidates>,
        backend_available: bool,
    },
    /// A hand appeared after finalization; two hands must reset first.
    #[serde(rename_all = "camelCase")]
    CompositionRefused { phrase: String },
    /// Two-hand reset completed. `discarded` is the text that was cleared.
    #[serde(rename_all = "camelCase")]
    SessionReset { discarded: String },
}

/// A composer event stamped with the engine's sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    /// Monotonically increasing event sequence number.
    pub seq: u64,
    #[serde(flatten)]
    pub event: ComposerEvent,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Which timer a countdown belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownKind {
    Stabilizing,
    Letter,
    Space,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub kind: CountdownKind,
    pub remaining_ms: u64,
    pub total_ms: u64,
}

/// Display state after one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: Phase,
    /// Hands seen on this tick (capped at 2).
    pub hands: usize,
    /// Symbol currently being held, `NONE` when no hand is classified.
    pub symbol: Symbol,
    pub countdown: Option<Countdown>,
    /// Accumulated letters and spaces.
    pub text: String,
    pub final_phrase: String,
    pub corrected_phrase: String,
}

// ---------------------------------------------------------------------------
// Engine status events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatusEvent {
    pub status: EngineStatus,
    /// Optional human-readable detail (e.g. error message).
    pub detail: Option<String>,
}

/// Current state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    /// Engine created but `start()` not yet called.
    Idle,
    /// Pose source open, frames flowing through the composer.
    Running,
    /// Stopped by request or because the source ended; may be restarted.
    Stopped,
    /// Unrecoverable error; restart required.
    Error,
}
