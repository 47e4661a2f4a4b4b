//! # signa-core
//!
//! Reusable gesture-to-text engine SDK.
//!
//! ## Architecture
//!
//! ```text
//! PoseSource → Frame{hands} → Pipeline(spawn_blocking)
//!                                   │
//!                          classifier::classify (per hand)
//!                                   │
//!                        Composer::tick (state machine)
//!                           │                 │
//!                 PhraseCorrector      AnnouncementSender
//!                           │                 │
//!   broadcast::Sender<SessionEvent>    AnnouncementQueue worker → Speaker
//! ```
//!
//! The composer is single-threaded and driven by caller-supplied timestamps.
//! Speech output never blocks the frame loop: announcements are queued and
//! delivered in order by a dedicated worker thread.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod classifier;
pub mod composer;
pub mod correction;
pub mod engine;
pub mod error;
pub mod ipc;
pub mod pose;
pub mod source;
pub mod speech;

// Convenience re-exports for downstream crates
pub use classifier::{classify, Symbol};
pub use composer::{Composer, ComposerConfig, Phase, Session, TickOutcome};
pub use correction::{
    frequency::FrequencyDictionary, CorrectionResult, Dictionary, PhraseCorrector,
};
pub use engine::{EngineConfig, SignaEngine};
pub use error::SignaError;
pub use ipc::events::{
    ComposerEvent, EngineStatus, EngineStatusEvent, SessionEvent, SessionSnapshot,
};
pub use pose::{Frame, HandPose, Landmark, Point};
pub use source::PoseSource;
pub use speech::{
    queue::{AnnouncementQueue, AnnouncementSender, QueueConfig},
    Announcement, Speaker,
};
