//! Blocking pipeline loop.
//!
//! ## Pipeline stages (per iteration)
//!
//! ```text
//! 1. Pull the next Frame from the PoseSource (error → empty frame)
//! 2. Map the frame timestamp onto a monotonic Instant
//! 3. Composer::tick → events + announcements
//! 4. Queue announcements (never blocks)
//! 5. Broadcast SessionEvents (stamped with seq) and a SessionSnapshot
//! ```
//!
//! This entire loop runs in `spawn_blocking`, keeping the Tokio async
//! executor free for event forwarding.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    composer::{Composer, TickOutcome},
    ipc::events::{ComposerEvent, EngineStatus, EngineStatusEvent, SessionEvent, SessionSnapshot},
    pose::Frame,
    source::PoseSource,
    speech::queue::AnnouncementSender,
};

#[derive(Default)]
pub struct EngineDiagnostics {
    pub frames: AtomicUsize,
    pub empty_frames: AtomicUsize,
    pub failed_frames: AtomicUsize,
    pub letters: AtomicUsize,
    pub spaces: AtomicUsize,
    pub phrases: AtomicUsize,
    pub resets: AtomicUsize,
}

impl EngineDiagnostics {
    pub fn reset(&self) {
        self.frames.store(0, Ordering::Relaxed);
        self.empty_frames.store(0, Ordering::Relaxed);
        self.failed_frames.store(0, Ordering::Relaxed);
        self.letters.store(0, Ordering::Relaxed);
        self.spaces.store(0, Ordering::Relaxed);
        self.phrases.store(0, Ordering::Relaxed);
        self.resets.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            frames: self.frames.load(Ordering::Relaxed),
            empty_frames: self.empty_frames.load(Ordering::Relaxed),
            failed_frames: self.failed_frames.load(Ordering::Relaxed),
            letters: self.letters.load(Ordering::Relaxed),
            spaces: self.spaces.load(Ordering::Relaxed),
            phrases: self.phrases.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
        }
    }

    fn record(&self, outcome: &TickOutcome) {
        for event in &outcome.events {
            let counter = match event {
                ComposerEvent::LetterCommitted { .. } => &self.letters,
                ComposerEvent::SpaceCommitted { .. } => &self.spaces,
                ComposerEvent::PhraseFinalized { .. } => &self.phrases,
                ComposerEvent::SessionReset { .. } => &self.resets,
                _ => continue,
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    pub frames: usize,
    pub empty_frames: usize,
    pub failed_frames: usize,
    pub letters: usize,
    pub spaces: usize,
    pub phrases: usize,
    pub resets: usize,
}

/// All context the pipeline needs, passed as one struct so the closure stays tidy.
pub struct PipelineContext {
    pub source: Box<dyn PoseSource>,
    pub composer: Composer,
    pub announcer: AnnouncementSender,
    pub empty_frame_sleep: Duration,
    pub running: Arc<AtomicBool>,
    pub event_tx: broadcast::Sender<SessionEvent>,
    pub snapshot_tx: broadcast::Sender<SessionSnapshot>,
    pub status_tx: broadcast::Sender<EngineStatusEvent>,
    pub status: Arc<Mutex<EngineStatus>>,
    pub seq: Arc<AtomicU64>,
    pub diagnostics: Arc<EngineDiagnostics>,
}

/// Run the blocking pipeline until the source ends or `ctx.running` becomes false.
pub fn run(mut ctx: PipelineContext) {
    info!("pipeline started");

    let mut clock = FrameClock::new(Instant::now());

    loop {
        // ── 0. Check running flag ─────────────────────────────────────────
        if !ctx.running.load(Ordering::Relaxed) {
            break;
        }

        // ── 1. Next frame ─────────────────────────────────────────────────
        let (frame, now) = match ctx.source.next_frame() {
            Ok(Some(frame)) => {
                let now = clock.instant_for(frame.timestamp_ms, Instant::now());
                (frame, now)
            }
            Ok(None) => {
                info!("pose source exhausted");
                break;
            }
            Err(e) => {
                ctx.diagnostics.failed_frames.fetch_add(1, Ordering::Relaxed);
                warn!("frame unreadable, treating as no hand: {e}");
                std::thread::sleep(ctx.empty_frame_sleep);
                (Frame::empty(None), clock.current())
            }
        };

        ctx.diagnostics.frames.fetch_add(1, Ordering::Relaxed);
        if frame.hands.is_empty() {
            ctx.diagnostics.empty_frames.fetch_add(1, Ordering::Relaxed);
        }

        // ── 2-3. Tick ─────────────────────────────────────────────────────
        let outcome = ctx.composer.tick(&frame.hands, now);
        ctx.diagnostics.record(&outcome);

        // ── 4. Speech ─────────────────────────────────────────────────────
        for announcement in outcome.announcements {
            if !ctx.announcer.announce(announcement) {
                warn!("announcement queue closed; dropping announcement");
            }
        }

        // ── 5. Broadcast ──────────────────────────────────────────────────
        for event in outcome.events {
            let seq = ctx.seq.fetch_add(1, Ordering::Relaxed);
            debug!(seq, ?event, "emitting session event");
            let _ = ctx.event_tx.send(SessionEvent { seq, event });
        }
        let _ = ctx.snapshot_tx.send(ctx.composer.snapshot(now));
    }

    // Source ran dry while nobody asked us to stop: report it ourselves.
    if ctx.running.swap(false, Ordering::SeqCst) {
        *ctx.status.lock() = EngineStatus::Stopped;
        let _ = ctx.status_tx.send(EngineStatusEvent {
            status: EngineStatus::Stopped,
            detail: Some("pose source ended".into()),
        });
    }

    let snap = ctx.diagnostics.snapshot();
    info!(
        frames = snap.frames,
        empty_frames = snap.empty_frames,
        failed_frames = snap.failed_frames,
        letters = snap.letters,
        spaces = snap.spaces,
        phrases = snap.phrases,
        resets = snap.resets,
        "pipeline stopped — diagnostics"
    );
}

/// Maps frame timestamps (ms since stream start) onto `Instant`s.
///
/// The stream's epoch is anchored when the first stamped frame arrives, so a
/// tracker that starts late does not lag the wall clock. Unstamped frames use
/// their arrival time. The result never goes backwards.
struct FrameClock {
    epoch: Option<Instant>,
    last: Instant,
}

impl FrameClock {
    fn new(start: Instant) -> Self {
        Self {
            epoch: None,
            last: start,
        }
    }

    fn instant_for(&mut self, timestamp_ms: Option<u64>, arrival: Instant) -> Instant {
        let now = match timestamp_ms {
            Some(ms) => {
                let offset = Duration::from_millis(ms);
                let epoch = *self
                    .epoch
                    .get_or_insert_with(|| arrival.checked_sub(offset).unwrap_or(arrival));
                epoch + offset
            }
            None => arrival,
        };
        self.last = self.last.max(now);
        self.last
    }

    /// Time of the last mapped frame. Used for frames that could not be read.
    fn current(&self) -> Instant {
        self.last
    }
}
