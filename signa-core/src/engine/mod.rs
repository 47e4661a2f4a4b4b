//! `SignaEngine`: top-level lifecycle controller.
//!
//! ## Lifecycle
//!
//! ```text
//! SignaEngine::new()
//!     └─► start(source, corrector, announcer) → source opened, pipeline spawned, status = Running
//!         ├─► stop()                        → running=false, status = Stopped
//!         └─► source exhausted              → pipeline exits, status = Stopped
//! ```
//!
//! `start()`/`stop()` report misuse as errors rather than panicking.
//!
//! ## Threading
//!
//! The pose source is opened *inside* the `spawn_blocking` closure so that a
//! source bound to its creating thread (camera bridges, pipes) never crosses
//! a thread boundary after acquisition. A sync oneshot channel propagates any
//! open errors back to the `start()` caller before a single frame is read.

pub mod pipeline;

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    composer::{Composer, ComposerConfig},
    correction::PhraseCorrector,
    error::{Result, SignaError},
    ipc::events::{EngineStatus, EngineStatusEvent, SessionEvent, SessionSnapshot},
    source::PoseSource,
    speech::queue::AnnouncementSender,
};

pub use pipeline::{DiagnosticsSnapshot, EngineDiagnostics};

/// Broadcast channel capacity: 256 events buffered for slow consumers.
const BROADCAST_CAP: usize = 256;

/// Configuration for `SignaEngine`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub composer: ComposerConfig,
    /// Sleep after a frame that could not be read, so a broken source does
    /// not spin a core. Default: 5 ms.
    pub empty_frame_sleep: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            composer: ComposerConfig::default(),
            empty_frame_sleep: Duration::from_millis(5),
        }
    }
}

/// The top-level engine handle.
///
/// `SignaEngine` is `Send + Sync`; all fields use interior mutability.
/// Wrap in `Arc<SignaEngine>` to share with event-forwarding async tasks.
pub struct SignaEngine {
    config: EngineConfig,
    /// `true` while the pipeline is active.
    running: Arc<AtomicBool>,
    status: Arc<Mutex<EngineStatus>>,
    event_tx: broadcast::Sender<SessionEvent>,
    snapshot_tx: broadcast::Sender<SessionSnapshot>,
    status_tx: broadcast::Sender<EngineStatusEvent>,
    /// Monotonically increasing event sequence counter.
    seq: Arc<AtomicU64>,
    diagnostics: Arc<EngineDiagnostics>,
    pipeline: Mutex<Option<JoinHandle<()>>>,
}

impl SignaEngine {
    pub fn new(config: EngineConfig) -> Self {
        let (event_tx, _) = broadcast::channel(BROADCAST_CAP);
        let (snapshot_tx, _) = broadcast::channel(BROADCAST_CAP);
        let (status_tx, _) = broadcast::channel(BROADCAST_CAP);

        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            status: Arc::new(Mutex::new(EngineStatus::Idle)),
            event_tx,
            snapshot_tx,
            status_tx,
            seq: Arc::new(AtomicU64::new(0)),
            diagnostics: Arc::new(EngineDiagnostics::default()),
            pipeline: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open `source` and start the pipeline with a fresh session.
    ///
    /// Blocks until the source is confirmed open (or fails), then returns.
    /// The pipeline continues running in a background blocking thread.
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// - `SignaError::AlreadyRunning` if already started.
    /// - Whatever `PoseSource::open` returns.
    pub fn start<S: PoseSource>(
        &self,
        mut source: S,
        corrector: PhraseCorrector,
        announcer: AnnouncementSender,
    ) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SignaError::AlreadyRunning);
        }

        self.diagnostics.reset();
        self.running.store(true, Ordering::SeqCst);
        self.set_status(EngineStatus::Running, None);

        let composer = Composer::new(self.config.composer.clone(), corrector);
        let empty_frame_sleep = self.config.empty_frame_sleep;
        let running = Arc::clone(&self.running);
        let event_tx = self.event_tx.clone();
        let snapshot_tx = self.snapshot_tx.clone();
        let status_tx = self.status_tx.clone();
        let status = Arc::clone(&self.status);
        let seq = Arc::clone(&self.seq);
        let diagnostics = Arc::clone(&self.diagnostics);

        let (open_tx, open_rx) = std::sync::mpsc::channel::<Result<()>>();

        let handle = tokio::task::spawn_blocking(move || {
            if let Err(e) = source.open() {
                let _ = open_tx.send(Err(e));
                running.store(false, Ordering::SeqCst);
                return;
            }
            let _ = open_tx.send(Ok(()));

            pipeline::run(pipeline::PipelineContext {
                source: Box::new(source),
                composer,
                announcer,
                empty_frame_sleep,
                running,
                event_tx,
                snapshot_tx,
                status_tx,
                status,
                seq,
                diagnostics,
            });
        });
        *self.pipeline.lock() = Some(handle);

        match open_rx.recv() {
            Ok(Ok(())) => {
                info!("engine started — reading frames");
                Ok(())
            }
            Ok(Err(e)) => {
                self.running.store(false, Ordering::SeqCst);
                self.set_status(EngineStatus::Error, Some(e.to_string()));
                Err(e)
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                self.set_status(EngineStatus::Error, Some("pipeline failed to start".into()));
                Err(SignaError::Other(anyhow::anyhow!(
                    "pipeline task died unexpectedly"
                )))
            }
        }
    }

    /// Ask the pipeline to stop after the frame it is processing.
    ///
    /// # Errors
    /// - `SignaError::NotRunning` if not currently running.
    pub fn stop(&self) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(SignaError::NotRunning);
        }

        self.running.store(false, Ordering::SeqCst);
        self.set_status(EngineStatus::Stopped, None);
        info!("engine stop requested");
        Ok(())
    }

    /// Wait for the pipeline thread to exit (source exhausted or `stop()`).
    pub async fn join(&self) {
        let handle = self.pipeline.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("pipeline task ended abnormally: {e}");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> EngineStatus {
        *self.status.lock()
    }

    /// Subscribe to composer events (letters, spaces, phrases, resets).
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Subscribe to per-frame display snapshots.
    pub fn subscribe_snapshots(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn subscribe_status(&self) -> broadcast::Receiver<EngineStatusEvent> {
        self.status_tx.subscribe()
    }

    /// Snapshot of pipeline counters for observability.
    pub fn diagnostics_snapshot(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn set_status(&self, new_status: EngineStatus, detail: Option<String>) {
        *self.status.lock() = new_status;
        let _ = self.status_tx.send(EngineStatusEvent {
            status: new_status,
            detail,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Frame;
    use crate::speech::{queue::AnnouncementQueue, queue::QueueConfig, stub::LogSpeaker};

    struct FailingSource;

    impl PoseSource for FailingSource {
        fn open(&mut self) -> Result<()> {
            Err(SignaError::PoseSource("camera unplugged".into()))
        }

        fn next_frame(&mut self) -> Result<Option<Frame>> {
            Ok(None)
        }
    }

    struct EndlessSource;

    impl PoseSource for EndlessSource {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            std::thread::sleep(Duration::from_millis(2));
            Ok(Some(Frame::empty(None)))
        }
    }

    fn queue() -> AnnouncementQueue {
        AnnouncementQueue::spawn(LogSpeaker::new(), QueueConfig::default()).expect("queue")
    }

    #[tokio::test]
    async fn open_failure_is_returned_from_start() {
        let engine = SignaEngine::new(EngineConfig::default());
        let queue = queue();
        let mut status_rx = engine.subscribe_status();

        let err = engine
            .start(FailingSource, PhraseCorrector::unavailable(), queue.sender())
            .expect_err("open should fail");
        assert!(matches!(err, SignaError::PoseSource(_)));
        assert_eq!(engine.status(), EngineStatus::Error);
        assert!(!engine.is_running());

        assert_eq!(status_rx.recv().await.expect("status").status, EngineStatus::Running);
        let last = status_rx.recv().await.expect("status");
        assert_eq!(last.status, EngineStatus::Error);
        assert!(last.detail.is_some_and(|d| d.contains("camera unplugged")));
    }

    #[tokio::test]
    async fn start_twice_and_stop_when_idle_are_errors() {
        let engine = SignaEngine::new(EngineConfig::default());
        let queue = queue();

        assert!(matches!(engine.stop(), Err(SignaError::NotRunning)));

        engine
            .start(EndlessSource, PhraseCorrector::unavailable(), queue.sender())
            .expect("start");
        assert!(matches!(
            engine.start(EndlessSource, PhraseCorrector::unavailable(), queue.sender()),
            Err(SignaError::AlreadyRunning)
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        engine.stop().expect("stop");
        engine.join().await;
        assert_eq!(engine.status(), EngineStatus::Stopped);
        assert!(engine.diagnostics_snapshot().frames > 0);
    }
}
