//! FIFO announcement queue with a single speech worker.
//!
//! ```text
//! Composer ──announce()──► unbounded channel ──recv_timeout(poll)──► worker ──► Speaker::speak
//! ```
//!
//! Enqueueing never blocks and never drops. The worker polls with a bounded
//! timeout so it notices the stop flag even when the channel is idle.
//! `shutdown()` lets the in-flight utterance finish, then joins; items still
//! queued at that point are discarded (use [`AnnouncementQueue::flush`] first
//! to drain them).

use std::panic::{self, AssertUnwindSafe};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use crate::error::{Result, SignaError};
use crate::speech::{Announcement, Speaker};

#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// How long the worker waits on an empty channel before re-checking the
    /// stop flag. Default: 100 ms.
    pub poll_interval: Duration,
    /// Word spoken for a committed space. Default: "spazio".
    pub space_word: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            space_word: "spazio".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct QueueStats {
    pub enqueued: AtomicU64,
    pub spoken: AtomicU64,
    pub failed: AtomicU64,
    /// Pauses and blank phrases: handled without calling the speaker.
    pub skipped: AtomicU64,
}

impl QueueStats {
    fn completed(&self) -> u64 {
        self.spoken.load(Ordering::Relaxed)
            + self.failed.load(Ordering::Relaxed)
            + self.skipped.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> QueueStatsSnapshot {
        QueueStatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            spoken: self.spoken.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatsSnapshot {
    pub enqueued: u64,
    pub spoken: u64,
    pub failed: u64,
    pub skipped: u64,
}

/// Cloneable producer end. Hand one to every component that announces.
#[derive(Clone)]
pub struct AnnouncementSender {
    tx: Sender<Announcement>,
    stats: Arc<QueueStats>,
}

impl AnnouncementSender {
    /// Queue an announcement. Returns `false` if the worker has shut down.
    pub fn announce(&self, announcement: Announcement) -> bool {
        match self.tx.send(announcement) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(err) => {
                warn!(announcement = ?err.0, "announcement queue closed; dropping");
                false
            }
        }
    }

    /// Items waiting in the channel (not counting the one being spoken).
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

pub struct AnnouncementQueue {
    sender: AnnouncementSender,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl AnnouncementQueue {
    /// Warm up `speaker` on the calling thread, then start the worker.
    ///
    /// # Errors
    /// Returns the speaker's warm-up error; no thread is started in that case.
    pub fn spawn<S: Speaker>(mut speaker: S, config: QueueConfig) -> Result<Self> {
        speaker.warm_up()?;

        let (tx, rx) = unbounded();
        let stats = Arc::new(QueueStats::default());
        let running = Arc::new(AtomicBool::new(true));

        let worker = {
            let running = Arc::clone(&running);
            let stats = Arc::clone(&stats);
            thread::Builder::new()
                .name("signa-speech".into())
                .spawn(move || worker_loop(speaker, rx, config, running, stats))
                .map_err(|e| SignaError::Speech(format!("failed to start speech worker: {e}")))?
        };
        info!("announcement queue started");

        Ok(Self {
            sender: AnnouncementSender { tx, stats },
            running,
            worker: Some(worker),
        })
    }

    pub fn sender(&self) -> AnnouncementSender {
        self.sender.clone()
    }

    pub fn announce(&self, announcement: Announcement) -> bool {
        self.sender.announce(announcement)
    }

    pub fn stats(&self) -> QueueStatsSnapshot {
        self.sender.stats.snapshot()
    }

    /// Wait until everything enqueued so far has been handled, or `timeout`
    /// passes. Returns `true` if the queue drained.
    pub fn flush(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let stats = &self.sender.stats;
            if stats.completed() >= stats.enqueued.load(Ordering::Relaxed) {
                return true;
            }
            if Instant::now() >= deadline || !self.running.load(Ordering::SeqCst) {
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Stop the worker after the current utterance and join it.
    pub fn shutdown(mut self) -> QueueStatsSnapshot {
        self.stop_and_join();
        self.stats()
    }

    fn stop_and_join(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("speech worker panicked");
            }
            let stats = self.stats();
            info!(
                spoken = stats.spoken,
                failed = stats.failed,
                skipped = stats.skipped,
                dropped = stats.enqueued.saturating_sub(stats.spoken + stats.failed + stats.skipped),
                "announcement queue stopped"
            );
        }
    }
}

impl Drop for AnnouncementQueue {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn worker_loop<S: Speaker>(
    mut speaker: S,
    rx: Receiver<Announcement>,
    config: QueueConfig,
    running: Arc<AtomicBool>,
    stats: Arc<QueueStats>,
) {
    debug!("speech worker running");
    while running.load(Ordering::SeqCst) {
        let announcement = match rx.recv_timeout(config.poll_interval) {
            Ok(a) => a,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        deliver(&mut speaker, announcement, &config, &stats);
    }
    debug!("speech worker exiting");
}

fn deliver<S: Speaker>(
    speaker: &mut S,
    announcement: Announcement,
    config: &QueueConfig,
    stats: &QueueStats,
) {
    if let Announcement::Pause(pause) = announcement {
        thread::sleep(pause);
        stats.skipped.fetch_add(1, Ordering::Relaxed);
        return;
    }
    let Some(text) = announcement.utterance(&config.space_word) else {
        debug!("blank announcement skipped");
        stats.skipped.fetch_add(1, Ordering::Relaxed);
        return;
    };
    // A panicking backend counts as one failed utterance; the worker keeps going.
    match panic::catch_unwind(AssertUnwindSafe(|| speaker.speak(&text))) {
        Ok(Ok(())) => {
            stats.spoken.fetch_add(1, Ordering::Relaxed);
        }
        Ok(Err(e)) => {
            warn!(text = %text, "speech failed: {e}");
            stats.failed.fetch_add(1, Ordering::Relaxed);
        }
        Err(_) => {
            warn!(text = %text, "speech backend panicked");
            stats.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct RecordingSpeaker {
        spoken: Arc<Mutex<Vec<String>>>,
        fail_on: Option<&'static str>,
        panic_on: Option<&'static str>,
        delay: Duration,
    }

    impl Speaker for RecordingSpeaker {
        fn speak(&mut self, text: &str) -> Result<()> {
            thread::sleep(self.delay);
            if self.fail_on == Some(text) {
                return Err(SignaError::Speech("intentional test failure".into()));
            }
            if self.panic_on == Some(text) {
                panic!("speech backend crashed on {text}");
            }
            self.spoken.lock().push(text.to_string());
            Ok(())
        }
    }

    struct BrokenSpeaker;

    impl Speaker for BrokenSpeaker {
        fn warm_up(&mut self) -> Result<()> {
            Err(SignaError::Speech("no engine".into()))
        }

        fn speak(&mut self, _text: &str) -> Result<()> {
            unreachable!("never warmed up")
        }
    }

    fn fast_config() -> QueueConfig {
        QueueConfig {
            poll_interval: Duration::from_millis(10),
            ..QueueConfig::default()
        }
    }

    #[test]
    fn delivers_in_fifo_order_with_space_word() {
        let speaker = RecordingSpeaker::default();
        let spoken = Arc::clone(&speaker.spoken);
        let queue = AnnouncementQueue::spawn(speaker, fast_config()).expect("spawn");

        queue.announce(Announcement::Letter('C'));
        queue.announce(Announcement::Letter('I'));
        queue.announce(Announcement::Space);
        queue.announce(Announcement::Phrase("Ha composto: CI ".into()));
        assert!(queue.flush(Duration::from_secs(2)));

        assert_eq!(
            *spoken.lock(),
            vec!["C", "I", "spazio", "Ha composto: CI "]
        );
        let stats = queue.shutdown();
        assert_eq!(stats.spoken, 4);
        assert_eq!(stats.enqueued, 4);
    }

    #[test]
    fn failed_and_blank_items_are_skipped_without_stalling() {
        let speaker = RecordingSpeaker {
            fail_on: Some("B"),
            ..RecordingSpeaker::default()
        };
        let spoken = Arc::clone(&speaker.spoken);
        let queue = AnnouncementQueue::spawn(speaker, fast_config()).expect("spawn");

        queue.announce(Announcement::Letter('A'));
        queue.announce(Announcement::Letter('B'));
        queue.announce(Announcement::Phrase("   ".into()));
        queue.announce(Announcement::Pause(Duration::from_millis(5)));
        queue.announce(Announcement::Letter('C'));
        assert!(queue.flush(Duration::from_secs(2)));

        assert_eq!(*spoken.lock(), vec!["A", "C"]);
        let stats = queue.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.spoken, 2);
    }

    #[test]
    fn panicking_speaker_fails_one_item_and_keeps_worker_alive() {
        let speaker = RecordingSpeaker {
            panic_on: Some("B"),
            ..RecordingSpeaker::default()
        };
        let spoken = Arc::clone(&speaker.spoken);
        let queue = AnnouncementQueue::spawn(speaker, fast_config()).expect("spawn");

        queue.announce(Announcement::Letter('A'));
        queue.announce(Announcement::Letter('B'));
        queue.announce(Announcement::Letter('C'));
        assert!(queue.flush(Duration::from_secs(2)));

        assert_eq!(*spoken.lock(), vec!["A", "C"]);
        let stats = queue.shutdown();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.spoken, 2);
    }

    #[test]
    fn pause_delays_the_next_item() {
        let speaker = RecordingSpeaker::default();
        let spoken = Arc::clone(&speaker.spoken);
        let queue = AnnouncementQueue::spawn(speaker, fast_config()).expect("spawn");

        let start = Instant::now();
        queue.announce(Announcement::Phrase("uno".into()));
        queue.announce(Announcement::Pause(Duration::from_millis(120)));
        queue.announce(Announcement::Phrase("due".into()));
        assert!(queue.flush(Duration::from_secs(2)));
        assert!(start.elapsed() >= Duration::from_millis(120));
        assert_eq!(*spoken.lock(), vec!["uno", "due"]);
    }

    #[test]
    fn announce_never_blocks_on_slow_speaker() {
        let speaker = RecordingSpeaker {
            delay: Duration::from_millis(50),
            ..RecordingSpeaker::default()
        };
        let queue = AnnouncementQueue::spawn(speaker, fast_config()).expect("spawn");

        let start = Instant::now();
        for c in "ABCDEFGHIJ".chars() {
            assert!(queue.announce(Announcement::Letter(c)));
        }
        assert!(start.elapsed() < Duration::from_millis(50));
        assert!(queue.sender().pending() > 0);
        drop(queue);
    }

    #[test]
    fn shutdown_joins_without_draining_backlog() {
        let speaker = RecordingSpeaker {
            delay: Duration::from_millis(40),
            ..RecordingSpeaker::default()
        };
        let spoken = Arc::clone(&speaker.spoken);
        let queue = AnnouncementQueue::spawn(speaker, fast_config()).expect("spawn");
        let sender = queue.sender();

        for c in "ABCDEFGHIJ".chars() {
            sender.announce(Announcement::Letter(c));
        }
        thread::sleep(Duration::from_millis(60));
        let stats = queue.shutdown();

        assert!(stats.spoken < 10, "backlog must not be fully drained");
        assert_eq!(spoken.lock().len() as u64, stats.spoken);
        assert!(!sender.announce(Announcement::Letter('Z')));
    }

    #[test]
    fn warm_up_failure_is_fatal() {
        let err = AnnouncementQueue::spawn(BrokenSpeaker, fast_config())
            .err()
            .expect("warm up must fail");
        assert!(matches!(err, SignaError::Speech(_)));
    }
}
