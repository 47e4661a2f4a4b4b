//! Synthetic frames that spell a word.
//!
//! Replays the gestures a signer would make, timed against a
//! [`ComposerConfig`]: an unrecognised hand long enough to stabilize, each
//! letter held long enough to commit (runs of the same letter held once per
//! repetition), an open hand for every space, then the hand leaves so the
//! phrase finalizes. Used by the `--demo` mode and by the engine tests.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::composer::ComposerConfig;
use crate::error::{Result, SignaError};
use crate::pose::{synth, Frame, HandPose};
use crate::source::PoseSource;

pub const DEFAULT_FPS: u32 = 30;

/// Empty frames appended after the last gesture.
const TRAILING_EMPTY_FRAMES: usize = 3;

pub struct ScriptedSource {
    frames: VecDeque<Frame>,
    realtime: bool,
    started: Option<Instant>,
}

impl ScriptedSource {
    pub fn from_frames(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            realtime: false,
            started: None,
        }
    }

    /// Frames spelling `text` at `fps`. Letters are case-insensitive and
    /// spaces become open-hand holds.
    ///
    /// # Errors
    /// `SignaError::PoseSource` for characters with no hand shape, or when
    /// `fps` is zero.
    pub fn spell(text: &str, config: &ComposerConfig, fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(SignaError::PoseSource("fps must be positive".into()));
        }
        let interval_ms = (1_000 / u64::from(fps)).max(1);
        let mut timeline = Timeline::new(interval_ms);

        let settle = config.hand_detection_delay + Duration::from_millis(2 * interval_ms);
        timeline.hold(Some(synth::unmatched_pose()), settle);

        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let run = chars[i..].iter().take_while(|&&next| next == c).count();
            if c == ' ' {
                timeline.hold(Some(synth::space_pose()), config.space_delay * 3 / 2);
            } else {
                let letter = c.to_ascii_uppercase();
                let pose = synth::letter_pose(letter).ok_or_else(|| {
                    SignaError::PoseSource(format!("no hand shape for {c:?}"))
                })?;
                let held = config.letter_save_delay * run as u32 + config.letter_save_delay / 2;
                timeline.hold(Some(pose), held);
            }
            i += run;
        }

        for _ in 0..TRAILING_EMPTY_FRAMES {
            timeline.push(None);
        }

        debug!(text, frames = timeline.frames.len(), fps, "scripted pose stream built");
        Ok(Self::from_frames(timeline.frames))
    }

    /// Pace frames against the wall clock using their timestamps.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl PoseSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(frame) = self.frames.pop_front() else {
            return Ok(None);
        };
        if self.realtime {
            let started = *self.started.get_or_insert_with(Instant::now);
            if let Some(ts) = frame.timestamp_ms {
                let due = started + Duration::from_millis(ts);
                let now = Instant::now();
                if due > now {
                    std::thread::sleep(due - now);
                }
            }
        }
        Ok(Some(frame))
    }
}

struct Timeline {
    interval_ms: u64,
    now_ms: u64,
    frames: Vec<Frame>,
}

impl Timeline {
    fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            now_ms: 0,
            frames: Vec::new(),
        }
    }

    fn push(&mut self, hand: Option<HandPose>) {
        let hands = hand.into_iter().collect();
        self.frames.push(Frame::with_hands(Some(self.now_ms), hands));
        self.now_ms += self.interval_ms;
    }

    /// Frames covering at least `duration` of the same hand.
    fn hold(&mut self, hand: Option<HandPose>, duration: Duration) {
        let count = (duration.as_millis() as u64).div_ceil(self.interval_ms) + 1;
        for _ in 0..count {
            self.push(hand.clone());
        }
    }
}
