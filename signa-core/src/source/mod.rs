//! Pose source abstraction.
//!
//! The `PoseSource` trait is what the pipeline pulls frames from. Swap in
//! [`jsonl::JsonLinesSource`] (landmark frames recorded by an external hand
//! tracker, one JSON object per line) or [`scripted::ScriptedSource`]
//! (synthetic frames spelling a word) without touching the pipeline.

pub mod jsonl;
pub mod scripted;

pub use jsonl::JsonLinesSource;
pub use scripted::ScriptedSource;

use crate::error::Result;
use crate::pose::Frame;

/// Contract for anything that produces hand landmark frames.
pub trait PoseSource: Send + 'static {
    /// Acquire the underlying resource (file, pipe, camera bridge).
    ///
    /// Called once on the pipeline thread before the first frame. An error
    /// here is fatal and is returned from `SignaEngine::start`.
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Next frame, `Ok(None)` at end of stream.
    ///
    /// An `Err` is a per-frame failure: the pipeline treats it as a frame
    /// with no hands and keeps reading.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

impl<S: PoseSource + ?Sized> PoseSource for Box<S> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        (**self).next_frame()
    }
}
