//! Speech output.
//!
//! The composer never talks to a speech engine directly: it emits
//! [`Announcement`]s, and the [`queue::AnnouncementQueue`] worker delivers
//! them in order to a [`Speaker`]. Swap in [`command::CommandSpeaker`]
//! (system TTS binary) or [`stub::LogSpeaker`] (tracing only) without
//! touching the pipeline.

pub mod command;
pub mod queue;
pub mod stub;

use std::time::Duration;

use crate::error::Result;

/// One item of audible output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    /// A single committed letter.
    Letter(char),
    /// A committed word boundary, spoken as the configured space word.
    Space,
    /// A whole phrase. Whitespace-only phrases are skipped.
    Phrase(String),
    /// Silence between two phrases.
    Pause(Duration),
}

impl Announcement {
    /// Text to hand to the speaker, or `None` for pauses and blank phrases.
    pub fn utterance(&self, space_word: &str) -> Option<String> {
        match self {
            Announcement::Letter(' ') | Announcement::Space => Some(space_word.to_string()),
            Announcement::Letter(c) => Some(c.to_string()),
            Announcement::Phrase(text) if text.trim().is_empty() => None,
            Announcement::Phrase(text) => Some(text.clone()),
            Announcement::Pause(_) => None,
        }
    }
}

/// Contract for speech synthesis backends.
pub trait Speaker: Send + 'static {
    /// One-time initialization (locate the engine, select a voice). Called
    /// on the caller's thread before the worker starts, so a failure here
    /// is reported at startup.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }

    /// Speak `text`, blocking until the utterance completes.
    fn speak(&mut self, text: &str) -> Result<()>;
}

impl<S: Speaker + ?Sized> Speaker for Box<S> {
    fn warm_up(&mut self) -> Result<()> {
        (**self).warm_up()
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        (**self).speak(text)
    }
}
