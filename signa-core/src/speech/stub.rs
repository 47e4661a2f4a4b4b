//! `LogSpeaker`: a speaker that only logs.
//!
//! Used for muted runs and CI, where no speech engine is installed. Every
//! utterance is emitted as an `info!` event so the output order can still be
//! followed in the logs.

use tracing::{debug, info};

use crate::error::Result;
use crate::speech::Speaker;

#[derive(Debug, Default)]
pub struct LogSpeaker {
    spoken: u64,
}

impl LogSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> u64 {
        self.spoken
    }
}

impl Speaker for LogSpeaker {
    fn warm_up(&mut self) -> Result<()> {
        debug!("LogSpeaker::warm_up — no-op");
        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        self.spoken += 1;
        info!(utterance = self.spoken, text, "speak");
        Ok(())
    }
}
