//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use signa_core::source::scripted::DEFAULT_FPS;

/// Compose text from fingerspelling hand poses.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "signa", version)]
#[command(about = "Compose text from fingerspelling hand poses")]
#[command(after_help = "Events are written to stdout as JSON lines; logs go to stderr (RUST_LOG).")]
pub struct CliArgs {
    /// JSON-lines pose frames, `-` for stdin (default: stdin)
    #[arg(short, long, value_name = "FILE", conflicts_with = "demo")]
    pub input: Option<PathBuf>,

    /// Spell TEXT with synthetic poses instead of reading input
    #[arg(long, value_name = "TEXT")]
    pub demo: Option<String>,

    /// Frame rate of the demo stream (1-240)
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub fps: u32,

    /// Pace demo frames against the wall clock
    #[arg(long)]
    pub realtime: bool,

    /// Settings file (default: platform data dir)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    pub save_settings: bool,

    /// Also print a display snapshot after every frame
    #[arg(long)]
    pub snapshots: bool,

    /// Log announcements instead of speaking them
    #[arg(long)]
    pub mute: bool,
}

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
    Demo(String),
}

impl CliArgs {
    pub fn input(&self) -> Input {
        match (&self.demo, &self.input) {
            (Some(text), _) => Input::Demo(text.clone()),
            (None, Some(path)) if path.as_os_str() != "-" => Input::File(path.clone()),
            (None, _) => Input::Stdin,
        }
    }
}
