//! `CommandSpeaker`: speaks through a system TTS binary.
//!
//! Supports espeak-compatible programs (`espeak-ng`, `espeak`) and macOS
//! `say`. Each utterance is one blocking child process, which gives the
//! queue worker the "returns when speech completes" behaviour for free.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{Result, SignaError};
use crate::speech::Speaker;

#[cfg(target_os = "macos")]
pub const DEFAULT_PROGRAM: &str = "say";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_PROGRAM: &str = "espeak-ng";

/// Words per minute.
pub const DEFAULT_RATE_WPM: u32 = 200;

/// Command-line dialect of the TTS program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// `-v <voice> -s <wpm> <text>`
    Espeak,
    /// `-v <voice> -r <wpm> <text>`
    Say,
}

impl Flavor {
    pub fn detect(program: &Path) -> Self {
        match program.file_stem().and_then(|s| s.to_str()) {
            Some("say") => Flavor::Say,
            _ => Flavor::Espeak,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandSpeakerConfig {
    /// Program name (looked up on `PATH`) or path.
    pub program: PathBuf,
    /// Voice name passed to the program. `None` keeps the program default.
    pub voice: Option<String>,
    pub rate_wpm: u32,
}

impl Default for CommandSpeakerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            voice: Some(default_voice().to_string()),
            rate_wpm: DEFAULT_RATE_WPM,
        }
    }
}

fn default_voice() -> &'static str {
    if cfg!(target_os = "macos") {
        "Alice"
    } else {
        "it"
    }
}

pub struct CommandSpeaker {
    config: CommandSpeakerConfig,
    flavor: Flavor,
    resolved: Option<PathBuf>,
}

impl CommandSpeaker {
    pub fn new(config: CommandSpeakerConfig) -> Self {
        let flavor = Flavor::detect(&config.program);
        Self {
            config,
            flavor,
            resolved: None,
        }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Arguments for one utterance, text last.
    pub fn args_for(&self, text: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(5);
        if let Some(voice) = self.config.voice.as_deref().filter(|v| !v.is_empty()) {
            args.push("-v".to_string());
            args.push(voice.to_string());
        }
        args.push(
            match self.flavor {
                Flavor::Espeak => "-s",
                Flavor::Say => "-r",
            }
            .to_string(),
        );
        args.push(self.config.rate_wpm.to_string());
        args.push(text.to_string());
        args
    }
}

impl Speaker for CommandSpeaker {
    fn warm_up(&mut self) -> Result<()> {
        let resolved = resolve_program(&self.config.program).ok_or_else(|| {
            SignaError::Speech(format!(
                "speech program {:?} not found",
                self.config.program.display().to_string()
            ))
        })?;
        info!(
            program = %resolved.display(),
            voice = self.config.voice.as_deref().unwrap_or("default"),
            rate = self.config.rate_wpm,
            "speech engine ready"
        );
        self.resolved = Some(resolved);
        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        let program = self.resolved.as_ref().unwrap_or(&self.config.program);
        debug!(text, "spawning speech program");
        let output = Command::new(program)
            .args(self.args_for(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| SignaError::Speech(format!("{}: {e}", program.display())))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(SignaError::Speech(format!(
                "{} exited with {}: {}",
                program.display(),
                output.status,
                stderr.trim()
            )))
        }
    }
}

/// Absolute or relative paths are checked directly; bare names are searched
/// on `PATH`.
fn resolve_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = candidate.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speaker(program: &str, voice: Option<&str>) -> CommandSpeaker {
        CommandSpeaker::new(CommandSpeakerConfig {
            program: PathBuf::from(program),
            voice: voice.map(str::to_string),
            rate_wpm: 180,
        })
    }

    #[test]
    fn flavor_follows_program_name() {
        assert_eq!(speaker("espeak-ng", None).flavor(), Flavor::Espeak);
        assert_eq!(speaker("/usr/bin/say", None).flavor(), Flavor::Say);
    }

    #[test]
    fn espeak_arguments() {
        let s = speaker("espeak-ng", Some("it"));
        assert_eq!(s.args_for("CIAO"), vec!["-v", "it", "-s", "180", "CIAO"]);
    }

    #[test]
    fn say_arguments_without_voice() {
        let s = speaker("say", None);
        assert_eq!(s.args_for("spazio"), vec!["-r", "180", "spazio"]);
        let blank = speaker("say", Some(""));
        assert_eq!(blank.args_for("x"), vec!["-r", "180", "x"]);
    }

    #[test]
    fn missing_program_fails_warm_up() {
        let mut s = speaker("signa-no-such-tts-binary", None);
        let err = s.warm_up().expect_err("program does not exist");
        assert!(matches!(err, SignaError::Speech(_)));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_is_reported() {
        let mut ok = speaker("true", None);
        ok.warm_up().expect("`true` is on PATH");
        ok.speak("A").expect("`true` succeeds");

        let mut failing = speaker("false", None);
        failing.warm_up().expect("`false` is on PATH");
        let err = failing.speak("A").expect_err("`false` fails");
        assert!(err.to_string().contains("exited with"));
    }
}
