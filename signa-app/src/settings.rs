//! Persistent application settings (JSON file in app data directory).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use signa_core::speech::command::CommandSpeakerConfig;
use signa_core::{ComposerConfig, QueueConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AppSettings {
    pub hand_detection_delay_ms: u64,
    pub letter_save_delay_ms: u64,
    pub space_delay_ms: u64,
    pub reset_delay_ms: u64,
    pub phrase_pause_ms: u64,
    /// TTS program; `None` uses the platform default.
    pub speech_program: Option<String>,
    /// TTS voice; `None` uses the platform default Italian voice.
    pub voice: Option<String>,
    pub speech_rate: u32,
    pub space_word: String,
    /// Extra `word [count]` list merged into the built-in vocabulary.
    pub word_list_path: Option<PathBuf>,
    pub extra_words: Vec<String>,
    pub max_candidates_shown: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            hand_detection_delay_ms: 1_500,
            letter_save_delay_ms: 1_500,
            space_delay_ms: 1_200,
            reset_delay_ms: 2_000,
            phrase_pause_ms: 300,
            speech_program: None,
            voice: None,
            speech_rate: 200,
            space_word: "spazio".into(),
            word_list_path: None,
            extra_words: Vec::new(),
            max_candidates_shown: 5,
        }
    }
}

impl AppSettings {
    pub fn normalize(&mut self) {
        self.hand_detection_delay_ms = self.hand_detection_delay_ms.clamp(200, 10_000);
        self.letter_save_delay_ms = self.letter_save_delay_ms.clamp(200, 10_000);
        self.space_delay_ms = self.space_delay_ms.clamp(200, 10_000);
        self.reset_delay_ms = self.reset_delay_ms.clamp(500, 10_000);
        self.phrase_pause_ms = self.phrase_pause_ms.min(5_000);
        self.speech_program = normalize_optional(self.speech_program.as_deref());
        self.voice = normalize_optional(self.voice.as_deref());
        self.speech_rate = self.speech_rate.clamp(80, 450);
        let space_word = self.space_word.trim();
        self.space_word = if space_word.is_empty() {
            "spazio".into()
        } else {
            space_word.to_string()
        };
        self.word_list_path = self
            .word_list_path
            .take()
            .filter(|p| !p.as_os_str().is_empty());
        self.extra_words = normalize_extra_words(&self.extra_words);
        self.max_candidates_shown = self.max_candidates_shown.clamp(1, 20);
    }

    /// Apply `SIGNA_*` environment overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Unparseable numbers are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        if let Some(v) = number("SIGNA_HAND_DETECTION_DELAY_MS") {
            self.hand_detection_delay_ms = v;
        }
        if let Some(v) = number("SIGNA_LETTER_SAVE_DELAY_MS") {
            self.letter_save_delay_ms = v;
        }
        if let Some(v) = number("SIGNA_SPACE_DELAY_MS") {
            self.space_delay_ms = v;
        }
        if let Some(v) = number("SIGNA_RESET_DELAY_MS") {
            self.reset_delay_ms = v;
        }
        if let Some(v) = number("SIGNA_SPEECH_RATE") {
            self.speech_rate = u32::try_from(v).unwrap_or(u32::MAX);
        }
        if let Some(v) = lookup("SIGNA_SPEECH_PROGRAM") {
            self.speech_program = Some(v);
        }
        if let Some(v) = lookup("SIGNA_VOICE") {
            self.voice = Some(v);
        }
        if let Some(v) = lookup("SIGNA_WORD_LIST") {
            self.word_list_path = Some(PathBuf::from(v));
        }
    }

    pub fn composer_config(&self) -> ComposerConfig {
        ComposerConfig {
            hand_detection_delay: Duration::from_millis(self.hand_detection_delay_ms),
            letter_save_delay: Duration::from_millis(self.letter_save_delay_ms),
            space_delay: Duration::from_millis(self.space_delay_ms),
            reset_delay: Duration::from_millis(self.reset_delay_ms),
            phrase_pause: Duration::from_millis(self.phrase_pause_ms),
            ..ComposerConfig::default()
        }
    }

    pub fn speaker_config(&self) -> CommandSpeakerConfig {
        let mut config = CommandSpeakerConfig::default();
        if let Some(program) = &self.speech_program {
            config.program = PathBuf::from(program);
        }
        if let Some(voice) = &self.voice {
            config.voice = Some(voice.clone());
        }
        config.rate_wpm = self.speech_rate;
        config
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            space_word: self.space_word.clone(),
            ..QueueConfig::default()
        }
    }
}

fn normalize_optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn normalize_extra_words(raw: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for word in raw {
        let normalized = word.trim().to_lowercase();
        if normalized.is_empty() || normalized.contains(char::is_whitespace) {
            continue;
        }
        if out.contains(&normalized) {
            continue;
        }
        out.push(normalized);
        if out.len() >= 512 {
            break;
        }
    }
    out
}

pub fn default_settings_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Signa")
            .join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".local")
                    .join("share")
            })
            .join("signa")
            .join("settings.json")
    }
}

/// Missing or unreadable files fall back to defaults.
pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<AppSettings>(&raw).ok())
        .unwrap_or_default();
    settings.normalize();
    settings
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(path, json)
}
