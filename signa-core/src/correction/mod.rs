//! Phrase correction stage.
//!
//! [`PhraseCorrector`] turns a finalized phrase into a [`CorrectionResult`]
//! using any [`Dictionary`] backend. Without a backend it degrades to an
//! explicit pass-through that reports `backend_available = false`.

pub mod frequency;
pub mod seed;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Tokens this short (in characters) are never corrected.
pub const MIN_CORRECTABLE_CHARS: usize = 3;

/// Spelling dictionary collaborator.
///
/// All lookups are case-insensitive; returned words are lowercase.
pub trait Dictionary: Send + 'static {
    fn is_known(&self, word: &str) -> bool;

    /// Most likely intended word, if any candidate exists.
    fn best_correction(&self, word: &str) -> Option<String>;

    /// Ranked candidate corrections, best first.
    fn candidates(&self, word: &str) -> Vec<String>;

    fn add_word(&mut self, word: &str);
}

/// One replaced token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCorrection {
    pub original: String,
    pub corrected: String,
    /// In `[0, 1]`: 1.0 for known words, `0.5 + 0.5 / candidates` for
    /// corrections, 0.0 when nothing better was found.
    pub confidence: f32,
}

/// Ranked alternatives for a corrected token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCandidates {
    pub word: String,
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionResult {
    pub corrected_phrase: String,
    /// Only tokens whose corrected form differs case-insensitively, in
    /// phrase order.
    pub corrections: Vec<WordCorrection>,
    /// One entry per distinct corrected token, in first-seen order.
    pub candidates_by_word: Vec<WordCandidates>,
    pub backend_available: bool,
}

impl CorrectionResult {
    fn unchanged(phrase: &str, backend_available: bool) -> Self {
        Self {
            corrected_phrase: phrase.to_string(),
            corrections: Vec::new(),
            candidates_by_word: Vec::new(),
            backend_available,
        }
    }
}

pub struct PhraseCorrector {
    dictionary: Option<Box<dyn Dictionary>>,
}

impl PhraseCorrector {
    pub fn new<D: Dictionary>(dictionary: D) -> Self {
        Self {
            dictionary: Some(Box::new(dictionary)),
        }
    }

    /// Corrector with no backend: every phrase passes through unchanged.
    pub fn unavailable() -> Self {
        warn!("no dictionary backend; phrase correction disabled");
        Self { dictionary: None }
    }

    pub fn is_available(&self) -> bool {
        self.dictionary.is_some()
    }

    /// Add vocabulary (names, domain terms) to the backend.
    pub fn add_words<'a, I>(&mut self, words: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        if let Some(dict) = self.dictionary.as_mut() {
            for word in words {
                dict.add_word(word);
            }
        }
    }

    pub fn correct(&self, phrase: &str) -> CorrectionResult {
        if phrase.trim().is_empty() {
            return CorrectionResult::unchanged(phrase, self.is_available());
        }

        let Some(dict) = self.dictionary.as_deref() else {
            warn!(phrase, "dictionary unavailable; passing phrase through");
            let joined = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
            return CorrectionResult::unchanged(&joined, false);
        };

        let mut result = CorrectionResult {
            backend_available: true,
            ..CorrectionResult::default()
        };
        let mut words = Vec::new();

        for token in phrase.split_whitespace() {
            if token.chars().count() < MIN_CORRECTABLE_CHARS {
                words.push(token.to_string());
                continue;
            }

            let (closest, confidence) = closest_word(dict, token);
            let corrected = restore_casing(token, &closest);

            if corrected.to_lowercase() != token.to_lowercase() {
                debug!(original = token, corrected = %corrected, confidence, "word corrected");
                result.corrections.push(WordCorrection {
                    original: token.to_string(),
                    corrected: corrected.clone(),
                    confidence,
                });
                if !result.candidates_by_word.iter().any(|c| c.word == token) {
                    result.candidates_by_word.push(WordCandidates {
                        word: token.to_string(),
                        candidates: dict.candidates(token),
                    });
                }
            }
            words.push(corrected);
        }

        result.corrected_phrase = words.join(" ");
        result
    }
}

fn closest_word(dict: &dyn Dictionary, word: &str) -> (String, f32) {
    if dict.is_known(word) {
        return (word.to_string(), 1.0);
    }
    match dict.best_correction(word) {
        Some(best) if best != word => {
            let count = dict.candidates(word).len();
            let confidence = if count == 0 {
                0.0
            } else {
                0.5 + 0.5 / count as f32
            };
            (best, confidence)
        }
        _ => (word.to_string(), 0.0),
    }
}

/// Has at least one cased character and no lowercase ones.
fn is_all_uppercase(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn restore_casing(original: &str, corrected: &str) -> String {
    if is_all_uppercase(original) {
        corrected.to_uppercase()
    } else if original.chars().next().is_some_and(char::is_uppercase) {
        capitalize(corrected)
    } else {
        corrected.to_string()
    }
}
