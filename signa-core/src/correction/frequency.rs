//! Edit-distance spelling dictionary over a word-frequency table.
//!
//! Candidate generation follows the classic frequency speller: a known word
//! is its own sole candidate; otherwise every known word one edit away;
//! failing that, every known word two edits away. Candidates are ranked by
//! frequency (descending), ties broken alphabetically, and the best
//! correction is the top of that list.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, SignaError};

use super::{seed, Dictionary};

/// Letters tried for insertions and replacements.
pub const ITALIAN_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzàèéìíîòóùú";

const BASE_VOCABULARY: &str = include_str!("../../data/it_base_words.txt");

/// Count given to words added without an explicit frequency.
const DEFAULT_COUNT: u64 = 1;

#[derive(Debug, Clone)]
pub struct FrequencyDictionary {
    counts: HashMap<String, u64>,
    alphabet: Vec<char>,
    max_distance: u8,
}

impl Default for FrequencyDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyDictionary {
    /// Empty dictionary over the Italian alphabet, searching up to two edits.
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            alphabet: ITALIAN_ALPHABET.chars().collect(),
            max_distance: 2,
        }
    }

    /// Built-in base vocabulary plus the startup seed words.
    pub fn italian() -> Result<Self> {
        let mut dict = Self::new();
        let base = dict.extend_from_word_list(BASE_VOCABULARY)?;
        for word in seed::seed_words() {
            dict.add_word(word);
        }
        info!(base, total = dict.len(), "italian dictionary ready");
        Ok(dict)
    }

    /// Search only one edit away (cheaper, fewer false corrections).
    pub fn with_max_distance(mut self, max_distance: u8) -> Self {
        self.max_distance = max_distance.clamp(1, 2);
        self
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Frequency of `word` (case-insensitive), 0 if unknown.
    pub fn frequency(&self, word: &str) -> u64 {
        self.counts.get(&word.to_lowercase()).copied().unwrap_or(0)
    }

    pub fn add_word_count(&mut self, word: &str, count: u64) {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return;
        }
        *self.counts.entry(word).or_insert(0) += count;
    }

    /// Load a word list file. See [`Self::extend_from_word_list`].
    pub fn load_word_list(&mut self, path: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SignaError::Dictionary(format!("{}: {e}", path.display())))?;
        let added = self.extend_from_word_list(&text)?;
        info!(path = %path.display(), added, "word list loaded");
        Ok(added)
    }

    /// Parse `word [count]` lines; blank lines and `#` comments are skipped.
    /// Repeated words accumulate. Returns the number of entries read.
    pub fn extend_from_word_list(&mut self, text: &str) -> Result<usize> {
        let mut added = 0;
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else { continue };
            let count = match fields.next() {
                None => DEFAULT_COUNT,
                Some(raw) => raw.parse::<u64>().map_err(|_| {
                    SignaError::Dictionary(format!(
                        "line {}: invalid count {raw:?} for {word:?}",
                        lineno + 1
                    ))
                })?,
            };
            if fields.next().is_some() {
                return Err(SignaError::Dictionary(format!(
                    "line {}: expected `word [count]`, got {line:?}",
                    lineno + 1
                )));
            }
            self.add_word_count(word, count);
            added += 1;
        }
        Ok(added)
    }

    fn ranked<I>(&self, words: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut known: Vec<(u64, String)> = words
            .into_iter()
            .filter_map(|w| self.counts.get(&w).map(|&count| (count, w)))
            .collect();
        known.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        known.dedup_by(|a, b| a.1 == b.1);
        known.into_iter().map(|(_, w)| w).collect()
    }

    fn edits1(&self, word: &str) -> HashSet<String> {
        let chars: Vec<char> = word.chars().collect();
        let n = chars.len();
        let mut out = HashSet::with_capacity(n * (2 * self.alphabet.len() + 2) + self.alphabet.len());
        let join = |parts: &[&[char]]| -> String { parts.iter().flat_map(|p| p.iter()).collect() };

        for i in 0..=n {
            let (left, right) = chars.split_at(i);
            let rest = right.get(1..).unwrap_or(&[]);
            if !right.is_empty() {
                out.insert(join(&[left, rest]));
            }
            if right.len() > 1 {
                let swapped = [right[1], right[0]];
                out.insert(join(&[left, &swapped[..], &right[2..]]));
            }
            for &c in &self.alphabet {
                let letter = [c];
                if !right.is_empty() {
                    out.insert(join(&[left, &letter[..], rest]));
                }
                out.insert(join(&[left, &letter[..], right]));
            }
        }
        out
    }
}

impl Dictionary for FrequencyDictionary {
    fn is_known(&self, word: &str) -> bool {
        self.counts.contains_key(&word.to_lowercase())
    }

    fn best_correction(&self, word: &str) -> Option<String> {
        self.candidates(word).into_iter().next()
    }

    fn candidates(&self, word: &str) -> Vec<String> {
        let word = word.to_lowercase();
        if self.counts.contains_key(&word) {
            return vec![word];
        }

        let one = self.edits1(&word);
        let known = self.ranked(one.iter().cloned());
        if !known.is_empty() || self.max_distance < 2 {
            return known;
        }

        let mut two = HashSet::new();
        for edit in &one {
            two.extend(
                self.edits1(edit)
                    .into_iter()
                    .filter(|w| self.counts.contains_key(w)),
            );
        }
        debug!(word = %word, found = two.len(), "distance-2 candidates");
        self.ranked(two)
    }

    fn add_word(&mut self, word: &str) {
        self.add_word_count(word, DEFAULT_COUNT);
    }
}
