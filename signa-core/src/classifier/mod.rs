//! Posture classifier.
//!
//! [`classify`] maps one [`HandPose`] to a [`Symbol`] by walking the ordered
//! rule table in [`rules::RULES`]: the first predicate that holds wins, and a
//! pose that satisfies none of them is [`Symbol::None`]. Several fingerspelled
//! letters overlap geometrically (a fist with the thumb low is both `A` and
//! `E`), so table order decides ties and must not be changed casually.

pub mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pose::HandPose;

pub use rules::{Rule, RULES};

/// Output of the classifier for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Symbol {
    /// No posture matched.
    #[default]
    None,
    /// Open hand: explicit word boundary.
    Space,
    /// An uppercase letter `A..=Z`.
    Letter(char),
}

impl Symbol {
    /// `Symbol::Letter` for `A..=Z` (either case), `None` otherwise.
    pub fn letter(c: char) -> Option<Self> {
        c.is_ascii_alphabetic()
            .then(|| Symbol::Letter(c.to_ascii_uppercase()))
    }

    pub fn as_letter(self) -> Option<char> {
        match self {
            Symbol::Letter(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Symbol::None
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::None => f.write_str("NONE"),
            Symbol::Space => f.write_str("SPACE"),
            Symbol::Letter(c) => write!(f, "{c}"),
        }
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.to_string()
    }
}

impl TryFrom<String> for Symbol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "NONE" => Ok(Symbol::None),
            "SPACE" => Ok(Symbol::Space),
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_uppercase() => Ok(Symbol::Letter(c)),
                    _ => Err(format!("unknown symbol {value:?}")),
                }
            }
        }
    }
}

/// Classify a hand pose. Pure, deterministic and total.
pub fn classify(pose: &HandPose) -> Symbol {
    RULES
        .iter()
        .find(|rule| (rule.matches)(pose))
        .map_or(Symbol::None, |rule| rule.symbol)
}

/// Every rule the pose satisfies, in table order. Diagnostic helper: the
/// first entry (if any) is what [`classify`] returns.
pub fn matching_rules(pose: &HandPose) -> Vec<Symbol> {
    RULES
        .iter()
        .filter(|rule| (rule.matches)(pose))
        .map(|rule| rule.symbol)
        .collect()
}
