//! Human-readable rendering of finalized phrases (stderr log lines).

use signa_core::correction::{WordCandidates, WordCorrection};
use signa_core::ComposerEvent;

/// `a, b, c` with at most `max` entries, then `and K more`.
pub fn candidate_list(candidates: &[String], max: usize) -> String {
    let shown = candidates.len().min(max);
    let mut out = candidates[..shown].join(", ");
    let hidden = candidates.len() - shown;
    if hidden > 0 {
        out.push_str(&format!(" and {hidden} more"));
    }
    out
}

/// One line per corrected word: `CASX → CASA (75%) [casa, cassa]`.
pub fn correction_lines(
    corrections: &[WordCorrection],
    candidates_by_word: &[WordCandidates],
    max_candidates: usize,
) -> Vec<String> {
    corrections
        .iter()
        .map(|c| {
            let mut line = format!(
                "{} → {} ({:.0}%)",
                c.original,
                c.corrected,
                c.confidence * 100.0
            );
            if let Some(entry) = candidates_by_word.iter().find(|w| w.word == c.original) {
                if !entry.candidates.is_empty() {
                    line.push_str(&format!(
                        " [{}]",
                        candidate_list(&entry.candidates, max_candidates)
                    ));
                }
            }
            line
        })
        .collect()
}

/// Summary for events worth a human-facing log line.
pub fn describe(event: &ComposerEvent, max_candidates: usize) -> Option<String> {
    match event {
        ComposerEvent::PhraseFinalized {
            phrase,
            corrected_phrase,
            corrections,
            candidates_by_word,
            backend_available,
        } => {
            let mut out = format!("phrase: {phrase}");
            if !backend_available {
                out.push_str(" (no dictionary)");
            } else if corrections.is_empty() {
                out.push_str(" (no corrections)");
            } else {
                out.push_str(&format!(" → {corrected_phrase}"));
                for line in correction_lines(corrections, candidates_by_word, max_candidates) {
                    out.push_str("\n  ");
                    out.push_str(&line);
                }
            }
            Some(out)
        }
        ComposerEvent::CompositionRefused { phrase } => Some(format!(
            "\"{phrase}\" is complete; show two hands to start a new phrase"
        )),
        ComposerEvent::SessionReset { discarded } if !discarded.is_empty() => {
            Some(format!("reset; discarded \"{discarded}\""))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn candidate_list_truncates_with_remainder() {
        let all = words(&["casa", "caso", "cassa", "cosa", "case", "cast", "cara"]);
        assert_eq!(
            candidate_list(&all, 5),
            "casa, caso, cassa, cosa, case and 2 more"
        );
        assert_eq!(candidate_list(&all[..2], 5), "casa, caso");
        assert_eq!(candidate_list(&[], 5), "");
    }

    #[test]
    fn finalized_phrase_lists_corrections() {
        let event = ComposerEvent::PhraseFinalized {
            phrase: "CASX".into(),
            corrected_phrase: "CASA".into(),
            corrections: vec![WordCorrection {
                original: "CASX".into(),
                corrected: "CASA".into(),
                confidence: 0.75,
            }],
            candidates_by_word: vec![WordCandidates {
                word: "CASX".into(),
                candidates: words(&["casa", "caso"]),
            }],
            backend_available: true,
        };
        assert_eq!(
            describe(&event, 5).as_deref(),
            Some("phrase: CASX → CASA\n  CASX → CASA (75%) [casa, caso]")
        );
    }

    #[test]
    fn quiet_events_have_no_description() {
        let event = ComposerEvent::LetterCommitted {
            letter: 'A',
            text: "A".into(),
        };
        assert_eq!(describe(&event, 5), None);
        let reset = ComposerEvent::SessionReset {
            discarded: String::new(),
        };
        assert_eq!(describe(&reset, 5), None);
    }
}
