//! Words added to every dictionary at startup.
//!
//! Generic frequency lists miss most first names and place names, which are
//! exactly what people fingerspell most often.

pub const PROPER_NAMES: &[&str] = &[
    "andrea", "marco", "giuseppe", "giovanni", "antonio", "francesco", "luigi", "roberto",
    "stefano", "paolo", "alessandro", "luca", "mario", "giorgio", "vincenzo", "davide",
    "alberto", "riccardo", "filippo", "daniele", "michele", "salvatore", "lorenzo", "simone",
    "nicola", "emanuele", "christian", "maria", "anna", "lucia", "sofia", "giulia", "sara",
    "laura", "valentina", "chiara", "francesca", "elena", "martina", "alessandra", "gabriella",
    "rosa", "beatrice", "elisa", "alice", "silvia", "monica", "roberta", "paola", "cristina",
    "federica", "claudia",
];

pub const REGIONAL_CAPITALS: &[&str] = &[
    "roma", "milano", "napoli", "torino", "palermo", "genova", "bologna", "firenze", "bari",
    "venezia", "verona", "padova", "trieste", "taranto", "brescia", "parma", "modena", "reggio",
    "perugia", "cagliari",
];

pub const ARTICLES: &[&str] = &["il", "lo", "la", "i", "gli", "le"];

pub const PREPOSITIONS: &[&str] = &["di", "a", "da", "in", "con", "su", "per", "tra", "fra"];

/// All seed words, names first.
pub fn seed_words() -> impl Iterator<Item = &'static str> {
    PROPER_NAMES
        .iter()
        .chain(REGIONAL_CAPITALS)
        .chain(ARTICLES)
        .chain(PREPOSITIONS)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_words_are_lowercase_and_complete() {
        let words: Vec<_> = seed_words().collect();
        assert_eq!(
            words.len(),
            PROPER_NAMES.len() + REGIONAL_CAPITALS.len() + ARTICLES.len() + PREPOSITIONS.len()
        );
        assert!(words.iter().all(|w| w.chars().all(char::is_lowercase)));
        assert!(words.contains(&"marco"));
        assert!(words.contains(&"cagliari"));
    }
}
