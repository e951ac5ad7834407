use vocab_core::model::WordTemplate;

const VOCABULARY_JSON: &str = include_str!("../data/vocabulary.json");

/// Bundled starter vocabulary used to build a new curriculum.
///
/// # Errors
///
/// Returns a JSON error if the bundled file is malformed.
pub fn starter_vocabulary() -> Result<Vec<WordTemplate>, serde_json::Error> {
    serde_json::from_str(VOCABULARY_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bundled_vocabulary_parses_without_duplicates() {
        let words = starter_vocabulary().unwrap();
        assert!(words.len() >= 20);
        let unique: HashSet<String> = words.iter().map(|w| w.word.to_lowercase()).collect();
        assert_eq!(unique.len(), words.len());
    }
}
