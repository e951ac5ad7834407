use serde::Deserialize;
use vocab_core::model::{Difficulty, WordTemplate};

use crate::error::GenerationError;

/// Remove Markdown code fences (```` ```json ```` and ```` ``` ````) and trim.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

#[derive(Debug, Deserialize)]
struct GeneratedEntry {
    word: String,
    definition: String,
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    difficulty: Option<f64>,
}

impl GeneratedEntry {
    fn into_template(self) -> WordTemplate {
        let example = match self.example {
            Some(example) if !example.trim().is_empty() => example,
            _ => format!("Example sentence with {}.", self.word),
        };
        let template = WordTemplate::new(self.word, self.definition, example);
        match self.difficulty.and_then(clamp_difficulty) {
            Some(difficulty) => template.with_difficulty(difficulty),
            None => template,
        }
    }
}

/// Zero, negative and non-finite values count as missing.
#[allow(clippy::cast_possible_truncation)]
fn clamp_difficulty(raw: f64) -> Option<Difficulty> {
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }
    Some(Difficulty::clamped(raw.round() as i64))
}

/// Parse generated text into word templates.
///
/// The text must be a JSON array (after fence stripping) of objects with
/// `word` and `definition` plus optional `example` and `difficulty`. A
/// missing example becomes `Example sentence with {word}.`; a missing
/// difficulty is left for the caller to fill.
///
/// # Errors
///
/// - `GenerationError::EmptyResponse` if nothing usable remains
/// - `GenerationError::Malformed` if the text is not a valid word list
pub fn parse_word_list(text: &str) -> Result<Vec<WordTemplate>, GenerationError> {
    let json = strip_code_fences(text);
    if json.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    let entries: Vec<GeneratedEntry> =
        serde_json::from_str(&json).map_err(|err| GenerationError::Malformed(err.to_string()))?;
    if entries.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(entries
        .into_iter()
        .map(GeneratedEntry::into_template)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let text = "```json\n[{\"word\":\"cat\",\"definition\":\"animal\"}]\n```\n";
        assert_eq!(
            strip_code_fences(text),
            r#"[{"word":"cat","definition":"animal"}]"#
        );
        assert_eq!(strip_code_fences("  ```\n[]```  "), "[]");
    }

    #[test]
    fn parses_fenced_list_and_fills_defaults() {
        let text = r#"```json
[
  {"word": "cat", "definition": "a small animal", "example": "The cat sleeps.", "difficulty": 5},
  {"word": "ephemeral", "definition": "short-lived"},
  {"word": "vast", "definition": "very large", "example": "", "difficulty": 0}
]
```"#;
        let words = parse_word_list(text).unwrap();
        assert_eq!(words.len(), 3);

        assert_eq!(words[0].example, "The cat sleeps.");
        assert_eq!(words[0].difficulty, Some(Difficulty::new(5).unwrap()));

        assert_eq!(words[1].example, "Example sentence with ephemeral.");
        assert_eq!(words[1].difficulty, None);

        assert_eq!(words[2].example, "Example sentence with vast.");
        assert_eq!(words[2].difficulty, None);
    }

    #[test]
    fn out_of_range_difficulty_is_clamped() {
        let words = parse_word_list(
            r#"[{"word":"a","definition":"b","difficulty":250},{"word":"c","definition":"d","difficulty":42.6}]"#,
        )
        .unwrap();
        assert_eq!(words[0].difficulty, Some(Difficulty::MAX));
        assert_eq!(words[1].difficulty, Some(Difficulty::new(43).unwrap()));
    }

    #[test]
    fn rejects_prose_and_empty_lists() {
        assert!(matches!(
            parse_word_list("Sorry, I cannot help with that."),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            parse_word_list(r#"[{"word":"no definition"}]"#),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            parse_word_list("```json\n[]\n```"),
            Err(GenerationError::EmptyResponse)
        ));
        assert!(matches!(
            parse_word_list("   "),
            Err(GenerationError::EmptyResponse)
        ));
    }
}
