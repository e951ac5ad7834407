use std::fmt::Write as _;

use vocab_core::diagnostic::diagnostic_difficulties;
use vocab_core::model::{Difficulty, UsedWords};

/// Learner tier named in a session prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl PromptTier {
    #[must_use]
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty.value() {
            0..=20 => Self::Beginner,
            21..=60 => Self::Intermediate,
            _ => Self::Advanced,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// Prompt asking for `count` words around `difficulty`, excluding `used`.
#[must_use]
pub fn session_prompt(difficulty: Difficulty, count: usize, used: &UsedWords) -> String {
    let tier = PromptTier::for_difficulty(difficulty).as_str();
    let mut prompt = format!(
        "Generate exactly {count} English vocabulary words for {tier} level learners \
         (difficulty {difficulty}/100).\n\n\
         Requirements:\n\
         - Return ONLY a valid JSON array, no markdown formatting\n\
         - Each word must be unique and appropriate for the difficulty level\n\
         - Include: word (string), definition (string), example (English sentence), \
         difficulty (number 1-100)"
    );

    if !used.is_empty() {
        let _ = write!(
            prompt,
            "\n\nIMPORTANT: Do NOT include any of these words that have already been used:\n{}",
            used.as_slice().join(", ")
        );
    }

    let _ = write!(
        prompt,
        "\n\nFormat:\n[\n  {{\n    \"word\": \"example\",\n    \"definition\": \"a representative case\",\n    \
         \"example\": \"This is an example sentence.\",\n    \"difficulty\": {difficulty}\n  }}\n]\n\n\
         Generate {count} words now:"
    );
    prompt
}

/// Prompt asking for one word at each diagnostic difficulty.
#[must_use]
pub fn diagnostic_prompt() -> String {
    let steps: Vec<String> = diagnostic_difficulties().map(|d| d.to_string()).collect();
    format!(
        "Generate exactly {count} English vocabulary words for a diagnostic test with varying \
         difficulty levels.\n\n\
         Requirements:\n\
         - Return ONLY a valid JSON array, no markdown formatting\n\
         - Words should range from very easy (difficulty {first}) to very difficult (difficulty {last})\n\
         - Generate words at these specific difficulty levels: {levels}\n\
         - Each word MUST match its difficulty level:\n  \
         * Difficulty 5-20: very basic words (e.g., cat, dog, run, happy)\n  \
         * Difficulty 25-40: common everyday words (e.g., beautiful, important, understand)\n  \
         * Difficulty 45-60: intermediate words (e.g., accomplish, significant, demonstrate)\n  \
         * Difficulty 65-80: advanced words (e.g., meticulous, eloquent, paradigm)\n  \
         * Difficulty 85-100: very difficult or academic words (e.g., ubiquitous, ephemeral)\n\
         - Include: word (string), definition (string), example (English sentence), difficulty (number)\n\n\
         Generate {count} words now with appropriate difficulty matching:",
        count = steps.len(),
        first = steps.first().map_or("5", String::as_str),
        last = steps.last().map_or("100", String::as_str),
        levels = steps.join(", "),
    )
}
