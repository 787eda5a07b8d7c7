use serde::Serialize;

use super::{Card, CardId};

const IGNORED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"'];

#[derive(Debug, Clone, Serialize)]
pub struct TypingPrompt {
    pub card_id: CardId,
    pub prompt: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharMatch {
    pub ch: char,
    pub matches: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypingCheck {
    pub correct: bool,
    pub expected: String,
    pub comparison: Vec<CharMatch>,
}

/// The learner sees Georgian and types the English.
pub fn generate(cards: &[Card]) -> Vec<TypingPrompt> {
    cards
        .iter()
        .map(|card| TypingPrompt {
            card_id: card.id,
            prompt: card.georgian.clone(),
            answer: card.english.clone(),
        })
        .collect()
}

/// Lowercases, drops punctuation and collapses runs of whitespace.
pub fn normalize(input: &str) -> String {
    let stripped: String = input
        .to_lowercase()
        .chars()
        .filter(|c| !IGNORED_PUNCTUATION.contains(c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Marks each typed character by whether it matches the expected character
/// at the same position.
pub fn character_comparison(input: &str, expected: &str) -> Vec<CharMatch> {
    let expected: Vec<char> = expected.to_lowercase().chars().collect();
    input
        .to_lowercase()
        .chars()
        .enumerate()
        .map(|(i, ch)| CharMatch {
            ch,
            matches: expected.get(i) == Some(&ch),
        })
        .collect()
}

pub fn check_typed_answer(input: &str, expected: &str) -> TypingCheck {
    TypingCheck {
        correct: normalize(input) == normalize(expected),
        expected: expected.to_string(),
        comparison: character_comparison(input, expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Hello,   World! "), "hello world");
        assert_eq!(normalize("It's \"fine\"."), "its fine");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_check_ignores_case_and_punctuation() {
        assert!(check_typed_answer("good morning", "Good morning!").correct);
        assert!(check_typed_answer("GOOD   MORNING.", "Good morning").correct);
        assert!(!check_typed_answer("good mourning", "Good morning").correct);
    }

    #[test]
    fn test_character_comparison() {
        let marks = character_comparison("Cot", "cat");
        assert_eq!(
            marks,
            vec![
                CharMatch { ch: 'c', matches: true },
                CharMatch { ch: 'o', matches: false },
                CharMatch { ch: 't', matches: true },
            ]
        );

        let longer = character_comparison("cats", "cat");
        assert!(!longer[3].matches);
    }
}
