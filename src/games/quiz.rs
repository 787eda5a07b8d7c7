use rand::Rng;
use serde::Serialize;

use super::{pick_distractors, shuffled, Card, CardId, Source, DISTRACTOR_COUNT};

/// Which side of the card is shown and which side is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    EnglishToGeorgian,
    GeorgianToEnglish,
}

impl Direction {
    pub fn for_source(source: Source) -> Self {
        match source {
            Source::Phrases => Direction::EnglishToGeorgian,
            Source::FileWords => Direction::GeorgianToEnglish,
        }
    }

    fn prompt<'a>(&self, card: &'a Card) -> &'a str {
        match self {
            Direction::EnglishToGeorgian => &card.english,
            Direction::GeorgianToEnglish => &card.georgian,
        }
    }

    fn answer<'a>(&self, card: &'a Card) -> &'a str {
        match self {
            Direction::EnglishToGeorgian => &card.georgian,
            Direction::GeorgianToEnglish => &card.english,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizQuestion {
    pub card_id: CardId,
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// One question per card. Distractors are other cards' answers.
pub fn generate<R: Rng + ?Sized>(cards: &[Card], direction: Direction, rng: &mut R) -> Vec<QuizQuestion> {
    cards
        .iter()
        .map(|card| {
            let answer = direction.answer(card).to_string();
            let others: Vec<String> = cards
                .iter()
                .filter(|other| other.id != card.id)
                .map(|other| direction.answer(other).to_string())
                .collect();

            let mut options = pick_distractors(&answer, &others, DISTRACTOR_COUNT, rng);
            options.push(answer.clone());

            QuizQuestion {
                card_id: card.id,
                prompt: direction.prompt(card).to_string(),
                options: shuffled(&options, rng),
                answer,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::test_support::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_answer_included_exactly_once() {
        let mut rng = StdRng::seed_from_u64(42);
        let deck = phrase_deck();
        let questions = generate(&deck, Direction::EnglishToGeorgian, &mut rng);
        assert_eq!(questions.len(), deck.len());

        for question in &questions {
            assert_eq!(question.options.len(), 4);
            let hits = question.options.iter().filter(|o| **o == question.answer).count();
            assert_eq!(hits, 1, "{:?}", question);

            let mut unique = question.options.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), question.options.len());
        }
    }

    #[test]
    fn test_direction_for_files() {
        let mut rng = StdRng::seed_from_u64(42);
        let deck = phrase_deck();
        let questions = generate(&deck[..4], Direction::for_source(Source::FileWords), &mut rng);
        assert_eq!(questions[0].prompt, deck[0].georgian);
        assert_eq!(questions[0].answer, deck[0].english);
    }

    #[test]
    fn test_duplicate_answers_do_not_repeat() {
        let mut rng = StdRng::seed_from_u64(5);
        let deck = vec![
            phrase_card(1, "hello", "გამარჯობა"),
            phrase_card(2, "hi", "გამარჯობა"),
            phrase_card(3, "bye", "ნახვამდის"),
        ];
        let questions = generate(&deck, Direction::EnglishToGeorgian, &mut rng);
        assert_eq!(questions[0].options.len(), 2);
        assert!(questions[0].options.contains(&"ნახვამდის".to_string()));
    }
}
