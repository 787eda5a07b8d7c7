use std::ops::RangeInclusive;

use rand::Rng;
use serde::Serialize;

use super::{shuffled, Card, CardId, Source};

const PHRASE_WORDS: RangeInclusive<usize> = 3..=8;
const FILE_WORDS: RangeInclusive<usize> = 2..=6;

#[derive(Debug, Clone, Serialize)]
pub struct OrderingQuestion {
    pub card_id: CardId,
    pub translation: String,
    pub words: Vec<String>,
    pub correct_order: Vec<String>,
}

pub fn is_eligible(card: &Card, source: Source) -> bool {
    let range = match source {
        Source::Phrases => PHRASE_WORDS,
        Source::FileWords => FILE_WORDS,
    };
    range.contains(&card.word_count())
}

/// Shuffles `words`, guaranteeing the result differs from the input unless
/// every word is the same.
pub fn scramble<R: Rng + ?Sized>(words: &[String], rng: &mut R) -> Vec<String> {
    let mut result = shuffled(words, rng);
    let all_same = words.windows(2).all(|pair| pair[0] == pair[1]);
    if result == words && !all_same {
        result.rotate_left(1);
    }
    result
}

pub fn is_correct_order(submitted: &[String], correct: &[String]) -> bool {
    submitted == correct
}

pub fn generate<R: Rng + ?Sized>(cards: &[Card], rng: &mut R) -> Vec<OrderingQuestion> {
    cards
        .iter()
        .map(|card| {
            let correct_order: Vec<String> = card.english.split_whitespace().map(str::to_string).collect();
            OrderingQuestion {
                card_id: card.id,
                translation: card.georgian.clone(),
                words: scramble(&correct_order, rng),
                correct_order,
            }
        })
        .collect()
}
