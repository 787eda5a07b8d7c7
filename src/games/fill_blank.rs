use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::{shuffled, Card, CardId, Source, DISTRACTOR_COUNT};

pub const BLANK: &str = "_____";

/// Phrases need at least this many words to be worth blanking.
const MIN_PHRASE_WORDS: usize = 3;
/// File words are preferred as multi-word expressions when there are enough of them.
const MIN_MULTI_WORD_FILE_CARDS: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct FillBlankQuestion {
    pub card_id: CardId,
    pub sentence_with_blank: String,
    pub missing_word: String,
    pub translation: String,
    pub options: Vec<String>,
}

/// Cards a fill-in-the-blank session may draw from.
pub fn candidates(pool: &[Card], source: Source) -> Vec<Card> {
    match source {
        Source::Phrases => pool
            .iter()
            .filter(|card| card.word_count() >= MIN_PHRASE_WORDS)
            .cloned()
            .collect(),
        Source::FileWords => {
            let multi: Vec<Card> = pool.iter().filter(|card| card.word_count() >= 2).cloned().collect();
            if multi.len() >= MIN_MULTI_WORD_FILE_CARDS {
                multi
            } else {
                pool.to_vec()
            }
        }
    }
}

/// Picks a word longer than two characters, falling back to any word.
fn choose_blank<R: Rng + ?Sized>(words: &[&str], rng: &mut R) -> Option<usize> {
    let long: Vec<usize> = (0..words.len()).filter(|&i| words[i].chars().count() > 2).collect();
    if long.is_empty() {
        (0..words.len()).collect::<Vec<_>>().choose(rng).copied()
    } else {
        long.choose(rng).copied()
    }
}

/// Distinct words from `pool`, none matching `missing` case-insensitively.
fn word_distractors<R: Rng + ?Sized>(missing: &str, pool: Vec<String>, rng: &mut R) -> Vec<String> {
    let missing = missing.to_lowercase();
    let mut unique: Vec<String> = Vec::new();
    for word in pool {
        let lowered = word.to_lowercase();
        if lowered != missing && !unique.iter().any(|w| w.to_lowercase() == lowered) {
            unique.push(word);
        }
    }
    unique.shuffle(rng);
    unique.truncate(DISTRACTOR_COUNT);
    unique
}

fn blanked(words: &[&str], index: usize) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| if i == index { BLANK } else { *w })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One question per card in `cards`; distractor words come from the other cards in `pool`.
///
/// A single-word file card cannot be blanked inside a sentence, so its
/// question shows the Georgian translation with the whole English word missing.
pub fn generate<R: Rng + ?Sized>(
    cards: &[Card],
    pool: &[Card],
    source: Source,
    rng: &mut R,
) -> Vec<FillBlankQuestion> {
    let mut questions = Vec::with_capacity(cards.len());

    for card in cards {
        let words: Vec<&str> = card.english.split_whitespace().collect();
        let others = pool.iter().filter(|other| other.id != card.id);

        let (sentence_with_blank, missing_word, distractor_pool) = match source {
            Source::FileWords if words.len() < 2 => (
                card.georgian.clone(),
                card.english.clone(),
                others.map(|o| o.english.clone()).collect::<Vec<_>>(),
            ),
            _ => {
                let Some(index) = choose_blank(&words, rng) else {
                    continue;
                };
                let distractor_pool = match source {
                    Source::Phrases => others
                        .flat_map(|o| o.english.split_whitespace())
                        .filter(|w| w.chars().count() > 2)
                        .map(str::to_string)
                        .collect(),
                    Source::FileWords => others
                        .filter_map(|o| o.english.split_whitespace().next())
                        .map(str::to_string)
                        .collect(),
                };
                (blanked(&words, index), words[index].to_string(), distractor_pool)
            }
        };

        let mut options = word_distractors(&missing_word, distractor_pool, rng);
        options.push(missing_word.clone());

        questions.push(FillBlankQuestion {
            card_id: card.id,
            sentence_with_blank,
            missing_word,
            translation: card.georgian.clone(),
            options: shuffled(&options, rng),
        });
    }

    questions
}
