//! Exercise generators for the six learning modes.
//!
//! Generators are pure functions over [`Card`]s and take the RNG as a
//! parameter, so a seeded RNG gives reproducible exercises. The HTTP layer
//! loads phrases or file words, turns them into cards and calls
//! [`build_exercise`].

pub mod fill_blank;
pub mod flashcards;
pub mod matching;
pub mod ordering;
pub mod quiz;
pub mod typing;

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{FileWord, Phrase};

pub use fill_blank::FillBlankQuestion;
pub use flashcards::{review_flashcards, FlashcardDeck, FlashcardReview};
pub use matching::{is_match, MatchingBoard, MatchingTile};
pub use ordering::{is_correct_order, OrderingQuestion};
pub use quiz::{Direction, QuizQuestion};
pub use typing::{check_typed_answer, TypingCheck, TypingPrompt};

/// Cards per exercise session.
pub const SESSION_SIZE: usize = 10;
/// Multiple-choice questions show the answer plus this many distractors.
pub const DISTRACTOR_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardId {
    Phrase(i32),
    Word(Uuid),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub id: CardId,
    pub english: String,
    pub georgian: String,
}

impl Card {
    pub fn word_count(&self) -> usize {
        self.english.split_whitespace().count()
    }
}

impl From<&Phrase> for Card {
    fn from(phrase: &Phrase) -> Self {
        Self {
            id: CardId::Phrase(phrase.id),
            english: phrase.english.clone(),
            georgian: phrase.georgian.clone(),
        }
    }
}

impl From<&FileWord> for Card {
    fn from(word: &FileWord) -> Self {
        Self {
            id: CardId::Word(word.id),
            english: word.english.clone(),
            georgian: word.georgian.clone(),
        }
    }
}

/// Where the cards come from. Phrases and file words have slightly
/// different eligibility rules and quiz directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Phrases,
    FileWords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Flashcards,
    Quiz,
    FillBlank,
    Ordering,
    Matching,
    Typing,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Flashcards => "flashcards",
            Mode::Quiz => "quiz",
            Mode::FillBlank => "fill-blank",
            Mode::Ordering => "ordering",
            Mode::Matching => "matching",
            Mode::Typing => "typing",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flashcards" => Ok(Mode::Flashcards),
            "quiz" => Ok(Mode::Quiz),
            "fill-blank" => Ok(Mode::FillBlank),
            "ordering" => Ok(Mode::Ordering),
            "matching" => Ok(Mode::Matching),
            "typing" => Ok(Mode::Typing),
            other => Err(format!("Unknown learning mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Exercise {
    Flashcards { cards: Vec<Card> },
    Quiz { questions: Vec<QuizQuestion> },
    FillBlank { questions: Vec<FillBlankQuestion> },
    Ordering { questions: Vec<OrderingQuestion> },
    Matching { board: MatchingBoard },
    Typing { prompts: Vec<TypingPrompt> },
}

fn minimum_cards(mode: Mode, source: Source) -> usize {
    match (mode, source) {
        (Mode::Quiz, _) => DISTRACTOR_COUNT + 1,
        (Mode::FillBlank | Mode::Ordering | Mode::Matching, Source::Phrases) => 4,
        (Mode::Matching, Source::FileWords) => 2,
        _ => 1,
    }
}

/// Builds one exercise session from `pool`. Returns `None` when the pool
/// does not hold enough eligible cards for `mode`.
pub fn build_exercise<R: Rng + ?Sized>(
    mode: Mode,
    source: Source,
    pool: &[Card],
    rng: &mut R,
) -> Option<Exercise> {
    let candidates: Vec<Card> = match mode {
        Mode::FillBlank => fill_blank::candidates(pool, source),
        Mode::Ordering => pool
            .iter()
            .filter(|card| ordering::is_eligible(card, source))
            .cloned()
            .collect(),
        _ => pool.to_vec(),
    };

    if candidates.is_empty() || candidates.len() < minimum_cards(mode, source) {
        return None;
    }

    let size = match mode {
        Mode::Matching => matching::MATCHING_PAIRS,
        _ => SESSION_SIZE,
    };
    let mut cards = shuffled(&candidates, rng);
    cards.truncate(size);

    let exercise = match mode {
        Mode::Flashcards => Exercise::Flashcards { cards },
        Mode::Quiz => Exercise::Quiz {
            questions: quiz::generate(&cards, Direction::for_source(source), rng),
        },
        Mode::FillBlank => Exercise::FillBlank {
            questions: fill_blank::generate(&cards, pool, source, rng),
        },
        Mode::Ordering => Exercise::Ordering {
            questions: ordering::generate(&cards, rng),
        },
        Mode::Matching => Exercise::Matching {
            board: matching::generate(&cards, rng),
        },
        Mode::Typing => Exercise::Typing {
            prompts: typing::generate(&cards),
        },
    };
    Some(exercise)
}

/// Returns a shuffled copy of `items`, leaving the input untouched.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut copy = items.to_vec();
    copy.shuffle(rng);
    copy
}

/// Up to `n` distinct items from `pool`, none equal to `correct`, in random order.
pub fn pick_distractors<T, R>(correct: &T, pool: &[T], n: usize, rng: &mut R) -> Vec<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let mut unique: Vec<T> = Vec::new();
    for item in pool {
        if item != correct && !unique.contains(item) {
            unique.push(item.clone());
        }
    }
    unique.shuffle(rng);
    unique.truncate(n);
    unique
}
