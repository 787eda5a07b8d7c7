use std::collections::VecDeque;

use serde::Serialize;

use super::{Card, CardId};

/// A flashcard pass over a set of cards. Known cards leave the deck and
/// unknown cards go to the back until every card is known.
#[derive(Debug, Clone)]
pub struct FlashcardDeck<T = Card> {
    queue: VecDeque<T>,
    round: u32,
    left_in_round: usize,
    known: usize,
}

impl<T> FlashcardDeck<T> {
    pub fn new(cards: Vec<T>) -> Self {
        let left_in_round = cards.len();
        Self {
            queue: cards.into(),
            round: 1,
            left_in_round,
            known: 0,
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.queue.front()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn known_count(&self) -> usize {
        self.known
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_complete(&self) -> bool {
        self.queue.is_empty()
    }

    /// Removes the current card. Returns it, or `None` when the deck is done.
    pub fn know(&mut self) -> Option<T> {
        let card = self.queue.pop_front()?;
        self.known += 1;
        self.advance();
        Some(card)
    }

    /// Moves the current card to the back of the deck. Returns `true` when
    /// this happened during the first round, i.e. the miss should be
    /// recorded as a mistake.
    pub fn dont_know(&mut self) -> bool {
        let first_round = self.round == 1;
        if let Some(card) = self.queue.pop_front() {
            self.queue.push_back(card);
            self.advance();
            first_round
        } else {
            false
        }
    }

    fn advance(&mut self) {
        self.left_in_round = self.left_in_round.saturating_sub(1);
        if self.left_in_round == 0 && !self.queue.is_empty() {
            self.round += 1;
            self.left_in_round = self.queue.len();
        }
    }
}

/// Outcome of replaying a client's flashcard answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashcardReview {
    pub complete: bool,
    pub rounds: u32,
    pub known: usize,
    pub remaining: usize,
    /// Cards missed on their first encounter, in the order they were missed.
    pub mistakes: Vec<CardId>,
}

/// Replays `answers` (`true` = know) over a deck in `cards` order. Answers
/// after the deck is finished are ignored.
pub fn review_flashcards(cards: Vec<CardId>, answers: &[bool]) -> FlashcardReview {
    let mut deck = FlashcardDeck::new(cards);
    let mut mistakes = Vec::new();

    for &known in answers {
        let Some(&current) = deck.current() else {
            break;
        };
        if known {
            deck.know();
        } else if deck.dont_know() {
            mistakes.push(current);
        }
    }

    FlashcardReview {
        complete: deck.is_complete(),
        rounds: deck.round(),
        known: deck.known_count(),
        remaining: deck.remaining(),
        mistakes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::test_support::*;
    use crate::games::CardId;

    fn deck() -> FlashcardDeck {
        FlashcardDeck::new(phrase_deck().into_iter().take(3).collect())
    }

    #[test]
    fn test_knowing_everything_finishes_in_one_round() {
        let mut deck = deck();
        while deck.know().is_some() {}
        assert!(deck.is_complete());
        assert_eq!(deck.known_count(), 3);
        assert_eq!(deck.round(), 1);
    }

    #[test]
    fn test_unknown_card_comes_back_in_next_round() {
        let mut deck = deck();
        assert_eq!(deck.current().map(|c| c.id), Some(CardId::Phrase(1)));

        assert!(deck.dont_know());
        deck.know();
        deck.know();
        assert_eq!(deck.round(), 2);
        assert_eq!(deck.remaining(), 1);
        assert_eq!(deck.current().map(|c| c.id), Some(CardId::Phrase(1)));

        // Misses after the first round are not mistakes.
        assert!(!deck.dont_know());
        assert_eq!(deck.round(), 3);
        deck.know();
        assert!(deck.is_complete());
    }

    #[test]
    fn test_empty_deck() {
        let mut deck = FlashcardDeck::<Card>::new(Vec::new());
        assert!(deck.is_complete());
        assert!(deck.know().is_none());
        assert!(!deck.dont_know());
    }

    #[test]
    fn test_review_records_only_first_round_misses() {
        let ids = vec![CardId::Phrase(1), CardId::Phrase(2), CardId::Phrase(3)];
        let review = review_flashcards(ids, &[false, true, false, false, true, true, true]);

        assert_eq!(review.mistakes, vec![CardId::Phrase(1), CardId::Phrase(3)]);
        assert!(review.complete);
        assert_eq!(review.known, 3);
        assert_eq!(review.remaining, 0);
        assert_eq!(review.rounds, 3);
    }

    #[test]
    fn test_review_ignores_answers_after_completion() {
        let review = review_flashcards(vec![CardId::Phrase(7)], &[true, false, false]);
        assert!(review.complete);
        assert!(review.mistakes.is_empty());
    }

    #[test]
    fn test_review_partial_session() {
        let ids = vec![CardId::Phrase(1), CardId::Phrase(2)];
        let review = review_flashcards(ids, &[true]);
        assert!(!review.complete);
        assert_eq!(review.remaining, 1);
        assert_eq!(review.rounds, 1);
    }
}
