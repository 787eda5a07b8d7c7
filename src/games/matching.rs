use rand::Rng;
use serde::Serialize;

use super::{shuffled, Card, CardId};

pub const MATCHING_PAIRS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchingTile {
    pub id: CardId,
    pub text: String,
}

/// Two independently shuffled columns. A tile on the left matches the tile
/// on the right with the same id.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingBoard {
    pub english: Vec<MatchingTile>,
    pub georgian: Vec<MatchingTile>,
}

pub fn generate<R: Rng + ?Sized>(cards: &[Card], rng: &mut R) -> MatchingBoard {
    let pairs = &cards[..cards.len().min(MATCHING_PAIRS)];

    let english: Vec<MatchingTile> = pairs
        .iter()
        .map(|c| MatchingTile {
            id: c.id,
            text: c.english.clone(),
        })
        .collect();
    let georgian: Vec<MatchingTile> = pairs
        .iter()
        .map(|c| MatchingTile {
            id: c.id,
            text: c.georgian.clone(),
        })
        .collect();

    MatchingBoard {
        english: shuffled(&english, rng),
        georgian: shuffled(&georgian, rng),
    }
}

pub fn is_match(left: CardId, right: CardId) -> bool {
    left == right
}
