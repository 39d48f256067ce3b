//! Cards and the per-round card registry.

use serde::{Deserialize, Serialize};

/// Index of a card within its round. Stable until the next round starts.
pub type CardId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    Hidden,
    Revealed,
    Matched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub letter: char,
    pub state: CardState,
}

impl Card {
    pub fn is_face_up(&self) -> bool {
        !matches!(self.state, CardState::Hidden)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("card {0} not found")]
    NotFound(CardId),
}

#[derive(Debug, Default)]
pub struct CardRegistry {
    cards: Vec<Card>,
}

impl CardRegistry {
    pub fn new() -> Self { Self { cards: Vec::new() } }

    /// Replaces whatever the previous round left behind with one hidden card
    /// per letter, ids following sequence order.
    pub fn create_round(&mut self, letters: &[char]) {
        self.cards = letters
            .iter()
            .enumerate()
            .map(|(id, &letter)| Card { id, letter, state: CardState::Hidden })
            .collect();
    }

    pub fn find_by_id(&self, id: CardId) -> Result<&Card, LookupError> {
        self.cards.get(id).ok_or(LookupError::NotFound(id))
    }

    pub fn find_by_id_mut(&mut self, id: CardId) -> Result<&mut Card, LookupError> {
        self.cards.get_mut(id).ok_or(LookupError::NotFound(id))
    }

    pub fn cards(&self) -> &[Card] { &self.cards }

    pub fn len(&self) -> usize { self.cards.len() }

    pub fn is_empty(&self) -> bool { self.cards.is_empty() }

    pub fn count_in(&self, state: CardState) -> usize {
        self.cards.iter().filter(|c| c.state == state).count()
    }
}
