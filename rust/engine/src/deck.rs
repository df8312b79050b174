use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// A deck with a deal cursor. Dealt cards stay in place behind the cursor,
/// so `peek` can observe the undealt remainder without consuming it.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
}

impl Deck {
    /// Fresh 52-card deck in canonical order; call [`Deck::shuffle`] before dealing.
    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        Self {
            cards: full_deck(),
            position: 0,
            rng,
        }
    }

    /// Shuffles the undealt remainder in place.
    pub fn shuffle(&mut self) {
        let position = self.position;
        self.cards[position..].shuffle(&mut self.rng);
    }

    /// Deals up to `n` cards, advancing the cursor. A short deck yields fewer.
    pub fn deal(&mut self, n: usize) -> Vec<Card> {
        let end = (self.position + n).min(self.cards.len());
        let dealt = self.cards[self.position..end].to_vec();
        self.position = end;
        dealt
    }

    /// The first `k` undealt cards, without consuming them.
    pub fn peek(&self, k: usize) -> &[Card] {
        let end = (self.position + k).min(self.cards.len());
        &self.cards[self.position..end]
    }

    /// An independent copy of the undealt remainder with its own derived RNG.
    /// The copy starts unshuffled; shuffling it never affects this deck.
    pub fn residual(&mut self) -> Deck {
        Deck {
            cards: self.cards[self.position..].to_vec(),
            position: 0,
            rng: ChaCha20Rng::seed_from_u64(self.rng.next_u64()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}
