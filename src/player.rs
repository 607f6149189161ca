use crate::card::{count_cards, CardCounts, Character};

pub const STARTING_COINS: u8 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub seat: usize,
    pub coins: u8,
    // face-down influence cards; lost cards leave the hand for the discard pile
    pub(crate) hand: Vec<Character>,
}

impl Player {
    pub fn new(seat: usize) -> Self {
        Self {
            seat,
            coins: STARTING_COINS,
            hand: Vec::with_capacity(4),
        }
    }

    pub fn hand(&self) -> &[Character] {
        &self.hand
    }

    pub fn alive(&self) -> bool {
        !self.hand.is_empty()
    }

    pub fn holds(&self, character: Character) -> bool {
        self.hand.contains(&character)
    }

    pub fn card_counts(&self) -> CardCounts {
        count_cards(&self.hand)
    }

    pub(crate) fn take(&mut self, character: Character) -> Option<Character> {
        let idx = self.hand.iter().position(|&c| c == character)?;
        Some(self.hand.remove(idx))
    }
}
