use serde::{Deserialize, Serialize};
use crate::card::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Character {
    Ambassador,
    Assassin,
    Captain,
    Contessa,
    Duke,
}

pub const NUM_CHARACTERS: usize = 5;

// order matters, it is the order of every per-card block in the observation
pub static CHARACTER_VARIANTS: [Character; NUM_CHARACTERS] = [
    Ambassador,
    Assassin,
    Captain,
    Contessa,
    Duke,
];

impl Character {
    pub fn index(self) -> usize {
        match self {
            Ambassador => 0,
            Assassin => 1,
            Captain => 2,
            Contessa => 3,
            Duke => 4,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Ambassador => "Amb",
            Assassin => "Ass",
            Captain => "Cap",
            Contessa => "Con",
            Duke => "Duk",
        }
    }
}

/// Number of cards per character, indexed by [`Character::index`].
pub type CardCounts = [u8; NUM_CHARACTERS];

pub fn count_cards(cards: &[Character]) -> CardCounts {
    let mut counts = [0; NUM_CHARACTERS];
    for card in cards {
        counts[card.index()] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_are_indexed_in_order() {
        for (idx, character) in CHARACTER_VARIANTS.iter().enumerate() {
            assert_eq!(character.index(), idx);
        }
    }

    #[test]
    fn counts() {
        assert_eq!(count_cards(&[Duke, Duke, Ambassador]), [1, 0, 0, 0, 2]);
        assert_eq!(count_cards(&[]), [0; NUM_CHARACTERS]);
    }
}
