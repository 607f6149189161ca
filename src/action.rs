use std::fmt::{Debug, Formatter};
use serde::{Deserialize, Serialize};
use crate::card::{Character, CHARACTER_VARIANTS};

/// An action a player can start their turn with.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Play {
    Exchange,
    ForeignAid,
    Income,
    Tax,
    Assassinate,
    Coup,
    Steal,
}

pub const NUM_PLAYS: usize = 7;

// self-targeted plays first, then the targeted ones, same as the action table
pub static PLAY_VARIANTS: [Play; NUM_PLAYS] = [
    Play::Exchange,
    Play::ForeignAid,
    Play::Income,
    Play::Tax,
    Play::Assassinate,
    Play::Coup,
    Play::Steal,
];

static TARGETED_PLAYS: [Play; 3] = [Play::Assassinate, Play::Coup, Play::Steal];

impl Play {
    pub fn index(self) -> usize {
        PLAY_VARIANTS.iter().position(|&p| p == self).unwrap_or_default()
    }

    /// The character the actor claims to hold, if any. Only claims can be challenged.
    pub fn claim(self) -> Option<Character> {
        match self {
            Play::Exchange => Some(Character::Ambassador),
            Play::Tax => Some(Character::Duke),
            Play::Assassinate => Some(Character::Assassin),
            Play::Steal => Some(Character::Captain),
            Play::ForeignAid | Play::Income | Play::Coup => None,
        }
    }

    pub fn blocks(self) -> &'static [Block] {
        match self {
            Play::ForeignAid => &[Block::ForeignAid],
            Play::Assassinate => &[Block::Assassinate],
            Play::Steal => &[Block::StealAmbassador, Block::StealCaptain],
            _ => &[],
        }
    }

    /// Coins paid up front when the play is declared.
    pub fn cost(self) -> u8 {
        match self {
            Play::Coup => 7,
            Play::Assassinate => 3,
            _ => 0,
        }
    }

    pub fn is_targeted(self) -> bool {
        TARGETED_PLAYS.contains(&self)
    }

    pub fn name(self) -> &'static str {
        match self {
            Play::Exchange => "EXCHANGE",
            Play::ForeignAid => "FOREIGN_AID",
            Play::Income => "INCOME",
            Play::Tax => "TAX",
            Play::Assassinate => "ASSASSINATE",
            Play::Coup => "COUP",
            Play::Steal => "STEAL",
        }
    }
}

/// A counter-claim against a play.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Block {
    Assassinate,
    ForeignAid,
    StealAmbassador,
    StealCaptain,
}

pub const NUM_BLOCKS: usize = 4;

pub static BLOCK_VARIANTS: [Block; NUM_BLOCKS] = [
    Block::Assassinate,
    Block::ForeignAid,
    Block::StealAmbassador,
    Block::StealCaptain,
];

impl Block {
    pub fn index(self) -> usize {
        BLOCK_VARIANTS.iter().position(|&b| b == self).unwrap_or_default()
    }

    pub fn claim(self) -> Character {
        match self {
            Block::Assassinate => Character::Contessa,
            Block::ForeignAid => Character::Duke,
            Block::StealAmbassador => Character::Ambassador,
            Block::StealCaptain => Character::Captain,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Block::Assassinate => "BLOCK_ASSASSINATE",
            Block::ForeignAid => "BLOCK_FOREIGN_AID",
            Block::StealAmbassador => "BLOCK_STEAL_AMB",
            Block::StealCaptain => "BLOCK_STEAL_CAP",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Lose(Character),
    ChallengePass,
    ChallengeCall,
    BlockPass,
    Block(Block),
    // target offset relative to the actor's seat, 0 for self-targeted plays
    Declare(Play, usize),
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Lose(character) => {
                f.write_fmt(format_args!("LOSE_{}", format!("{:?}", character).to_uppercase()))
            }
            Action::ChallengePass => f.write_str("CHALLENGE_PASS"),
            Action::ChallengeCall => f.write_str("CHALLENGE_CALL"),
            Action::BlockPass => f.write_str("BLOCK_PASS"),
            Action::Block(block) => f.write_str(block.name()),
            Action::Declare(play, 0) => f.write_str(play.name()),
            Action::Declare(play, offset) => {
                f.write_fmt(format_args!("{}_{offset}", play.name()))
            }
        }
    }
}

pub const LOSE_BASE: usize = 0;
pub const CHALLENGE_PASS: usize = 5;
pub const CHALLENGE_CALL: usize = 6;
pub const BLOCK_PASS: usize = 7;
pub const BLOCK_BASE: usize = 8;
pub const EXCHANGE: usize = 12;
pub const FOREIGN_AID: usize = 13;
pub const INCOME: usize = 14;
pub const TAX: usize = 15;
pub const TARGETED_BASE: usize = 16;

/// The fixed discrete action space for a table of `num_players` seats.
///
/// Targeted plays take one index per target offset: `ASSASSINATE_k`, `COUP_k`
/// and `STEAL_k` aim at the seat `k` places after the actor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ActionSpace {
    num_players: usize,
}

impl ActionSpace {
    pub fn new(num_players: usize) -> Self {
        Self { num_players }
    }

    pub fn len(&self) -> usize {
        TARGETED_BASE + TARGETED_PLAYS.len() * self.num_targets()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    fn num_targets(&self) -> usize {
        self.num_players - 1
    }

    pub fn index(&self, action: Action) -> Option<usize> {
        let idx = match action {
            Action::Lose(character) => LOSE_BASE + character.index(),
            Action::ChallengePass => CHALLENGE_PASS,
            Action::ChallengeCall => CHALLENGE_CALL,
            Action::BlockPass => BLOCK_PASS,
            Action::Block(block) => BLOCK_BASE + block.index(),
            Action::Declare(play, offset) if play.is_targeted() => {
                if offset == 0 || offset > self.num_targets() {
                    return None;
                }
                let block = TARGETED_PLAYS.iter().position(|&p| p == play)?;
                TARGETED_BASE + block * self.num_targets() + offset - 1
            }
            Action::Declare(_, offset) if offset != 0 => return None,
            Action::Declare(Play::Exchange, _) => EXCHANGE,
            Action::Declare(Play::ForeignAid, _) => FOREIGN_AID,
            Action::Declare(Play::Income, _) => INCOME,
            Action::Declare(Play::Tax, _) => TAX,
            Action::Declare(_, _) => return None,
        };

        Some(idx)
    }

    pub fn action(&self, idx: usize) -> Option<Action> {
        let action = match idx {
            0..=4 => Action::Lose(CHARACTER_VARIANTS[idx - LOSE_BASE]),
            CHALLENGE_PASS => Action::ChallengePass,
            CHALLENGE_CALL => Action::ChallengeCall,
            BLOCK_PASS => Action::BlockPass,
            8..=11 => Action::Block(BLOCK_VARIANTS[idx - BLOCK_BASE]),
            EXCHANGE => Action::Declare(Play::Exchange, 0),
            FOREIGN_AID => Action::Declare(Play::ForeignAid, 0),
            INCOME => Action::Declare(Play::Income, 0),
            TAX => Action::Declare(Play::Tax, 0),
            _ if idx < self.len() => {
                let rel = idx - TARGETED_BASE;
                let play = TARGETED_PLAYS[rel / self.num_targets()];
                Action::Declare(play, rel % self.num_targets() + 1)
            }
            _ => return None,
        };

        Some(action)
    }

    pub fn actions(&self) -> impl Iterator<Item=Action> + '_ {
        (0..self.len()).filter_map(|idx| self.action(idx))
    }
}
