//! Observation vectors from one seat's point of view.
//!
//! Every per-seat block is rotated so the observer sits at position 0, followed by
//! the other seats in play order (eliminated seats included). The only private
//! information is the observer's own hand and the tally of cards it can't see.

use serde::Serialize;
use crate::action::{NUM_BLOCKS, NUM_PLAYS};
use crate::card::NUM_CHARACTERS;
use crate::state::Table;
use crate::turn_log::{Against, TurnEvent};

pub type Observation = Vec<u8>;

// BLOCK_PASS leads the block one-hot, ahead of the four blocks
const BLOCK_SLOTS: usize = 1 + NUM_BLOCKS;

/// Coins shown are capped here; a player can't sit on more than this without having to coup.
pub const MAX_COINS: u8 = 12;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Scope {
    Public,
    Private,
}

/// One block of the observation vector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub desc: &'static str,
    pub size: usize,
    pub max: u8,
    pub scope: Scope,
    /// Indexed by seat, rotated to the observer.
    pub per_seat: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ObservationLayout {
    num_players: usize,
    max_card_count: u8,
}

impl ObservationLayout {
    pub fn new(num_players: usize, max_card_count: u8) -> Self {
        Self { num_players, max_card_count }
    }

    pub fn segments(&self) -> Vec<Segment> {
        let n = self.num_players;
        let seat = |desc, max, scope| Segment { desc, size: n, max, scope, per_seat: true };
        let fixed = |desc, size, max, scope| Segment { desc, size, max, scope, per_seat: false };
        use Scope::{Private, Public};

        vec![
            seat("Coins of each player", MAX_COINS, Public),
            fixed("Unseen card totals", NUM_CHARACTERS, self.max_card_count, Private),
            fixed("Player's cards by type", NUM_CHARACTERS, self.max_card_count, Private),
            seat("Card totals per player", 4, Public),
            fixed("Action", NUM_PLAYS, 1, Public),
            seat("Actor", 1, Public),
            seat("Action's target", 1, Public),
            seat("Challenge passed", 1, Public),
            seat("Challenger", 1, Public),
            seat("Challenge loser", 1, Public),
            fixed("Block action", BLOCK_SLOTS, 1, Public),
            seat("Block passed", 1, Public),
            seat("Blocker", 1, Public),
            seat("Block challenge passed", 1, Public),
            seat("Block challenger", 1, Public),
            seat("Block challenge loser", 1, Public),
        ]
    }

    pub fn len(&self) -> usize {
        self.segments().iter().map(|s| s.size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upper bound of every entry, in vector order.
    pub fn highs(&self) -> Vec<u8> {
        self.segments()
            .iter()
            .flat_map(|s| std::iter::repeat(s.max).take(s.size))
            .collect()
    }

    /// Start offset of the segment with this description.
    pub fn offset(&self, desc: &str) -> Option<usize> {
        let mut offset = 0;
        for segment in self.segments() {
            if segment.desc == desc {
                return Some(offset);
            }
            offset += segment.size;
        }
        None
    }
}

/// Per-seat indicator block, rotated so `observer` lands at index 0.
struct SeatBlock {
    values: Vec<u8>,
    observer: usize,
}

impl SeatBlock {
    fn new(num_players: usize, observer: usize) -> Self {
        Self { values: vec![0; num_players], observer }
    }

    fn set(&mut self, seat: usize, value: u8) {
        let n = self.values.len();
        self.values[(seat + n - self.observer) % n] = value;
    }

    fn mark(&mut self, seat: Option<usize>) {
        if let Some(seat) = seat {
            self.set(seat, 1);
        }
    }
}

pub fn encode(table: &Table, observer: usize) -> Observation {
    let n = table.num_players();
    let hidden = table.hidden();
    let seats = || SeatBlock::new(n, observer);

    let mut coins = seats();
    let mut card_totals = seats();
    for player in hidden.players() {
        coins.set(player.seat, player.coins.min(MAX_COINS));
        card_totals.set(player.seat, player.hand().len() as u8);
    }

    let mut action = [0u8; NUM_PLAYS];
    let (mut actor, mut target) = (seats(), seats());
    let (mut challenge_passed, mut challenger, mut challenge_loser) = (seats(), seats(), seats());
    let mut block_action = [0u8; BLOCK_SLOTS];
    let (mut block_passed, mut blocker) = (seats(), seats());
    let (mut block_challenge_passed, mut block_challenger, mut block_challenge_loser) = (seats(), seats(), seats());

    for event in table.log().events() {
        match *event {
            TurnEvent::ActionDeclared { actor: seat, play, target: aimed } => {
                action[play.index()] = 1;
                actor.set(seat, 1);
                target.mark(aimed);
            }
            TurnEvent::ChallengePassed { seat, against: Against::Action } => challenge_passed.set(seat, 1),
            TurnEvent::ChallengePassed { seat, against: Against::Block } => block_challenge_passed.set(seat, 1),
            TurnEvent::ChallengeResolved { challenger: seat, loser, .. } => {
                challenger.set(seat, 1);
                challenge_loser.set(loser, 1);
            }
            TurnEvent::BlockChallengeResolved { challenger: seat, loser, .. } => {
                block_challenger.set(seat, 1);
                block_challenge_loser.set(loser, 1);
            }
            TurnEvent::BlockDeclared { blocker: seat, block } => {
                block_action = [0; BLOCK_SLOTS];
                block_action[1 + block.index()] = 1;
                blocker.set(seat, 1);
            }
            TurnEvent::BlockPassed { seat } => {
                block_passed.set(seat, 1);
                if blocker.values.iter().all(|&v| v == 0) {
                    block_action[0] = 1;
                }
            }
            TurnEvent::ChallengeCalled { .. } | TurnEvent::CardLost { .. } | TurnEvent::ActionResolved { .. } => {}
        }
    }

    let mut obs = Vec::with_capacity(12 * n + 22);
    obs.extend(coins.values);
    obs.extend(hidden.unseen(observer));
    obs.extend(hidden.player(observer).card_counts());
    obs.extend(card_totals.values);
    obs.extend(action);
    obs.extend(actor.values);
    obs.extend(target.values);
    obs.extend(challenge_passed.values);
    obs.extend(challenger.values);
    obs.extend(challenge_loser.values);
    obs.extend(block_action);
    obs.extend(block_passed.values);
    obs.extend(blocker.values);
    obs.extend(block_challenge_passed.values);
    obs.extend(block_challenger.values);
    obs.extend(block_challenge_loser.values);
    obs
}
