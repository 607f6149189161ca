use serde::{Deserialize, Serialize};
use crate::action::{Block, Play};
use crate::card::Character;

/// Which claim a challenge window is answering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Against {
    Action,
    Block,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Succeeded,
    BluffCaught,
    Blocked,
}

/// One public thing that happened during a turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    ActionDeclared { actor: usize, play: Play, target: Option<usize> },
    ChallengePassed { seat: usize, against: Against },
    ChallengeCalled { seat: usize, against: Against, claim: Character },
    ChallengeResolved { challenger: usize, loser: usize, claim: Character },
    BlockDeclared { blocker: usize, block: Block },
    BlockPassed { seat: usize },
    BlockChallengeResolved { challenger: usize, loser: usize, claim: Character },
    CardLost { seat: usize, card: Character },
    ActionResolved { actor: usize, play: Play, outcome: Outcome },
}

/// Events of the turn in progress, plus every finished turn of the episode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnLog {
    current: Vec<TurnEvent>,
    archive: Vec<Vec<TurnEvent>>,
}

impl TurnLog {
    pub fn push(&mut self, event: TurnEvent) {
        self.current.push(event);
    }

    pub fn events(&self) -> &[TurnEvent] {
        &self.current
    }

    pub fn archive(&self) -> &[Vec<TurnEvent>] {
        &self.archive
    }

    /// Closes the current turn. The next turn starts from an empty log.
    pub fn archive_turn(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.archive.push(finished);
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.current.iter().find_map(|event| match event {
            TurnEvent::ActionResolved { outcome, .. } => Some(*outcome),
            _ => None,
        })
    }
}
