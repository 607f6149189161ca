//! The turn state machine: declaration, challenge, block, block challenge and card loss.

use tracing::debug;
use crate::action::{Action, Block, Play};
use crate::card::Character;
use crate::deck::{DeckError, HiddenState};
use crate::protocol::{protocol, PhaseKind};
use crate::turn_log::{Against, Outcome, TurnEvent, TurnLog};

/// A play as declared: who, what, at whom.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub actor: usize,
    pub play: Play,
    pub target: Option<usize>,
}

/// Why a seat is giving up a card, which decides where the turn goes afterward.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LossReason {
    // the actor held the claim; the action carries on
    ChallengeLost,
    // the actor did not; the action is void
    BluffCaught,
    // the blocker held the claim; the block stands
    BlockChallengeLost,
    // the blocker did not; the action resolves
    BlockBluffCaught,
    // coup or assassination
    ActionEffect,
    // not a loss: the actor puts back two of the cards in hand, one pick at a time
    ExchangeReturn {
        drawn: [Character; 2],
        returned: Option<Character>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitAction,
    AwaitChallenge {
        decl: Declaration,
        responder: usize,
    },
    AwaitBlock {
        decl: Declaration,
        responder: usize,
    },
    AwaitBlockChallenge {
        decl: Declaration,
        block: Block,
        blocker: usize,
        responder: usize,
    },
    AwaitCardLoss {
        decl: Declaration,
        loser: usize,
        reason: LossReason,
    },
    TerminalTurn,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::AwaitAction => PhaseKind::AwaitAction,
            Phase::AwaitChallenge { .. } => PhaseKind::AwaitChallenge,
            Phase::AwaitBlock { .. } => PhaseKind::AwaitBlock,
            Phase::AwaitBlockChallenge { .. } => PhaseKind::AwaitBlockChallenge,
            Phase::AwaitCardLoss { .. } => PhaseKind::AwaitCardLoss,
            Phase::TerminalTurn => PhaseKind::TerminalTurn,
        }
    }
}

/// Everything about an episode in progress that the rules touch: the hidden cards,
/// the coins, the phase and the log of the current turn.
#[derive(Clone, Debug)]
pub struct Table {
    pub(crate) hidden: HiddenState,
    pub(crate) log: TurnLog,
    phase: Phase,
    current_player_idx: usize,
}

impl Table {
    pub fn new(hidden: HiddenState) -> Self {
        let current_player_idx = hidden.players()
            .iter()
            .position(|p| p.alive())
            .unwrap_or_default();

        Self {
            hidden,
            log: TurnLog::default(),
            phase: Phase::AwaitAction,
            current_player_idx,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn hidden(&self) -> &HiddenState {
        &self.hidden
    }

    pub fn log(&self) -> &TurnLog {
        &self.log
    }

    pub fn num_players(&self) -> usize {
        self.hidden.players().len()
    }

    /// The seat whose turn it is.
    pub fn current_player_idx(&self) -> usize {
        self.current_player_idx
    }

    /// The seat that owes the next decision, none between turns.
    pub fn to_act(&self) -> Option<usize> {
        match self.phase {
            Phase::AwaitAction => Some(self.current_player_idx),
            Phase::AwaitChallenge { responder, .. } => Some(responder),
            Phase::AwaitBlock { responder, .. } => Some(responder),
            Phase::AwaitBlockChallenge { responder, .. } => Some(responder),
            Phase::AwaitCardLoss { loser, .. } => Some(loser),
            Phase::TerminalTurn => None,
        }
    }

    pub fn is_alive(&self, seat: usize) -> bool {
        self.hidden.player(seat).alive()
    }

    /// Seat `offset` places after `seat`, wrapping around the table.
    pub fn seat_after(&self, seat: usize, offset: usize) -> usize {
        (seat + offset) % self.num_players()
    }

    /// The first living seat after `from` in play order, stopping before `stop` comes round.
    fn next_alive(&self, from: usize, stop: usize) -> Option<usize> {
        (1..self.num_players())
            .map(|n| self.seat_after(from, n))
            .take_while(|&seat| seat != stop)
            .find(|&seat| self.is_alive(seat))
    }

    fn next_living_player(&self) -> usize {
        self.next_alive(self.current_player_idx, self.current_player_idx)
            .unwrap_or(self.current_player_idx)
    }

    /// Applies an action the caller has already checked against the legal mask.
    pub fn apply(&mut self, action: Action) -> Result<(), DeckError> {
        let before = self.phase.kind();

        debug!(phase = ?before, seat = ?self.to_act(), ?action, "apply");

        match (self.phase, action) {
            (Phase::AwaitAction, Action::Declare(play, offset)) => {
                self.declare(play, offset)?;
            }
            (Phase::AwaitChallenge { decl, responder }, Action::ChallengePass) => {
                self.log.push(TurnEvent::ChallengePassed { seat: responder, against: Against::Action });
                match self.next_alive(responder, decl.actor) {
                    Some(next) => self.phase = Phase::AwaitChallenge { decl, responder: next },
                    None => self.open_block(decl)?,
                }
            }
            (Phase::AwaitChallenge { decl, responder }, Action::ChallengeCall) => {
                self.call_action_challenge(decl, responder)?;
            }
            (Phase::AwaitBlock { decl, responder }, Action::BlockPass) => {
                self.log.push(TurnEvent::BlockPassed { seat: responder });
                let next = match decl.play {
                    Play::ForeignAid => self.next_alive(responder, decl.actor),
                    _ => None,
                };
                match next {
                    Some(next) => self.phase = Phase::AwaitBlock { decl, responder: next },
                    None => self.resolve(decl)?,
                }
            }
            (Phase::AwaitBlock { decl, responder }, Action::Block(block)) => {
                self.log.push(TurnEvent::BlockDeclared { blocker: responder, block });
                match self.next_alive(responder, responder) {
                    Some(next) => {
                        self.phase = Phase::AwaitBlockChallenge { decl, block, blocker: responder, responder: next };
                    }
                    None => self.finish(decl, Outcome::Blocked),
                }
            }
            (Phase::AwaitBlockChallenge { decl, block, blocker, responder }, Action::ChallengePass) => {
                self.log.push(TurnEvent::ChallengePassed { seat: responder, against: Against::Block });
                match self.next_alive(responder, blocker) {
                    Some(next) => {
                        self.phase = Phase::AwaitBlockChallenge { decl, block, blocker, responder: next };
                    }
                    None => self.finish(decl, Outcome::Blocked),
                }
            }
            (Phase::AwaitBlockChallenge { decl, block, blocker, responder }, Action::ChallengeCall) => {
                self.call_block_challenge(decl, block, blocker, responder)?;
            }
            (Phase::AwaitCardLoss { decl, loser, reason }, Action::Lose(card)) => {
                self.lose(decl, loser, reason, card)?;
            }
            (phase, action) => {
                unreachable!("{:?} is not an action of {:?}, the mask should have stopped it", action, phase.kind())
            }
        }

        // a turn can't go on once a single seat is left holding cards
        if self.phase != Phase::TerminalTurn && self.hidden.num_alive() <= 1 {
            debug!("one seat left, cutting the turn short");
            self.phase = Phase::TerminalTurn;
        }

        debug_assert!(
            protocol().allows(before, self.phase.kind()),
            "{:?} -> {:?} is not part of the protocol", before, self.phase.kind()
        );

        Ok(())
    }

    fn declare(&mut self, play: Play, offset: usize) -> Result<(), DeckError> {
        let actor = self.current_player_idx;
        let target = if play.is_targeted() {
            Some(self.seat_after(actor, offset))
        } else {
            None
        };
        let decl = Declaration { actor, play, target };

        // costs are paid up front and never refunded
        self.hidden.player_mut(actor).coins -= play.cost();
        self.log.push(TurnEvent::ActionDeclared { actor, play, target });

        match (play, target) {
            (Play::Income, _) => {
                self.hidden.player_mut(actor).coins += 1;
                self.finish(decl, Outcome::Succeeded);
            }
            (Play::Coup, Some(target)) => {
                self.phase = Phase::AwaitCardLoss { decl, loser: target, reason: LossReason::ActionEffect };
            }
            _ if play.claim().is_some() => {
                match self.next_alive(actor, actor) {
                    Some(responder) => self.phase = Phase::AwaitChallenge { decl, responder },
                    None => self.open_block(decl)?,
                }
            }
            _ => self.open_block(decl)?,
        }

        Ok(())
    }

    fn call_action_challenge(&mut self, decl: Declaration, challenger: usize) -> Result<(), DeckError> {
        let Some(claim) = decl.play.claim() else {
            unreachable!("{:?} has no claim to challenge", decl.play)
        };
        self.log.push(TurnEvent::ChallengeCalled { seat: challenger, against: Against::Action, claim });

        let (loser, reason) = if self.hidden.player(decl.actor).holds(claim) {
            self.hidden.redraw(decl.actor, claim)?;
            (challenger, LossReason::ChallengeLost)
        } else {
            (decl.actor, LossReason::BluffCaught)
        };

        debug!(challenger, loser, ?claim, "action challenge resolved");
        self.log.push(TurnEvent::ChallengeResolved { challenger, loser, claim });
        self.phase = Phase::AwaitCardLoss { decl, loser, reason };
        Ok(())
    }

    fn call_block_challenge(&mut self, decl: Declaration, block: Block, blocker: usize, challenger: usize) -> Result<(), DeckError> {
        let claim = block.claim();
        self.log.push(TurnEvent::ChallengeCalled { seat: challenger, against: Against::Block, claim });

        let (loser, reason) = if self.hidden.player(blocker).holds(claim) {
            self.hidden.redraw(blocker, claim)?;
            (challenger, LossReason::BlockChallengeLost)
        } else {
            (blocker, LossReason::BlockBluffCaught)
        };

        debug!(challenger, loser, ?claim, "block challenge resolved");
        self.log.push(TurnEvent::BlockChallengeResolved { challenger, loser, claim });
        self.phase = Phase::AwaitCardLoss { decl, loser, reason };
        Ok(())
    }

    /// The claim (if any) stood; give the eligible seats their chance to block.
    fn open_block(&mut self, decl: Declaration) -> Result<(), DeckError> {
        if decl.play.blocks().is_empty() {
            return self.resolve(decl);
        }

        let responder = match decl.target {
            Some(target) if self.is_alive(target) => Some(target),
            Some(_) => None,
            None => self.next_alive(decl.actor, decl.actor),
        };

        match responder {
            Some(responder) => {
                self.phase = Phase::AwaitBlock { decl, responder };
                Ok(())
            }
            None => self.resolve(decl),
        }
    }

    /// Applies the effect of an unopposed (or successfully defended) play.
    fn resolve(&mut self, decl: Declaration) -> Result<(), DeckError> {
        let actor = decl.actor;

        match (decl.play, decl.target) {
            (Play::Tax, _) => {
                self.hidden.player_mut(actor).coins += 3;
            }
            (Play::ForeignAid, _) => {
                self.hidden.player_mut(actor).coins += 2;
            }
            (Play::Steal, Some(target)) => {
                let amount = self.hidden.player(target).coins.min(2);
                self.hidden.player_mut(target).coins -= amount;
                self.hidden.player_mut(actor).coins += amount;
                debug!(actor, target, amount, "steal");
            }
            (Play::Assassinate, Some(target)) if self.is_alive(target) => {
                self.phase = Phase::AwaitCardLoss { decl, loser: target, reason: LossReason::ActionEffect };
                return Ok(());
            }
            // nobody left to hide the new cards from
            (Play::Exchange, _) if self.hidden.num_alive() > 1 => {
                let cards = self.hidden.draw(actor, 2)?;
                let drawn = [cards[0], cards[1]];
                self.phase = Phase::AwaitCardLoss {
                    decl,
                    loser: actor,
                    reason: LossReason::ExchangeReturn { drawn, returned: None },
                };
                return Ok(());
            }
            _ => {}
        }

        self.finish(decl, Outcome::Succeeded);
        Ok(())
    }

    fn lose(&mut self, decl: Declaration, loser: usize, reason: LossReason, card: Character) -> Result<(), DeckError> {
        if let LossReason::ExchangeReturn { drawn, returned } = reason {
            match returned {
                None => {
                    let reason = LossReason::ExchangeReturn { drawn, returned: Some(card) };
                    self.phase = Phase::AwaitCardLoss { decl, loser, reason };
                }
                Some(first) => {
                    let mut kept = self.hidden.player(loser).hand().to_vec();
                    for back in [first, card] {
                        let idx = kept.iter()
                            .position(|&c| c == back)
                            .ok_or(DeckError::CardNotHeld { seat: loser, card: back })?;
                        kept.remove(idx);
                    }
                    self.hidden.swap_for_exchange(loser, &drawn, &kept)?;
                    self.finish(decl, Outcome::Succeeded);
                }
            }
            return Ok(());
        }

        self.hidden.reveal_and_lose(loser, card)?;
        self.log.push(TurnEvent::CardLost { seat: loser, card });

        match reason {
            LossReason::ChallengeLost => self.open_block(decl)?,
            LossReason::BluffCaught => self.finish(decl, Outcome::BluffCaught),
            LossReason::BlockChallengeLost => self.finish(decl, Outcome::Blocked),
            LossReason::BlockBluffCaught => self.resolve(decl)?,
            LossReason::ActionEffect => self.finish(decl, Outcome::Succeeded),
            LossReason::ExchangeReturn { .. } => unreachable!("exchange returns are handled above"),
        }

        Ok(())
    }

    fn finish(&mut self, decl: Declaration, outcome: Outcome) {
        debug!(actor = decl.actor, play = ?decl.play, ?outcome, "turn resolved");
        self.log.push(TurnEvent::ActionResolved { actor: decl.actor, play: decl.play, outcome });
        self.phase = Phase::TerminalTurn;
    }

    /// Archives the finished turn and hands the next one to the next living seat.
    pub fn go_next_turn(&mut self) {
        debug_assert_eq!(self.phase, Phase::TerminalTurn);

        self.log.archive_turn();
        self.current_player_idx = self.next_living_player();
        self.phase = Phase::AwaitAction;
    }

    #[cfg(test)]
    pub(crate) fn hidden_mut(&mut self) -> &mut HiddenState {
        &mut self.hidden
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use super::*;
    use crate::card::Character::{Assassin, Captain, Contessa, Duke};
    use crate::config::GameConfig;

    fn table(num_players: usize) -> Table {
        let config = GameConfig::for_players(num_players);
        Table::new(HiddenState::new(&config, Pcg64::seed_from_u64(3)).unwrap())
    }

    fn eliminate(table: &mut Table, seat: usize) {
        for card in table.hidden().player(seat).hand().to_vec() {
            table.hidden_mut().reveal_and_lose(seat, card).unwrap();
        }
    }

    #[test]
    fn income_ends_the_turn() {
        let mut table = table(3);
        table.apply(Action::Declare(Play::Income, 0)).unwrap();

        assert_eq!(*table.phase(), Phase::TerminalTurn);
        assert_eq!(table.to_act(), None);
        assert_eq!(table.log().outcome(), Some(Outcome::Succeeded));

        table.go_next_turn();
        assert_eq!(table.current_player_idx(), 1);
        assert!(table.log().events().is_empty());
        assert_eq!(table.log().archive().len(), 1);
    }

    #[test]
    fn dead_seats_are_skipped() {
        let mut table = table(4);
        eliminate(&mut table, 1);

        table.apply(Action::Declare(Play::Tax, 0)).unwrap();
        assert_eq!(table.to_act(), Some(2));
        table.apply(Action::ChallengePass).unwrap();
        assert_eq!(table.to_act(), Some(3));
        table.apply(Action::ChallengePass).unwrap();
        assert_eq!(*table.phase(), Phase::TerminalTurn);

        table.go_next_turn();
        assert_eq!(table.current_player_idx(), 2);
    }

    #[test]
    fn steal_takes_what_there_is() {
        let mut table = table(2);
        table.hidden_mut().rig_hand(0, &[Captain, Duke]);
        table.hidden_mut().player_mut(1).coins = 1;

        table.apply(Action::Declare(Play::Steal, 1)).unwrap();
        table.apply(Action::ChallengePass).unwrap();
        assert!(matches!(table.phase(), Phase::AwaitBlock { responder: 1, .. }));
        table.apply(Action::BlockPass).unwrap();

        assert_eq!(table.hidden().player(0).coins, 3);
        assert_eq!(table.hidden().player(1).coins, 0);
    }

    #[test]
    fn block_challenge_window_starts_after_the_blocker() {
        let mut table = table(4);
        table.hidden_mut().player_mut(0).coins = 3;
        table.hidden_mut().rig_hand(2, &[Contessa, Duke]);

        table.apply(Action::Declare(Play::Assassinate, 2)).unwrap();
        for _ in 0..3 {
            table.apply(Action::ChallengePass).unwrap();
        }
        assert_eq!(table.to_act(), Some(2));
        table.apply(Action::Block(Block::Assassinate)).unwrap();

        let mut order = Vec::new();
        while let Phase::AwaitBlockChallenge { responder, .. } = *table.phase() {
            order.push(responder);
            table.apply(Action::ChallengePass).unwrap();
        }
        assert_eq!(order, vec![3, 0, 1]);
        assert_eq!(table.log().outcome(), Some(Outcome::Blocked));
        assert_eq!(table.hidden().player(0).coins, 0);
    }

    #[test]
    fn last_card_lost_cuts_the_turn_short() {
        let mut table = table(2);
        table.hidden_mut().rig_hand(0, &[Duke]);
        table.hidden_mut().player_mut(1).coins = 3;
        table.apply(Action::Declare(Play::Income, 0)).unwrap();
        table.go_next_turn();

        // seat 1 assassinates, seat 0 calls and loses its last card to the failed challenge
        table.hidden_mut().rig_hand(1, &[Captain, Assassin]);
        table.apply(Action::Declare(Play::Assassinate, 1)).unwrap();
        table.apply(Action::ChallengeCall).unwrap();
        assert!(matches!(table.phase(), Phase::AwaitCardLoss { loser: 0, reason: LossReason::ChallengeLost, .. }));
        table.apply(Action::Lose(Duke)).unwrap();

        assert_eq!(*table.phase(), Phase::TerminalTurn);
        assert_eq!(table.hidden().num_alive(), 1);
    }
}
