//! Which action indices the seat to act may submit.

use crate::action::{Action, ActionSpace, Play};
use crate::card::{CardCounts, CHARACTER_VARIANTS};
use crate::state::{LossReason, Phase, Table};

/// At this many coins a player must coup.
pub const FORCED_COUP_COINS: u8 = 10;

pub fn legal_actions(table: &Table, space: &ActionSpace) -> Vec<bool> {
    let mut mask = vec![false; space.len()];
    let mut allow = |action: Action| {
        if let Some(idx) = space.index(action) {
            mask[idx] = true;
        }
    };

    match *table.phase() {
        Phase::AwaitAction => {
            let actor = table.current_player_idx();
            let coins = table.hidden().player(actor).coins;

            let targets: Vec<usize> = (1..table.num_players())
                .filter(|&offset| table.is_alive(table.seat_after(actor, offset)))
                .collect();

            for &offset in &targets {
                if coins >= Play::Coup.cost() {
                    allow(Action::Declare(Play::Coup, offset));
                }
            }

            if coins < FORCED_COUP_COINS {
                allow(Action::Declare(Play::Income, 0));
                allow(Action::Declare(Play::ForeignAid, 0));
                allow(Action::Declare(Play::Tax, 0));
                allow(Action::Declare(Play::Exchange, 0));

                for &offset in &targets {
                    if coins >= Play::Assassinate.cost() {
                        allow(Action::Declare(Play::Assassinate, offset));
                    }
                    // nothing to take from a broke player
                    if table.hidden().player(table.seat_after(actor, offset)).coins > 0 {
                        allow(Action::Declare(Play::Steal, offset));
                    }
                }
            }
        }
        Phase::AwaitChallenge { .. } | Phase::AwaitBlockChallenge { .. } => {
            allow(Action::ChallengePass);
            allow(Action::ChallengeCall);
        }
        Phase::AwaitBlock { decl, .. } => {
            allow(Action::BlockPass);
            for &block in decl.play.blocks() {
                allow(Action::Block(block));
            }
        }
        Phase::AwaitCardLoss { loser, reason, .. } => {
            let counts = losable_cards(table, loser, reason);
            for character in CHARACTER_VARIANTS {
                if counts[character.index()] > 0 {
                    allow(Action::Lose(character));
                }
            }
        }
        Phase::TerminalTurn => {}
    }

    mask
}

/// Cards the seat can give up right now. During an exchange, a card already picked
/// to go back can't be picked twice.
pub fn losable_cards(table: &Table, seat: usize, reason: LossReason) -> CardCounts {
    let mut counts = table.hidden().player(seat).card_counts();
    if let LossReason::ExchangeReturn { returned: Some(first), .. } = reason {
        counts[first.index()] -= 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use super::*;
    use crate::action::{Block, BLOCK_PASS, EXCHANGE, FOREIGN_AID, INCOME, TAX};
    use crate::config::GameConfig;
    use crate::deck::HiddenState;

    fn table(num_players: usize) -> Table {
        let config = GameConfig::for_players(num_players);
        Table::new(HiddenState::new(&config, Pcg64::seed_from_u64(5)).unwrap())
    }

    fn legal(table: &Table) -> Vec<usize> {
        let space = ActionSpace::new(table.num_players());
        legal_actions(table, &space)
            .iter()
            .enumerate()
            .filter(|&(_, &ok)| ok)
            .map(|(idx, _)| idx)
            .collect()
    }

    #[test]
    fn opening_turn() {
        let table = table(2);
        // no coup or assassination on two coins, steal from seat 1 is fine
        assert_eq!(legal(&table), vec![EXCHANGE, FOREIGN_AID, INCOME, TAX, 18]);
    }

    #[test]
    fn dead_seats_are_not_targets() {
        let mut table = table(3);
        table.hidden_mut().player_mut(0).coins = 7;
        for card in table.hidden().player(2).hand().to_vec() {
            table.hidden_mut().reveal_and_lose(2, card).unwrap();
        }

        let space = ActionSpace::new(3);
        let mask = legal_actions(&table, &space);
        assert!(mask[space.index(Action::Declare(Play::Coup, 1)).unwrap()]);
        assert!(!mask[space.index(Action::Declare(Play::Coup, 2)).unwrap()]);
        assert!(!mask[space.index(Action::Declare(Play::Steal, 2)).unwrap()]);
        assert!(mask[space.index(Action::Declare(Play::Assassinate, 1)).unwrap()]);
    }

    #[test]
    fn block_window_offers_the_play_blocks() {
        let mut table = table(2);
        table.apply(Action::Declare(Play::Steal, 1)).unwrap();
        table.apply(Action::ChallengePass).unwrap();

        let space = ActionSpace::new(2);
        assert_eq!(legal(&table), vec![
            BLOCK_PASS,
            space.index(Action::Block(Block::StealAmbassador)).unwrap(),
            space.index(Action::Block(Block::StealCaptain)).unwrap(),
        ]);
    }

    #[test]
    fn nothing_between_turns() {
        let mut table = table(2);
        table.apply(Action::Declare(Play::Income, 0)).unwrap();
        assert!(legal(&table).is_empty());
    }
}
