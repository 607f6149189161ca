//! The deck and every player's hand: the single source of truth for where each card is.

use rand::seq::SliceRandom;
use rand_pcg::Pcg64;
use thiserror::Error;
use tracing::debug;
use crate::card::{count_cards, CardCounts, Character, CHARACTER_VARIANTS};
use crate::config::{GameConfig, HAND_SIZE};
use crate::player::Player;

/// Broken card bookkeeping. These only surface when a transition is wrong, never from player input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("cannot deal {requested} cards from a deck of {remaining}")]
    EmptyDeck { requested: usize, remaining: usize },
    #[error("seat {seat} does not hold {card:?}")]
    CardNotHeld { seat: usize, card: Character },
    #[error("seat {seat} cannot keep {kept:?} after drawing {drawn:?}")]
    InvalidExchange {
        seat: usize,
        drawn: Vec<Character>,
        kept: Vec<Character>,
    },
}

#[derive(Clone, Debug)]
pub struct HiddenState {
    // top of the deck is the end of the vec
    deck: Vec<Character>,
    discard: Vec<Character>,
    players: Vec<Player>,
    // deck + every hand, per character
    hidden: CardCounts,
    rng: Pcg64,
}

impl HiddenState {
    /// Shuffles the configured deck and deals the starting hands.
    ///
    /// When fewer seats play than the table has, the seated ones are sampled with `rng`.
    /// Seats left out get an empty hand, or draw straight into the discard pile with `dead_draw`.
    pub fn new(config: &GameConfig, mut rng: Pcg64) -> Result<Self, DeckError> {
        let counts = config.card_counts();
        let mut deck: Vec<Character> = CHARACTER_VARIANTS.iter()
            .flat_map(|&card| std::iter::repeat(card).take(counts[card.index()] as usize))
            .collect();
        deck.shuffle(&mut rng);

        let mut seated = vec![true; config.num_players];
        if config.num_players_alive < config.num_players {
            seated = vec![false; config.num_players];
            for seat in rand::seq::index::sample(&mut rng, config.num_players, config.num_players_alive) {
                seated[seat] = true;
            }
        }

        let mut state = Self {
            deck,
            discard: Vec::new(),
            players: (0..config.num_players).map(Player::new).collect(),
            hidden: counts,
            rng,
        };

        for (seat, seated) in seated.into_iter().enumerate() {
            if seated {
                state.draw(seat, HAND_SIZE)?;
            } else if config.dead_draw {
                let cards = state.deal(HAND_SIZE)?;
                debug!(seat, ?cards, "dead draw");
                state.discard.extend(cards);
            }
        }

        Ok(state)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: usize) -> &Player {
        &self.players[seat]
    }

    pub(crate) fn player_mut(&mut self, seat: usize) -> &mut Player {
        &mut self.players[seat]
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn discard(&self) -> &[Character] {
        &self.discard
    }

    pub fn num_alive(&self) -> usize {
        self.players.iter().filter(|p| p.alive()).count()
    }

    /// Takes `n` cards off the top of the deck. The cards leave the hidden tally
    /// until they land in a hand.
    pub fn deal(&mut self, n: usize) -> Result<Vec<Character>, DeckError> {
        if self.deck.len() < n {
            return Err(DeckError::EmptyDeck { requested: n, remaining: self.deck.len() });
        }

        let cards = self.deck.split_off(self.deck.len() - n);
        for card in &cards {
            self.hidden[card.index()] -= 1;
        }

        Ok(cards)
    }

    pub fn draw(&mut self, seat: usize, n: usize) -> Result<Vec<Character>, DeckError> {
        let cards = self.deal(n)?;
        for card in &cards {
            self.hidden[card.index()] += 1;
        }
        self.players[seat].hand.extend_from_slice(&cards);

        debug!(seat, ?cards, hand = self.players[seat].hand.len(), "drew");
        Ok(cards)
    }

    pub fn return_cards(&mut self, cards: &[Character]) {
        for card in cards {
            self.hidden[card.index()] += 1;
        }
        self.deck.extend_from_slice(cards);
        self.deck.shuffle(&mut self.rng);
    }

    // cards taken out of a hand leave the tally until they land somewhere hidden again
    fn release(&mut self, cards: &[Character]) {
        for card in cards {
            self.hidden[card.index()] -= 1;
        }
    }

    pub fn reveal_and_lose(&mut self, seat: usize, card: Character) -> Result<(), DeckError> {
        let lost = self.players[seat].take(card).ok_or(DeckError::CardNotHeld { seat, card })?;
        self.release(&[lost]);
        self.discard.push(lost);

        debug!(seat, ?card, remaining = self.players[seat].hand.len(), "lost influence");
        Ok(())
    }

    /// A revealed card that won a challenge goes back into the deck and the seat
    /// draws a replacement into the same hand position.
    pub fn redraw(&mut self, seat: usize, card: Character) -> Result<Character, DeckError> {
        let hand = &mut self.players[seat].hand;
        let idx = hand.iter().position(|&c| c == card).ok_or(DeckError::CardNotHeld { seat, card })?;
        hand.remove(idx);
        self.release(&[card]);
        self.return_cards(&[card]);

        let fresh = self.deal(1)?[0];
        self.hidden[fresh.index()] += 1;
        self.players[seat].hand.insert(idx, fresh);

        debug!(seat, ?card, "revealed and replaced");
        Ok(fresh)
    }

    /// Finishes an exchange. The `drawn` cards are already in the seat's hand; the seat
    /// keeps `kept` and everything else goes back into the deck.
    pub fn swap_for_exchange(&mut self, seat: usize, drawn: &[Character], kept: &[Character]) -> Result<(), DeckError> {
        let invalid = || DeckError::InvalidExchange {
            seat,
            drawn: drawn.to_vec(),
            kept: kept.to_vec(),
        };

        let hand = &self.players[seat].hand;
        let mut base = hand.clone();
        if !remove_all(&mut base, drawn) || kept.len() != base.len() {
            return Err(invalid());
        }

        let mut returned = hand.clone();
        if !remove_all(&mut returned, kept) {
            return Err(invalid());
        }

        self.players[seat].hand = kept.to_vec();
        self.release(&returned);
        self.return_cards(&returned);

        debug!(seat, ?returned, "exchange returned cards");
        Ok(())
    }

    /// Cards the seat can't see: the deck plus every other hand.
    pub fn unseen(&self, seat: usize) -> CardCounts {
        let own = self.players[seat].card_counts();
        let mut unseen = self.hidden;
        for (count, own) in unseen.iter_mut().zip(own) {
            *count -= own;
        }
        unseen
    }

    /// Every card by where it physically is: deck, discard and hands.
    pub fn census(&self) -> CardCounts {
        let mut total = count_cards(&self.deck);
        for card in self.discard.iter().chain(self.players.iter().flat_map(|p| p.hand.iter())) {
            total[card.index()] += 1;
        }
        total
    }

    /// The hidden tally rebuilt from scratch, for checking the incremental one.
    pub fn recount_hidden(&self) -> CardCounts {
        let mut total = count_cards(&self.deck);
        for card in self.players.iter().flat_map(|p| p.hand.iter()) {
            total[card.index()] += 1;
        }
        total
    }

    pub fn hidden_counts(&self) -> CardCounts {
        self.hidden
    }

    /// Puts `cards` in the seat's hand, trading with the deck (or, when the deck runs out
    /// of a character, with another seat) so the card totals stay intact.
    #[cfg(test)]
    pub(crate) fn rig_hand(&mut self, seat: usize, cards: &[Character]) {
        let old = std::mem::take(&mut self.players[seat].hand);
        self.deck.extend(old);

        for &card in cards {
            if let Some(idx) = self.deck.iter().position(|&c| c == card) {
                self.deck.remove(idx);
            } else {
                let other = (0..self.players.len())
                    .find(|&s| s != seat && self.players[s].holds(card))
                    .expect("no copy of the card left to rig");
                let idx = self.players[other].hand.iter().position(|&c| c == card).unwrap();
                let replacement = self.deck.iter().position(|c| !cards.contains(c))
                    .map(|i| self.deck.remove(i))
                    .expect("deck has no spare card for the swap");
                self.players[other].hand[idx] = replacement;
            }
            self.players[seat].hand.push(card);
        }
    }
}

fn remove_all(pool: &mut Vec<Character>, cards: &[Character]) -> bool {
    for card in cards {
        match pool.iter().position(|c| c == card) {
            Some(idx) => {
                pool.remove(idx);
            }
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use super::*;
    use crate::card::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

    fn state(config: &GameConfig) -> HiddenState {
        HiddenState::new(config, Pcg64::seed_from_u64(7)).unwrap()
    }

    fn assert_conserved(state: &HiddenState, config: &GameConfig) {
        assert_eq!(state.census(), config.card_counts());
        assert_eq!(state.hidden_counts(), state.recount_hidden());
    }

    #[test]
    fn deals_two_cards_per_seat() {
        let config = GameConfig::default();
        let state = state(&config);

        assert!(state.players().iter().all(|p| p.hand().len() == 2));
        assert_eq!(state.deck_len(), 3);
        assert_conserved(&state, &config);
    }

    #[test]
    fn dead_seats() {
        let mut config = GameConfig::for_players(6);
        config.num_players_alive = 2;
        let without = state(&config);
        assert_eq!(without.num_alive(), 2);
        assert_eq!(without.deck_len(), 11);

        config.dead_draw = true;
        let with = state(&config);
        assert_eq!(with.num_alive(), 2);
        assert_eq!(with.deck_len(), 3);
        assert_eq!(with.discard().len(), 8);
        assert_conserved(&with, &config);
    }

    #[test]
    fn deal_past_the_end() {
        let config = GameConfig::default();
        let mut state = state(&config);
        assert_eq!(state.deal(4), Err(DeckError::EmptyDeck { requested: 4, remaining: 3 }));
        assert_eq!(state.deck_len(), 3);

        let cards = state.deal(3).unwrap();
        assert_eq!(state.deck_len(), 0);
        state.return_cards(&cards);
        assert_eq!(state.deck_len(), 3);
        assert_conserved(&state, &config);
    }

    #[test]
    fn lose_card() {
        let config = GameConfig::for_players(3);
        let mut state = state(&config);
        state.rig_hand(0, &[Duke, Captain]);

        assert_eq!(state.reveal_and_lose(0, Contessa), Err(DeckError::CardNotHeld { seat: 0, card: Contessa }));
        state.reveal_and_lose(0, Duke).unwrap();

        assert_eq!(state.player(0).hand(), &[Captain]);
        assert_eq!(state.discard(), &[Duke]);
        assert_conserved(&state, &config);
    }

    #[test]
    fn unseen_excludes_own_hand_and_discard() {
        let config = GameConfig::for_players(3);
        let mut state = state(&config);
        state.rig_hand(1, &[Duke, Duke]);

        assert_eq!(state.unseen(1)[Duke.index()], 1);
        assert_eq!(state.unseen(0)[Duke.index()], 3 - state.player(0).card_counts()[Duke.index()]);

        state.reveal_and_lose(1, Duke).unwrap();
        assert_eq!(state.unseen(0)[Duke.index()], 2 - state.player(0).card_counts()[Duke.index()]);
        assert_conserved(&state, &config);
    }

    #[test]
    fn redraw_keeps_position() {
        let config = GameConfig::for_players(2);
        let mut state = state(&config);
        state.rig_hand(0, &[Assassin, Contessa]);

        assert_eq!(state.redraw(0, Ambassador), Err(DeckError::CardNotHeld { seat: 0, card: Ambassador }));

        state.redraw(0, Assassin).unwrap();
        assert_eq!(state.player(0).hand().len(), 2);
        assert_eq!(state.player(0).hand()[1], Contessa);
        assert_conserved(&state, &config);
    }

    #[test]
    fn exchange() {
        let config = GameConfig::for_players(2);
        let mut state = state(&config);
        state.rig_hand(0, &[Duke, Captain]);

        let drawn = state.draw(0, 2).unwrap();
        assert_eq!(state.player(0).hand().len(), 4);

        // must keep exactly two
        assert!(state.swap_for_exchange(0, &drawn, &[Duke]).is_err());
        // can't keep what isn't there
        let missing = CHARACTER_VARIANTS.iter()
            .copied()
            .find(|&c| !state.player(0).holds(c))
            .unwrap();
        assert!(state.swap_for_exchange(0, &drawn, &[Duke, missing]).is_err());

        state.swap_for_exchange(0, &drawn, &[drawn[0], Captain]).unwrap();
        assert_eq!(state.player(0).hand(), &[drawn[0], Captain]);
        assert_eq!(state.deck_len(), 11);
        assert_conserved(&state, &config);
    }

    #[test]
    fn same_seed_same_deal() {
        let config = GameConfig::default();
        let a = state(&config);
        let b = state(&config);
        for seat in 0..6 {
            assert_eq!(a.player(seat).hand(), b.player(seat).hand());
        }
    }
}
