//! Episode configuration.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::card::{CardCounts, Character, CHARACTER_VARIANTS, NUM_CHARACTERS};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

/// Cards in every starting hand.
pub const HAND_SIZE: usize = 2;

/// Cards an exchange draws, which the deck must always be able to provide.
pub const EXCHANGE_DRAW: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Ansi,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub deck: BTreeMap<Character, u8>,
    /// Seats left out of the episode still draw (and discard) a starting hand.
    pub dead_draw: bool,
    pub num_players: usize,
    pub num_players_alive: usize,
    pub render_mode: Option<RenderMode>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            deck: CHARACTER_VARIANTS.iter().map(|&c| (c, 3)).collect(),
            dead_draw: false,
            num_players: MAX_PLAYERS,
            num_players_alive: MAX_PLAYERS,
            render_mode: Some(RenderMode::Ansi),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("num_players={0} must be between 2 and 6")]
    PlayerCount(usize),
    #[error("num_players_alive={alive} must be between 2 and num_players={players}")]
    AliveCount { alive: usize, players: usize },
    #[error("deck holds {available} cards but {needed} are needed")]
    NotEnoughCards { needed: usize, available: usize },
    #[error("malformed config: {0}")]
    Parse(String),
}

impl GameConfig {
    pub fn for_players(num_players: usize) -> Self {
        Self {
            num_players,
            num_players_alive: num_players,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)
            .map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.num_players) {
            return Err(ConfigError::PlayerCount(self.num_players));
        }

        if self.num_players_alive < MIN_PLAYERS || self.num_players_alive > self.num_players {
            return Err(ConfigError::AliveCount {
                alive: self.num_players_alive,
                players: self.num_players,
            });
        }

        let drawing_seats = if self.dead_draw { self.num_players } else { self.num_players_alive };
        let needed = drawing_seats * HAND_SIZE + EXCHANGE_DRAW;
        let available = self.total_cards();
        if available < needed {
            return Err(ConfigError::NotEnoughCards { needed, available });
        }

        Ok(())
    }

    pub fn total_cards(&self) -> usize {
        self.deck.values().map(|&n| n as usize).sum()
    }

    pub fn card_counts(&self) -> CardCounts {
        let mut counts = [0; NUM_CHARACTERS];
        for (character, &n) in &self.deck {
            counts[character.index()] = n;
        }
        counts
    }

    /// Largest count of a single character, the upper bound of the per-card observation blocks.
    pub fn max_card_count(&self) -> u8 {
        self.deck.values().copied().max().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.total_cards(), 15);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn bad_player_counts() {
        let mut config = GameConfig::for_players(7);
        assert_eq!(config.validate(), Err(ConfigError::PlayerCount(7)));

        config = GameConfig::for_players(4);
        config.num_players_alive = 5;
        assert_eq!(config.validate(), Err(ConfigError::AliveCount { alive: 5, players: 4 }));

        config.num_players_alive = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn small_deck() {
        let mut config = GameConfig::for_players(6);
        config.deck = CHARACTER_VARIANTS.iter().map(|&c| (c, 2)).collect();
        assert_eq!(config.validate(), Err(ConfigError::NotEnoughCards { needed: 14, available: 10 }));

        // dead seats drawing counts against the deck too
        config.num_players_alive = 2;
        assert_eq!(config.validate(), Ok(()));
        config.dead_draw = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_json() {
        let config = GameConfig::from_json(r#"{
            "num_players": 3,
            "num_players_alive": 2,
            "dead_draw": true,
            "deck": {"Ambassador": 2, "Assassin": 2, "Captain": 2, "Contessa": 2, "Duke": 2},
            "render_mode": null
        }"#).unwrap();

        assert_eq!(config.num_players, 3);
        assert_eq!(config.card_counts(), [2; NUM_CHARACTERS]);
        assert_eq!(config.render_mode, None);

        let partial = GameConfig::from_json(r#"{"num_players": 2, "num_players_alive": 2}"#).unwrap();
        assert_eq!(partial.render_mode, Some(RenderMode::Ansi));
        assert_eq!(partial.max_card_count(), 3);

        assert!(matches!(GameConfig::from_json("{\"num_players\": \"x\"}"), Err(ConfigError::Parse(_))));
    }
}
