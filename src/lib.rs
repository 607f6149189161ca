pub mod action;
pub mod card;
pub mod config;
pub mod deck;
pub mod error;
pub mod mask;
pub mod observe;
pub mod player;
pub mod protocol;
pub mod render;
pub mod state;
pub mod turn_log;

pub use action::{Action, ActionSpace, Block, Play};
pub use card::Character;
pub use config::{GameConfig, RenderMode};
pub use error::CoupError;
pub use observe::{Observation, ObservationLayout};
pub use state::Phase;

use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::deck::HiddenState;
use crate::state::Table;

/// What a seat needs to pick its next action.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepInfo {
    pub action_mask: Vec<bool>,
    pub observation_history: Vec<Observation>,
}

/// The view handed to the seat that acts next (or to the winner, once the episode is over).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Step {
    pub seat: usize,
    pub observation: Observation,
    pub rewards: Vec<f32>,
    pub done: bool,
    pub info: StepInfo,
}

/// One episode: the table, plus everything agents get to keep between turns.
#[derive(Clone, Debug)]
pub struct Coup {
    config: GameConfig,
    space: ActionSpace,
    layout: ObservationLayout,
    table: Table,
    turn: usize,
    // seats holding cards when the current turn started
    roster: Vec<usize>,
    histories: Vec<Vec<Observation>>,
    rewards: Vec<f32>,
    done: bool,
}

impl Coup {
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, CoupError> {
        config.validate()?;

        let hidden = HiddenState::new(&config, Pcg64::seed_from_u64(seed))?;
        let table = Table::new(hidden);
        let roster = alive_seats(&table);

        info!(
            seed,
            num_players = config.num_players,
            seated = ?roster,
            first = table.current_player_idx(),
            "episode started"
        );

        Ok(Self {
            space: ActionSpace::new(config.num_players),
            layout: ObservationLayout::new(config.num_players, config.max_card_count()),
            table,
            turn: 0,
            roster,
            histories: vec![Vec::new(); config.num_players],
            rewards: vec![0.0; config.num_players],
            done: false,
            config,
        })
    }

    /// Starts over with the same configuration.
    pub fn reset(&mut self, seed: u64) -> Result<(), CoupError> {
        *self = Coup::new(self.config.clone(), seed)?;
        Ok(())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn action_space(&self) -> ActionSpace {
        self.space
    }

    pub fn observation_layout(&self) -> ObservationLayout {
        self.layout
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Finished turns so far.
    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// The seat that owes a decision. Once the episode is over, the winner.
    pub fn agent_selection(&self) -> usize {
        self.table.to_act()
            .or_else(|| self.winner())
            .unwrap_or(self.table.current_player_idx())
    }

    pub fn winner(&self) -> Option<usize> {
        if self.table.hidden().num_alive() != 1 {
            return None;
        }

        self.table.hidden()
            .players()
            .iter()
            .position(|p| p.alive())
    }

    pub fn action_mask(&self) -> Vec<bool> {
        if self.done {
            return vec![false; self.space.len()];
        }
        mask::legal_actions(&self.table, &self.space)
    }

    /// The current observation from `seat`'s point of view, `None` for a seat not at the table.
    pub fn observe(&self, seat: usize) -> Option<Observation> {
        (seat < self.table.num_players()).then(|| observe::encode(&self.table, seat))
    }

    /// One observation per finished turn the seat took part in.
    pub fn observation_history(&self, seat: usize) -> Option<&[Observation]> {
        self.histories.get(seat).map(Vec::as_slice)
    }

    pub fn last(&self) -> Step {
        let seat = self.agent_selection();
        Step {
            seat,
            observation: observe::encode(&self.table, seat),
            rewards: self.rewards.clone(),
            done: self.done,
            info: StepInfo {
                action_mask: self.action_mask(),
                observation_history: self.histories[seat].clone(),
            },
        }
    }

    /// Plays the action at `index` for the seat that owes a decision.
    ///
    /// Indices the mask doesn't allow are rejected and nothing changes. The transition is
    /// applied to a copy of the table, which only replaces the live one if it went through.
    pub fn step(&mut self, index: usize) -> Result<Step, CoupError> {
        let seat = self.agent_selection();
        let legal = self.action_mask().get(index).copied().unwrap_or(false);
        let action = match self.space.action(index) {
            Some(action) if legal => action,
            _ => {
                return Err(CoupError::IllegalAction {
                    index,
                    seat,
                    phase: self.table.phase().kind(),
                });
            }
        };

        let mut table = self.table.clone();
        table.apply(action)?;
        self.table = table;

        if *self.table.phase() == Phase::TerminalTurn {
            self.end_turn();
        }

        Ok(self.last())
    }

    /// Like [`Coup::step`], but leaves `self` alone and returns the episode after the action.
    pub fn apply_action(&self, index: usize) -> Result<Coup, CoupError> {
        let mut next = self.clone();
        next.step(index)?;
        Ok(next)
    }

    pub fn render(&self) -> Option<String> {
        match self.config.render_mode {
            Some(RenderMode::Ansi) => Some(render::ansi(self)),
            None => {
                warn!("render called without a render mode");
                None
            }
        }
    }

    fn end_turn(&mut self) {
        for &seat in &self.roster {
            self.histories[seat].push(observe::encode(&self.table, seat));
        }
        self.turn += 1;

        debug!(turn = self.turn, outcome = ?self.table.log().outcome(), "turn over");

        if let Some(winner) = self.winner() {
            self.done = true;
            self.rewards[winner] = 1.0;
            info!(winner, turns = self.turn, "episode finished");
            return;
        }

        self.table.go_next_turn();
        self.roster = alive_seats(&self.table);
    }
}

fn alive_seats(table: &Table) -> Vec<usize> {
    (0..table.num_players())
        .filter(|&seat| table.is_alive(seat))
        .collect()
}
