use thiserror::Error;
use crate::config::ConfigError;
use crate::deck::DeckError;
use crate::protocol::PhaseKind;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoupError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("action {index} is not legal for seat {seat} during {phase:?}")]
    IllegalAction {
        index: usize,
        seat: usize,
        phase: PhaseKind,
    },
    #[error("card bookkeeping failed: {0}")]
    Deck(#[from] DeckError),
}
