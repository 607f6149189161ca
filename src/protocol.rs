//! Which phase may follow which: the turn protocol as a directed graph.

use std::sync::OnceLock;
use petgraph::dot::{Config, Dot};
use petgraph::graphmap::DiGraphMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhaseKind {
    AwaitAction,
    AwaitChallenge,
    AwaitBlock,
    AwaitBlockChallenge,
    AwaitCardLoss,
    TerminalTurn,
}

pub static PHASE_KINDS: [PhaseKind; 6] = [
    PhaseKind::AwaitAction,
    PhaseKind::AwaitChallenge,
    PhaseKind::AwaitBlock,
    PhaseKind::AwaitBlockChallenge,
    PhaseKind::AwaitCardLoss,
    PhaseKind::TerminalTurn,
];

pub struct Protocol {
    graph: DiGraphMap<PhaseKind, ()>,
}

impl Protocol {
    fn new() -> Self {
        use PhaseKind::*;

        let graph = DiGraphMap::from_edges([
            // income resolves on the spot, coup goes straight to the target's loss
            (AwaitAction, TerminalTurn),
            (AwaitAction, AwaitCardLoss),
            (AwaitAction, AwaitChallenge),
            // foreign aid has no claim
            (AwaitAction, AwaitBlock),

            (AwaitChallenge, AwaitChallenge),
            (AwaitChallenge, AwaitCardLoss),
            (AwaitChallenge, AwaitBlock),
            (AwaitChallenge, TerminalTurn),

            (AwaitBlock, AwaitBlock),
            (AwaitBlock, AwaitBlockChallenge),
            (AwaitBlock, AwaitCardLoss),
            (AwaitBlock, TerminalTurn),

            (AwaitBlockChallenge, AwaitBlockChallenge),
            (AwaitBlockChallenge, AwaitCardLoss),
            (AwaitBlockChallenge, TerminalTurn),

            // exchange picks, and an assassination landing after a caught block bluff
            (AwaitCardLoss, AwaitCardLoss),
            (AwaitCardLoss, AwaitBlock),
            (AwaitCardLoss, TerminalTurn),

            (TerminalTurn, AwaitAction),
        ]);

        Self { graph }
    }

    pub fn allows(&self, from: PhaseKind, to: PhaseKind) -> bool {
        self.graph.contains_edge(from, to)
    }

    pub fn graph(&self) -> &DiGraphMap<PhaseKind, ()> {
        &self.graph
    }

    pub fn to_dot(&self) -> String {
        format!("{:?}", Dot::with_config(&self.graph, &[Config::EdgeNoLabel]))
    }
}

pub fn protocol() -> &'static Protocol {
    static PROTOCOL: OnceLock<Protocol> = OnceLock::new();
    PROTOCOL.get_or_init(Protocol::new)
}

#[cfg(test)]
mod tests {
    use petgraph::algo::has_path_connecting;
    use super::*;

    #[test]
    fn every_phase_is_reachable_from_a_fresh_turn() {
        let graph = protocol().graph();
        for kind in PHASE_KINDS {
            assert!(has_path_connecting(graph, PhaseKind::AwaitAction, kind, None), "{:?}", kind);
        }
    }

    #[test]
    fn every_phase_can_finish_the_turn() {
        let graph = protocol().graph();
        for kind in PHASE_KINDS {
            assert!(has_path_connecting(graph, kind, PhaseKind::TerminalTurn, None), "{:?}", kind);
        }
    }

    #[test]
    fn terminal_turn_only_reopens_the_next_turn() {
        let next: Vec<PhaseKind> = protocol().graph().neighbors(PhaseKind::TerminalTurn).collect();
        assert_eq!(next, vec![PhaseKind::AwaitAction]);
        assert!(!protocol().allows(PhaseKind::AwaitAction, PhaseKind::AwaitBlockChallenge));
    }

    #[test]
    fn dot_output() {
        let dot = protocol().to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("AwaitBlockChallenge"));
    }
}
