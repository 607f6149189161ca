//! Plain-text view of the public table, for watching an episode in a terminal.

use std::fmt::Write;
use crate::Coup;

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

pub fn ansi(coup: &Coup) -> String {
    let mut out = String::new();

    if let Some(winner) = coup.winner() {
        let _ = writeln!(out, "{BOLD}GAME OVER - Winner is {winner}{RESET}");
        return out;
    }

    let table = coup.table();
    let space = coup.action_space();
    let available: Vec<String> = coup.action_mask()
        .iter()
        .enumerate()
        .filter(|&(_, &ok)| ok)
        .filter_map(|(idx, _)| space.action(idx))
        .map(|action| format!("{:?}", action))
        .collect();

    let _ = writeln!(out);
    let _ = writeln!(out, "{BOLD}Turn {} - {:?} - {}{RESET}", coup.turn(), table.phase().kind(), coup.agent_selection());
    let _ = writeln!(out);
    let _ = writeln!(out, "Available actions: {}", available.join(" "));
    let _ = writeln!(out);
    let _ = writeln!(out, "| id | cards   | coins |");
    let _ = writeln!(out, "|----|---------|-------|");

    for player in table.hidden().players() {
        let cards: Vec<&str> = player.hand().iter().map(|c| c.short_name()).collect();
        let row = format!("| {:<2} | {:<7} | {:>4}$ |", player.seat, cards.join(" "), player.coins);
        if player.alive() {
            let _ = writeln!(out, "{row}");
        } else {
            let _ = writeln!(out, "{DIM}{row}{RESET}");
        }
    }

    out
}
