//! Perft: see <https://www.chessprogramming.org/Perft>.
//!
//! Counts the leaf nodes of the legal move tree to a fixed depth. The node
//! counts for well-known positions validate the generator and the
//! make/unmake protocol against published reference values.

use crate::movegen::{in_check, possible_moves};
use crate::Position;
use fischer_core::Color;

/// Counts leaf nodes of the legal move tree for the side to move.
pub fn perft(position: &mut Position, color: Color, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for &m in &possible_moves(position, color) {
        position.make(m);
        if !in_check(position, color) {
            nodes += perft(position, color.opposite(), depth - 1);
        }
        position.unmake();
    }
    nodes
}
