//! Interactive terminal chess.
//!
//! Collects the game setup (orthodox or Chess960, human or engine
//! opponent), then alternates turns until the side to move has no legal
//! move. Every prompt re-asks until the input is valid; moves are entered
//! as four coordinate digits `x1y1x2y2` and resolved against the engine's
//! generated move list.

use std::io::{self, BufRead, Write};

use fischer_core::{parse_squares, Color, Move, Piece};
use fischer_engine::{
    attacks_by, game_over, leaves_king_exposed, material_score, possible_moves, Position, Searcher,
};
use rand::seq::SliceRandom;
use rand::thread_rng;

#[derive(Clone, Copy, PartialEq, Eq)]
enum GameType {
    Standard,
    Chess960,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Opponent {
    Human,
    Engine,
}

fn prompt(message: &str) -> String {
    print!("{message}");
    io::stdout().flush().expect("flush stdout");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .expect("read stdin");
    line.trim().to_string()
}

fn ask_game_type() -> GameType {
    loop {
        match prompt("Play [c]hess or c[h]ess960? ").to_lowercase().as_str() {
            "c" => return GameType::Standard,
            "h" => return GameType::Chess960,
            _ => {}
        }
    }
}

fn ask_opponent() -> Opponent {
    loop {
        match prompt("Play against [p]layer or [e]ngine? ")
            .to_lowercase()
            .as_str()
        {
            "p" => return Opponent::Human,
            "e" => return Opponent::Engine,
            _ => {}
        }
    }
}

fn ask_player_color() -> Color {
    loop {
        match prompt("Play as [w]hite or [b]lack? ").to_lowercase().as_str() {
            "w" => return Color::White,
            "b" => return Color::Black,
            _ => {}
        }
    }
}

fn ask_depth() -> u8 {
    loop {
        if let Ok(depth) = prompt("What engine depth (1-5)? ").parse::<u8>() {
            if (1..=5).contains(&depth) {
                return depth;
            }
        }
    }
}

/// Shuffled back rank for a Chess960 game; both colors get the same order.
fn shuffled_back_rank() -> [Piece; 8] {
    let mut order = [
        Piece::Rook,
        Piece::Knight,
        Piece::Bishop,
        Piece::Queen,
        Piece::King,
        Piece::Bishop,
        Piece::Knight,
        Piece::Rook,
    ];
    order.shuffle(&mut thread_rng());
    order
}

fn print_board(position: &Position, score: f32) {
    println!("\n     0    1    2    3    4    5    6    7");
    println!("  |----|----|----|----|----|----|----|----|");
    for rank in 0..8u8 {
        print!("{rank} ");
        for file in 0..8u8 {
            let sq = fischer_core::Square::from_coords(file, rank).expect("coords in range");
            match position.piece_on(sq) {
                Some((piece, Color::White)) => print!("| W{} ", piece.to_char(Color::White)),
                Some((piece, Color::Black)) => print!("| b{} ", piece.to_char(Color::Black)),
                None => print!("|    "),
            }
        }
        println!("| {rank}");
        println!("  |----|----|----|----|----|----|----|----|");
    }
    println!("     0    1    2    3    4    5    6    7");
    let half_turns = position.ply_count();
    println!(
        "Turn: {}{}, Material: {}, Score: {:.1}\n",
        half_turns / 2,
        if half_turns % 2 == 0 { "" } else { ".5" },
        material_score(position),
        score,
    );
}

/// Narrows same-displacement candidates down to one move, asking about
/// promotion targets and (in Chess960) whether a king hop is meant as a
/// castle.
fn pick_candidate(candidates: &[Move]) -> Move {
    if candidates.iter().any(|m| m.flag().is_promotion()) {
        loop {
            let piece = match prompt("Promote to what (N/B/R/Q)? ")
                .to_uppercase()
                .as_str()
            {
                "N" => Piece::Knight,
                "B" => Piece::Bishop,
                "R" => Piece::Rook,
                "Q" => Piece::Queen,
                _ => continue,
            };
            if let Some(&m) = candidates
                .iter()
                .find(|m| m.flag().promotion_piece() == Some(piece))
            {
                return m;
            }
        }
    }

    if candidates.len() == 1 {
        return candidates[0];
    }

    // A castle and an ordinary king move can share the same displacement.
    loop {
        let wants_castle = match prompt("Castle (y/n)? ").to_lowercase().as_str() {
            "y" => true,
            "n" => false,
            _ => continue,
        };
        if let Some(&m) = candidates.iter().find(|m| m.flag().is_castle() == wants_castle) {
            return m;
        }
    }
}

fn ask_move(position: &Position, side: Color) -> Move {
    let moves = possible_moves(position, side);
    let mut scratch = position.clone();
    loop {
        let input = prompt("Choose your move (x1y1x2y2)? ");
        let (from, to) = match parse_squares(&input) {
            Ok(squares) => squares,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        let candidates: Vec<Move> = moves
            .as_slice()
            .iter()
            .copied()
            .filter(|m| m.from() == from && m.to() == to)
            .collect();
        if candidates.is_empty() {
            println!("Not a possible move.");
            continue;
        }

        let chosen = pick_candidate(&candidates);
        if leaves_king_exposed(&mut scratch, chosen, side) {
            println!("That move leaves your king in check.");
            continue;
        }
        return chosen;
    }
}

fn main() {
    let game_type = ask_game_type();
    let opponent = ask_opponent();
    let (player_color, depth) = if opponent == Opponent::Engine {
        (ask_player_color(), ask_depth())
    } else {
        (Color::White, 0)
    };

    let mut position = match game_type {
        GameType::Standard => Position::standard(),
        GameType::Chess960 => Position::with_back_rank(shuffled_back_rank()),
    };

    let mut white_turn = true;
    let mut score = 0.0;
    print_board(&position, score);

    loop {
        let side = if white_turn { Color::White } else { Color::Black };
        if game_over(&position, side) {
            break;
        }

        let engine_turn = opponent == Opponent::Engine && side != player_color;
        let m = if engine_turn {
            let mut searcher = Searcher::new();
            score = searcher.minimax(
                &mut position,
                depth,
                f32::NEG_INFINITY,
                f32::INFINITY,
                white_turn,
                true,
            );
            match searcher.best_move() {
                Some(m) => m,
                None => break,
            }
        } else {
            ask_move(&position, side)
        };

        position.make(m);
        print_board(&position, score);
        white_turn = !white_turn;
    }

    let loser = if white_turn { Color::White } else { Color::Black };
    let checked = (attacks_by(&position, loser.opposite())
        & position.pieces_of(loser, Piece::King))
    .is_not_empty();
    if checked {
        println!("{} wins!", loser.opposite());
    } else {
        println!("It's a stalemate!");
    }
}
