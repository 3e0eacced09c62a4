//! Cross-module scenarios: whole games driven through the token interface,
//! structural invariants along random playouts, and Chess960 starts.

use fischer_core::{Color, Move, Piece};
use fischer_engine::{
    attacks_by, evaluate, game_over, in_check, legal_moves, material_score, possible_moves,
    Position, Searcher, Wing,
};
use proptest::prelude::*;

/// Checks the structural invariants the engine promises after every make
/// and unmake.
fn assert_invariants(pos: &Position) {
    // The twelve piece boards are pairwise disjoint.
    let mut boards = Vec::new();
    for color in Color::ALL {
        for piece in Piece::ALL {
            boards.push(pos.pieces_of(color, piece));
        }
    }
    for (i, &a) in boards.iter().enumerate() {
        for &b in &boards[i + 1..] {
            assert!((a & b).is_empty(), "piece boards overlap");
        }
    }

    // Exactly one king per side.
    for color in Color::ALL {
        assert_eq!(pos.pieces_of(color, Piece::King).count(), 1);
    }

    // The en-passant pawn, if any, sits on a double-push landing rank.
    assert!(pos.en_passant().count() <= 1);
    if let Some(sq) = pos.en_passant().lsb() {
        assert!(sq.rank() == 3 || sq.rank() == 4);
    }

    // A castling right implies the rook-identity bit is still a rook.
    for color in Color::ALL {
        for wing in Wing::ALL {
            if pos.castling().allows(color, wing) {
                let home = pos.rook_home(color, wing);
                assert!(
                    (home & pos.pieces_of(color, Piece::Rook)).is_not_empty(),
                    "castling right without its rook"
                );
            }
        }
    }
}

/// Plays one token per turn, resolving it against the generated move list
/// exactly as the driver does.
fn play_tokens(pos: &mut Position, tokens: &[&str]) {
    let mut side = Color::White;
    for token in tokens {
        let moves = possible_moves(pos, side);
        let all = moves.tokens(side);
        assert!(all.contains(token), "token {token} not generated");
        let m = moves
            .find_token(token, side)
            .unwrap_or_else(|| panic!("token {token} not found"));
        pos.make(m);
        side = side.opposite();
    }
}

#[test]
fn fools_mate_through_tokens() {
    let mut pos = Position::standard();
    play_tokens(&mut pos, &[" 5655", " 4143", " 6664", " 3074"]);

    assert!(game_over(&pos, Color::White));
    // The driver distinguishes checkmate from stalemate by testing the
    // side-to-move's king against the opponent's attack mask.
    let white_king = pos.pieces_of(Color::White, Piece::King);
    assert!((attacks_by(&pos, Color::Black) & white_king).is_not_empty());
}

#[test]
fn en_passant_round_trip_through_tokens() {
    let mut pos = Position::standard();
    // White edges a pawn up to rank 3, then Black double-pushes beside it.
    play_tokens(&mut pos, &[" 4644", " 0103", " 4443", " 3133"]);
    assert_eq!(pos.en_passant().lsb().map(|s| s.index()), Some(27));

    let before = pos.clone();
    let moves = possible_moves(&pos, Color::White);
    let ep = moves
        .find_token(" 4332", Color::White)
        .expect("en-passant capture should be generated");
    pos.make(ep);
    assert_eq!(
        pos.pieces_of(Color::Black, Piece::Pawn).count(),
        7,
        "the double-pushed pawn is gone"
    );
    pos.unmake();
    assert_eq!(pos, before);
}

#[test]
fn promotion_through_tokens() {
    let mut pos = Position::from_rows([
        "....k...",
        "P.......",
        "........",
        "........",
        "........",
        "........",
        "........",
        "....K...",
    ]);
    let before = pos.clone();
    let moves = possible_moves(&pos, Color::White);
    let promote = moves.find_token("Q0100", Color::White).unwrap();
    pos.make(promote);
    assert!(pos.pieces_of(Color::White, Piece::Pawn).is_empty());
    assert_eq!(pos.pieces_of(Color::White, Piece::Queen).count(), 1);
    assert_eq!(material_score(&pos), 900);

    pos.unmake();
    assert_eq!(pos, before);
}

#[test]
fn scholars_mate_engine_sees_the_loss() {
    let mut pos = Position::standard();
    // 1.e4 e5 2.Bc4 Nc6 3.Qh5 Nf6?? 4.Qxf7#
    play_tokens(
        &mut pos,
        &[
            " 4644", " 4143", " 5724", " 1022", " 3773", " 6052", " 7351",
        ],
    );
    assert!(game_over(&pos, Color::Black));
    assert!(in_check(&pos, Color::Black));
    // White delivered mate; material is still nearly level, so the attack
    // mask test is what decides the result.
    let black_king = pos.pieces_of(Color::Black, Piece::King);
    assert!((attacks_by(&pos, Color::White) & black_king).is_not_empty());
}

#[test]
fn search_at_every_driver_depth_returns_a_move() {
    for depth in 1u8..=3 {
        let mut pos = Position::standard();
        let mut searcher = Searcher::new();
        searcher.minimax(&mut pos, depth, f32::NEG_INFINITY, f32::INFINITY, true, true);
        let best = searcher.best_move().expect("opening position has moves");
        let legal = legal_moves(&pos, Color::White);
        assert!(legal.as_slice().contains(&best));
    }
}

#[test]
fn chess960_starts_are_symmetric() {
    let orders: [[Piece; 8]; 3] = [
        [
            Piece::Knight,
            Piece::Queen,
            Piece::Rook,
            Piece::King,
            Piece::Bishop,
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
        ],
        [
            Piece::Bishop,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
            Piece::Knight,
            Piece::Rook,
            Piece::Knight,
        ],
        [
            Piece::Rook,
            Piece::King,
            Piece::Rook,
            Piece::Queen,
            Piece::Bishop,
            Piece::Bishop,
            Piece::Knight,
            Piece::Knight,
        ],
    ];
    for order in orders {
        let pos = Position::with_back_rank(order);
        assert_invariants(&pos);
        assert!(!game_over(&pos, Color::White));
        assert!(!game_over(&pos, Color::Black));
        assert_eq!(
            legal_moves(&pos, Color::White).len(),
            legal_moves(&pos, Color::Black).len()
        );
        assert_eq!(evaluate(&pos), 0.0);
    }
}

#[test]
fn chess960_rook_identity_from_shuffled_rank() {
    // Rooks on files 1 and 2 of a shuffled rank; after clearing the short
    // wing the king castles with the rook identified at construction, not
    // with a rook on a fixed file.
    let order = [
        Piece::Rook,
        Piece::Rook,
        Piece::King,
        Piece::Queen,
        Piece::Bishop,
        Piece::Bishop,
        Piece::Knight,
        Piece::Knight,
    ];
    let pos = Position::with_back_rank(order);
    assert_eq!(
        pos.rook_home(Color::White, Wing::Long)
            .lsb()
            .map(|s| s.file()),
        Some(0)
    );
    assert_eq!(
        pos.rook_home(Color::White, Wing::Short)
            .lsb()
            .map(|s| s.file()),
        Some(1)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Random playouts: invariants hold at every step, evaluation stays
    /// mirror-symmetric, and unwinding the whole game restores every
    /// intermediate position exactly.
    #[test]
    fn random_playouts_are_reversible(picks in prop::collection::vec(0usize..1024, 0..50)) {
        let mut pos = Position::standard();
        let mut side = Color::White;
        let mut snapshots = vec![pos.clone()];

        for &pick in &picks {
            let legal = legal_moves(&pos, side);
            if legal.is_empty() {
                break;
            }
            let m: Move = legal[pick % legal.len()];
            pos.make(m);
            assert_invariants(&pos);
            prop_assert!((evaluate(&pos) + evaluate(&pos.mirrored())).abs() < 1e-3);
            snapshots.push(pos.clone());
            side = side.opposite();
        }

        while snapshots.len() > 1 {
            snapshots.pop();
            pos.unmake();
            prop_assert_eq!(&pos, snapshots.last().unwrap());
        }
    }

    /// The generator never emits a move that captures a king, and every
    /// ordinary-tag token belongs to exactly one generated move.
    #[test]
    fn generator_laws(picks in prop::collection::vec(0usize..1024, 0..30)) {
        let mut pos = Position::standard();
        let mut side = Color::White;

        for &pick in &picks {
            let kings = pos.pieces_of(Color::White, Piece::King)
                | pos.pieces_of(Color::Black, Piece::King);
            let moves = possible_moves(&pos, side);
            for m in moves.as_slice() {
                prop_assert!(!kings.contains(m.to()) || m.flag().is_castle());
            }

            let legal = legal_moves(&pos, side);
            if legal.is_empty() {
                break;
            }
            pos.make(legal[pick % legal.len()]);
            side = side.opposite();
        }
    }
}
