//! Bitboard chess engine for orthodox chess and Chess960.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit board representation with efficient operations
//! - [`Position`] - the twelve piece boards, castling rights, rook
//!   identities, en-passant state, and the reversible make/unmake protocol
//! - Move generation with Hyperbola Quintessence sliders and shifted span
//!   masks for knights and the king
//! - Evaluation (material plus positional terms) and a fixed-depth
//!   alpha-beta minimax search
//!
//! # Architecture
//!
//! Each piece type and color pair has its own 64-bit board. The position
//! carries no side-to-move: operations take a [`Color`](fischer_core::Color)
//! argument and the driver alternates turns, validating its moves against
//! the generated token strings.
//!
//! # Example
//!
//! ```
//! use fischer_core::Color;
//! use fischer_engine::{movegen, Position, Searcher};
//!
//! let mut position = Position::standard();
//! let moves = movegen::possible_moves(&position, Color::White);
//! assert_eq!(moves.len(), 20);
//!
//! let mut searcher = Searcher::new();
//! let score = searcher.minimax(
//!     &mut position,
//!     2,
//!     f32::NEG_INFINITY,
//!     f32::INFINITY,
//!     true,
//!     true,
//! );
//! position.make(searcher.best_move().unwrap());
//! assert!(score.abs() < 100.0);
//! ```

mod bitboard;
mod evaluate;
pub mod movegen;
mod position;
mod search;

pub use bitboard::Bitboard;
pub use evaluate::{evaluate, game_over, material_score};
pub use movegen::{attacks_by, in_check, leaves_king_exposed, legal_moves, possible_moves, MoveList};
pub use position::{CastlingRights, Position, Wing};
pub use search::{Searcher, MATE_SCORE};
