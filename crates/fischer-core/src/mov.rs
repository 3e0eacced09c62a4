//! Move representation and the textual move-token format.

use crate::{Color, Piece, Square};
use std::fmt;
use thiserror::Error;

/// Flags for special move types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveFlag {
    /// Ordinary move or capture.
    Normal = 0,
    /// Pawn double push from its starting rank.
    DoublePush = 1,
    /// Castling toward file 7 with the right-hand rook.
    CastleShort = 2,
    /// Castling toward file 0 with the left-hand rook.
    CastleLong = 3,
    /// En passant capture.
    EnPassant = 4,
    /// Pawn promotion to knight.
    PromoteKnight = 5,
    /// Pawn promotion to bishop.
    PromoteBishop = 6,
    /// Pawn promotion to rook.
    PromoteRook = 7,
    /// Pawn promotion to queen.
    PromoteQueen = 8,
}

impl MoveFlag {
    /// Returns the promotion piece if this is a promotion move.
    #[inline]
    pub const fn promotion_piece(self) -> Option<Piece> {
        match self {
            MoveFlag::PromoteKnight => Some(Piece::Knight),
            MoveFlag::PromoteBishop => Some(Piece::Bishop),
            MoveFlag::PromoteRook => Some(Piece::Rook),
            MoveFlag::PromoteQueen => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Returns the promotion flag for the given target piece.
    #[inline]
    pub const fn promotion_to(piece: Piece) -> Option<Self> {
        match piece {
            Piece::Knight => Some(MoveFlag::PromoteKnight),
            Piece::Bishop => Some(MoveFlag::PromoteBishop),
            Piece::Rook => Some(MoveFlag::PromoteRook),
            Piece::Queen => Some(MoveFlag::PromoteQueen),
            _ => None,
        }
    }

    /// Returns true if this is a promotion move.
    #[inline]
    pub const fn is_promotion(self) -> bool {
        matches!(
            self,
            MoveFlag::PromoteKnight
                | MoveFlag::PromoteBishop
                | MoveFlag::PromoteRook
                | MoveFlag::PromoteQueen
        )
    }

    /// Returns true if this is a castling move.
    #[inline]
    pub const fn is_castle(self) -> bool {
        matches!(self, MoveFlag::CastleShort | MoveFlag::CastleLong)
    }
}

/// A chess move.
///
/// Encoded compactly: 6 bits from, 6 bits to, 4 bits flags = 16 bits total.
/// For castling moves, `to` is the king's destination square.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    /// Creates a new move.
    #[inline]
    pub const fn new(from: Square, to: Square, flag: MoveFlag) -> Self {
        let encoded = (from.index() as u16) | ((to.index() as u16) << 6) | ((flag as u16) << 12);
        Move(encoded)
    }

    /// Creates an ordinary move (no special flags).
    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveFlag::Normal)
    }

    /// Returns the source square.
    #[inline]
    pub const fn from(self) -> Square {
        // SAFETY: masked to 6 bits, always a valid square index
        unsafe { Square::from_index_unchecked((self.0 & 0x3F) as u8) }
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        // SAFETY: masked to 6 bits, always a valid square index
        unsafe { Square::from_index_unchecked(((self.0 >> 6) & 0x3F) as u8) }
    }

    /// Returns the move flag.
    #[inline]
    pub const fn flag(self) -> MoveFlag {
        match (self.0 >> 12) as u8 {
            0 => MoveFlag::Normal,
            1 => MoveFlag::DoublePush,
            2 => MoveFlag::CastleShort,
            3 => MoveFlag::CastleLong,
            4 => MoveFlag::EnPassant,
            5 => MoveFlag::PromoteKnight,
            6 => MoveFlag::PromoteBishop,
            7 => MoveFlag::PromoteRook,
            8 => MoveFlag::PromoteQueen,
            _ => MoveFlag::Normal, // unreachable for moves built via new()
        }
    }

    /// Returns the move reflected vertically (both squares flipped, flag kept).
    #[inline]
    pub const fn flipped(self) -> Self {
        Move::new(self.from().flipped(), self.to().flipped(), self.flag())
    }

    /// Renders the five-character move token `T x1 y1 x2 y2`.
    ///
    /// The tag `T` is a space for ordinary moves (including double pushes
    /// and en passant), the promotion piece letter for promotions, and
    /// `C` for castling; promotion and castle tags are uppercase for White
    /// and lowercase for Black. The coordinates are the file and rank
    /// digits of the source and destination squares.
    pub fn to_token(self, color: Color) -> String {
        let tag = match self.flag() {
            MoveFlag::CastleShort | MoveFlag::CastleLong => match color {
                Color::White => 'C',
                Color::Black => 'c',
            },
            flag => match flag.promotion_piece() {
                Some(piece) => piece.to_char(color),
                None => ' ',
            },
        };
        let (from, to) = (self.from(), self.to());
        format!(
            "{}{}{}{}{}",
            tag,
            from.file(),
            from.rank(),
            to.file(),
            to.rank()
        )
    }

    /// A null move (used as placeholder, not a legal move).
    pub const NULL: Move = Move(0);
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}{} {:?})", self.from(), self.to(), self.flag())
    }
}

/// Errors produced when parsing coordinate input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("expected 4 coordinate digits, got {0} characters")]
    BadLength(usize),

    #[error("coordinate out of range: '{0}'")]
    BadCoordinate(char),
}

/// Parses a `x1 y1 x2 y2` digit string into source and destination squares.
///
/// This is the driver-facing half of the move-token format: the user enters
/// the four coordinate digits and the tag is resolved against the generated
/// move list.
pub fn parse_squares(s: &str) -> Result<(Square, Square), TokenError> {
    let digits: Vec<char> = s.chars().collect();
    if digits.len() != 4 {
        return Err(TokenError::BadLength(digits.len()));
    }
    let mut coords = [0u8; 4];
    for (i, &c) in digits.iter().enumerate() {
        match c.to_digit(10) {
            Some(d) if d < 8 => coords[i] = d as u8,
            _ => return Err(TokenError::BadCoordinate(c)),
        }
    }
    let from = Square::from_coords(coords[0], coords[1]).expect("digits checked above");
    let to = Square::from_coords(coords[2], coords[3]).expect("digits checked above");
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sq(file: u8, rank: u8) -> Square {
        Square::from_coords(file, rank).unwrap()
    }

    #[test]
    fn move_encoding() {
        let m = Move::new(sq(4, 6), sq(4, 4), MoveFlag::DoublePush);
        assert_eq!(m.from(), sq(4, 6));
        assert_eq!(m.to(), sq(4, 4));
        assert_eq!(m.flag(), MoveFlag::DoublePush);
    }

    #[test]
    fn move_token_ordinary() {
        let m = Move::normal(sq(4, 6), sq(4, 5));
        assert_eq!(m.to_token(Color::White), " 4645");
        assert_eq!(m.to_token(Color::Black), " 4645");
    }

    #[test]
    fn move_token_promotion() {
        let m = Move::new(sq(0, 1), sq(0, 0), MoveFlag::PromoteQueen);
        assert_eq!(m.to_token(Color::White), "Q0100");

        let m = Move::new(sq(0, 6), sq(0, 7), MoveFlag::PromoteKnight);
        assert_eq!(m.to_token(Color::Black), "n0607");
    }

    #[test]
    fn move_token_castle() {
        let m = Move::new(sq(4, 7), sq(6, 7), MoveFlag::CastleShort);
        assert_eq!(m.to_token(Color::White), "C4767");

        let m = Move::new(sq(4, 0), sq(2, 0), MoveFlag::CastleLong);
        assert_eq!(m.to_token(Color::Black), "c4020");
    }

    #[test]
    fn move_flipped() {
        let m = Move::new(sq(4, 1), sq(4, 3), MoveFlag::DoublePush);
        let f = m.flipped();
        assert_eq!(f.from(), sq(4, 6));
        assert_eq!(f.to(), sq(4, 4));
        assert_eq!(f.flag(), MoveFlag::DoublePush);
    }

    #[test]
    fn flag_promotion_piece() {
        assert_eq!(MoveFlag::Normal.promotion_piece(), None);
        assert_eq!(MoveFlag::EnPassant.promotion_piece(), None);
        assert_eq!(MoveFlag::PromoteQueen.promotion_piece(), Some(Piece::Queen));
        for piece in Piece::PROMOTIONS {
            let flag = MoveFlag::promotion_to(piece).unwrap();
            assert_eq!(flag.promotion_piece(), Some(piece));
        }
        assert_eq!(MoveFlag::promotion_to(Piece::King), None);
    }

    #[test]
    fn flag_predicates() {
        assert!(MoveFlag::PromoteRook.is_promotion());
        assert!(!MoveFlag::CastleShort.is_promotion());
        assert!(MoveFlag::CastleShort.is_castle());
        assert!(MoveFlag::CastleLong.is_castle());
        assert!(!MoveFlag::EnPassant.is_castle());
    }

    #[test]
    fn parse_squares_valid() {
        let (from, to) = parse_squares("4645").unwrap();
        assert_eq!(from, sq(4, 6));
        assert_eq!(to, sq(4, 5));
    }

    #[test]
    fn parse_squares_invalid() {
        assert_eq!(parse_squares("464"), Err(TokenError::BadLength(3)));
        assert_eq!(parse_squares("46455"), Err(TokenError::BadLength(5)));
        assert_eq!(parse_squares("4a45"), Err(TokenError::BadCoordinate('a')));
        assert_eq!(parse_squares("4845"), Err(TokenError::BadCoordinate('8')));
    }

    proptest! {
        #[test]
        fn token_coords_roundtrip(from in 0u8..64, to in 0u8..64) {
            let m = Move::normal(
                Square::from_index(from).unwrap(),
                Square::from_index(to).unwrap(),
            );
            let token = m.to_token(Color::White);
            prop_assert_eq!(token.len(), 5);
            let (f, t) = parse_squares(&token[1..]).unwrap();
            prop_assert_eq!(f, m.from());
            prop_assert_eq!(t, m.to());
        }
    }
}
