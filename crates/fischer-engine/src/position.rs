//! Chess position representation and the make/unmake protocol.

use fischer_core::{Color, Move, MoveFlag, Piece, Square};

use crate::Bitboard;

/// The two castling directions.
///
/// `Long` castling moves the king two files toward file 0 together with the
/// left-hand rook; `Short` moves it toward file 7 with the right-hand rook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Wing {
    Long = 0,
    Short = 1,
}

impl Wing {
    /// Both wings, queenside first.
    pub const ALL: [Wing; 2] = [Wing::Long, Wing::Short];

    /// Returns the index (0 for Long, 1 for Short).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    const WHITE_SHORT: u8 = 0b0001;
    const WHITE_LONG: u8 = 0b0010;
    const BLACK_SHORT: u8 = 0b0100;
    const BLACK_LONG: u8 = 0b1000;

    #[inline]
    const fn flag(color: Color, wing: Wing) -> u8 {
        match (color, wing) {
            (Color::White, Wing::Short) => Self::WHITE_SHORT,
            (Color::White, Wing::Long) => Self::WHITE_LONG,
            (Color::Black, Wing::Short) => Self::BLACK_SHORT,
            (Color::Black, Wing::Long) => Self::BLACK_LONG,
        }
    }

    /// Returns true if the given side may castle on the given wing.
    #[inline]
    pub const fn allows(self, color: Color, wing: Wing) -> bool {
        (self.0 & Self::flag(color, wing)) != 0
    }

    /// Grants the castling right for a color and wing.
    #[inline]
    pub fn grant(&mut self, color: Color, wing: Wing) {
        self.0 |= Self::flag(color, wing);
    }

    /// Removes the castling right for a color and wing.
    #[inline]
    pub fn remove(&mut self, color: Color, wing: Wing) {
        self.0 &= !Self::flag(color, wing);
    }

    /// Removes both castling rights for a color.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        match color {
            Color::White => self.0 &= !(Self::WHITE_SHORT | Self::WHITE_LONG),
            Color::Black => self.0 &= !(Self::BLACK_SHORT | Self::BLACK_LONG),
        }
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Everything needed to reverse one move.
///
/// Both colors' castling rights and the en-passant board are snapshotted in
/// full, so unmake is self-contained: callers never save state around a
/// speculative make.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Undo {
    mv: Move,
    color: Color,
    piece: Piece,
    captured: Option<(Piece, Square)>,
    castling: CastlingRights,
    en_passant: Bitboard,
}

/// Complete chess position state.
///
/// Holds the twelve piece bitboards, the en-passant marker, castling rights,
/// the identity of each color's castling rooks (fixed at construction, which
/// is what makes Chess960 castling work), and the history stack that backs
/// [`unmake`](Position::unmake).
///
/// There is no side-to-move field: operations that depend on the side take a
/// [`Color`] argument, and the driver owns turn alternation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Piece bitboards indexed by color, then piece type.
    pieces: [[Bitboard; 6]; 2],
    /// The pawn that just made a two-square advance, if any (at most one bit).
    en_passant: Bitboard,
    /// Castling rights for both colors.
    castling: CastlingRights,
    /// Starting squares of each color's castling rooks, indexed by color and
    /// wing. Never changes during play.
    rook_homes: [[Bitboard; 2]; 2],
    /// Undo records for every move made on this position.
    history: Vec<Undo>,
}

/// Back-rank piece order of the orthodox starting position.
const STANDARD_BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

impl Position {
    /// Creates the orthodox starting position.
    pub fn standard() -> Self {
        Self::with_back_rank(STANDARD_BACK_RANK)
    }

    /// Creates a starting position with the given back-rank piece order.
    ///
    /// Both colors receive the same order, as in Chess960; pawns stand on
    /// their usual ranks and all four castling rights are granted. The
    /// caller is responsible for shuffling (and for any Chess960 placement
    /// constraints it wants to enforce).
    pub fn with_back_rank(order: [Piece; 8]) -> Self {
        let mut pieces = [[Bitboard::EMPTY; 6]; 2];
        for (file, piece) in order.into_iter().enumerate() {
            pieces[Color::Black.index()][piece.index()].0 |= 1u64 << file;
            pieces[Color::White.index()][piece.index()].0 |= 1u64 << (56 + file);
        }
        pieces[Color::Black.index()][Piece::Pawn.index()] = Bitboard::RANKS[1];
        pieces[Color::White.index()][Piece::Pawn.index()] = Bitboard::RANKS[6];
        Self::from_pieces(pieces, CastlingRights::ALL)
    }

    /// Creates a position from eight strings of piece letters, top rank
    /// first.
    ///
    /// Uppercase letters are White, lowercase Black; any other character is
    /// an empty square. Castling rights start out empty; grant them with
    /// [`set_castling`](Position::set_castling) when a setup calls for them.
    pub fn from_rows(rows: [&str; 8]) -> Self {
        let mut pieces = [[Bitboard::EMPTY; 6]; 2];
        for (rank, row) in rows.iter().enumerate() {
            for (file, c) in row.chars().take(8).enumerate() {
                if let Some((piece, color)) = Piece::from_char(c) {
                    pieces[color.index()][piece.index()].0 |= 1u64 << (rank * 8 + file);
                }
            }
        }
        Self::from_pieces(pieces, CastlingRights::NONE)
    }

    fn from_pieces(pieces: [[Bitboard; 6]; 2], castling: CastlingRights) -> Self {
        let mut rook_homes = [[Bitboard::EMPTY; 2]; 2];
        for color in Color::ALL {
            let rooks = pieces[color.index()][Piece::Rook.index()];
            let left = rooks.lowest_bit();
            let right = (rooks ^ left).highest_bit();
            rook_homes[color.index()][Wing::Long.index()] = left;
            rook_homes[color.index()][Wing::Short.index()] = right;
        }
        Position {
            pieces,
            en_passant: Bitboard::EMPTY,
            castling,
            rook_homes,
            history: Vec::new(),
        }
    }

    /// Returns the bitboard of pieces of the given color and type.
    #[inline]
    pub fn pieces_of(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    /// Returns a bitboard of all pieces of the given color.
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        let mut bb = Bitboard::EMPTY;
        for piece in Piece::ALL {
            bb |= self.pieces[color.index()][piece.index()];
        }
        bb
    }

    /// Returns a bitboard of all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied_by(Color::White) | self.occupied_by(Color::Black)
    }

    /// Returns a bitboard of all empty squares.
    #[inline]
    pub fn empty_squares(&self) -> Bitboard {
        !self.occupied()
    }

    /// Returns the piece and color at the given square, if any.
    pub fn piece_on(&self, sq: Square) -> Option<(Piece, Color)> {
        let bb = Bitboard::from_square(sq);
        for color in Color::ALL {
            for piece in Piece::ALL {
                if (self.pieces[color.index()][piece.index()] & bb).is_not_empty() {
                    return Some((piece, color));
                }
            }
        }
        None
    }

    /// Returns the pawn that just double-pushed, if any (at most one bit).
    #[inline]
    pub fn en_passant(&self) -> Bitboard {
        self.en_passant
    }

    /// Returns the castling rights.
    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    /// Replaces the castling rights. Intended for custom setups built with
    /// [`from_rows`](Position::from_rows); the rights must be consistent
    /// with the piece placement.
    pub fn set_castling(&mut self, castling: CastlingRights) {
        self.castling = castling;
    }

    /// Returns the starting square of the given castling rook (one bit), or
    /// an empty board if that rook did not exist at construction.
    #[inline]
    pub fn rook_home(&self, color: Color, wing: Wing) -> Bitboard {
        self.rook_homes[color.index()][wing.index()]
    }

    /// Returns the number of moves made (and not yet unmade) on this
    /// position.
    #[inline]
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    /// Makes a move in place, pushing an undo record.
    ///
    /// The mover is identified from the move's source square; double pushes,
    /// en passant, promotions, and castling are resolved from the move flag.
    ///
    /// # Panics
    ///
    /// Panics if the source square is empty. Under the documented protocol
    /// (moves come from the generator or are validated against it) this
    /// cannot happen.
    pub fn make(&mut self, m: Move) {
        let (piece, color) = self
            .piece_on(m.from())
            .expect("no piece on the move's source square");
        let enemy = color.opposite();
        let from_bb = Bitboard::from_square(m.from());
        let to_bb = Bitboard::from_square(m.to());

        let mut undo = Undo {
            mv: m,
            color,
            piece,
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
        };

        let old_en_passant = self.en_passant;
        self.en_passant = if m.flag() == MoveFlag::DoublePush {
            to_bb
        } else {
            Bitboard::EMPTY
        };

        // Capture resolution. The en-passant victim sits on the square
        // recorded in the en-passant board, not on the destination.
        let victim_sq = if m.flag() == MoveFlag::EnPassant {
            old_en_passant
                .lsb()
                .expect("en-passant move without a double-pushed pawn")
        } else {
            m.to()
        };
        let victim_bb = Bitboard::from_square(victim_sq);
        for victim in Piece::ALL {
            if (self.pieces[enemy.index()][victim.index()] & victim_bb).is_not_empty() {
                self.pieces[enemy.index()][victim.index()] ^= victim_bb;
                undo.captured = Some((victim, victim_sq));
                if victim == Piece::Rook {
                    for wing in Wing::ALL {
                        if victim_bb == self.rook_homes[enemy.index()][wing.index()] {
                            self.castling.remove(enemy, wing);
                        }
                    }
                }
                break;
            }
        }

        // Move the piece and update castling rights.
        self.pieces[color.index()][piece.index()] ^= from_bb | to_bb;
        match piece {
            Piece::King => self.castling.remove_color(color),
            Piece::Rook => {
                for wing in Wing::ALL {
                    if from_bb == self.rook_homes[color.index()][wing.index()] {
                        self.castling.remove(color, wing);
                    }
                }
            }
            _ => {}
        }

        match m.flag() {
            MoveFlag::CastleLong | MoveFlag::CastleShort => {
                let wing = if m.flag() == MoveFlag::CastleLong {
                    Wing::Long
                } else {
                    Wing::Short
                };
                let rook_from = self.rook_homes[color.index()][wing.index()];
                let rook_to = match wing {
                    Wing::Long => to_bb << 1,
                    Wing::Short => to_bb >> 1,
                };
                // A Chess960 rook may already stand on its destination.
                if rook_from != rook_to {
                    self.pieces[color.index()][Piece::Rook.index()] ^= rook_from | rook_to;
                }
            }
            flag => {
                if let Some(promoted) = flag.promotion_piece() {
                    self.pieces[color.index()][Piece::Pawn.index()] ^= to_bb;
                    self.pieces[color.index()][promoted.index()] |= to_bb;
                }
            }
        }

        self.history.push(undo);
        debug_assert!(self.is_consistent());
    }

    /// Reverses the most recent move, restoring the position bit for bit
    /// (including castling rights and the en-passant board).
    ///
    /// # Panics
    ///
    /// Panics if no move has been made.
    pub fn unmake(&mut self) {
        let undo = self.history.pop().expect("unmake without a matching make");
        let m = undo.mv;
        let color = undo.color;
        let from_bb = Bitboard::from_square(m.from());
        let to_bb = Bitboard::from_square(m.to());

        match m.flag() {
            MoveFlag::CastleLong | MoveFlag::CastleShort => {
                let wing = if m.flag() == MoveFlag::CastleLong {
                    Wing::Long
                } else {
                    Wing::Short
                };
                let rook_from = self.rook_homes[color.index()][wing.index()];
                let rook_to = match wing {
                    Wing::Long => to_bb << 1,
                    Wing::Short => to_bb >> 1,
                };
                if rook_from != rook_to {
                    self.pieces[color.index()][Piece::Rook.index()] ^= rook_from | rook_to;
                }
            }
            flag => {
                if let Some(promoted) = flag.promotion_piece() {
                    self.pieces[color.index()][promoted.index()] ^= to_bb;
                    self.pieces[color.index()][Piece::Pawn.index()] ^= to_bb;
                }
            }
        }

        self.pieces[color.index()][undo.piece.index()] ^= from_bb | to_bb;

        if let Some((victim, victim_sq)) = undo.captured {
            self.pieces[color.opposite().index()][victim.index()] |=
                Bitboard::from_square(victim_sq);
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        debug_assert!(self.is_consistent());
    }

    /// Returns the position with colors swapped and the board flipped
    /// vertically. Used to check evaluation symmetry.
    pub fn mirrored(&self) -> Self {
        let mut pieces = [[Bitboard::EMPTY; 6]; 2];
        let mut rook_homes = [[Bitboard::EMPTY; 2]; 2];
        let mut castling = CastlingRights::NONE;
        for color in Color::ALL {
            let other = color.opposite().index();
            for piece in Piece::ALL {
                pieces[other][piece.index()] =
                    self.pieces[color.index()][piece.index()].flip_vertical();
            }
            for wing in Wing::ALL {
                rook_homes[other][wing.index()] =
                    self.rook_homes[color.index()][wing.index()].flip_vertical();
                if self.castling.allows(color, wing) {
                    castling.grant(color.opposite(), wing);
                }
            }
        }
        Position {
            pieces,
            en_passant: self.en_passant.flip_vertical(),
            castling,
            rook_homes,
            history: Vec::new(),
        }
    }

    /// Checks the structural invariants: pairwise-disjoint piece boards, one
    /// king per side, and at most one en-passant bit.
    fn is_consistent(&self) -> bool {
        let mut seen = Bitboard::EMPTY;
        for color in Color::ALL {
            for piece in Piece::ALL {
                let bb = self.pieces[color.index()][piece.index()];
                if (seen & bb).is_not_empty() {
                    return false;
                }
                seen |= bb;
            }
            if self.pieces_of(color, Piece::King).count() != 1 {
                return false;
            }
        }
        self.en_passant.count() <= 1
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::standard()
    }
}
