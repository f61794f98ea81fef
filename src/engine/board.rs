//! Bitboard-based position representation.
//!
//! `Position` stores piece placement as 12 bitboards (2 colours × 6 piece
//! types), redundant occupancy bitboards, side to move, castling rights,
//! en-passant square and move counters.
//!
//! Move application is fallible and check-blind: `apply_move` validates that
//! the mover exists, belongs to the side to move, and can physically reach
//! the target square, but never asks whether a king is left attacked. The
//! variant does not announce check, and the server is the authority on what
//! actually happened. A FEN with zero kings for a side is accepted for the
//! same reason: fog games end by king capture.

use crate::engine::attacks;
use crate::engine::types::{Bitboard, CastlingRights, Color, EngineError, Move, PieceType, Square};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete position using bitboard representation.
///
/// Board layout follows LERF (Little-Endian Rank-File) mapping:
/// a1 = 0, b1 = 1, … h1 = 7, a2 = 8, … h8 = 63.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Piece bitboards: `pieces[color][piece_type]`.
    pub pieces: [[Bitboard; PieceType::COUNT]; 2],

    /// Per-colour occupancy (union of all piece bitboards for that colour).
    pub occupied: [Bitboard; 2],

    /// Total occupancy (union of both colours).
    pub all_occupied: Bitboard,

    /// Whose turn it is, as far as this position knows.
    pub side_to_move: Color,

    /// Castling availability (K/Q/k/q).
    pub castling_rights: CastlingRights,

    /// En-passant target square (the square *behind* the double-pushed pawn).
    pub en_passant: Option<Square>,

    /// Half-move clock (reset on pawn move or capture).
    pub halfmove_clock: u16,

    /// Full-move number (starts at 1, incremented after Black moves).
    pub fullmove_number: u16,
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

impl Position {
    /// Create an empty board with no pieces.
    pub fn empty() -> Self {
        Position {
            pieces: [[Bitboard::EMPTY; PieceType::COUNT]; 2],
            occupied: [Bitboard::EMPTY; 2],
            all_occupied: Bitboard::EMPTY,
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .expect("starting FEN is always valid")
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    /// Place a piece on a square.
    #[inline]
    pub fn put_piece(&mut self, sq: Square, color: Color, piece: PieceType) {
        let bb = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] |= bb;
        self.occupied[color.index()] |= bb;
        self.all_occupied |= bb;
    }

    /// Remove a piece from a square.
    #[inline]
    pub fn remove_piece(&mut self, sq: Square, color: Color, piece: PieceType) {
        let bb = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] &= !bb;
        self.occupied[color.index()] &= !bb;
        self.all_occupied &= !bb;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square?
    pub fn piece_at(&self, sq: Square) -> Option<(Color, PieceType)> {
        let bb = Bitboard::from_square(sq);

        if (self.all_occupied & bb).is_empty() {
            return None;
        }

        let color = if (self.occupied[Color::White.index()] & bb).is_not_empty() {
            Color::White
        } else {
            Color::Black
        };

        for &pt in &PieceType::ALL {
            if (self.pieces[color.index()][pt.index()] & bb).is_not_empty() {
                return Some((color, pt));
            }
        }

        // Unreachable if occupancy is consistent.
        None
    }

    /// Bitboard of all pieces of a given colour and type.
    #[inline]
    pub fn bb(&self, color: Color, piece: PieceType) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    /// A copy of this position with the side to move overridden. Used by the
    /// forced-apply fallback when local turn tracking has drifted from the
    /// server's.
    pub fn with_side_to_move(&self, side: Color) -> Self {
        let mut copy = self.clone();
        copy.side_to_move = side;
        copy
    }

    // -----------------------------------------------------------------------
    // Occupancy sanity check (debug builds)
    // -----------------------------------------------------------------------

    /// Verify that redundant occupancy bitboards are consistent with piece
    /// bitboards. Available in debug builds and test builds.
    #[cfg(any(debug_assertions, test))]
    pub fn assert_consistent(&self) {
        for color in [Color::White, Color::Black] {
            let mut expected = Bitboard::EMPTY;
            for &pt in &PieceType::ALL {
                expected |= self.pieces[color.index()][pt.index()];
            }
            assert_eq!(
                self.occupied[color.index()],
                expected,
                "occupancy mismatch for {color:?}",
            );
        }
        assert_eq!(
            self.all_occupied,
            self.occupied[0] | self.occupied[1],
            "all_occupied mismatch",
        );
    }

    // -----------------------------------------------------------------------
    // Move application
    // -----------------------------------------------------------------------

    /// Apply a move declared as (from, to, promotion?).
    ///
    /// Capture, en passant, castling and double-push effects are derived
    /// from the position. Returns the kind of the captured piece, if any.
    /// On any validation failure the position is left untouched and an
    /// `EngineError` is returned; this function never panics.
    pub fn apply_move(&mut self, mv: Move) -> Result<Option<PieceType>, EngineError> {
        let (color, kind) = self.piece_at(mv.from).ok_or_else(|| invalid(mv, "no piece on from-square"))?;

        if color != self.side_to_move {
            return Err(invalid(mv, "piece does not belong to the side to move"));
        }
        if mv.from == mv.to {
            return Err(invalid(mv, "from and to are the same square"));
        }
        if let Some((on_to, _)) = self.piece_at(mv.to) {
            if on_to == color {
                return Err(invalid(mv, "own piece on target square"));
            }
        }

        let us = color;
        let them = !us;
        let t = attacks::tables();

        // Classify the move while validating reachability.
        let mut is_en_passant = false;
        let mut is_castling = false;
        let mut is_double_push = false;

        let reachable = match kind {
            PieceType::Knight => t.knight_attacks(mv.from).is_set(mv.to),
            PieceType::Bishop => attacks::bishop_attacks(mv.from, self.all_occupied).is_set(mv.to),
            PieceType::Rook => attacks::rook_attacks(mv.from, self.all_occupied).is_set(mv.to),
            PieceType::Queen => attacks::queen_attacks(mv.from, self.all_occupied).is_set(mv.to),
            PieceType::King => {
                if t.king_attacks(mv.from).is_set(mv.to) {
                    true
                } else if let Some(path) = self.castling_path(us, mv.from, mv.to) {
                    is_castling = true;
                    path.iter().all(|sq| !self.all_occupied.is_set(*sq))
                } else {
                    false
                }
            }
            PieceType::Pawn => {
                let dir: i8 = match us {
                    Color::White => 8,
                    Color::Black => -8,
                };
                let start_rank = match us {
                    Color::White => 1,
                    Color::Black => 6,
                };
                let single = mv.from.0 as i8 + dir;
                let double = mv.from.0 as i8 + dir * 2;
                if mv.to.0 as i8 == single && !self.all_occupied.is_set(mv.to) {
                    true
                } else if mv.from.rank() == start_rank
                    && mv.to.0 as i8 == double
                    && !self.all_occupied.is_set(Square(single as u8))
                    && !self.all_occupied.is_set(mv.to)
                {
                    is_double_push = true;
                    true
                } else if t.pawn_attacks(us, mv.from).is_set(mv.to) {
                    if (self.occupied[them.index()] & Bitboard::from_square(mv.to)).is_not_empty() {
                        true
                    } else if self.en_passant == Some(mv.to) {
                        is_en_passant = true;
                        true
                    } else {
                        false
                    }
                } else {
                    false
                }
            }
        };

        if !reachable {
            return Err(invalid(mv, "target square is not reachable"));
        }

        // ---- Handle capture ----
        let captured = if is_en_passant {
            let cap_sq = match us {
                Color::White => Square(mv.to.0 - 8),
                Color::Black => Square(mv.to.0 + 8),
            };
            self.remove_piece(cap_sq, them, PieceType::Pawn);
            Some(PieceType::Pawn)
        } else if let Some((_, cap_kind)) = self.piece_at(mv.to) {
            self.remove_piece(mv.to, them, cap_kind);
            Some(cap_kind)
        } else {
            None
        };

        // ---- Move the piece ----
        self.remove_piece(mv.from, us, kind);
        let promo_rank = match us {
            Color::White => 7,
            Color::Black => 0,
        };
        let landing = if kind == PieceType::Pawn && mv.to.rank() == promo_rank {
            mv.promotion_or_queen()
        } else {
            kind
        };
        self.put_piece(mv.to, us, landing);

        // ---- Castling: relocate the rook ----
        if is_castling {
            let (rook_from, rook_to) = castling_rook_squares(mv.to);
            self.remove_piece(rook_from, us, PieceType::Rook);
            self.put_piece(rook_to, us, PieceType::Rook);
        }

        // ---- Update castling rights ----
        // Moving king or rook, or capturing on a rook's home square.
        self.castling_rights.0 &= CASTLING_MASK[mv.from.0 as usize];
        self.castling_rights.0 &= CASTLING_MASK[mv.to.0 as usize];

        // ---- Double pawn push sets en passant, anything else clears it ----
        self.en_passant = if is_double_push {
            Some(Square((mv.from.0 as i8 + (mv.to.0 as i8 - mv.from.0 as i8) / 2) as u8))
        } else {
            None
        };

        // ---- Clocks ----
        if kind == PieceType::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        // ---- Switch side ----
        self.side_to_move = them;

        Ok(captured)
    }

    /// If (from, to) is the king's castling hop for `color`, return the
    /// squares that must be empty between king and rook. `None` means the
    /// move is not a castling attempt or the right is gone.
    fn castling_path(&self, color: Color, from: Square, to: Square) -> Option<Vec<Square>> {
        let base = match color {
            Color::White => 0u8,
            Color::Black => 56u8,
        };
        if from != Square(base + 4) {
            return None;
        }
        if to == Square(base + 6) && self.castling_rights.can_castle_kingside(color) {
            Some(vec![Square(base + 5), Square(base + 6)])
        } else if to == Square(base + 2) && self.castling_rights.can_castle_queenside(color) {
            Some(vec![Square(base + 1), Square(base + 2), Square(base + 3)])
        } else {
            None
        }
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), useful for
    /// debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                let ch = match self.piece_at(sq) {
                    Some((c, p)) => p.to_char(c),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

fn invalid(mv: Move, reason: &str) -> EngineError {
    EngineError::InvalidMove {
        from: mv.from.to_algebraic(),
        to: mv.to.to_algebraic(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Castling helpers (free functions)
// ---------------------------------------------------------------------------

/// For a king-destination square (after castling), return (rook_from, rook_to).
fn castling_rook_squares(king_to: Square) -> (Square, Square) {
    match king_to.0 {
        // White kingside: king e1→g1, rook h1→f1.
        6 => (Square(7), Square(5)),
        // White queenside: king e1→c1, rook a1→d1.
        2 => (Square(0), Square(3)),
        // Black kingside: king e8→g8, rook h8→f8.
        62 => (Square(63), Square(61)),
        // Black queenside: king e8→c8, rook a8→d8.
        58 => (Square(56), Square(59)),
        _ => unreachable!("castling destination checked by castling_path"),
    }
}

/// Mask table indexed by square index. When a move touches a square, AND the
/// castling rights with this mask. E.g. if a rook on a1 moves (or is
/// captured), remove White-queenside. The king's home square removes both
/// that side's rights.
#[rustfmt::skip]
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    mask[0]  = 0b1111 & !CastlingRights::WHITE_QUEENSIDE;
    mask[4]  = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
    mask[7]  = 0b1111 & !CastlingRights::WHITE_KINGSIDE;
    mask[56] = 0b1111 & !CastlingRights::BLACK_QUEENSIDE;
    mask[60] = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
    mask[63] = 0b1111 & !CastlingRights::BLACK_KINGSIDE;
    mask
};

// ---------------------------------------------------------------------------
// FEN parsing & generation
// ---------------------------------------------------------------------------

impl Position {
    /// Parse a FEN string into a `Position`.
    ///
    /// Validates all 6 fields (piece placement, side to move, castling,
    /// en passant, halfmove clock, fullmove number). King counts are NOT
    /// validated: a fog game that just ended may have a captured king.
    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(EngineError::InvalidFen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        let mut pos = Position::empty();

        // ----- Field 1: Piece placement -----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(EngineError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8; // FEN starts from rank 8
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(EngineError::InvalidFen(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(EngineError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as u8;
                } else if let Some((color, piece)) = PieceType::from_char(ch) {
                    let sq = Square::from_file_rank(file, rank);
                    pos.put_piece(sq, color, piece);
                    file += 1;
                } else {
                    return Err(EngineError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(EngineError::InvalidFen(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }

        // ----- Field 2: Side to move -----
        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(EngineError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        // ----- Field 3: Castling availability -----
        pos.castling_rights = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            EngineError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        // ----- Field 4: En passant target square -----
        if fields[3] != "-" {
            let ep_sq = Square::from_algebraic(fields[3]).ok_or_else(|| {
                EngineError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            // Target must be on rank 3 (for Black) or rank 6 (for White).
            let rank = ep_sq.rank();
            if rank != 2 && rank != 5 {
                return Err(EngineError::InvalidFen(format!(
                    "en passant square {} is not on rank 3 or 6",
                    fields[3]
                )));
            }
            pos.en_passant = Some(ep_sq);
        }

        // ----- Field 5: Halfmove clock -----
        pos.halfmove_clock = fields[4].parse::<u16>().map_err(|_| {
            EngineError::InvalidFen(format!("invalid halfmove clock: '{}'", fields[4]))
        })?;

        // ----- Field 6: Fullmove number -----
        pos.fullmove_number = fields[5].parse::<u16>().map_err(|_| {
            EngineError::InvalidFen(format!("invalid fullmove number: '{}'", fields[5]))
        })?;
        if pos.fullmove_number == 0 {
            return Err(EngineError::InvalidFen(
                "fullmove number must be >= 1".to_string(),
            ));
        }

        #[cfg(debug_assertions)]
        pos.assert_consistent();

        Ok(pos)
    }

    /// Export the position as a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        // ----- Field 1: Piece placement -----
        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.to_char(color));
                    }
                    None => {
                        empty_count += 1;
                    }
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        // ----- Field 2: Side to move -----
        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        // ----- Field 3: Castling -----
        fen.push(' ');
        fen.push_str(&self.castling_rights.to_fen());

        // ----- Field 4: En passant -----
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        // ----- Field 5: Halfmove clock -----
        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());

        // ----- Field 6: Fullmove number -----
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
