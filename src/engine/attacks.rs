//! Attack and sight geometry.
//!
//! Leaper tables (knight, king, pawn attacks) are initialised once via
//! `OnceLock`. Sliding attacks are computed by ray scan with the blocker
//! included: the same "first obstacle ends the ray" rule serves both move
//! generation and fog visibility.

use crate::engine::types::{Bitboard, Color, Square};
use std::sync::OnceLock;

// =========================================================================
// Public API
// =========================================================================

/// Get a reference to the global attack tables.
pub fn tables() -> &'static AttackTables {
    static TABLES: OnceLock<AttackTables> = OnceLock::new();
    TABLES.get_or_init(AttackTables::init)
}

/// Pre-computed attack tables for the leaper pieces.
pub struct AttackTables {
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    /// `pawn_attacks[color][square]` — squares a pawn on `square` attacks.
    pawn_attacks: [[Bitboard; 64]; 2],
}

impl AttackTables {
    /// Knight attacks from a square.
    #[inline]
    pub fn knight_attacks(&self, sq: Square) -> Bitboard {
        self.knight[sq.0 as usize]
    }

    /// King attacks from a square.
    #[inline]
    pub fn king_attacks(&self, sq: Square) -> Bitboard {
        self.king[sq.0 as usize]
    }

    /// Pawn attack squares for a given colour.
    #[inline]
    pub fn pawn_attacks(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_attacks[color.index()][sq.0 as usize]
    }
}

const ROOK_DELTAS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DELTAS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Rook attacks from `sq` given current `occupied` bitboard. The first
/// occupant on each ray is included; nothing beyond it is.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    sliding_attacks(sq, occupied, &ROOK_DELTAS)
}

/// Bishop attacks from `sq` given current `occupied` bitboard.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    sliding_attacks(sq, occupied, &BISHOP_DELTAS)
}

/// Queen attacks = rook | bishop.
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

/// Sliding attacks along rays from `sq`, stopping at and including the first
/// square set in `occupied`. `deltas` lists (rank_delta, file_delta) rays.
fn sliding_attacks(sq: Square, occupied: Bitboard, deltas: &[(i8, i8)]) -> Bitboard {
    let file = sq.file() as i8;
    let rank = sq.rank() as i8;
    let mut attacks = Bitboard::EMPTY;
    for &(dr, df) in deltas {
        let mut r = rank + dr;
        let mut f = file + df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let target = Square::from_file_rank(f as u8, r as u8);
            attacks.set(target);
            if occupied.is_set(target) {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

// =========================================================================
// Initialisation
// =========================================================================

impl AttackTables {
    fn init() -> Self {
        AttackTables {
            knight: init_leaper_attacks(&[
                (-2, -1),
                (-2, 1),
                (-1, -2),
                (-1, 2),
                (1, -2),
                (1, 2),
                (2, -1),
                (2, 1),
            ]),
            king: init_leaper_attacks(&[
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ]),
            pawn_attacks: init_pawn_attacks(),
        }
    }
}

fn init_leaper_attacks(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    for sq in 0..64u8 {
        let file = (sq & 7) as i8;
        let rank = (sq >> 3) as i8;
        let mut bb = 0u64;
        for &(dr, df) in offsets {
            let r = rank + dr;
            let f = file + df;
            if (0..8).contains(&r) && (0..8).contains(&f) {
                bb |= 1u64 << (r * 8 + f);
            }
        }
        table[sq as usize] = Bitboard(bb);
    }
    table
}

fn init_pawn_attacks() -> [[Bitboard; 64]; 2] {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    for sq in 0..64u8 {
        let file = (sq & 7) as i8;
        let rank = (sq >> 3) as i8;

        // White pawns attack NW and NE (rank + 1).
        if rank < 7 {
            let mut bb = 0u64;
            if file > 0 {
                bb |= 1u64 << ((rank + 1) * 8 + (file - 1));
            }
            if file < 7 {
                bb |= 1u64 << ((rank + 1) * 8 + (file + 1));
            }
            table[Color::White.index()][sq as usize] = Bitboard(bb);
        }

        // Black pawns attack SW and SE (rank - 1).
        if rank > 0 {
            let mut bb = 0u64;
            if file > 0 {
                bb |= 1u64 << ((rank - 1) * 8 + (file - 1));
            }
            if file < 7 {
                bb |= 1u64 << ((rank - 1) * 8 + (file + 1));
            }
            table[Color::Black.index()][sq as usize] = Bitboard(bb);
        }
    }
    table
}

// =========================================================================
// Tests
// =========================================================================
