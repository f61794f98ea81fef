//! Visibility computation: which squares can a side currently see?
//!
//! A side sees every square one of its pieces stands on, plus every square
//! those pieces attack or could move onto. Sliding pieces see along each ray
//! up to and including the first occupant, friend or foe. Knights and kings
//! see their full offset fans regardless of occupancy. Pawns are the odd
//! ones out: the forward square is sight only while empty (a blocked pawn
//! sees nothing ahead), the double-push square only from the starting rank
//! with both squares empty, and the diagonals only when an enemy piece
//! stands there.
//!
//! No turn, check or pin constraint applies. Visibility is recomputed from
//! scratch for every position; a stale set would leak hidden pieces.

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::types::{Bitboard, Color, PieceType, Square};

/// The set of squares visible to `side` in `pos`.
pub fn visible_squares(pos: &Position, side: Color) -> Bitboard {
    let t = attacks::tables();
    let occ = pos.all_occupied;
    let enemy = pos.occupied[(!side).index()];

    // Own-piece squares are always visible.
    let mut visible = pos.occupied[side.index()];

    for &kind in &PieceType::ALL {
        for from in pos.bb(side, kind).iter() {
            visible |= match kind {
                PieceType::Knight => t.knight_attacks(from),
                PieceType::King => t.king_attacks(from),
                PieceType::Bishop => attacks::bishop_attacks(from, occ),
                PieceType::Rook => attacks::rook_attacks(from, occ),
                PieceType::Queen => attacks::queen_attacks(from, occ),
                PieceType::Pawn => pawn_sight(side, from, occ, enemy),
            };
        }
    }

    visible
}

/// Pawn sight: empty forward square(s) plus enemy-occupied diagonals.
fn pawn_sight(side: Color, from: Square, occ: Bitboard, enemy: Bitboard) -> Bitboard {
    let t = attacks::tables();

    // Diagonals are attack squares, not sight lines into empty space.
    let mut sight = t.pawn_attacks(side, from) & enemy;

    let (dir, start_rank): (i8, u8) = match side {
        Color::White => (8, 1),
        Color::Black => (-8, 6),
    };

    let forward = from.0 as i8 + dir;
    if (0..64).contains(&forward) {
        let forward = Square(forward as u8);
        if !occ.is_set(forward) {
            sight.set(forward);
            if from.rank() == start_rank {
                let double = Square((from.0 as i8 + dir * 2) as u8);
                if !occ.is_set(double) {
                    sight.set(double);
                }
            }
        }
    }

    sight
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn own_piece_squares_always_visible() {
        let p = Position::starting();
        for side in [Color::White, Color::Black] {
            let visible = visible_squares(&p, side);
            for square in p.occupied[side.index()].iter() {
                assert!(visible.is_set(square), "{square} should be visible");
            }
        }
    }

    #[test]
    fn starting_position_white_sees_first_four_ranks() {
        // Ranks 1-2: own pieces. Ranks 3-4: pawn forward sight (every file)
        // which also covers the knight jump squares. Nothing further: the
        // pawn diagonals stay dark because no enemy stands there.
        let visible = visible_squares(&Position::starting(), Color::White);
        for rank in 0..4u8 {
            for file in 0..8u8 {
                let square = Square::from_file_rank(file, rank);
                assert!(visible.is_set(square), "{square} should be visible");
            }
        }
        for rank in 4..8u8 {
            for file in 0..8u8 {
                let square = Square::from_file_rank(file, rank);
                assert!(!visible.is_set(square), "{square} should be fogged");
            }
        }
        assert_eq!(visible.pop_count(), 32);
    }

    #[test]
    fn starting_position_is_symmetric_for_black() {
        let visible = visible_squares(&Position::starting(), Color::Black);
        assert_eq!(visible.pop_count(), 32);
        assert!(visible.is_set(sq("e5")));
        assert!(!visible.is_set(sq("e4")));
    }

    #[test]
    fn blocked_pawn_sees_nothing_ahead() {
        // White pawn e2, black rook e3: the pawn cannot see e3 (not a
        // diagonal) nor past it. The rook square stays dark to white except
        // through other pieces' sight. Lone kings far away.
        let p = pos("7k/8/8/8/8/4r3/4P3/K7 w - - 0 1");
        let visible = visible_squares(&p, Color::White);
        assert!(!visible.is_set(sq("e3")), "pawn does not attack straight ahead");
        assert!(!visible.is_set(sq("e4")), "no sight through the blocker");
    }

    #[test]
    fn pawn_double_sight_only_with_both_squares_empty() {
        // Blocker on e4: e3 is seen, e4 is not.
        let p = pos("7k/8/8/8/4r3/8/4P3/K7 w - - 0 1");
        let visible = visible_squares(&p, Color::White);
        assert!(visible.is_set(sq("e3")));
        assert!(!visible.is_set(sq("e4")));
    }

    #[test]
    fn pawn_diagonal_visible_only_with_enemy_there() {
        let empty_diag = pos("7k/8/8/8/8/8/4P3/K7 w - - 0 1");
        let visible = visible_squares(&empty_diag, Color::White);
        assert!(!visible.is_set(sq("d3")));
        assert!(!visible.is_set(sq("f3")));

        let enemy_diag = pos("7k/8/8/8/8/3r4/4P3/K7 w - - 0 1");
        let visible = visible_squares(&enemy_diag, Color::White);
        assert!(visible.is_set(sq("d3")), "enemy on the diagonal is seen");
        assert!(!visible.is_set(sq("f3")));
    }

    #[test]
    fn slider_ray_truncates_at_first_occupant() {
        // White rook a1, black pawn a5.
        let p = pos("7k/8/8/p7/8/8/8/R3K3 w - - 0 1");
        let visible = visible_squares(&p, Color::White);
        assert!(visible.is_set(sq("a4")));
        assert!(visible.is_set(sq("a5")), "first occupant is seen");
        assert!(!visible.is_set(sq("a6")), "nothing beyond it");
        assert!(!visible.is_set(sq("a7")));
        assert!(!visible.is_set(sq("a8")));
    }

    #[test]
    fn friendly_blocker_also_ends_the_ray_but_is_seen() {
        // White rook a1, white knight a3. The knight ends the rook's ray
        // and its own jumps do not cover a4.
        let p = pos("7k/8/8/8/8/N7/8/R3K3 w - - 0 1");
        let visible = visible_squares(&p, Color::White);
        assert!(visible.is_set(sq("a2")));
        assert!(visible.is_set(sq("a3")));
        assert!(!visible.is_set(sq("a4")));
    }

    #[test]
    fn knight_sees_over_pieces() {
        let visible = visible_squares(&Position::starting(), Color::White);
        assert!(visible.is_set(sq("a3")));
        assert!(visible.is_set(sq("c3")));
        assert!(visible.is_set(sq("f3")));
        assert!(visible.is_set(sq("h3")));
    }

    #[test]
    fn visibility_ignores_side_to_move() {
        // Black to move, but white visibility is computed all the same.
        let p = pos("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
        let visible = visible_squares(&p, Color::White);
        assert!(visible.is_set(sq("e4")));
        assert!(visible.is_set(sq("e5")), "pawn on e4 sees e5");
    }

    #[test]
    fn visibility_is_pure() {
        let p = Position::starting();
        let a = visible_squares(&p, Color::White);
        let b = visible_squares(&p, Color::White);
        assert_eq!(a, b);
        assert_eq!(
            p.to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }
}
