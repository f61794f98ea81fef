//! Destination generation under the variant's relaxed legality.
//!
//! For each of the local side's pieces standing on a visible square, the
//! physically reachable targets are produced with NO check-safety filtering:
//! neither player is told about check, so moving into it, staying in it, and
//! castling through it are all offered. Castling needs only the recorded
//! right and an empty path. The map is recomputed on every position or
//! visibility change and pieces with no targets are omitted entirely.

use std::collections::BTreeMap;

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::types::{Bitboard, Color, PieceType, Square};

/// Per-piece target squares, keyed by the piece's square.
pub type DestinationMap = BTreeMap<Square, Vec<Square>>;

/// Destinations for `side`, empty when it is not `side`'s turn.
pub fn destinations(pos: &Position, side: Color, visible: Bitboard) -> DestinationMap {
    let mut map = DestinationMap::new();
    if pos.side_to_move != side {
        return map;
    }

    let friendly = pos.occupied[side.index()];

    for &kind in &PieceType::ALL {
        for from in pos.bb(side, kind).iter() {
            if !visible.is_set(from) {
                continue;
            }
            let targets = match kind {
                PieceType::Pawn => pawn_targets(pos, side, from),
                PieceType::Knight => {
                    collect(attacks::tables().knight_attacks(from) & !friendly)
                }
                PieceType::King => king_targets(pos, side, from),
                PieceType::Bishop => {
                    collect(attacks::bishop_attacks(from, pos.all_occupied) & !friendly)
                }
                PieceType::Rook => {
                    collect(attacks::rook_attacks(from, pos.all_occupied) & !friendly)
                }
                PieceType::Queen => {
                    collect(attacks::queen_attacks(from, pos.all_occupied) & !friendly)
                }
            };
            if !targets.is_empty() {
                map.insert(from, targets);
            }
        }
    }

    map
}

#[inline]
fn collect(bb: Bitboard) -> Vec<Square> {
    bb.iter().collect()
}

/// Pawn targets: forward push(es), diagonal captures, en passant.
fn pawn_targets(pos: &Position, side: Color, from: Square) -> Vec<Square> {
    let mut targets = Vec::new();
    let (dir, start_rank): (i8, u8) = match side {
        Color::White => (8, 1),
        Color::Black => (-8, 6),
    };

    let forward = from.0 as i8 + dir;
    if (0..64).contains(&forward) {
        let forward = Square(forward as u8);
        if !pos.all_occupied.is_set(forward) {
            targets.push(forward);
            if from.rank() == start_rank {
                let double = Square((from.0 as i8 + dir * 2) as u8);
                if !pos.all_occupied.is_set(double) {
                    targets.push(double);
                }
            }
        }
    }

    let enemy = pos.occupied[(!side).index()];
    for to in attacks::tables().pawn_attacks(side, from).iter() {
        if enemy.is_set(to) || pos.en_passant == Some(to) {
            targets.push(to);
        }
    }

    targets
}

/// King targets: the offset fan, plus castling on recorded right + empty
/// path. Deliberately no attacked-square checks anywhere.
fn king_targets(pos: &Position, side: Color, from: Square) -> Vec<Square> {
    let friendly = pos.occupied[side.index()];
    let mut targets = collect(attacks::tables().king_attacks(from) & !friendly);

    let base = match side {
        Color::White => 0u8,
        Color::Black => 56u8,
    };
    if from != Square(base + 4) {
        return targets;
    }

    if pos.castling_rights.can_castle_kingside(side)
        && !pos.all_occupied.is_set(Square(base + 5))
        && !pos.all_occupied.is_set(Square(base + 6))
    {
        targets.push(Square(base + 6));
    }
    if pos.castling_rights.can_castle_queenside(side)
        && !pos.all_occupied.is_set(Square(base + 1))
        && !pos.all_occupied.is_set(Square(base + 2))
        && !pos.all_occupied.is_set(Square(base + 3))
    {
        targets.push(Square(base + 2));
    }

    targets
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fog::visibility::visible_squares;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn dests_for(fen: &str, side: Color) -> DestinationMap {
        let p = pos(fen);
        let visible = visible_squares(&p, side);
        destinations(&p, side, visible)
    }

    #[test]
    fn off_turn_map_is_empty() {
        let p = Position::starting();
        let visible = visible_squares(&p, Color::Black);
        assert!(destinations(&p, Color::Black, visible).is_empty());
    }

    #[test]
    fn starting_position_white_targets() {
        let map = dests_for(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            Color::White,
        );
        // 8 pawns and 2 knights have targets; everything else is boxed in
        // and therefore omitted from the map.
        assert_eq!(map.len(), 10);
        assert_eq!(map.get(&sq("e2")), Some(&vec![sq("e3"), sq("e4")]));
        assert_eq!(map.get(&sq("b1")), Some(&vec![sq("a3"), sq("c3")]));
        assert!(!map.contains_key(&sq("a1")), "blocked rook is omitted");
        assert!(!map.contains_key(&sq("e1")), "boxed-in king is omitted");
    }

    #[test]
    fn king_may_step_into_attack() {
        // Black rook sweeps rank 3; e3 must still be offered.
        let map = dests_for("4k3/8/8/8/8/7r/4K3/8 w - - 0 1", Color::White);
        let king = map.get(&sq("e2")).unwrap();
        assert!(king.contains(&sq("e3")), "no check-safety filtering");
    }

    #[test]
    fn pinned_piece_still_moves() {
        // Bishop on e2 is pinned to the king by the rook on e8.
        let map = dests_for("4r2k/8/8/8/8/8/4B3/4K3 w - - 0 1", Color::White);
        let bishop = map.get(&sq("e2")).unwrap();
        assert!(bishop.contains(&sq("d3")));
        assert!(bishop.contains(&sq("h5")));
    }

    #[test]
    fn castling_offered_through_attacked_square() {
        // Black rook attacks f1: standard chess forbids O-O, this variant
        // offers it anyway.
        let map = dests_for("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1", Color::White);
        let king = map.get(&sq("e1")).unwrap();
        assert!(king.contains(&sq("g1")));
        assert!(king.contains(&sq("c1")));
    }

    #[test]
    fn castling_needs_empty_path() {
        let map = dests_for(
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/RN2K1NR w KQkq - 0 1",
            Color::White,
        );
        let king = map.get(&sq("e1")).unwrap();
        assert!(!king.contains(&sq("g1")));
        assert!(!king.contains(&sq("c1")));
    }

    #[test]
    fn castling_needs_recorded_right() {
        let map = dests_for("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w Q - 0 1", Color::White);
        let king = map.get(&sq("e1")).unwrap();
        assert!(!king.contains(&sq("g1")));
        assert!(king.contains(&sq("c1")));
    }

    #[test]
    fn pawn_captures_and_en_passant() {
        let map = dests_for(
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            Color::White,
        );
        let pawn = map.get(&sq("e5")).unwrap();
        assert!(pawn.contains(&sq("e6")), "forward push");
        assert!(pawn.contains(&sq("f6")), "en passant onto the recorded target");
        assert!(!pawn.contains(&sq("d6")), "empty diagonal is not a capture");
    }

    #[test]
    fn slider_stops_before_friend_includes_enemy() {
        // Rook a1, own pawn a3, enemy rook h1, nothing else on rank 1.
        let map = dests_for("4k3/8/8/8/8/P7/4K3/R6r w - - 0 1", Color::White);
        let rook = map.get(&sq("a1")).unwrap();
        assert!(rook.contains(&sq("a2")));
        assert!(!rook.contains(&sq("a3")), "own pawn blocks");
        assert!(rook.contains(&sq("b1")));
        assert!(rook.contains(&sq("h1")), "enemy piece is a capture target");
    }

    #[test]
    fn piece_outside_the_visibility_set_is_skipped() {
        // A hand-trimmed visibility set excludes b1; its knight vanishes
        // from the map while e2's pawn remains.
        let p = Position::starting();
        let mut visible = visible_squares(&p, Color::White);
        visible.clear(sq("b1"));
        let map = destinations(&p, Color::White, visible);
        assert!(!map.contains_key(&sq("b1")));
        assert!(map.contains_key(&sq("e2")));
    }

    #[test]
    fn zero_target_pieces_are_omitted_not_empty() {
        let map = dests_for(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            Color::White,
        );
        for targets in map.values() {
            assert!(!targets.is_empty());
        }
    }
}
