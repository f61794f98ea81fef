//! Render projection: what the local player actually gets to draw.
//!
//! Two derived views over (position, visibility, side): the piece map (own
//! pieces always, enemy pieces only inside visibility) and the fog set
//! (squares neither visible nor holding an own piece). `suppress_fog`
//! dispels everything for the post-game reveal.

use std::collections::BTreeMap;

use crate::engine::board::Position;
use crate::engine::types::{Bitboard, Color, PieceType, Square};

/// Renderable pieces keyed by square.
pub type PieceMap = BTreeMap<Square, (Color, PieceType)>;

/// The pieces to display for `side`: all of its own, plus any enemy piece
/// standing on a visible square. With `suppress_fog` every piece projects.
pub fn project_pieces(
    pos: &Position,
    visible: Bitboard,
    side: Color,
    suppress_fog: bool,
) -> PieceMap {
    let mut pieces = PieceMap::new();
    for square in pos.all_occupied.iter() {
        let (color, kind) = match pos.piece_at(square) {
            Some(p) => p,
            None => continue,
        };
        if suppress_fog || color == side || visible.is_set(square) {
            pieces.insert(square, (color, kind));
        }
    }
    pieces
}

/// The squares to cover with fog for `side`: not visible and not holding an
/// own piece. Own pieces are never fogged, whatever the visibility set says.
/// Empty when `suppress_fog` is set.
pub fn fog_squares(pos: &Position, visible: Bitboard, side: Color, suppress_fog: bool) -> Bitboard {
    if suppress_fog {
        return Bitboard::EMPTY;
    }
    !(visible | pos.occupied[side.index()])
}

// =========================================================================
// Tests
// =========================================================================
