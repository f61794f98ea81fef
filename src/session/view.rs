//! The surface handed to the board widget: everything it needs to render
//! one update and restrict interaction, recomputed from scratch per call.

use crate::engine::types::{Bitboard, Color, Move};
use crate::fog::{
    destinations, fog_squares, project_pieces, visible_squares, DestinationMap, PieceMap,
};

use super::game::GameSession;

/// One renderable snapshot of the game.
#[derive(Clone, Debug)]
pub struct BoardView {
    /// Pieces to draw, keyed by square.
    pub pieces: PieceMap,
    /// Squares to cover with fog.
    pub fog: Bitboard,
    /// Per-piece move targets the player may pick from. Empty off-turn, in
    /// historical views, and once the game is over.
    pub dests: DestinationMap,
    /// The move that produced this position, for highlighting.
    pub last_move: Option<Move>,
    /// Side to move, `None` in historical views (no one moves in the past).
    pub turn: Option<Color>,
}

impl GameSession {
    /// The live fogged view for the local player.
    pub fn live_view(&self) -> BoardView {
        let position = self.position();
        let side = self.our_side();
        let visible = visible_squares(position, side);

        let dests = if !self.is_over() && self.turn() == side {
            destinations(position, side, visible)
        } else {
            DestinationMap::new()
        };

        BoardView {
            pieces: project_pieces(position, visible, side, false),
            fog: fog_squares(position, visible, side, false),
            dests,
            last_move: self.last_move(),
            turn: Some(self.turn()),
        }
    }

    /// The view at ply `ply`, for history scrubbing. `ply >= ply_count()`
    /// yields the live view; anything earlier is a read-only reconstruction
    /// with no destinations offered.
    pub fn view_at(&self, ply: usize) -> BoardView {
        let ply = self.clamp_ply(ply);
        if ply == self.ply_count() {
            return self.live_view();
        }

        let frame = self.frame_at(ply);
        let side = self.our_side();
        let visible = visible_squares(&frame.position, side);

        BoardView {
            pieces: project_pieces(&frame.position, visible, side, false),
            fog: fog_squares(&frame.position, visible, side, false),
            dests: DestinationMap::new(),
            last_move: frame.last_move,
            turn: None,
        }
    }

    /// The fog-dispelled live board for the post-game reveal.
    pub fn reveal_view(&self) -> BoardView {
        let position = self.position();
        let side = self.our_side();
        let visible = visible_squares(position, side);

        BoardView {
            pieces: project_pieces(position, visible, side, true),
            fog: fog_squares(position, visible, side, true),
            dests: DestinationMap::new(),
            last_move: self.last_move(),
            turn: Some(self.turn()),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
