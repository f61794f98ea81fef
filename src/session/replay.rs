//! Replay reconstruction for move-by-move review.
//!
//! A historical position is always rebuilt from the fixed starting position
//! by replaying the first K logged moves through the same direct-then-forced
//! apply the live path uses. Rebuilding instead of undoing (or branching off
//! the live board) keeps replay free of drift from engine-internal state
//! such as half-move clocks. Nothing is cached: K changes on every scrub
//! step and a board rebuild is cheap next to the cost of a stale one.

use tracing::debug;

use crate::engine::board::Position;
use crate::engine::types::{Move, PieceType};

use super::game::{apply_with_fallback, GameSession};

/// A reconstructed point in the game: the position after K plies, the
/// captured-piece tallies accumulated so far, and the move that produced it.
#[derive(Clone, Debug)]
pub struct ReplayFrame {
    pub position: Position,
    /// `captures[color]` lists the piece kinds that colour had taken by
    /// this ply.
    pub captures: [Vec<PieceType>; 2],
    pub last_move: Option<Move>,
}

impl GameSession {
    /// Clamp a requested ply index into `[0, ply_count()]`.
    pub fn clamp_ply(&self, ply: usize) -> usize {
        ply.min(self.ply_count())
    }

    /// The position after the first `ply` logged moves. `ply` 0 is the
    /// starting position; `ply_count()` reproduces the live position.
    pub fn position_at(&self, ply: usize) -> Position {
        self.frame_at(ply).position
    }

    /// The full reconstructed frame after the first `ply` logged moves.
    /// Never touches the live position.
    pub fn frame_at(&self, ply: usize) -> ReplayFrame {
        let ply = self.clamp_ply(ply);
        let mut position = Position::starting();
        let mut captures = [Vec::new(), Vec::new()];
        let mut last_move = None;

        for &mv in &self.move_log()[..ply] {
            let mover = position
                .piece_at(mv.from)
                .map(|(color, _)| color)
                .unwrap_or(position.side_to_move);
            match apply_with_fallback(&position, mv) {
                Ok((next, captured)) => {
                    position = next;
                    if let Some(kind) = captured {
                        captures[mover.index()].push(kind);
                    }
                    last_move = Some(mv);
                }
                Err(err) => {
                    // A move the live path accepted via a server FEN can
                    // fail local reconstruction; skip it and carry on.
                    debug!(%err, %mv, "replay skipped a move no apply path accepts");
                }
            }
        }

        ReplayFrame {
            position,
            captures,
            last_move,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
