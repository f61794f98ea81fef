//! Shadow position synchronization.
//!
//! The server is the authority on the game; the client keeps a local shadow
//! of it and reconciles every declared move. A declared move may not apply
//! cleanly here: under fog the client does not always know whose turn it
//! really is, so the local side-to-move bookkeeping can drift. Application
//! therefore walks a ladder:
//!
//!   1. load the server's canonical FEN when the event carries one;
//!   2. otherwise apply the move directly to the shadow position;
//!   3. otherwise force it: retry on a scratch copy with the side to move
//!      flipped, adopting the scratch only on success.
//!
//! A move that survives none of the paths is dropped with a warning and the
//! prior position is kept. Nothing in here panics; a desynced-but-consistent
//! board beats a crashed client.

use tracing::{debug, warn};

use crate::engine::board::Position;
use crate::engine::types::{Color, EngineError, Move, PieceType};
use crate::net::messages::{ClientCommand, ServerEvent};

// ---------------------------------------------------------------------------
// ApplyOutcome
// ---------------------------------------------------------------------------

/// Which path accepted a server-declared move, or `Rejected` if none did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The server's canonical FEN was loaded.
    Loaded,
    /// The move applied directly to the shadow position.
    Applied,
    /// The move applied only after flipping the recorded side to move.
    Forced,
    /// Every path failed; the move was dropped and the position kept.
    Rejected,
}

impl ApplyOutcome {
    /// Whether the move was accepted and logged.
    pub fn accepted(self) -> bool {
        self != ApplyOutcome::Rejected
    }
}

// ---------------------------------------------------------------------------
// Game outcome
// ---------------------------------------------------------------------------

/// Why a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverReason {
    Checkmate,
    Stalemate,
    Resign,
    Disconnect,
    Timeout,
    Unknown,
}

impl GameOverReason {
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "checkmate" => GameOverReason::Checkmate,
            "stalemate" => GameOverReason::Stalemate,
            "resign" => GameOverReason::Resign,
            "disconnect" => GameOverReason::Disconnect,
            "timeout" => GameOverReason::Timeout,
            _ => GameOverReason::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameOverReason::Checkmate => "checkmate",
            GameOverReason::Stalemate => "stalemate",
            GameOverReason::Resign => "resign",
            GameOverReason::Disconnect => "disconnect",
            GameOverReason::Timeout => "timeout",
            GameOverReason::Unknown => "unknown",
        }
    }
}

/// Final result as declared by the server. `winner: None` is a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner: Option<Color>,
    pub reason: GameOverReason,
}

// ---------------------------------------------------------------------------
// Forced apply
// ---------------------------------------------------------------------------

/// Apply `mv` on a scratch copy of `pos` with the side to move flipped.
/// Returns the new position and any captured piece kind. Pure: `pos` is
/// never touched.
pub fn force_apply(pos: &Position, mv: Move) -> Result<(Position, Option<PieceType>), EngineError> {
    let mut scratch = pos.with_side_to_move(!pos.side_to_move);
    let captured = scratch.apply_move(mv)?;
    Ok((scratch, captured))
}

/// Direct apply, then forced apply. Used verbatim by replay so historical
/// reconstruction reconciles exactly like the live path did.
pub(crate) fn apply_with_fallback(
    pos: &Position,
    mv: Move,
) -> Result<(Position, Option<PieceType>), EngineError> {
    let mut direct = pos.clone();
    match direct.apply_move(mv) {
        Ok(captured) => Ok((direct, captured)),
        Err(direct_err) => force_apply(pos, mv).map_err(|_| direct_err),
    }
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// One fog game from this client's point of view.
///
/// Exclusive owner of the live `Position` and the append-only move log.
/// View components receive read-only snapshots and recompute from scratch;
/// nothing holds references into this struct across events.
#[derive(Clone, Debug)]
pub struct GameSession {
    game_id: String,
    our_side: Color,
    position: Position,
    log: Vec<Move>,
    /// `captures[color]` lists the piece kinds that colour has taken.
    captures: [Vec<PieceType>; 2],
    last_move: Option<Move>,
    /// Whose turn it is according to the server (not the shadow board).
    turn: Color,
    outcome: Option<GameOutcome>,
}

impl GameSession {
    /// Start a fresh session from the standard starting position.
    pub fn new(game_id: impl Into<String>, our_side: Color, turn: Color) -> Self {
        GameSession {
            game_id: game_id.into(),
            our_side,
            position: Position::starting(),
            log: Vec::new(),
            captures: [Vec::new(), Vec::new()],
            last_move: None,
            turn,
            outcome: None,
        }
    }

    /// Build a session from a `game_start` event, if that is what it is.
    pub fn from_game_start(event: &ServerEvent) -> Option<Self> {
        match event {
            ServerEvent::GameStart {
                game_id,
                color,
                turn,
                ..
            } => {
                let our_side = Color::from_name(color)?;
                let turn = Color::from_name(turn).unwrap_or(Color::White);
                Some(GameSession::new(game_id.clone(), our_side, turn))
            }
            _ => None,
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn our_side(&self) -> Color {
        self.our_side
    }

    /// The live shadow position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Applied moves, oldest first.
    pub fn move_log(&self) -> &[Move] {
        &self.log
    }

    /// Number of applied plies; also the "live" ply index.
    pub fn ply_count(&self) -> usize {
        self.log.len()
    }

    /// Piece kinds captured BY `side` (they are the opponent's pieces).
    pub fn captures_by(&self, side: Color) -> &[PieceType] {
        &self.captures[side.index()]
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Server-declared side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    // -----------------------------------------------------------------
    // Server move application
    // -----------------------------------------------------------------

    /// Reconcile one server-declared move into the shadow position.
    ///
    /// Accepted moves are appended to the log exactly once, in the same
    /// call that updates the board. Rejected moves change nothing.
    pub fn apply_server_move(&mut self, mv: Move, fen: Option<&str>) -> ApplyOutcome {
        // Identify mover and capture from the pre-move shadow; on the FEN
        // path the whole position is replaced and the diff is gone after.
        let mover = self
            .position
            .piece_at(mv.from)
            .map(|(color, _)| color)
            .unwrap_or(self.position.side_to_move);

        if let Some(fen) = fen {
            match Position::from_fen(fen) {
                Ok(next) => {
                    let captured = capture_diff(&self.position, mv);
                    self.accept(next, mv, mover, captured);
                    return ApplyOutcome::Loaded;
                }
                Err(err) => {
                    debug!(%err, "server position rejected, falling back to local apply");
                }
            }
        }

        let mut direct = self.position.clone();
        match direct.apply_move(mv) {
            Ok(captured) => {
                self.accept(direct, mv, mover, captured);
                return ApplyOutcome::Applied;
            }
            Err(err) => {
                debug!(%err, %mv, "direct apply failed, trying forced apply");
            }
        }

        match force_apply(&self.position, mv) {
            Ok((next, captured)) => {
                self.accept(next, mv, mover, captured);
                ApplyOutcome::Forced
            }
            Err(err) => {
                warn!(%err, %mv, "dropping server move: every apply path failed");
                ApplyOutcome::Rejected
            }
        }
    }

    fn accept(&mut self, next: Position, mv: Move, mover: Color, captured: Option<PieceType>) {
        self.position = next;
        self.log.push(mv);
        self.last_move = Some(mv);
        if let Some(kind) = captured {
            self.captures[mover.index()].push(kind);
        }
    }

    // -----------------------------------------------------------------
    // Event handling
    // -----------------------------------------------------------------

    /// Feed one server event into the session. `waiting` and `game_start`
    /// are the coordinator's business (a new session) and are ignored here.
    /// Returns the apply outcome for `move_made` events.
    pub fn handle_event(&mut self, event: &ServerEvent) -> Option<ApplyOutcome> {
        match event {
            ServerEvent::MoveMade {
                mv,
                fen,
                turn,
                is_game_over,
                is_checkmate,
                is_stalemate,
                winner,
                ..
            } => {
                let parsed = match mv.to_move() {
                    Ok(parsed) => parsed,
                    Err(err) => {
                        warn!(%err, "unparseable server move dropped");
                        return Some(ApplyOutcome::Rejected);
                    }
                };
                let outcome = self.apply_server_move(parsed, fen.as_deref());
                if let Some(turn) = Color::from_name(turn) {
                    self.turn = turn;
                }
                if *is_game_over {
                    let reason = if *is_checkmate {
                        GameOverReason::Checkmate
                    } else if *is_stalemate {
                        GameOverReason::Stalemate
                    } else {
                        GameOverReason::Unknown
                    };
                    self.outcome = Some(GameOutcome {
                        winner: winner.as_deref().and_then(Color::from_name),
                        reason,
                    });
                }
                Some(outcome)
            }

            ServerEvent::GameOver { winner, reason } => {
                self.outcome = Some(GameOutcome {
                    winner: winner.as_deref().and_then(Color::from_name),
                    reason: GameOverReason::from_str_loose(reason),
                });
                None
            }

            ServerEvent::Error { message } => {
                warn!(message = %message, "server error");
                None
            }

            ServerEvent::Waiting | ServerEvent::GameStart { .. } => None,
        }
    }

    // -----------------------------------------------------------------
    // Outgoing proposals
    // -----------------------------------------------------------------

    /// Build the `make_move` request for a local proposal, or `None` when
    /// the game is over or it is not our turn. The server's `move_made`
    /// reply, not this proposal, is what advances the shadow position.
    pub fn propose(&self, mv: Move) -> Option<ClientCommand> {
        if self.is_over() || self.turn != self.our_side {
            return None;
        }
        Some(ClientCommand::MakeMove {
            game_id: self.game_id.clone(),
            from: mv.from.to_algebraic(),
            to: mv.to.to_algebraic(),
        })
    }
}

/// What would this move capture in `pos`, judged by occupancy? Handles the
/// en-passant case where the captured pawn is not on the target square.
fn capture_diff(pos: &Position, mv: Move) -> Option<PieceType> {
    let (mover, kind) = pos.piece_at(mv.from)?;
    if let Some((color, captured)) = pos.piece_at(mv.to) {
        return (color != mover).then_some(captured);
    }
    if kind == PieceType::Pawn && pos.en_passant == Some(mv.to) && mv.from.file() != mv.to.file() {
        return Some(PieceType::Pawn);
    }
    None
}

// =========================================================================
// Tests
// =========================================================================
