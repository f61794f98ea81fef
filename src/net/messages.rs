//! Typed messages for the server's real-time game events.
//!
//! Event names and payload fields follow the server's JSON: snake_case
//! `type` discriminators with camelCase fields. A `move_made` event may
//! omit `fen`; the synchronizer then falls back to applying the declared
//! move locally.

use serde::{Deserialize, Serialize};

use crate::engine::types::{EngineError, Move, PieceType, Square};

// ---------------------------------------------------------------------------
// Move declaration
// ---------------------------------------------------------------------------

/// A move as it travels on the wire: algebraic squares plus an optional
/// promotion letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDecl {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

impl MoveDecl {
    /// Parse into an engine move.
    pub fn to_move(&self) -> Result<Move, EngineError> {
        let from = Square::from_algebraic(&self.from)
            .ok_or_else(|| EngineError::InvalidSquare(self.from.clone()))?;
        let to = Square::from_algebraic(&self.to)
            .ok_or_else(|| EngineError::InvalidSquare(self.to.clone()))?;
        let promotion = match &self.promotion {
            None => None,
            Some(s) => Some(
                s.chars()
                    .next()
                    .and_then(PieceType::from_promotion)
                    .ok_or_else(|| EngineError::InvalidMove {
                        from: self.from.clone(),
                        to: self.to.clone(),
                        reason: format!("invalid promotion '{s}'"),
                    })?,
            ),
        };
        Ok(Move {
            from,
            to,
            promotion,
        })
    }

    pub fn from_move(mv: Move) -> Self {
        MoveDecl {
            from: mv.from.to_algebraic(),
            to: mv.to.to_algebraic(),
            promotion: mv
                .promotion
                .map(|p| p.to_char(crate::engine::types::Color::Black).to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Server → Client events
// ---------------------------------------------------------------------------

/// Events delivered by the server over the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Waiting,

    #[serde(rename_all = "camelCase")]
    GameStart {
        game_id: String,
        color: String,
        #[serde(default)]
        visible_squares: Vec<String>,
        turn: String,
    },

    #[serde(rename_all = "camelCase")]
    MoveMade {
        #[serde(rename = "move")]
        mv: MoveDecl,
        /// Canonical resulting position. Optional: when absent the client
        /// applies the move itself.
        #[serde(default)]
        fen: Option<String>,
        #[serde(default)]
        visible_squares: Vec<String>,
        turn: String,
        #[serde(default)]
        is_game_over: bool,
        #[serde(default)]
        is_checkmate: bool,
        #[serde(default)]
        is_stalemate: bool,
        #[serde(default)]
        winner: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    GameOver {
        #[serde(default)]
        winner: Option<String>,
        reason: String,
    },

    Error {
        message: String,
    },
}

impl ServerEvent {
    /// Parse an event from its JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Client → Server requests
// ---------------------------------------------------------------------------

/// Outgoing requests. Serialization only; delivery is the transport's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    FindGame,

    #[serde(rename_all = "camelCase")]
    MakeMove {
        game_id: String,
        from: String,
        to: String,
    },

    #[serde(rename_all = "camelCase")]
    Resign { game_id: String },
}

impl ClientCommand {
    /// Serialize to JSON text for sending over the transport.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","message":"serialization failed"}"#.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_deserializes() {
        let ev = ServerEvent::from_json(r#"{"type":"waiting"}"#).unwrap();
        assert!(matches!(ev, ServerEvent::Waiting));
    }

    #[test]
    fn game_start_deserializes() {
        let json = r#"{
            "type": "game_start",
            "gameId": "g1",
            "color": "white",
            "visibleSquares": ["a1", "a2"],
            "turn": "white"
        }"#;
        let ev = ServerEvent::from_json(json).unwrap();
        match ev {
            ServerEvent::GameStart {
                game_id,
                color,
                visible_squares,
                turn,
            } => {
                assert_eq!(game_id, "g1");
                assert_eq!(color, "white");
                assert_eq!(visible_squares, vec!["a1", "a2"]);
                assert_eq!(turn, "white");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn move_made_deserializes_with_fen() {
        let json = r#"{
            "type": "move_made",
            "move": {"from": "e2", "to": "e4"},
            "fen": "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "visibleSquares": [],
            "turn": "black",
            "isGameOver": false,
            "isCheckmate": false,
            "isStalemate": false,
            "winner": null
        }"#;
        let ev = ServerEvent::from_json(json).unwrap();
        match ev {
            ServerEvent::MoveMade { mv, fen, turn, .. } => {
                assert_eq!(mv.from, "e2");
                assert_eq!(mv.to, "e4");
                assert!(fen.is_some());
                assert_eq!(turn, "black");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn move_made_tolerates_missing_fen() {
        let json = r#"{
            "type": "move_made",
            "move": {"from": "e7", "to": "e5"},
            "turn": "white"
        }"#;
        let ev = ServerEvent::from_json(json).unwrap();
        match ev {
            ServerEvent::MoveMade {
                fen,
                is_game_over,
                winner,
                ..
            } => {
                assert_eq!(fen, None);
                assert!(!is_game_over);
                assert_eq!(winner, None);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn game_over_deserializes() {
        let json = r#"{"type":"game_over","winner":"black","reason":"resign"}"#;
        let ev = ServerEvent::from_json(json).unwrap();
        match ev {
            ServerEvent::GameOver { winner, reason } => {
                assert_eq!(winner.as_deref(), Some("black"));
                assert_eq!(reason, "resign");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn error_deserializes() {
        let ev = ServerEvent::from_json(r#"{"type":"error","message":"boom"}"#).unwrap();
        assert!(matches!(ev, ServerEvent::Error { message } if message == "boom"));
    }

    #[test]
    fn move_decl_parses_promotion() {
        let decl = MoveDecl {
            from: "e7".into(),
            to: "e8".into(),
            promotion: Some("r".into()),
        };
        let mv = decl.to_move().unwrap();
        assert_eq!(mv.promotion, Some(PieceType::Rook));
    }

    #[test]
    fn move_decl_rejects_garbage() {
        let decl = MoveDecl {
            from: "z9".into(),
            to: "e8".into(),
            promotion: None,
        };
        assert!(decl.to_move().is_err());

        let decl = MoveDecl {
            from: "e7".into(),
            to: "e8".into(),
            promotion: Some("x".into()),
        };
        assert!(decl.to_move().is_err());
    }

    #[test]
    fn move_decl_round_trip() {
        let mv = Move::from_coords("a7a8q").unwrap();
        let decl = MoveDecl::from_move(mv);
        assert_eq!(decl.promotion.as_deref(), Some("q"));
        assert_eq!(decl.to_move().unwrap(), mv);
    }

    #[test]
    fn find_game_serializes() {
        let json = ClientCommand::FindGame.to_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "find_game");
    }

    #[test]
    fn make_move_serializes() {
        let cmd = ClientCommand::MakeMove {
            game_id: "g1".into(),
            from: "e2".into(),
            to: "e4".into(),
        };
        let parsed: serde_json::Value = serde_json::from_str(&cmd.to_json()).unwrap();
        assert_eq!(parsed["type"], "make_move");
        assert_eq!(parsed["gameId"], "g1");
        assert_eq!(parsed["from"], "e2");
        assert_eq!(parsed["to"], "e4");
    }

    #[test]
    fn resign_serializes() {
        let cmd = ClientCommand::Resign {
            game_id: "g1".into(),
        };
        let parsed: serde_json::Value = serde_json::from_str(&cmd.to_json()).unwrap();
        assert_eq!(parsed["type"], "resign");
        assert_eq!(parsed["gameId"], "g1");
    }

    #[test]
    fn command_round_trip() {
        let cmd = ClientCommand::MakeMove {
            game_id: "g1".into(),
            from: "g1".into(),
            to: "f3".into(),
        };
        let back: ClientCommand = serde_json::from_str(&cmd.to_json()).unwrap();
        assert_eq!(back, cmd);
    }
}
