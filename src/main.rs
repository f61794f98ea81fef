//! Demo driver: feeds a stream of server-event JSON through a
//! `GameSession` and prints the fogged board after every event.
//!
//! Events are read as JSON lines from stdin when piped; run interactively
//! it replays a short built-in game instead.

use std::io::{BufRead, IsTerminal};

use fog_chess::net::messages::ServerEvent;
use fog_chess::session::{BoardView, GameSession};

const SCRIPT: &[&str] = &[
    r#"{"type":"waiting"}"#,
    r#"{"type":"game_start","gameId":"demo","color":"white","visibleSquares":[],"turn":"white"}"#,
    r#"{"type":"move_made","move":{"from":"e2","to":"e4"},"turn":"black"}"#,
    r#"{"type":"move_made","move":{"from":"e7","to":"e5"},"fen":"rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2","turn":"white"}"#,
    r#"{"type":"move_made","move":{"from":"g1","to":"f3"},"turn":"black"}"#,
    r#"{"type":"move_made","move":{"from":"b8","to":"c6"},"fen":"r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3","turn":"white"}"#,
    r#"{"type":"game_over","winner":"white","reason":"resign"}"#,
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fog_chess=info".into()),
        )
        .init();

    let stdin = std::io::stdin();
    let lines: Vec<String> = if stdin.is_terminal() {
        tracing::info!("no piped input, replaying the built-in demo game");
        SCRIPT.iter().map(|s| s.to_string()).collect()
    } else {
        stdin.lock().lines().map_while(Result::ok).collect()
    };

    let mut session: Option<GameSession> = None;

    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        let event = match ServerEvent::from_json(line) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(%err, "skipping unparseable event");
                continue;
            }
        };

        match &event {
            ServerEvent::Waiting => {
                tracing::info!("waiting for an opponent");
            }
            ServerEvent::GameStart { game_id, color, .. } => {
                tracing::info!(%game_id, %color, "game started");
                let fresh = GameSession::from_game_start(&event)
                    .expect("game_start event always builds a session");
                println!("{}", render(&fresh.live_view()));
                session = Some(fresh);
            }
            _ => {
                let Some(session) = session.as_mut() else {
                    tracing::warn!("event before game_start ignored");
                    continue;
                };
                session.handle_event(&event);
                if session.is_over() {
                    let outcome = session.outcome().expect("game over");
                    let winner = outcome
                        .winner
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "nobody".into());
                    println!(
                        "game over after {} plies: {winner} wins ({})",
                        session.ply_count(),
                        outcome.reason.as_str()
                    );
                    println!("{}", render(&session.reveal_view()));
                } else {
                    println!("{}", render(&session.live_view()));
                }
            }
        }
    }
}

/// Text rendering of a view: fog as '#', empty visible squares as '.'.
fn render(view: &BoardView) -> String {
    use fog_chess::engine::types::Square;

    let mut out = String::with_capacity(220);
    for rank in (0..8u8).rev() {
        out.push((b'1' + rank) as char);
        out.push(' ');
        for file in 0..8u8 {
            let sq = Square::from_file_rank(file, rank);
            let ch = if let Some(&(color, kind)) = view.pieces.get(&sq) {
                kind.to_char(color)
            } else if view.fog.is_set(sq) {
                '#'
            } else {
                '.'
            };
            out.push(ch);
            if file < 7 {
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h");
    if let Some(turn) = view.turn {
        out.push_str(&format!("   ({turn} to move)"));
    }
    out
}
