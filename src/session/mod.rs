//! The stateful side of the client: one `GameSession` per game, exclusive
//! owner of the live shadow position and the move log. Everything else in
//! the crate only ever reads snapshots it hands out.

pub mod game;
pub mod replay;
pub mod view;

pub use game::{force_apply, ApplyOutcome, GameOutcome, GameOverReason, GameSession};
pub use replay::ReplayFrame;
pub use view::BoardView;
