//! Client-side core for a fog-of-war chess variant.
//!
//! Each player sees only the squares their own pieces stand on or attack;
//! everything else, enemy pieces included, is hidden. Check is never
//! announced and the game ends when a king is actually captured.
//!
//! The crate is organised around that asymmetry of knowledge:
//!
//! - [`engine`] — an embedded rules engine: bitboard [`engine::Position`],
//!   FEN, and fallible, check-blind move application.
//! - [`fog`] — the pure view core: visibility sets, piece/fog projection,
//!   and destination maps under the variant's relaxed legality.
//! - [`session`] — the stateful owner: [`session::GameSession`] keeps the
//!   shadow position in sync with server-declared moves (with a forced-apply
//!   fallback for turn desyncs) and rebuilds any historical ply on demand.
//! - [`net`] — typed wire messages; the socket itself is not this crate's
//!   concern.
//!
//! The server remains the sole authority on the real game state; this crate
//! is a view and proposal generator, never a referee.

pub mod config;
pub mod engine;
pub mod fog;
pub mod net;
pub mod session;
