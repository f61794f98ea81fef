//! The pure view core: visibility, fog projection and destination
//! generation. Everything in here is a total function of a borrowed
//! `Position`; nothing mutates, caches or fails.

pub mod destinations;
pub mod projection;
pub mod visibility;

pub use destinations::{destinations, DestinationMap};
pub use projection::{fog_squares, project_pieces, PieceMap};
pub use visibility::visible_squares;
