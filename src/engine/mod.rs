pub mod attacks;
pub mod board;
pub mod types;

pub use board::Position;
pub use types::*;
