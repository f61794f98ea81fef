//! Wire protocol types. The socket itself lives outside this crate; these
//! are the typed shapes of what it delivers and accepts.

pub mod messages;

pub use messages::{ClientCommand, MoveDecl, ServerEvent};
