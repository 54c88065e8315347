//! Small structured SQL representation and its renderer, so statement shape
//! is testable independent of text formatting.

mod render;
mod stmt;

pub use render::*;
pub use stmt::*;
