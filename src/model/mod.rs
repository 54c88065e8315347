pub mod collections;
pub mod graph;
pub mod types;
pub mod validator;

pub use collections::*;
pub use graph::*;
pub use types::*;
pub use validator::*;
