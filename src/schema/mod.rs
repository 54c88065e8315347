pub mod builder;
pub mod types;

pub use builder::*;
pub use types::*;
