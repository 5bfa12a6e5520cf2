//! Track data structures shared by every platform

mod model;
mod title;

pub use model::*;
pub use title::*;
