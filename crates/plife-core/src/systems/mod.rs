//! Systems - logic that operates on components

mod forces;
mod motion;

pub use forces::*;
pub use motion::*;
