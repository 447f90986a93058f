//! Components - plain data carried by the simulation

mod common;
mod particle;

pub use common::*;
pub use particle::*;
