//! Generation - random worlds, types and particles

mod world;

pub use world::*;
