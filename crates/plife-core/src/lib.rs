//! Particle Life Core - Typed Particle Simulation Engine
//!
//! A population of point particles, each belonging to a particle type,
//! moving in a 2D plane. Every ordered pair of types has an attraction
//! coefficient; together with three global scalars (friction, beta, range)
//! these drive a piecewise force law that produces emergent structure.
//!
//! # Architecture
//!
//! - **Components**: Pure data (`Vector`, `Color`, `ParticleType`, `Particle`)
//! - **Matrix**: The pairwise rule table and the physics scalars
//! - **Systems**: The force law and the per-frame motion step
//! - **Engine**: `Simulation`, which keeps the type registry, the rule table
//!   and the particles consistent with each other
//! - **Persistence**: JSON interchange and versioned binary snapshots
//!
//! # Example
//!
//! ```rust,no_run
//! use plife_core::prelude::*;
//!
//! let mut sim = Simulation::new(800.0, 600.0);
//! let mut events = EventLog::new();
//!
//! // Three canonical types, 500 particles, random rules
//! sim.generate_random_world(500, &mut events);
//!
//! // Run simulation
//! loop {
//!     sim.update();
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod generation;
pub mod matrix;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::engine::Simulation;
    pub use crate::error::SimError;
    pub use crate::events::{EventKind, EventLog, EventSink, SimEvent};
    pub use crate::matrix::AttractionMatrix;
    pub use crate::persistence::SaveError;
}
