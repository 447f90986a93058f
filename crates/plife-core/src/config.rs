//! Simulation configuration - world bounds, physics scalars and the default
//! random world size.
//!
//! Loaded from JSON. Every field is optional; missing fields take the
//! defaults below.
//!
//! ```json
//! {
//!   "width": 1280.0,
//!   "height": 720.0,
//!   "friction": 0.8,
//!   "beta": 0.3,
//!   "range": 80.0,
//!   "world_particles": 1000,
//!   "seed": 42
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::error::SimError;
use crate::matrix::{
    validate_beta, validate_friction, validate_range, AttractionMatrix, DEFAULT_BETA,
    DEFAULT_FRICTION, DEFAULT_RANGE,
};

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;
/// Particles scattered by a reset
pub const DEFAULT_WORLD_PARTICLES: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: f64,
    pub height: f64,
    pub friction: f64,
    pub beta: f64,
    pub range: f64,
    pub world_particles: usize,
    /// Seed for world generation; `None` draws from the thread RNG
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            friction: DEFAULT_FRICTION,
            beta: DEFAULT_BETA,
            range: DEFAULT_RANGE,
            world_particles: DEFAULT_WORLD_PARTICLES,
            seed: None,
        }
    }
}

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] SimError),
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check the physics scalars and bounds
    pub fn validate(&self) -> Result<(), SimError> {
        validate_friction(self.friction)?;
        validate_beta(self.beta)?;
        validate_range(self.range)?;
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SimError::InvalidParameter {
                    name,
                    value,
                    expected: "a finite value greater than 0",
                });
            }
        }
        Ok(())
    }

    /// Empty rule table carrying this config's scalars
    pub fn matrix(&self) -> Result<AttractionMatrix, SimError> {
        AttractionMatrix::new(self.friction, self.beta, self.range)
    }
}
