//! Simulation - owns the particles, the type registry and the rule table

use rand::Rng;
use std::io::{Read, Write};

use crate::components::*;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::events::{EventKind, EventSink, SimEvent};
use crate::generation;
use crate::matrix::AttractionMatrix;
use crate::persistence::{self, SaveError};
use crate::systems::advance_frame;

/// The simulation aggregate.
///
/// Invariants kept by every operation:
/// - `particle_types[i].id() == i`
/// - `matrix.dim() == particle_types.len()`
/// - every particle's `type_id` is below `particle_types.len()`
///
/// Width and height bound random placement only; the physics never clamps
/// or wraps positions.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) particles: Vec<Particle>,
    pub(crate) particle_types: Vec<ParticleType>,
    pub(crate) matrix: AttractionMatrix,
    /// Empty table with the scalars this simulation was built or loaded with
    baseline: AttractionMatrix,
}

/// Compares world state only; the reset baseline is not part of it.
impl PartialEq for Simulation {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.particles == other.particles
            && self.particle_types == other.particle_types
            && self.matrix == other.matrix
    }
}

impl Simulation {
    /// Create an empty simulation with the default physics scalars
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            particles: Vec::new(),
            particle_types: Vec::new(),
            matrix: AttractionMatrix::default(),
            baseline: AttractionMatrix::default(),
        }
    }

    /// Create an empty simulation from a validated config
    pub fn with_config(config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let matrix = config.matrix()?;
        Ok(Self {
            width: config.width,
            height: config.height,
            particles: Vec::new(),
            particle_types: Vec::new(),
            baseline: matrix.clone(),
            matrix,
        })
    }

    /// Assemble from parts that already satisfy the invariants
    pub(crate) fn from_parts(
        width: f64,
        height: f64,
        particles: Vec<Particle>,
        particle_types: Vec<ParticleType>,
        matrix: AttractionMatrix,
    ) -> Self {
        debug_assert_eq!(matrix.dim(), particle_types.len());
        Self {
            width,
            height,
            particles,
            particle_types,
            baseline: matrix.without_types(),
            matrix,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_types(&self) -> &[ParticleType] {
        &self.particle_types
    }

    pub fn matrix(&self) -> &AttractionMatrix {
        &self.matrix
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn type_count(&self) -> usize {
        self.particle_types.len()
    }

    /// Number of particles of the given type
    pub fn count_of_type(&self, type_id: usize) -> usize {
        self.particles.iter().filter(|p| p.type_id == type_id).count()
    }

    /// Drop every particle and type, and restore the physics scalars the
    /// simulation was created or loaded with.
    pub fn reset(&mut self) {
        self.particles.clear();
        self.particle_types.clear();
        self.matrix = self.baseline.clone();
    }

    /// Append a particle. Its type must already be registered.
    pub fn add_particle(
        &mut self,
        particle: Particle,
        events: &mut impl EventSink,
    ) -> Result<(), SimError> {
        if particle.type_id >= self.particle_types.len() {
            return Err(SimError::UnknownParticleType {
                type_id: particle.type_id,
                count: self.particle_types.len(),
            });
        }
        self.particles.push(particle);
        log::debug!("Added particle {}", particle);
        events.record(SimEvent::new(EventKind::ParticleAdded {
            type_id: particle.type_id,
        }));
        Ok(())
    }

    /// Register a new white type with the next dense id and grow the rule
    /// table to match.
    pub fn add_particle_type(&mut self, events: &mut impl EventSink) -> ParticleType {
        let particle_type = ParticleType::new(Color::WHITE, self.particle_types.len());
        self.particle_types.push(particle_type);
        self.matrix.add_type();

        log::debug!(
            "Added particle type {} (matrix now {}x{})",
            particle_type.id(),
            self.matrix.dim(),
            self.matrix.dim()
        );
        events.record(SimEvent::new(EventKind::ParticleTypeAdded {
            id: particle_type.id(),
        }));
        particle_type
    }

    /// Remove the type at `index` together with all of its particles, then
    /// renumber the surviving types (and their particles) to dense ids.
    ///
    /// Returns the removed type with its original id.
    pub fn remove_particle_type(
        &mut self,
        index: usize,
        events: &mut impl EventSink,
    ) -> Result<ParticleType, SimError> {
        let count = self.particle_types.len();
        if index >= count {
            return Err(SimError::TypeIndexOutOfRange { index, count });
        }

        self.matrix.remove_type(index)?;
        let removed = self.particle_types.remove(index);

        // Old id -> new id; the removed type maps to nothing
        let mut remap = vec![None; count];
        for (new_id, particle_type) in self.particle_types.iter_mut().enumerate() {
            if let Some(slot) = remap.get_mut(particle_type.id()) {
                *slot = Some(new_id);
            }
            particle_type.set_id(new_id);
        }

        let before = self.particles.len();
        self.particles = self
            .particles
            .iter()
            .filter_map(|p| {
                let new_id = remap.get(p.type_id).copied().flatten()?;
                Some(Particle {
                    type_id: new_id,
                    ..*p
                })
            })
            .collect();
        let particles_removed = before - self.particles.len();

        log::debug!(
            "Removed particle type {} and {} particle(s)",
            removed.id(),
            particles_removed
        );
        events.record(SimEvent::new(EventKind::ParticleTypeRemoved {
            index,
            particles_removed,
        }));
        Ok(removed)
    }

    /// Change the display color of the type at `index`
    pub fn set_type_color(&mut self, index: usize, color: Color) -> Result<(), SimError> {
        let count = self.particle_types.len();
        let particle_type = self
            .particle_types
            .get_mut(index)
            .ok_or(SimError::TypeIndexOutOfRange { index, count })?;
        particle_type.set_color(color);
        Ok(())
    }

    pub fn set_attraction(&mut self, i: usize, j: usize, value: f64) -> Result<(), SimError> {
        self.matrix.set_attraction(i, j, value)
    }

    pub fn set_friction(&mut self, friction: f64) -> Result<(), SimError> {
        self.matrix.set_friction(friction)
    }

    pub fn set_beta(&mut self, beta: f64) -> Result<(), SimError> {
        self.matrix.set_beta(beta)
    }

    pub fn set_range(&mut self, range: f64) -> Result<(), SimError> {
        self.matrix.set_range(range)
    }

    /// Reset to three canonical types (red, blue, green) with `count`
    /// particles at rest and a random rule table.
    pub fn generate_random_world(&mut self, count: usize, events: &mut impl EventSink) {
        let mut rng = rand::thread_rng();
        self.generate_random_world_with(count, &mut rng, events);
    }

    /// [`Simulation::generate_random_world`] with a caller-supplied RNG
    pub fn generate_random_world_with(
        &mut self,
        count: usize,
        rng: &mut impl Rng,
        events: &mut impl EventSink,
    ) {
        self.reset();
        generation::generate_world(self, count, rng, events);
    }

    /// Add a type with a random color and random rules toward and from every
    /// existing type, then scatter `count` particles of it.
    pub fn add_random_particle_type(
        &mut self,
        count: usize,
        rng: &mut impl Rng,
        events: &mut impl EventSink,
    ) -> ParticleType {
        generation::spawn_random_type(self, count, rng, events)
    }

    /// Add one particle at rest at a random position with a random existing
    /// type. Fails when no type is registered.
    pub fn spawn_random_particle(
        &mut self,
        rng: &mut impl Rng,
        events: &mut impl EventSink,
    ) -> Result<Particle, SimError> {
        generation::spawn_random_particle(self, rng, events)
    }

    /// Advance one frame.
    ///
    /// The next frame is built from a snapshot of the current one and
    /// swapped in whole, so readers never see a half-updated population.
    pub fn update(&mut self) {
        let next = advance_frame(&self.particles, &self.matrix);
        self.particles = next;
        log::trace!("Stepped {} particle(s)", self.particles.len());
    }

    /// Advance `frames` frames
    pub fn update_n(&mut self, frames: usize) {
        for _ in 0..frames {
            self.update();
        }
    }

    /// Save a binary snapshot to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::save_snapshot(self, writer)
    }

    /// Replace this simulation with a binary snapshot read from `reader`.
    /// On error the simulation is left unchanged.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        *self = persistence::load_snapshot(reader)?;
        Ok(())
    }

    /// Write the JSON form to a writer
    pub fn save_json<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::write_json(self, writer)
    }

    /// Replace this simulation with the JSON form read from `reader`.
    /// On error the simulation is left unchanged.
    pub fn load_json<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        *self = persistence::read_json(reader)?;
        Ok(())
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_WIDTH, crate::config::DEFAULT_HEIGHT)
    }
}
