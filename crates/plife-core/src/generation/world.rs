//! Random world generation

use rand::Rng;

use crate::components::*;
use crate::engine::Simulation;
use crate::error::SimError;
use crate::events::{EventKind, EventSink, SimEvent};
use crate::matrix::AttractionMatrix;

/// Colors of the three types every random world starts with, in id order
pub const CANONICAL_COLORS: [Color; 3] = [Color::RED, Color::BLUE, Color::GREEN];

/// Uniform position in `[0, width) x [0, height)`.
///
/// A degenerate extent (zero, negative, non-finite) collapses that axis to 0.
pub fn random_position(width: f64, height: f64, rng: &mut impl Rng) -> Vector {
    Vector::new(random_coord(width, rng), random_coord(height, rng))
}

fn random_coord(extent: f64, rng: &mut impl Rng) -> f64 {
    if extent > 0.0 && extent.is_finite() {
        rng.gen_range(0.0..extent)
    } else {
        0.0
    }
}

/// Rule coefficient drawn uniformly from `[-1, 1]`
pub fn random_attraction(rng: &mut impl Rng) -> f64 {
    rng.gen_range(-1.0..=1.0)
}

/// Replace every entry of the table with a random coefficient
pub fn randomize_rules(matrix: &mut AttractionMatrix, rng: &mut impl Rng) {
    matrix.fill_with(|_, _| random_attraction(rng));
}

/// Populate an empty simulation: the canonical types, `count` particles at
/// rest with uniformly random types, then random rules.
pub fn generate_world(
    sim: &mut Simulation,
    count: usize,
    rng: &mut impl Rng,
    events: &mut impl EventSink,
) {
    for color in CANONICAL_COLORS {
        let particle_type = sim.add_particle_type(events);
        sim.particle_types[particle_type.id()].set_color(color);
    }

    sim.particles.reserve(count);
    for _ in 0..count {
        let pos = random_position(sim.width, sim.height, rng);
        let type_id = rng.gen_range(0..CANONICAL_COLORS.len());
        sim.particles.push(Particle::at_rest(pos, type_id));
    }

    randomize_rules(&mut sim.matrix, rng);

    log::info!(
        "Generated random world: {} particle(s), {} type(s) in {}x{}",
        count,
        sim.type_count(),
        sim.width,
        sim.height
    );
    events.record(SimEvent::new(EventKind::WorldGenerated {
        particles: count,
        types: sim.type_count(),
    }));
}

/// Add a type with a random opaque color, random rules toward and from
/// every type (itself included), and `count` particles of it at rest.
pub fn spawn_random_type(
    sim: &mut Simulation,
    count: usize,
    rng: &mut impl Rng,
    events: &mut impl EventSink,
) -> ParticleType {
    let added = sim.add_particle_type(events);
    let id = added.id();
    sim.particle_types[id].set_color(Color::random_opaque(rng));

    for other in 0..sim.type_count() {
        let toward = random_attraction(rng);
        let from = random_attraction(rng);
        // Both indices are below dim, which was just grown to include `id`
        sim.matrix.set_coefficient(other, id, toward);
        sim.matrix.set_coefficient(id, other, from);
    }

    for _ in 0..count {
        let pos = random_position(sim.width, sim.height, rng);
        sim.particles.push(Particle::at_rest(pos, id));
        events.record(SimEvent::new(EventKind::ParticleAdded { type_id: id }));
    }

    log::debug!("Added random particle type {} with {} particle(s)", id, count);
    sim.particle_types[id]
}

/// Add one particle at rest with a random position and a random existing type
pub fn spawn_random_particle(
    sim: &mut Simulation,
    rng: &mut impl Rng,
    events: &mut impl EventSink,
) -> Result<Particle, SimError> {
    let count = sim.type_count();
    if count == 0 {
        return Err(SimError::TypeIndexOutOfRange { index: 0, count });
    }

    let pos = random_position(sim.width, sim.height, rng);
    let particle = Particle::at_rest(pos, rng.gen_range(0..count));
    sim.add_particle(particle, events)?;
    Ok(particle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_position_in_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let p = random_position(800.0, 600.0, &mut rng);
            assert!(p.dx >= 0.0 && p.dx < 800.0);
            assert!(p.dy >= 0.0 && p.dy < 600.0);
        }
    }

    #[test]
    fn test_degenerate_bounds_collapse() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = random_position(0.0, f64::INFINITY, &mut rng);
        assert_eq!(p, Vector::ZERO);
    }

    #[test]
    fn test_randomize_rules_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut m = AttractionMatrix::default();
        for _ in 0..5 {
            m.add_type();
        }
        randomize_rules(&mut m, &mut rng);
        assert!(m.rows().flatten().all(|a| (-1.0..=1.0).contains(a)));
        assert!(m.rows().flatten().any(|&a| a != 0.0));
    }

    #[test]
    fn test_spawn_random_type() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sim = Simulation::new(300.0, 200.0);
        let mut events = EventLog::new();
        sim.generate_random_world_with(10, &mut rng, &mut ());
        let before = sim.matrix().clone();

        let added = spawn_random_type(&mut sim, 100, &mut rng, &mut events);
        assert_eq!(added.id(), 3);
        assert_eq!(added.color().alpha(), 255);
        assert_eq!(sim.particle_types()[3], added);
        assert_eq!(sim.particle_count(), 110);
        assert_eq!(sim.count_of_type(3), 100);

        // Old entries untouched, new row and column filled
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(sim.matrix().attraction(i, j), before.attraction(i, j));
            }
        }
        for k in 0..4 {
            assert!((-1.0..=1.0).contains(&sim.matrix().attraction(k, 3).unwrap()));
            assert!((-1.0..=1.0).contains(&sim.matrix().attraction(3, k).unwrap()));
        }

        // One type event plus one event per particle
        assert_eq!(events.len(), 101);
    }

    #[test]
    fn test_spawn_random_particle() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut sim = Simulation::new(300.0, 200.0);

        assert_eq!(
            spawn_random_particle(&mut sim, &mut rng, &mut ()),
            Err(SimError::TypeIndexOutOfRange { index: 0, count: 0 })
        );

        sim.add_particle_type(&mut ());
        sim.add_particle_type(&mut ());
        let p = spawn_random_particle(&mut sim, &mut rng, &mut ()).unwrap();
        assert!(p.type_id < 2);
        assert_eq!(p.vel, Vector::ZERO);
        assert_eq!(sim.particles(), &[p]);
    }
}
