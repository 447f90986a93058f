//! Motion system - advances every particle by one frame

use crate::components::Particle;
use crate::error::SimError;
use crate::matrix::AttractionMatrix;

use super::pair_force;

/// Compute the next frame from a frozen snapshot of `particles`.
///
/// Each new velocity is the old velocity plus the sum of forces from every
/// particle (self included; it contributes nothing), damped by friction.
/// The new position advances by the *old* velocity, so position lags
/// velocity by one frame.
///
/// Fails if any `type_id` has no row in `rules`.
pub fn motion_system(
    particles: &[Particle],
    rules: &AttractionMatrix,
) -> Result<Vec<Particle>, SimError> {
    let count = rules.dim();
    if let Some(p) = particles.iter().find(|p| p.type_id >= count) {
        return Err(SimError::UnknownParticleType {
            type_id: p.type_id,
            count,
        });
    }
    Ok(advance_frame(particles, rules))
}

/// [`motion_system`] for a population whose type ids are already known to
/// index `rules`.
pub(crate) fn advance_frame(particles: &[Particle], rules: &AttractionMatrix) -> Vec<Particle> {
    let beta = rules.beta();
    let range = rules.range();
    let friction = rules.friction();

    particles
        .iter()
        .map(|p| {
            let mut vel = p.vel;
            for q in particles {
                let a = rules.coefficient(p.type_id, q.type_id);
                vel = vel + pair_force(p.pos, q.pos, a, beta, range);
            }
            Particle {
                pos: p.pos + p.vel,
                vel: vel * friction,
                type_id: p.type_id,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Vector;

    fn rules(n: usize, friction: f64) -> AttractionMatrix {
        let mut m = AttractionMatrix::default();
        for _ in 0..n {
            m.add_type();
        }
        m.set_friction(friction).unwrap();
        m
    }

    #[test]
    fn test_single_particle_keeps_velocity() {
        let m = rules(1, 1.0);
        let p = Particle::new(Vector::new(50.0, 30.0), Vector::new(-2.0, 4.0), 0);

        let next = motion_system(&[p], &m).unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].pos, Vector::new(48.0, 34.0));
        assert_eq!(next[0].vel, Vector::new(-2.0, 4.0));
        assert_eq!(next[0].type_id, 0);
    }

    #[test]
    fn test_friction_damps_velocity() {
        let m = rules(1, 0.5);
        let p = Particle::new(Vector::ZERO, Vector::new(4.0, -2.0), 0);

        let next = motion_system(&[p], &m).unwrap();
        assert_eq!(next[0].vel, Vector::new(2.0, -1.0));
        assert_eq!(next[0].pos, Vector::new(4.0, -2.0));
    }

    #[test]
    fn test_step_uses_frozen_snapshot() {
        let mut m = rules(2, 0.9);
        m.set_attraction(0, 1, 0.6).unwrap();
        m.set_attraction(1, 0, -0.4).unwrap();
        m.set_attraction(1, 1, 0.3).unwrap();

        let particles = vec![
            Particle::new(Vector::new(0.0, 0.0), Vector::new(1.0, 0.0), 0),
            Particle::new(Vector::new(30.0, 5.0), Vector::new(0.0, -1.0), 1),
            Particle::new(Vector::new(10.0, 12.0), Vector::new(0.5, 0.5), 1),
        ];

        let next = motion_system(&particles, &m).unwrap();

        for (i, p) in particles.iter().enumerate() {
            let mut vel = p.vel;
            for q in &particles {
                vel = vel + m.compute_force(p, q).unwrap();
            }
            assert_eq!(next[i].vel, vel * 0.9);
            assert_eq!(next[i].pos, p.pos + p.vel);
            assert_eq!(next[i].type_id, p.type_id);
        }
    }

    #[test]
    fn test_position_lags_velocity_by_one_frame() {
        let mut m = rules(1, 1.0);
        m.set_attraction(0, 0, 1.0).unwrap();

        let particles = vec![
            Particle::at_rest(Vector::new(0.0, 0.0), 0),
            Particle::at_rest(Vector::new(35.0, 0.0), 0),
        ];

        let first = motion_system(&particles, &m).unwrap();
        // Velocity changed, position did not
        assert!(first[0].vel.dx > 0.0);
        assert_eq!(first[0].pos, particles[0].pos);

        let second = motion_system(&first, &m).unwrap();
        assert_eq!(second[0].pos, first[0].pos + first[0].vel);
    }

    #[test]
    fn test_unregistered_type_rejected() {
        let mut m = rules(2, 0.9);
        m.set_attraction(1, 0, 1.0).unwrap();
        let particles = vec![
            Particle::at_rest(Vector::new(0.0, 0.0), 0),
            Particle::at_rest(Vector::new(35.0, 0.0), 2),
        ];

        assert_eq!(
            motion_system(&particles, &m),
            Err(SimError::UnknownParticleType { type_id: 2, count: 2 })
        );
    }

    #[test]
    fn test_empty_population() {
        assert_eq!(motion_system(&[], &rules(0, 0.7)), Ok(Vec::new()));
    }
}
