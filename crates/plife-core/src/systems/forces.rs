//! Force law - how strongly one particle pulls or pushes another
//!
//! The profile is a function of the normalized distance `d = dist / range`:
//!
//! ```text
//!  f
//!  a |              /\
//!    |            /    \
//!  0 +----------+--------+---- d
//!    |       /  beta      1
//! -1 |/
//! ```
//!
//! Below `beta` particles always repel (the core keeps them from collapsing
//! onto one another). Between `beta` and `1` the signed rule coefficient `a`
//! scales a triangle peaking at `(1 + beta) / 2`.

use crate::components::Vector;

/// Force magnitude at normalized distance `d` for rule coefficient `attraction`.
///
/// Requires `0 < beta < 1`; at the endpoints the formula divides by zero.
pub fn force_profile(d: f64, attraction: f64, beta: f64) -> f64 {
    if d < beta {
        d / beta - 1.0
    } else {
        attraction * (1.0 - (2.0 * d - 1.0 - beta).abs() / (1.0 - beta))
    }
}

/// Force exerted on a particle at `p` by a particle at `q`.
///
/// Coincident and out-of-range pairs are neutral. A negative profile value
/// yields a vector pointing away from `q`.
pub fn pair_force(p: Vector, q: Vector, attraction: f64, beta: f64, range: f64) -> Vector {
    let delta = q - p;
    let dist = delta.magnitude();

    // Also rejects NaN distances
    if dist > 0.0 && dist <= range {
        let f = force_profile(dist / range, attraction, beta);
        delta * (f / dist)
    } else {
        Vector::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BETA: f64 = 0.4;

    #[test]
    fn test_repulsion_core_ignores_coefficient() {
        for a in [-1.0, 0.0, 0.5, 1.0] {
            assert_eq!(force_profile(0.0, a, BETA), -1.0);
            assert_eq!(force_profile(0.2, a, BETA), -0.5);
        }
        let f = force_profile(0.39, 1.0, BETA);
        assert!((-1.0..0.0).contains(&f));
    }

    #[test]
    fn test_triangle_peak_and_edges() {
        let peak = (1.0 + BETA) / 2.0;
        assert!((force_profile(peak, 0.8, BETA) - 0.8).abs() < 1e-12);
        assert!((force_profile(peak, -0.3, BETA) + 0.3).abs() < 1e-12);
        assert!(force_profile(BETA, 1.0, BETA).abs() < 1e-12);
        assert!(force_profile(1.0, 1.0, BETA).abs() < 1e-12);
    }

    #[test]
    fn test_pair_force_zero_cases() {
        let p = Vector::new(10.0, 10.0);

        assert_eq!(pair_force(p, p, 1.0, BETA, 50.0), Vector::ZERO);
        assert_eq!(pair_force(p, Vector::new(60.1, 10.0), 1.0, BETA, 50.0), Vector::ZERO);
        assert_eq!(pair_force(p, Vector::new(f64::NAN, 10.0), 1.0, BETA, 50.0), Vector::ZERO);
    }

    #[test]
    fn test_pair_force_direction() {
        let p = Vector::new(0.0, 0.0);

        // At the peak with a positive coefficient: pulled toward q
        let q = Vector::new(35.0, 0.0);
        let f = pair_force(p, q, 1.0, BETA, 50.0);
        assert!((f.dx - 1.0).abs() < 1e-12);
        assert_eq!(f.dy, 0.0);

        // Negative coefficient: pushed away
        let f = pair_force(p, q, -1.0, BETA, 50.0);
        assert!((f.dx + 1.0).abs() < 1e-12);

        // Inside the core: pushed away even when attracted
        let f = pair_force(p, Vector::new(0.0, 10.0), 1.0, BETA, 50.0);
        assert!((f.dy + 0.5).abs() < 1e-12);
        assert_eq!(f.dx, 0.0);
    }

    #[test]
    fn test_pair_force_at_exact_range_is_finite() {
        let f = pair_force(Vector::ZERO, Vector::new(50.0, 0.0), 1.0, BETA, 50.0);
        assert!(f.dx.abs() < 1e-12);
    }
}
