//! Attraction matrix - the rule table plus the global physics scalars
//!
//! Entry `(i, j)` is the coefficient type `i` feels toward type `j`. Rows and
//! columns are positional: they follow the order of the simulation's type
//! list, which is why type ids must stay dense.

use crate::components::{Particle, Vector};
use crate::error::SimError;
use crate::systems::pair_force;

/// Default per-frame velocity damping
pub const DEFAULT_FRICTION: f64 = 0.7;
/// Default normalized radius of the repulsion core
pub const DEFAULT_BETA: f64 = 0.4;
/// Default interaction radius
pub const DEFAULT_RANGE: f64 = 50.0;

/// Square rule table with friction, beta and range.
///
/// Stored row-major in a flat buffer; every structural change reallocates.
#[derive(Debug, Clone, PartialEq)]
pub struct AttractionMatrix {
    attractions: Vec<f64>,
    dim: usize,
    friction: f64,
    beta: f64,
    range: f64,
}

impl AttractionMatrix {
    /// Empty table with the given scalars
    pub fn new(friction: f64, beta: f64, range: f64) -> Result<Self, SimError> {
        validate_friction(friction)?;
        validate_beta(beta)?;
        validate_range(range)?;
        Ok(Self {
            attractions: Vec::new(),
            dim: 0,
            friction,
            beta,
            range,
        })
    }

    /// Build from nested rows. Every row must be as long as the row count.
    pub fn from_rows(
        rows: &[Vec<f64>],
        friction: f64,
        beta: f64,
        range: f64,
    ) -> Result<Self, SimError> {
        let mut matrix = Self::new(friction, beta, range)?;
        let dim = rows.len();
        for (row, values) in rows.iter().enumerate() {
            if values.len() != dim {
                return Err(SimError::NonSquareMatrix {
                    row,
                    len: values.len(),
                    dim,
                });
            }
        }
        matrix.attractions = rows.iter().flatten().copied().collect();
        matrix.dim = dim;
        Ok(matrix)
    }

    /// Number of rows (and columns)
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Append a neutral last row and column
    pub fn add_type(&mut self) {
        let n = self.dim + 1;
        let mut grown = vec![0.0; n * n];
        for i in 0..self.dim {
            let old = &self.attractions[i * self.dim..(i + 1) * self.dim];
            grown[i * n..i * n + self.dim].copy_from_slice(old);
        }
        self.attractions = grown;
        self.dim = n;
    }

    /// Delete row `index` and column `index`; remaining entries keep their
    /// pairwise relationship.
    pub fn remove_type(&mut self, index: usize) -> Result<(), SimError> {
        if index >= self.dim {
            return Err(SimError::TypeIndexOutOfRange {
                index,
                count: self.dim,
            });
        }

        let n = self.dim - 1;
        let mut shrunk = Vec::with_capacity(n * n);
        for i in (0..self.dim).filter(|&i| i != index) {
            for j in (0..self.dim).filter(|&j| j != index) {
                shrunk.push(self.attractions[i * self.dim + j]);
            }
        }
        self.attractions = shrunk;
        self.dim = n;
        Ok(())
    }

    /// Coefficient type `i` feels toward type `j`
    pub fn attraction(&self, i: usize, j: usize) -> Result<f64, SimError> {
        self.offset(i, j).map(|k| self.attractions[k])
    }

    pub fn set_attraction(&mut self, i: usize, j: usize, value: f64) -> Result<(), SimError> {
        let k = self.offset(i, j)?;
        self.attractions[k] = value;
        Ok(())
    }

    /// Row `i`, if it exists
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        (i < self.dim).then(|| &self.attractions[i * self.dim..(i + 1) * self.dim])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics; an empty table has no rows anyway
        self.attractions.chunks_exact(self.dim.max(1))
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn set_friction(&mut self, friction: f64) -> Result<(), SimError> {
        validate_friction(friction)?;
        self.friction = friction;
        Ok(())
    }

    pub fn set_beta(&mut self, beta: f64) -> Result<(), SimError> {
        validate_beta(beta)?;
        self.beta = beta;
        Ok(())
    }

    pub fn set_range(&mut self, range: f64) -> Result<(), SimError> {
        validate_range(range)?;
        self.range = range;
        Ok(())
    }

    /// Attraction vector exerted on `p` by `q`.
    ///
    /// Fails when either particle's type has no row in the table.
    pub fn compute_force(&self, p: &Particle, q: &Particle) -> Result<Vector, SimError> {
        let a = self.attraction(p.type_id, q.type_id)?;
        Ok(pair_force(p.pos, q.pos, a, self.beta, self.range))
    }

    /// Empty table carrying this table's scalars
    pub(crate) fn without_types(&self) -> Self {
        Self {
            attractions: Vec::new(),
            dim: 0,
            ..*self
        }
    }

    /// Overwrite every entry with `f(row, col)`
    pub(crate) fn fill_with(&mut self, mut f: impl FnMut(usize, usize) -> f64) {
        for i in 0..self.dim {
            for j in 0..self.dim {
                self.attractions[i * self.dim + j] = f(i, j);
            }
        }
    }

    /// Unchecked lookup for the frame step, where every type id is known to
    /// be live.
    pub(crate) fn coefficient(&self, i: usize, j: usize) -> f64 {
        self.attractions[i * self.dim + j]
    }

    pub(crate) fn set_coefficient(&mut self, i: usize, j: usize, value: f64) {
        self.attractions[i * self.dim + j] = value;
    }

    fn offset(&self, i: usize, j: usize) -> Result<usize, SimError> {
        if i < self.dim && j < self.dim {
            Ok(i * self.dim + j)
        } else {
            Err(SimError::MatrixIndexOutOfRange {
                row: i,
                col: j,
                dim: self.dim,
            })
        }
    }
}

impl Default for AttractionMatrix {
    fn default() -> Self {
        Self {
            attractions: Vec::new(),
            dim: 0,
            friction: DEFAULT_FRICTION,
            beta: DEFAULT_BETA,
            range: DEFAULT_RANGE,
        }
    }
}

pub(crate) fn validate_friction(friction: f64) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&friction) {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name: "friction",
            value: friction,
            expected: "a value in [0, 1]",
        })
    }
}

pub(crate) fn validate_beta(beta: f64) -> Result<(), SimError> {
    if beta > 0.0 && beta < 1.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name: "beta",
            value: beta,
            expected: "a value strictly between 0 and 1",
        })
    }
}

pub(crate) fn validate_range(range: f64) -> Result<(), SimError> {
    if range > 0.0 && range.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name: "range",
            value: range,
            expected: "a finite value greater than 0",
        })
    }
}
