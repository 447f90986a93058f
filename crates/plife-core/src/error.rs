//! Errors raised when a caller breaks an operation's contract.

use thiserror::Error;

/// Contract violations reported by the simulation core.
///
/// None of these leave the simulation in a modified state: the operation
/// that returns one has not been applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A particle type index outside `0..count`
    #[error("particle type index {index} out of range ({count} type(s) registered)")]
    TypeIndexOutOfRange { index: usize, count: usize },

    /// A rule table lookup outside the `dim x dim` table
    #[error("attraction index ({row}, {col}) out of range for a {dim}x{dim} matrix")]
    MatrixIndexOutOfRange { row: usize, col: usize, dim: usize },

    /// A rule table row whose length differs from the row count
    #[error("attraction matrix row {row} has {len} entries, expected {dim}")]
    NonSquareMatrix { row: usize, len: usize, dim: usize },

    /// A particle whose type id does not name a registered type
    #[error("particle references unknown type id {type_id} ({count} type(s) registered)")]
    UnknownParticleType { type_id: usize, count: usize },

    /// A global scalar outside its valid domain
    #[error("invalid {name} {value}: expected {expected}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}
