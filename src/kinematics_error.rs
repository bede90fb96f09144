//! Errors reported by the kinematics solvers

use thiserror::Error;

/// Failure of a single forward or inverse kinematics call.
///
/// None of these is retried internally. The caller (normally the motion controller) decides
/// what to do next, usually aborting the current motion. Payloads are `Copy` so that building
/// an error never allocates inside the servo cycle.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum KinematicsError {
    /// Closed-form algebra left its domain (acos argument outside [-1, 1], negative
    /// discriminant, negative square root). The target cannot be reached.
    #[error("target is out of reach: {0}")]
    Unreachable(&'static str),

    /// Iterative solver used all allowed iterations without meeting the threshold.
    #[error("no convergence after {iterations} iterations")]
    NoConvergence { iterations: u32 },

    /// Iterative solver error grew beyond the configured ceiling.
    #[error("iteration is diverging: error {error} exceeds {limit} at iteration {iterations}")]
    Diverging {
        error: f64,
        limit: f64,
        iterations: u32,
    },

    /// Jacobian inversion found no usable pivot.
    #[error("singular configuration")]
    Singular,

    /// Input is not physically meaningful (non-positive strut, wrong joint count, broken
    /// parameter table).
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}
