//! Error types for structured error handling.
//!
//! This module provides:
//! - `SolverError`: Errors from local optimisers

use thiserror::Error;

/// Optimiser errors.
///
/// Only structural problems are errors. A run that stops without meeting its
/// convergence test is not an error: the optimiser reports it through its
/// termination status instead.
///
/// # Examples
/// ```
/// use smile_core::types::SolverError;
///
/// let err = SolverError::EmptyParameters;
/// assert!(format!("{}", err).contains("parameter"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The starting point has no coordinates.
    #[error("Empty parameter vector")]
    EmptyParameters,

    /// The objective returned no residuals.
    #[error("Empty residual vector")]
    EmptyResiduals,

    /// The objective returned a residual vector whose length changed between calls.
    #[error("Residual dimension changed from {expected} to {actual}")]
    DimensionMismatch {
        /// Length of the first residual vector
        expected: usize,
        /// Length observed later
        actual: usize,
    },
}
