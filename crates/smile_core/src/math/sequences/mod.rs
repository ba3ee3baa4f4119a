//! Low-discrepancy sequences.
//!
//! Low-discrepancy sequences cover the unit hypercube more evenly than
//! pseudo-random draws. Calibration uses them to spread restart points over
//! the parameter domain.
//!
//! - [`HaltonSequence`]: radical inverse in the first primes, optionally
//!   with a seeded random start per dimension

mod halton;

pub use halton::HaltonSequence;

/// Trait for low-discrepancy sequences.
///
/// Implementations are deterministic: two sequences built with the same
/// arguments produce the same points.
pub trait LowDiscrepancySequence {
    /// Returns the dimensionality of the sequence.
    fn dimension(&self) -> usize;

    /// Advances the sequence and returns the next point.
    ///
    /// # Returns
    ///
    /// A slice of `dimension()` values, each in the interval [0, 1).
    fn next_point(&mut self) -> &[f64];
}
