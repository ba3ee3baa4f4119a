//! Core traits.
//!
//! - [`optimisation`]: the local optimiser contract consumed by calibration
//!   drivers

pub mod optimisation;

pub use optimisation::{OptimisationOutcome, OptimizationMethod};
