//! Numerical building blocks.
//!
//! - [`solvers`]: local least-squares optimisers and their stopping rules
//! - [`sequences`]: deterministic low-discrepancy sequences
//! - [`distributions`]: standard normal density and distribution functions

pub mod distributions;
pub mod sequences;
pub mod solvers;
