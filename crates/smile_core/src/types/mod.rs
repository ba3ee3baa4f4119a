//! Shared value and error types.
//!
//! - [`SolverError`]: failures raised by local optimisers before any
//!   iteration can start (empty parameter or residual vectors)

pub mod error;

pub use error::SolverError;
