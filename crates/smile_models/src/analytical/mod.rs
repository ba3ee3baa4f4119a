//! Closed-form option sensitivities.
//!
//! - [`black`]: Black and Bachelier derivatives with respect to the
//!   standard deviation, used for vega weighting of smile points

pub mod black;

pub use black::{bachelier_std_dev_derivative, black_std_dev_derivative};
