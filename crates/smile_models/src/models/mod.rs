//! Stochastic volatility smile models.
//!
//! - [`zabr`]: five-parameter ZABR extension of SABR with short-maturity
//!   and Hagan evaluation modes

pub mod zabr;

pub use zabr::{zabr_volatility, MarketContext, ZabrEvaluation, ZabrParams};
