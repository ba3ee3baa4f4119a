//! ZABR smile calibration.
//!
//! This module provides the calibration engine:
//! - [`ParameterTransform`]: unconstrained optimiser coordinates to model parameters
//! - [`WeightedResidual`]: model-minus-market residuals, RMS and max errors
//! - [`ProjectedObjective`]: the residual restricted to free parameters
//! - [`RestartSequence`]: deterministic Halton restart points
//! - [`ZabrCalibrator`]: multi-start best-of-N driver
//! - [`ZabrInterpolation`]: stateful calibrated smile with explicit `update`
//! - [`Zabr`]: factory building interpolations from strikes and volatilities
//! - [`FitResult`], [`TerminationStatus`]: calibration outcome
//! - [`CalibrationError`]: input, domain and unsupported-operation errors
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Calibration Flow                          │
//! │                                                                  │
//! │  MarketPoints + MarketContext → ZabrCalibrator → FitResult       │
//! │                                      │              │            │
//! │          ┌───────────────────────────┘              ▼            │
//! │          ▼                                   ZabrSmileSection    │
//! │  RestartSequence → ParameterTransform::inverse                   │
//! │          → ProjectedObjective → optimiser → WeightedResidual     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod driver;
mod error;
pub mod interpolation;
pub mod market;
pub mod parameters;
pub mod projection;
pub mod residual;
pub mod restart;
pub mod result;
pub mod transform;

pub use config::ZabrCalibrationConfig;
pub use driver::ZabrCalibrator;
pub use error::CalibrationError;
pub use interpolation::{Zabr, ZabrInterpolation};
pub use market::{market_points, validate_points, MarketPoint};
pub use parameters::{ModelParameters, ParameterGuess, ZabrGuess, ZabrParamIndex};
pub use projection::ProjectedObjective;
pub use residual::{uniform_weights, vega_weights, WeightedResidual, NON_FINITE_RESIDUAL};
pub use restart::{RestartSequence, RESTART_SEED};
pub use result::{FitResult, TerminationStatus};
pub use transform::{ParameterTransform, EPSILON_FLOOR, RHO_SATURATION};
