//! # smile_models (L2: Business Logic)
//!
//! ZABR volatility smile model and its calibration engine.
//!
//! This crate provides:
//! - ZABR implied volatility in three evaluation modes (`models::zabr`)
//! - Black and Bachelier standard-deviation derivatives for vega weights
//!   (`analytical::black`)
//! - Multi-start calibration to a single expiry's market smile
//!   (`calibration`)
//! - Frozen, queryable smile sections (`smile_section`)
//!
//! ## Design Principles
//!
//! - **Pure evaluation**: model volatility is a function of parameters,
//!   market context and strike; no hidden state
//! - **Composition over inheritance**: the calibrator owns an optimiser
//!   behind `smile_core::traits::OptimizationMethod`
//! - **Explicit recomputation**: callers install a fresh market context and
//!   re-run calibration; nothing updates in the background
//!
//! ## Example
//!
//! ```
//! use smile_models::calibration::{MarketPoint, ZabrCalibrationConfig, ZabrGuess, ZabrInterpolation};
//! use smile_models::models::zabr::MarketContext;
//!
//! let points = vec![
//!     MarketPoint::new(0.03, 0.22),
//!     MarketPoint::new(0.04, 0.20),
//!     MarketPoint::new(0.05, 0.19),
//! ];
//! let context = MarketContext::new(5.0, 0.04).unwrap();
//! let config = ZabrCalibrationConfig::default()
//!     .with_error_accept(0.001)
//!     .with_max_restarts(20);
//!
//! let smile = ZabrInterpolation::new(points, context, ZabrGuess::default(), config).unwrap();
//! assert!(smile.rms_error() < 0.001);
//! assert!((smile.volatility(0.04).unwrap() - 0.20).abs() < 0.005);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod calibration;
pub mod models;
pub mod smile_section;
