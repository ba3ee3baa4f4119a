//! # smile_core: Numerical Foundation for Smile Calibration
//!
//! ## Layer 1 (Foundation) Role
//!
//! smile_core is the bottom layer of the workspace, providing:
//! - Local optimisers behind a common trait (`traits::optimisation`)
//! - Levenberg-Marquardt least squares with end criteria (`math::solvers`)
//! - Deterministic low-discrepancy sequences (`math::sequences`)
//! - Standard normal distribution functions (`math::distributions`)
//! - Error types: `SolverError` (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other smile_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - rand: Seeded random start offsets for quasi-random sequences
//! - thiserror: Error derivation
//! - serde: Serialisation of termination status and end criteria
//!
//! ## Usage Examples
//!
//! ```rust
//! use smile_core::math::solvers::{EndCriteria, EndCriteriaType, LevenbergMarquardt};
//! use smile_core::traits::optimisation::OptimizationMethod;
//!
//! // Minimise (p[0] - 2)² + (p[1] - 3)²
//! let residuals = |p: &[f64]| vec![p[0] - 2.0, p[1] - 3.0];
//!
//! let lm = LevenbergMarquardt::with_defaults();
//! let outcome = lm.minimise(&residuals, vec![0.0, 0.0], &EndCriteria::default());
//!
//! assert_eq!(outcome.status, EndCriteriaType::Converged);
//! assert!((outcome.params[0] - 2.0).abs() < 1e-6);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod traits;
pub mod types;
