//! Local optimisation solvers for model calibration.
//!
//! ## Available Solvers
//!
//! - [`LevenbergMarquardt`]: Nonlinear least-squares with finite-difference Jacobian
//!
//! ## Configuration
//!
//! Every solver stops according to an [`EndCriteria`]:
//! - `max_iterations`: Maximum iteration count (default: 60000)
//! - `max_stationary_state_iterations`: Consecutive non-improving steps (default: 100)
//! - `root_epsilon`, `function_epsilon`, `gradient_norm_epsilon` (default: 1e-8)
//!
//! The reason for stopping is reported as an [`EndCriteriaType`].
//! The LM solver additionally uses [`LMConfig`] for damping control.
//!
//! ## Example
//!
//! ```
//! use smile_core::math::solvers::{EndCriteria, LevenbergMarquardt};
//! use smile_core::traits::optimisation::OptimizationMethod;
//!
//! // Minimise (p[0] - 2)² + (p[1] - 3)²
//! let residuals = |params: &[f64]| -> Vec<f64> {
//!     vec![params[0] - 2.0, params[1] - 3.0]
//! };
//!
//! let solver = LevenbergMarquardt::with_defaults();
//! let outcome = solver.minimise(&residuals, vec![0.0, 0.0], &EndCriteria::default());
//!
//! assert!(outcome.is_success());
//! assert!((outcome.params[0] - 2.0).abs() < 1e-6);
//! ```

mod end_criteria;
mod levenberg_marquardt;

// Re-export public types at module level
pub use end_criteria::{EndCriteria, EndCriteriaType};
pub use levenberg_marquardt::{LMConfig, LevenbergMarquardt};
