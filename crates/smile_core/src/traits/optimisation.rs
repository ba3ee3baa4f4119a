//! Local optimiser contract.
//!
//! Calibration drivers treat the local optimiser as a black box: given a
//! residual function, a starting point and a stopping rule, it returns a
//! candidate solution together with the reason it stopped.
//!
//! # Example
//!
//! ```
//! use smile_core::math::solvers::{EndCriteria, EndCriteriaType};
//! use smile_core::traits::optimisation::{OptimisationOutcome, OptimizationMethod};
//!
//! // An optimiser that never moves
//! struct Identity;
//!
//! impl OptimizationMethod for Identity {
//!     fn minimise(
//!         &self,
//!         residuals: &dyn Fn(&[f64]) -> Vec<f64>,
//!         initial: Vec<f64>,
//!         _end_criteria: &EndCriteria,
//!     ) -> OptimisationOutcome {
//!         let value = residuals(&initial).iter().map(|r| r * r).sum();
//!         OptimisationOutcome::new(initial, value, 0, EndCriteriaType::None)
//!     }
//! }
//!
//! let outcome = Identity.minimise(&|p| vec![p[0] - 1.0], vec![3.0], &EndCriteria::default());
//! assert_eq!(outcome.params, vec![3.0]);
//! assert!((outcome.value - 4.0).abs() < 1e-12);
//! ```

use crate::math::solvers::{EndCriteria, EndCriteriaType};

/// Result of a single local optimisation run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimisationOutcome {
    /// Final point in the optimiser's own (unconstrained) coordinates.
    pub params: Vec<f64>,
    /// Sum of squared residuals at `params`.
    pub value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Why the optimiser stopped.
    pub status: EndCriteriaType,
}

impl OptimisationOutcome {
    /// Create a new outcome.
    pub fn new(params: Vec<f64>, value: f64, iterations: usize, status: EndCriteriaType) -> Self {
        Self {
            params,
            value,
            iterations,
            status,
        }
    }

    /// Whether the stopping rule reported a successful termination.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Local least-squares optimiser.
///
/// Implementations minimise the sum of squares of `residuals` starting from
/// `initial` and must not fail: problems that cannot be solved are reported
/// through [`EndCriteriaType`] with the best point found so far.
///
/// The trait is object safe and `Send + Sync` so drivers can hold a shared
/// optimiser and run independent restarts on several threads.
pub trait OptimizationMethod: Send + Sync {
    /// Minimise `residuals` from `initial` until `end_criteria` fires.
    fn minimise(
        &self,
        residuals: &dyn Fn(&[f64]) -> Vec<f64>,
        initial: Vec<f64>,
        end_criteria: &EndCriteria,
    ) -> OptimisationOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HalfStep;

    impl OptimizationMethod for HalfStep {
        fn minimise(
            &self,
            residuals: &dyn Fn(&[f64]) -> Vec<f64>,
            initial: Vec<f64>,
            _end_criteria: &EndCriteria,
        ) -> OptimisationOutcome {
            let params: Vec<f64> = initial.iter().map(|p| p * 0.5).collect();
            let value = residuals(&params).iter().map(|r| r * r).sum();
            OptimisationOutcome::new(params, value, 1, EndCriteriaType::MaxIterations)
        }
    }

    #[test]
    fn test_outcome_new() {
        let outcome = OptimisationOutcome::new(vec![1.0], 0.5, 3, EndCriteriaType::Converged);
        assert_eq!(outcome.params, vec![1.0]);
        assert_eq!(outcome.iterations, 3);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_outcome_not_success() {
        let outcome = OptimisationOutcome::new(vec![1.0], 0.5, 3, EndCriteriaType::MaxIterations);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_trait_object_dispatch() {
        let method: Box<dyn OptimizationMethod> = Box::new(HalfStep);
        let outcome = method.minimise(&|p| vec![p[0]], vec![4.0], &EndCriteria::default());
        assert_eq!(outcome.params, vec![2.0]);
        assert!((outcome.value - 4.0).abs() < 1e-12);
        assert_eq!(outcome.status, EndCriteriaType::MaxIterations);
    }
}
