//! Integration tests for module exports.
//!
//! Verify that all public modules and types are accessible via absolute paths.

/// Test that solver types are accessible via absolute path.
#[test]
fn test_solvers_module_exports() {
    use smile_core::math::solvers::{
        EndCriteria, EndCriteriaType, LMConfig, LevenbergMarquardt,
    };

    let solver = LevenbergMarquardt::new(LMConfig::default());
    let outcome = solver
        .solve(&|p: &[f64]| vec![p[0] - 1.0], vec![0.0], &EndCriteria::fast())
        .unwrap();
    assert_eq!(outcome.status, EndCriteriaType::Converged);
}

/// Test that the optimiser trait can be used through a shared reference.
#[test]
fn test_traits_module_exports() {
    use smile_core::math::solvers::{EndCriteria, LevenbergMarquardt};
    use smile_core::traits::{OptimisationOutcome, OptimizationMethod};
    use std::sync::Arc;

    let method: Arc<dyn OptimizationMethod> = Arc::new(LevenbergMarquardt::with_defaults());
    let outcome: OptimisationOutcome =
        method.minimise(&|p: &[f64]| vec![p[0] + 2.0], vec![1.0], &EndCriteria::default());
    assert!((outcome.params[0] + 2.0).abs() < 1e-6);
}

/// Test that sequences are accessible via absolute path.
#[test]
fn test_sequences_module_exports() {
    use smile_core::math::sequences::{HaltonSequence, LowDiscrepancySequence};

    let mut halton = HaltonSequence::new(5, 42, true).unwrap();
    assert_eq!(halton.next_point().len(), 5);
}

/// Test that distribution functions are accessible via absolute path.
#[test]
fn test_distributions_module_exports() {
    use smile_core::math::distributions::norm_pdf;

    assert!(norm_pdf(0.0_f64) > 0.39);
}

/// Test that error types are accessible via absolute path.
#[test]
fn test_types_module_exports() {
    use smile_core::types::SolverError;

    let err = SolverError::DimensionMismatch {
        expected: 3,
        actual: 2,
    };
    assert!(err.to_string().contains('3'));
}
