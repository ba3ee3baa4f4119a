//! Levenberg-Marquardt nonlinear least-squares solver.
//!
//! This module provides the [`LevenbergMarquardt`] optimiser used by default
//! for smile calibration.
//!
//! # Algorithm
//!
//! The Levenberg-Marquardt algorithm combines Gauss-Newton and gradient descent:
//!
//! ```text
//! (J^T J + λI) δ = -J^T r
//! p_{n+1} = p_n + δ
//! ```
//!
//! where:
//! - `J` is the Jacobian matrix of residuals (forward differences)
//! - `r` is the residual vector
//! - `λ` is the damping factor (adjusted during iteration)
//! - `δ` is the parameter update step
//!
//! # Termination
//!
//! | Condition                                         | Status                    |
//! |---------------------------------------------------|---------------------------|
//! | `‖r‖ < root_epsilon`                              | `Converged`               |
//! | `‖J^T r‖∞ < gradient_norm_epsilon`                | `Converged`               |
//! | relative step below `LMConfig::param_tolerance`   | `Converged`               |
//! | damping saturated at `max_lambda`, or `‖r‖` not finite | `StationaryPoint`    |
//! | too many steps with negligible decrease           | `StationaryFunctionValue` |
//! | iteration limit                                   | `MaxIterations`           |

use crate::math::solvers::{EndCriteria, EndCriteriaType};
use crate::traits::optimisation::{OptimisationOutcome, OptimizationMethod};
use crate::types::SolverError;

/// Damping and differencing configuration for [`LevenbergMarquardt`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LMConfig {
    /// Initial damping factor.
    pub initial_lambda: f64,
    /// Factor to increase lambda on rejected step.
    pub lambda_up: f64,
    /// Factor to decrease lambda on accepted step.
    pub lambda_down: f64,
    /// Minimum damping factor.
    pub min_lambda: f64,
    /// Maximum damping factor.
    pub max_lambda: f64,
    /// Tolerance for relative parameter change convergence.
    pub param_tolerance: f64,
    /// Relative step for the forward-difference Jacobian.
    pub finite_diff_step: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e10,
            param_tolerance: 1e-10,
            finite_diff_step: 1e-8,
        }
    }
}

/// Levenberg-Marquardt nonlinear least-squares optimiser.
///
/// Solves optimisation problems of the form:
/// ```text
/// min_p ||f(p)||^2
/// ```
///
/// where `f(p)` is a vector-valued function (residuals) and `p` is a parameter vector.
///
/// # Example
///
/// ```
/// use smile_core::math::solvers::{EndCriteria, EndCriteriaType, LevenbergMarquardt};
///
/// // Fit y = a * exp(-b * x)
/// let x_data = [0.0, 1.0, 2.0, 3.0];
/// let y_data: Vec<f64> = x_data.iter().map(|x: &f64| 2.0 * (-0.5 * x).exp()).collect();
///
/// let residuals = |p: &[f64]| -> Vec<f64> {
///     x_data.iter().zip(&y_data).map(|(x, y)| p[0] * (-p[1] * x).exp() - y).collect()
/// };
///
/// let solver = LevenbergMarquardt::with_defaults();
/// let outcome = solver.solve(&residuals, vec![1.0, 1.0], &EndCriteria::default()).unwrap();
///
/// assert_eq!(outcome.status, EndCriteriaType::Converged);
/// assert!((outcome.params[0] - 2.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    config: LMConfig,
}

impl LevenbergMarquardt {
    /// Create a new LM solver with the given configuration.
    pub fn new(config: LMConfig) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: LMConfig::default(),
        }
    }

    /// Get the solver configuration.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Solve the nonlinear least-squares problem.
    ///
    /// # Returns
    ///
    /// * `Ok(OptimisationOutcome)` - Final point and termination status
    /// * `Err(SolverError)` - If the problem is structurally invalid
    pub fn solve(
        &self,
        residuals: &dyn Fn(&[f64]) -> Vec<f64>,
        initial_params: Vec<f64>,
        end_criteria: &EndCriteria,
    ) -> Result<OptimisationOutcome, SolverError> {
        let n_params = initial_params.len();
        if n_params == 0 {
            return Err(SolverError::EmptyParameters);
        }

        let mut params = initial_params;
        let mut lambda = self.config.initial_lambda;

        let mut r = residuals(&params);
        let n_residuals = r.len();
        if n_residuals == 0 {
            return Err(SolverError::EmptyResiduals);
        }

        let mut ss = sum_of_squares(&r);
        let mut stationary_steps = 0usize;

        for iteration in 0..end_criteria.max_iterations {
            if !ss.is_finite() {
                return Ok(OptimisationOutcome::new(
                    params,
                    ss,
                    iteration,
                    EndCriteriaType::StationaryPoint,
                ));
            }

            if ss.sqrt() < end_criteria.root_epsilon {
                return Ok(OptimisationOutcome::new(
                    params,
                    ss,
                    iteration,
                    EndCriteriaType::Converged,
                ));
            }

            let jacobian = compute_jacobian(residuals, &params, &r, self.config.finite_diff_step)?;
            let gradient = gradient(&jacobian, &r, n_params);

            let gradient_norm = gradient.iter().fold(0.0_f64, |acc, g| acc.max(g.abs()));
            if gradient_norm < end_criteria.gradient_norm_epsilon {
                return Ok(OptimisationOutcome::new(
                    params,
                    ss,
                    iteration,
                    EndCriteriaType::Converged,
                ));
            }

            // Solve (J^T J + λI) δ = -J^T r
            let delta = match solve_normal_equations(&jacobian, &gradient, lambda, n_params) {
                Some(d) => d,
                None => {
                    if lambda >= self.config.max_lambda {
                        return Ok(OptimisationOutcome::new(
                            params,
                            ss,
                            iteration,
                            EndCriteriaType::StationaryPoint,
                        ));
                    }
                    lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
                    continue;
                }
            };

            let param_change = delta.iter().map(|d| d * d).sum::<f64>().sqrt();
            let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt().max(1.0);
            if param_change / param_norm < self.config.param_tolerance {
                return Ok(OptimisationOutcome::new(
                    params,
                    ss,
                    iteration,
                    EndCriteriaType::Converged,
                ));
            }

            let new_params: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
            let new_r = residuals(&new_params);
            if new_r.len() != n_residuals {
                return Err(SolverError::DimensionMismatch {
                    expected: n_residuals,
                    actual: new_r.len(),
                });
            }
            let new_ss = sum_of_squares(&new_r);

            if new_ss < ss {
                let relative_decrease = (ss - new_ss) / ss.max(f64::MIN_POSITIVE);
                if relative_decrease < end_criteria.function_epsilon {
                    stationary_steps += 1;
                } else {
                    stationary_steps = 0;
                }

                params = new_params;
                r = new_r;
                ss = new_ss;
                lambda = (lambda * self.config.lambda_down).max(self.config.min_lambda);

                // zero disables the stationary-value test
                if end_criteria.max_stationary_state_iterations > 0
                    && stationary_steps >= end_criteria.max_stationary_state_iterations
                {
                    return Ok(OptimisationOutcome::new(
                        params,
                        ss,
                        iteration + 1,
                        EndCriteriaType::StationaryFunctionValue,
                    ));
                }
            } else {
                if lambda >= self.config.max_lambda {
                    return Ok(OptimisationOutcome::new(
                        params,
                        ss,
                        iteration + 1,
                        EndCriteriaType::StationaryPoint,
                    ));
                }
                lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
            }
        }

        Ok(OptimisationOutcome::new(
            params,
            ss,
            end_criteria.max_iterations,
            EndCriteriaType::MaxIterations,
        ))
    }
}

impl OptimizationMethod for LevenbergMarquardt {
    fn minimise(
        &self,
        residuals: &dyn Fn(&[f64]) -> Vec<f64>,
        initial: Vec<f64>,
        end_criteria: &EndCriteria,
    ) -> OptimisationOutcome {
        match self.solve(residuals, initial.clone(), end_criteria) {
            Ok(outcome) => outcome,
            Err(_) => OptimisationOutcome::new(initial, f64::INFINITY, 0, EndCriteriaType::None),
        }
    }
}

/// Compute Jacobian matrix using forward differences.
fn compute_jacobian(
    residuals: &dyn Fn(&[f64]) -> Vec<f64>,
    params: &[f64],
    r0: &[f64],
    eps: f64,
) -> Result<Vec<Vec<f64>>, SolverError> {
    let n_params = params.len();
    let n_residuals = r0.len();

    let mut jacobian = vec![vec![0.0; n_params]; n_residuals];

    for j in 0..n_params {
        let h = eps * params[j].abs().max(1.0);

        let mut params_plus = params.to_vec();
        params_plus[j] += h;

        let r_plus = residuals(&params_plus);
        if r_plus.len() != n_residuals {
            return Err(SolverError::DimensionMismatch {
                expected: n_residuals,
                actual: r_plus.len(),
            });
        }

        for i in 0..n_residuals {
            jacobian[i][j] = (r_plus[i] - r0[i]) / h;
        }
    }

    Ok(jacobian)
}

/// J^T r
fn gradient(jacobian: &[Vec<f64>], residuals: &[f64], n_params: usize) -> Vec<f64> {
    (0..n_params)
        .map(|i| {
            jacobian
                .iter()
                .zip(residuals)
                .map(|(row, r)| row[i] * r)
                .sum()
        })
        .collect()
}

/// Solve the normal equations (J^T J + λI) δ = -J^T r.
fn solve_normal_equations(
    jacobian: &[Vec<f64>],
    gradient: &[f64],
    lambda: f64,
    n_params: usize,
) -> Option<Vec<f64>> {
    let mut jtj = vec![vec![0.0; n_params]; n_params];
    for i in 0..n_params {
        for j in 0..=i {
            let sum: f64 = jacobian.iter().map(|row| row[i] * row[j]).sum();
            jtj[i][j] = sum;
            jtj[j][i] = sum;
        }
    }

    for (i, row) in jtj.iter_mut().enumerate() {
        row[i] += lambda;
    }

    let rhs: Vec<f64> = gradient.iter().map(|g| -g).collect();

    solve_cholesky(&jtj, &rhs)
}

/// Compute sum of squares of a vector.
#[inline]
fn sum_of_squares(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

/// Solve Ax = b using Cholesky decomposition.
fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L L^T
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if !(sum > 0.0) {
                    return None; // Not positive definite (or NaN)
                }
                l[i][j] = sum.sqrt();
            } else {
                if l[j][j].abs() < 1e-30 {
                    return None;
                }
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // L^T x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // LMConfig Tests
    // ========================================

    #[test]
    fn test_config_default() {
        let config = LMConfig::default();
        assert!(config.initial_lambda > 0.0);
        assert!(config.lambda_up > 1.0);
        assert!(config.lambda_down < 1.0);
        assert!(config.min_lambda < config.max_lambda);
    }

    // ========================================
    // LevenbergMarquardt Tests
    // ========================================

    #[test]
    fn test_solve_simple_linear() {
        let residuals = |params: &[f64]| -> Vec<f64> { vec![params[0] - 2.0, params[1] - 3.0] };

        let solver = LevenbergMarquardt::with_defaults();
        let outcome = solver
            .solve(&residuals, vec![0.0, 0.0], &EndCriteria::default())
            .unwrap();

        assert_eq!(outcome.status, EndCriteriaType::Converged);
        assert!((outcome.params[0] - 2.0).abs() < 1e-6);
        assert!((outcome.params[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_solve_rosenbrock() {
        // Residuals [10(p1 - p0²), 1 - p0]; minimum at (1, 1)
        let residuals = |params: &[f64]| -> Vec<f64> {
            vec![10.0 * (params[1] - params[0] * params[0]), 1.0 - params[0]]
        };

        let solver = LevenbergMarquardt::with_defaults();
        let outcome = solver
            .solve(&residuals, vec![-1.2, 1.0], &EndCriteria::default())
            .unwrap();

        assert!((outcome.params[0] - 1.0).abs() < 1e-4);
        assert!((outcome.params[1] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_solve_already_optimal() {
        let residuals = |params: &[f64]| -> Vec<f64> { vec![params[0] - 5.0] };

        let solver = LevenbergMarquardt::with_defaults();
        let outcome = solver
            .solve(&residuals, vec![5.0], &EndCriteria::default())
            .unwrap();

        assert_eq!(outcome.status, EndCriteriaType::Converged);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_solve_inconsistent_system_stops_at_minimum() {
        // p = 1 and p = 3 cannot both hold; least squares optimum is p = 2
        let residuals = |params: &[f64]| -> Vec<f64> { vec![params[0] - 1.0, params[0] - 3.0] };

        let solver = LevenbergMarquardt::with_defaults();
        let outcome = solver
            .solve(&residuals, vec![10.0], &EndCriteria::default())
            .unwrap();

        assert!((outcome.params[0] - 2.0).abs() < 1e-6);
        assert!((outcome.value - 2.0).abs() < 1e-8);
        assert_eq!(outcome.status, EndCriteriaType::Converged);
    }

    #[test]
    fn test_solve_max_iterations() {
        let residuals = |params: &[f64]| -> Vec<f64> {
            vec![10.0 * (params[1] - params[0] * params[0]), 1.0 - params[0]]
        };

        let solver = LevenbergMarquardt::with_defaults();
        let criteria = EndCriteria::new(1, 100, 1e-12, 1e-12, 1e-12);
        let outcome = solver.solve(&residuals, vec![-1.2, 1.0], &criteria).unwrap();

        assert_eq!(outcome.status, EndCriteriaType::MaxIterations);
        assert_eq!(outcome.iterations, 1);
    }

    #[test]
    fn test_solve_non_finite_objective() {
        let residuals = |_params: &[f64]| -> Vec<f64> { vec![f64::NAN] };

        let solver = LevenbergMarquardt::with_defaults();
        let outcome = solver
            .solve(&residuals, vec![1.0], &EndCriteria::default())
            .unwrap();

        assert_eq!(outcome.status, EndCriteriaType::StationaryPoint);
        assert_eq!(outcome.params, vec![1.0]);
    }

    #[test]
    fn test_solve_empty_params() {
        let residuals = |_params: &[f64]| -> Vec<f64> { vec![1.0] };

        let solver = LevenbergMarquardt::with_defaults();
        let result = solver.solve(&residuals, vec![], &EndCriteria::default());

        assert_eq!(result.unwrap_err(), SolverError::EmptyParameters);
    }

    #[test]
    fn test_solve_empty_residuals() {
        let residuals = |_params: &[f64]| -> Vec<f64> { vec![] };

        let solver = LevenbergMarquardt::with_defaults();
        let result = solver.solve(&residuals, vec![1.0], &EndCriteria::default());

        assert_eq!(result.unwrap_err(), SolverError::EmptyResiduals);
    }

    #[test]
    fn test_minimise_never_fails() {
        let residuals = |_params: &[f64]| -> Vec<f64> { vec![1.0] };

        let solver = LevenbergMarquardt::with_defaults();
        let outcome = solver.minimise(&residuals, vec![], &EndCriteria::default());

        assert_eq!(outcome.status, EndCriteriaType::None);
        assert!(outcome.value.is_infinite());
    }

    #[test]
    fn test_solve_multi_dimensional() {
        let residuals = |params: &[f64]| -> Vec<f64> {
            params
                .iter()
                .enumerate()
                .map(|(i, &p)| p - i as f64)
                .collect()
        };

        let solver = LevenbergMarquardt::with_defaults();
        let outcome = solver
            .solve(&residuals, vec![10.0, 10.0, 10.0, 10.0], &EndCriteria::default())
            .unwrap();

        assert!(outcome.is_success());
        for (i, &p) in outcome.params.iter().enumerate() {
            assert!((p - i as f64).abs() < 1e-6);
        }
    }

    #[test]
    fn test_solve_underdetermined() {
        // One equation, two unknowns: any point on p0 + p1 = 1 is a root
        let residuals = |params: &[f64]| -> Vec<f64> { vec![params[0] + params[1] - 1.0] };

        let solver = LevenbergMarquardt::with_defaults();
        let outcome = solver
            .solve(&residuals, vec![3.0, -4.0], &EndCriteria::default())
            .unwrap();

        assert_eq!(outcome.status, EndCriteriaType::Converged);
        assert!((outcome.params[0] + outcome.params[1] - 1.0).abs() < 1e-8);
    }

    // ========================================
    // Cholesky Solver Tests
    // ========================================

    #[test]
    fn test_cholesky_simple() {
        // 4*x0 + 2*x1 = 8, 2*x0 + 2*x1 = 5
        let a = vec![vec![4.0, 2.0], vec![2.0, 2.0]];
        let b = vec![8.0, 5.0];

        let x = solve_cholesky(&a, &b).unwrap();
        assert!((x[0] - 1.5).abs() < 1e-10);
        assert!((x[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cholesky_non_positive_definite() {
        let a = vec![vec![-1.0, 0.0], vec![0.0, 1.0]];
        let b = vec![1.0, 1.0];

        assert!(solve_cholesky(&a, &b).is_none());
    }

    #[test]
    fn test_cholesky_nan() {
        let a = vec![vec![f64::NAN]];
        assert!(solve_cholesky(&a, &[1.0]).is_none());
    }

    // ========================================
    // Jacobian Tests
    // ========================================

    #[test]
    fn test_jacobian_linear() {
        let residuals = |params: &[f64]| -> Vec<f64> { vec![2.0 * params[0] + 3.0 * params[1]] };

        let params = vec![1.0, 1.0];
        let r0 = residuals(&params);
        let jacobian = compute_jacobian(&residuals, &params, &r0, 1e-8).unwrap();

        assert_eq!(jacobian.len(), 1);
        assert_eq!(jacobian[0].len(), 2);
        assert!((jacobian[0][0] - 2.0).abs() < 1e-5);
        assert!((jacobian[0][1] - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_jacobian_dimension_change() {
        let residuals = |params: &[f64]| -> Vec<f64> {
            if params[0] > 1.0 {
                vec![1.0, 2.0]
            } else {
                vec![1.0]
            }
        };

        let result = compute_jacobian(&residuals, &[1.0], &[1.0], 1e-3);
        assert!(matches!(
            result,
            Err(SolverError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }
}
