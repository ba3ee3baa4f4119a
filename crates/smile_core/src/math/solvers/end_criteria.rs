//! Stopping rules shared by all optimisers.

use serde::{Deserialize, Serialize};

/// Reason a local optimisation stopped.
///
/// Only [`EndCriteriaType::Converged`] counts as success; every other value is
/// an ordinary outcome that callers inspect rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCriteriaType {
    /// No stopping rule fired (nothing was run).
    #[default]
    None,
    /// Iteration limit reached.
    MaxIterations,
    /// No downhill step could be found (damping saturated, or the objective is not finite).
    StationaryPoint,
    /// The objective stopped improving for too many consecutive iterations.
    StationaryFunctionValue,
    /// A minimum was reached: vanishing residual, vanishing gradient or negligible step.
    Converged,
}

impl EndCriteriaType {
    /// Whether this status denotes successful convergence.
    pub fn is_success(&self) -> bool {
        matches!(self, EndCriteriaType::Converged)
    }

    /// Short lowercase label used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            EndCriteriaType::None => "none",
            EndCriteriaType::MaxIterations => "max_iterations",
            EndCriteriaType::StationaryPoint => "stationary_point",
            EndCriteriaType::StationaryFunctionValue => "stationary_function_value",
            EndCriteriaType::Converged => "converged",
        }
    }
}

impl std::fmt::Display for EndCriteriaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stopping rule for local optimisers.
///
/// # Example
///
/// ```
/// use smile_core::math::solvers::EndCriteria;
///
/// let criteria = EndCriteria::default();
/// assert_eq!(criteria.max_iterations, 60000);
/// assert_eq!(criteria.max_stationary_state_iterations, 100);
///
/// let custom = EndCriteria::new(500, 20, 1e-10, 1e-10, 1e-10);
/// assert_eq!(custom.max_iterations, 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndCriteria {
    /// Maximum number of iterations before giving up.
    pub max_iterations: usize,
    /// Maximum number of consecutive accepted steps without a meaningful
    /// decrease of the objective.
    pub max_stationary_state_iterations: usize,
    /// The optimiser stops with `Converged` when the residual norm is below this.
    pub root_epsilon: f64,
    /// Relative objective decrease regarded as no improvement.
    pub function_epsilon: f64,
    /// Gradient infinity norm regarded as zero.
    pub gradient_norm_epsilon: f64,
}

impl Default for EndCriteria {
    /// Default values:
    /// - `max_iterations`: 60000
    /// - `max_stationary_state_iterations`: 100
    /// - `root_epsilon`, `function_epsilon`, `gradient_norm_epsilon`: 1e-8
    fn default() -> Self {
        Self {
            max_iterations: 60000,
            max_stationary_state_iterations: 100,
            root_epsilon: 1e-8,
            function_epsilon: 1e-8,
            gradient_norm_epsilon: 1e-8,
        }
    }
}

impl EndCriteria {
    /// Create a new stopping rule.
    ///
    /// # Panics
    ///
    /// Panics if `max_iterations == 0` or any tolerance is negative.
    pub fn new(
        max_iterations: usize,
        max_stationary_state_iterations: usize,
        root_epsilon: f64,
        function_epsilon: f64,
        gradient_norm_epsilon: f64,
    ) -> Self {
        let criteria = Self {
            max_iterations,
            max_stationary_state_iterations,
            root_epsilon,
            function_epsilon,
            gradient_norm_epsilon,
        };
        assert!(max_iterations > 0, "max_iterations must be > 0");
        assert!(criteria.tolerances_valid(), "tolerances must be non-negative");
        criteria
    }

    /// Create a rule with relaxed tolerances and a small iteration budget.
    pub fn fast() -> Self {
        Self {
            max_iterations: 200,
            max_stationary_state_iterations: 20,
            root_epsilon: 1e-6,
            function_epsilon: 1e-6,
            gradient_norm_epsilon: 1e-6,
        }
    }

    /// Check the rule without panicking (used for deserialised configuration).
    pub fn is_valid(&self) -> bool {
        self.max_iterations > 0 && self.tolerances_valid()
    }

    fn tolerances_valid(&self) -> bool {
        [
            self.root_epsilon,
            self.function_epsilon,
            self.gradient_norm_epsilon,
        ]
        .iter()
        .all(|eps| eps.is_finite() && *eps >= 0.0)
    }
}
