//! Calibration result types.

use serde::{Deserialize, Serialize};
use smile_core::math::solvers::EndCriteriaType;

use crate::models::zabr::ZabrParams;

/// Why a calibration finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationStatus {
    /// Every parameter was fixed; the optimiser never ran.
    NoOptimizationNeeded,
    /// The optimiser converged on the best restart.
    Converged,
    /// The best restart hit the iteration limit.
    MaxIterations,
    /// The best restart found no downhill direction.
    StationaryPoint,
    /// The best restart stopped improving.
    StationaryFunctionValue,
    /// The optimiser reported no reason.
    Unknown,
}

impl From<EndCriteriaType> for TerminationStatus {
    fn from(status: EndCriteriaType) -> Self {
        match status {
            EndCriteriaType::Converged => TerminationStatus::Converged,
            EndCriteriaType::MaxIterations => TerminationStatus::MaxIterations,
            EndCriteriaType::StationaryPoint => TerminationStatus::StationaryPoint,
            EndCriteriaType::StationaryFunctionValue => TerminationStatus::StationaryFunctionValue,
            EndCriteriaType::None => TerminationStatus::Unknown,
        }
    }
}

impl std::fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TerminationStatus::NoOptimizationNeeded => "no_optimization_needed",
            TerminationStatus::Converged => "converged",
            TerminationStatus::MaxIterations => "max_iterations",
            TerminationStatus::StationaryPoint => "stationary_point",
            TerminationStatus::StationaryFunctionValue => "stationary_function_value",
            TerminationStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Outcome of one calibration.
///
/// Both error metrics are computed from the best parameters, whichever
/// metric drove the restart selection. They are infinite when the model
/// volatility is not finite at some strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Best parameters (fixed ones unchanged).
    pub params: ZabrParams,
    /// Root-mean-square error with the `n / (n - 1)` correction.
    pub rms_error: f64,
    /// Largest absolute volatility error.
    pub max_error: f64,
    /// Termination status of the best restart.
    pub status: TerminationStatus,
    /// Number of restarts examined (zero when nothing was optimised).
    pub restarts: usize,
}

impl FitResult {
    /// Check whether the chosen error metric is within `tolerance`.
    pub fn is_acceptable(&self, tolerance: f64, use_max_error: bool) -> bool {
        let error = if use_max_error {
            self.max_error
        } else {
            self.rms_error
        };
        error <= tolerance
    }
}
