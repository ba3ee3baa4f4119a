//! Calibration configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smile_core::math::solvers::EndCriteria;

use super::CalibrationError;
use crate::models::zabr::ZabrEvaluation;

/// Settings for a ZABR calibration.
///
/// Deserialises from partial documents: missing fields take their defaults.
///
/// # Example
///
/// ```
/// use smile_models::calibration::ZabrCalibrationConfig;
/// use smile_models::models::zabr::ZabrEvaluation;
///
/// let config = ZabrCalibrationConfig::default()
///     .with_evaluation(ZabrEvaluation::ShortMaturityNormal)
///     .with_vega_weighted(true)
///     .with_max_restarts(10);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.error_accept, 0.002);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZabrCalibrationConfig {
    /// Volatility evaluation mode.
    pub evaluation: ZabrEvaluation,
    /// Weight points by vega instead of uniformly.
    pub vega_weighted: bool,
    /// Stop restarting once the acceptance metric is at or below this.
    pub error_accept: f64,
    /// Use the max error instead of the RMS error as acceptance metric.
    pub use_max_error: bool,
    /// Maximum number of restarts, the caller's guess included.
    pub max_restarts: usize,
    /// Stopping rule passed to the optimiser.
    pub end_criteria: EndCriteria,
    /// Wall-clock budget in seconds; restart 0 always runs.
    pub max_duration_secs: Option<f64>,
    /// Run restarts on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for ZabrCalibrationConfig {
    fn default() -> Self {
        Self {
            evaluation: ZabrEvaluation::default(),
            vega_weighted: false,
            error_accept: 0.002,
            use_max_error: false,
            max_restarts: 50,
            end_criteria: EndCriteria::default(),
            max_duration_secs: None,
            parallel: true,
        }
    }
}

impl ZabrCalibrationConfig {
    /// Set the evaluation mode.
    pub fn with_evaluation(mut self, evaluation: ZabrEvaluation) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Enable or disable vega weighting.
    pub fn with_vega_weighted(mut self, vega_weighted: bool) -> Self {
        self.vega_weighted = vega_weighted;
        self
    }

    /// Set the acceptance threshold.
    pub fn with_error_accept(mut self, error_accept: f64) -> Self {
        self.error_accept = error_accept;
        self
    }

    /// Select the max error as acceptance metric.
    pub fn with_use_max_error(mut self, use_max_error: bool) -> Self {
        self.use_max_error = use_max_error;
        self
    }

    /// Set the maximum number of restarts.
    pub fn with_max_restarts(mut self, max_restarts: usize) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Set the optimiser stopping rule.
    pub fn with_end_criteria(mut self, end_criteria: EndCriteria) -> Self {
        self.end_criteria = end_criteria;
        self
    }

    /// Set a wall-clock budget.
    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration_secs = Some(max_duration.as_secs_f64());
        self
    }

    /// Enable or disable parallel restarts.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Wall-clock budget, if any.
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidInput` for a negative or non-finite
    /// threshold or budget, zero restarts, or an invalid stopping rule.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !(self.error_accept.is_finite() && self.error_accept >= 0.0) {
            return Err(CalibrationError::invalid_input(format!(
                "error_accept must be non-negative, got {}",
                self.error_accept
            )));
        }
        if self.max_restarts == 0 {
            return Err(CalibrationError::invalid_input(
                "max_restarts must be at least 1",
            ));
        }
        if !self.end_criteria.is_valid() {
            return Err(CalibrationError::invalid_input(
                "end criteria need max_iterations > 0 and non-negative tolerances",
            ));
        }
        if let Some(secs) = self.max_duration_secs {
            if !(secs.is_finite() && secs >= 0.0) {
                return Err(CalibrationError::invalid_input(format!(
                    "max_duration_secs must be non-negative, got {}",
                    secs
                )));
            }
        }
        Ok(())
    }
}
