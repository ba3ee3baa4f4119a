//! Multi-start calibration driver.
//!
//! For each restart the driver maps the starting parameters to optimiser
//! coordinates, minimises the projected residual, and scores the result with
//! the acceptance metric (RMS or max error). The best restart wins; ties keep
//! the earlier one. The search stops as soon as the best score is within
//! `error_accept`, or after `max_restarts` restarts.
//!
//! With the `parallel` feature restarts are evaluated in batches on the rayon
//! pool and scanned in index order, so the result equals the sequential one.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use smile_core::math::solvers::{EndCriteriaType, LevenbergMarquardt};
use smile_core::traits::optimisation::OptimizationMethod;
use tracing::{debug, info, warn};

use super::config::ZabrCalibrationConfig;
use super::market::{validate_points, MarketPoint};
use super::parameters::{ModelParameters, ZabrGuess};
use super::projection::ProjectedObjective;
use super::residual::{uniform_weights, vega_weights, WeightedResidual};
use super::restart::RestartSequence;
use super::result::{FitResult, TerminationStatus};
use super::CalibrationError;
use crate::models::zabr::{MarketContext, ZabrParams};

/// Outcome of one restart.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    params: ZabrParams,
    error: f64,
    status: EndCriteriaType,
}

/// Running best-of-N selection.
struct BestOfN {
    best: Option<Candidate>,
    examined: usize,
    error_accept: f64,
}

impl BestOfN {
    fn new(error_accept: f64) -> Self {
        Self {
            best: None,
            examined: 0,
            error_accept,
        }
    }

    /// Record restart `restart`; returns `true` once the search may stop.
    fn offer(&mut self, restart: usize, candidate: Candidate) -> bool {
        self.examined += 1;
        debug!(
            restart,
            error = candidate.error,
            status = %candidate.status,
            "ZABR restart finished"
        );

        let improves = candidate.error.is_finite()
            && self
                .best
                .as_ref()
                .map_or(true, |best| candidate.error < best.error);
        if improves {
            self.best = Some(candidate);
        }

        self.best
            .as_ref()
            .is_some_and(|best| best.error <= self.error_accept)
    }
}

/// ZABR calibrator.
///
/// Holds the configuration and a shared local optimiser
/// (Levenberg-Marquardt unless another is supplied).
///
/// # Example
///
/// ```
/// use smile_models::calibration::{
///     uniform_weights, MarketPoint, TerminationStatus, ZabrCalibrationConfig, ZabrCalibrator,
///     ZabrGuess,
/// };
/// use smile_models::models::zabr::MarketContext;
///
/// let points = vec![
///     MarketPoint::new(0.03, 0.22),
///     MarketPoint::new(0.04, 0.20),
///     MarketPoint::new(0.05, 0.19),
/// ];
/// let context = MarketContext::new(5.0, 0.04).unwrap();
/// let weights = uniform_weights(points.len());
///
/// let calibrator = ZabrCalibrator::new(
///     ZabrCalibrationConfig::default()
///         .with_error_accept(0.001)
///         .with_max_restarts(20),
/// )
/// .unwrap();
/// let result = calibrator
///     .calibrate(&points, &context, &ZabrGuess::default(), &weights)
///     .unwrap();
///
/// assert!(result.rms_error < 0.001);
/// assert!(matches!(
///     result.status,
///     TerminationStatus::Converged | TerminationStatus::MaxIterations
/// ));
/// ```
#[derive(Clone)]
pub struct ZabrCalibrator {
    config: ZabrCalibrationConfig,
    optimiser: Arc<dyn OptimizationMethod>,
}

impl fmt::Debug for ZabrCalibrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZabrCalibrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ZabrCalibrator {
    /// Create a calibrator using Levenberg-Marquardt.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidInput` when the configuration is invalid.
    pub fn new(config: ZabrCalibrationConfig) -> Result<Self, CalibrationError> {
        Self::with_optimiser(config, Arc::new(LevenbergMarquardt::with_defaults()))
    }

    /// Create a calibrator with the default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: ZabrCalibrationConfig::default(),
            optimiser: Arc::new(LevenbergMarquardt::with_defaults()),
        }
    }

    /// Create a calibrator with a custom local optimiser.
    pub fn with_optimiser(
        config: ZabrCalibrationConfig,
        optimiser: Arc<dyn OptimizationMethod>,
    ) -> Result<Self, CalibrationError> {
        config.validate()?;
        Ok(Self { config, optimiser })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ZabrCalibrationConfig {
        &self.config
    }

    /// Weights for `points` under this configuration: vega or uniform.
    pub fn weights_for(&self, points: &[MarketPoint], context: &MarketContext) -> Vec<f64> {
        if self.config.vega_weighted {
            vega_weights(points, context, self.config.evaluation)
        } else {
            uniform_weights(points.len())
        }
    }

    /// Calibrate to `points` with one weight per point.
    ///
    /// Optimiser non-convergence is reported through the result's status.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidInput` for an empty or invalid smile, a
    /// non-positive forward or expiry, mismatched or negative weights, or an
    /// out-of-domain guess. Inputs are checked before any restart runs.
    pub fn calibrate(
        &self,
        points: &[MarketPoint],
        context: &MarketContext,
        guess: &ZabrGuess,
        weights: &[f64],
    ) -> Result<FitResult, CalibrationError> {
        validate_points(points)?;
        context.validate()?;
        validate_weights(weights, points.len())?;
        let parameters = guess.resolve()?;

        let residual = WeightedResidual::new(points, weights, *context, self.config.evaluation);

        if parameters.all_fixed() {
            let params = *parameters.params();
            let result = FitResult {
                params,
                rms_error: residual.rms_error(&params),
                max_error: residual.max_error(&params),
                status: TerminationStatus::NoOptimizationNeeded,
                restarts: 0,
            };
            info!(
                rms_error = result.rms_error,
                max_error = result.max_error,
                "ZABR parameters all fixed, no optimisation needed"
            );
            return Ok(result);
        }

        let objective = ProjectedObjective::new(&residual, parameters);
        let search = self.search(&objective, &residual, &parameters);

        let (params, status) = match search.best {
            Some(best) => (best.params, TerminationStatus::from(best.status)),
            None => {
                warn!(
                    restarts = search.examined,
                    "no ZABR restart produced a finite error, keeping the initial guess"
                );
                (*parameters.params(), TerminationStatus::Unknown)
            }
        };

        let result = FitResult {
            params,
            rms_error: residual.rms_error(&params),
            max_error: residual.max_error(&params),
            status,
            restarts: search.examined,
        };
        info!(
            rms_error = result.rms_error,
            max_error = result.max_error,
            restarts = result.restarts,
            status = %result.status,
            accepted = result.is_acceptable(self.config.error_accept, self.config.use_max_error),
            "ZABR calibration finished"
        );
        Ok(result)
    }

    fn search(
        &self,
        objective: &ProjectedObjective<'_>,
        residual: &WeightedResidual<'_>,
        parameters: &ModelParameters,
    ) -> BestOfN {
        let deadline = self
            .config
            .max_duration()
            .and_then(|budget| Instant::now().checked_add(budget));

        #[cfg(feature = "parallel")]
        {
            if self.config.parallel && deadline.is_none() {
                return self.search_parallel(objective, residual, parameters);
            }
        }

        let mut search = BestOfN::new(self.config.error_accept);
        let starts = RestartSequence::new(parameters).take(self.config.max_restarts);
        for (restart, start) in starts.enumerate() {
            if restart > 0 && deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(restarts = restart, "ZABR calibration time budget exhausted");
                break;
            }
            let candidate = self.run_restart(objective, residual, &start);
            if search.offer(restart, candidate) {
                break;
            }
        }
        search
    }

    #[cfg(feature = "parallel")]
    fn search_parallel(
        &self,
        objective: &ProjectedObjective<'_>,
        residual: &WeightedResidual<'_>,
        parameters: &ModelParameters,
    ) -> BestOfN {
        let starts: Vec<ZabrParams> = RestartSequence::new(parameters)
            .take(self.config.max_restarts)
            .collect();
        let batch = rayon::current_num_threads().max(1);
        let mut search = BestOfN::new(self.config.error_accept);

        // restart 0 runs alone so an accepted guess costs one optimisation
        let mut next = 0;
        while next < starts.len() {
            let end = if next == 0 {
                1
            } else {
                (next + batch).min(starts.len())
            };
            let candidates: Vec<Candidate> = starts[next..end]
                .par_iter()
                .map(|start| self.run_restart(objective, residual, start))
                .collect();
            for (offset, candidate) in candidates.into_iter().enumerate() {
                if search.offer(next + offset, candidate) {
                    return search;
                }
            }
            next = end;
        }
        search
    }

    fn run_restart(
        &self,
        objective: &ProjectedObjective<'_>,
        residual: &WeightedResidual<'_>,
        start: &ZabrParams,
    ) -> Candidate {
        let outcome = self.optimiser.minimise(
            &|x: &[f64]| objective.residuals(x),
            objective.start_point(start),
            &self.config.end_criteria,
        );
        let params = objective.parameters_at(&outcome.params);
        let error = if self.config.use_max_error {
            residual.max_error(&params)
        } else {
            residual.rms_error(&params)
        };
        Candidate {
            params,
            error,
            status: outcome.status,
        }
    }
}

fn validate_weights(weights: &[f64], n: usize) -> Result<(), CalibrationError> {
    if weights.len() != n {
        return Err(CalibrationError::invalid_input(format!(
            "{} weights for {} market points",
            weights.len(),
            n
        )));
    }
    if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
        return Err(CalibrationError::invalid_input(format!(
            "weights must be non-negative, got {}",
            w
        )));
    }
    Ok(())
}
