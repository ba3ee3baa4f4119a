//! Stateful ZABR smile interpolation.
//!
//! [`ZabrInterpolation`] owns a smile, a market context snapshot and the
//! latest fit. It never recalibrates on its own: callers run
//! [`ZabrInterpolation::update`] after changing inputs, or
//! [`ZabrInterpolation::update_context`] with a fresh snapshot.

use std::sync::Arc;

use smile_core::traits::optimisation::OptimizationMethod;

use super::config::ZabrCalibrationConfig;
use super::driver::ZabrCalibrator;
use super::market::{market_points, validate_points, MarketPoint};
use super::parameters::ZabrGuess;
use super::result::{FitResult, TerminationStatus};
use super::CalibrationError;
use crate::models::zabr::MarketContext;
use crate::smile_section::ZabrSmileSection;

/// Calibrated ZABR smile over one expiry.
///
/// Calibration borrows `self` mutably, so one instance runs at most one
/// calibration at a time.
#[derive(Debug, Clone)]
pub struct ZabrInterpolation {
    points: Vec<MarketPoint>,
    context: MarketContext,
    guess: ZabrGuess,
    calibrator: ZabrCalibrator,
    weights: Vec<f64>,
    result: FitResult,
    section: ZabrSmileSection,
}

impl ZabrInterpolation {
    /// Validate the inputs and calibrate with Levenberg-Marquardt.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidInput` for invalid points, context, guess
    /// or configuration.
    pub fn new(
        points: Vec<MarketPoint>,
        context: MarketContext,
        guess: ZabrGuess,
        config: ZabrCalibrationConfig,
    ) -> Result<Self, CalibrationError> {
        Self::with_calibrator(points, context, guess, ZabrCalibrator::new(config)?)
    }

    /// Validate the inputs and calibrate with a custom optimiser.
    pub fn with_optimiser(
        points: Vec<MarketPoint>,
        context: MarketContext,
        guess: ZabrGuess,
        config: ZabrCalibrationConfig,
        optimiser: Arc<dyn OptimizationMethod>,
    ) -> Result<Self, CalibrationError> {
        let calibrator = ZabrCalibrator::with_optimiser(config, optimiser)?;
        Self::with_calibrator(points, context, guess, calibrator)
    }

    fn with_calibrator(
        points: Vec<MarketPoint>,
        context: MarketContext,
        guess: ZabrGuess,
        calibrator: ZabrCalibrator,
    ) -> Result<Self, CalibrationError> {
        validate_points(&points)?;
        context.validate()?;
        guess.resolve()?;

        let weights = calibrator.weights_for(&points, &context);
        let result = calibrator.calibrate(&points, &context, &guess, &weights)?;
        let section =
            ZabrSmileSection::new(result.params, context, calibrator.config().evaluation)?;

        Ok(Self {
            points,
            context,
            guess,
            calibrator,
            weights,
            result,
            section,
        })
    }

    /// Recalibrate from the current inputs.
    ///
    /// Re-checks the forward, recomputes vega weights when enabled, reruns
    /// the calibration and rebuilds the smile section. The previous fit is
    /// kept if this fails.
    pub fn update(&mut self) -> Result<(), CalibrationError> {
        self.context.validate()?;
        if self.calibrator.config().vega_weighted {
            self.weights = self.calibrator.weights_for(&self.points, &self.context);
        }
        let result =
            self.calibrator
                .calibrate(&self.points, &self.context, &self.guess, &self.weights)?;
        let section = ZabrSmileSection::new(
            result.params,
            self.context,
            self.calibrator.config().evaluation,
        )?;
        self.result = result;
        self.section = section;
        Ok(())
    }

    /// Install a fresh market context and recalibrate.
    pub fn update_context(&mut self, context: MarketContext) -> Result<(), CalibrationError> {
        context.validate()?;
        self.context = context;
        self.update()
    }

    /// Calibrated volatility at `strike`.
    pub fn volatility(&self, strike: f64) -> Result<f64, CalibrationError> {
        self.section.volatility(strike)
    }

    /// Calibrated alpha.
    pub fn alpha(&self) -> f64 {
        self.result.params.alpha
    }

    /// Calibrated beta.
    pub fn beta(&self) -> f64 {
        self.result.params.beta
    }

    /// Calibrated nu.
    pub fn nu(&self) -> f64 {
        self.result.params.nu
    }

    /// Calibrated rho.
    pub fn rho(&self) -> f64 {
        self.result.params.rho
    }

    /// Calibrated gamma.
    pub fn gamma(&self) -> f64 {
        self.result.params.gamma
    }

    /// RMS error of the latest fit.
    pub fn rms_error(&self) -> f64 {
        self.result.rms_error
    }

    /// Max error of the latest fit.
    pub fn max_error(&self) -> f64 {
        self.result.max_error
    }

    /// Termination status of the latest fit.
    pub fn termination_status(&self) -> TerminationStatus {
        self.result.status
    }

    /// Weights used by the latest fit.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Time to expiry of the current context.
    pub fn expiry(&self) -> f64 {
        self.context.expiry
    }

    /// Forward of the current context.
    pub fn forward(&self) -> f64 {
        self.context.forward
    }

    /// Market points being fitted.
    pub fn points(&self) -> &[MarketPoint] {
        &self.points
    }

    /// Latest fit.
    pub fn result(&self) -> &FitResult {
        &self.result
    }

    /// Smile section of the latest fit.
    pub fn smile_section(&self) -> &ZabrSmileSection {
        &self.section
    }
}

/// Factory capturing calibration settings.
///
/// # Example
///
/// ```
/// use smile_models::calibration::{Zabr, ZabrCalibrationConfig, ZabrGuess};
/// use smile_models::models::zabr::MarketContext;
///
/// let factory = Zabr::new(
///     ZabrGuess::default().with_fixed_gamma(1.0),
///     ZabrCalibrationConfig::default().with_max_restarts(5),
/// );
/// let smile = factory
///     .interpolate(&[0.03, 0.04, 0.05], &[0.22, 0.20, 0.19], MarketContext::new(5.0, 0.04).unwrap())
///     .unwrap();
/// assert_eq!(smile.gamma(), 1.0);
/// ```
#[derive(Clone)]
pub struct Zabr {
    guess: ZabrGuess,
    config: ZabrCalibrationConfig,
    optimiser: Option<Arc<dyn OptimizationMethod>>,
}

impl std::fmt::Debug for Zabr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zabr")
            .field("guess", &self.guess)
            .field("config", &self.config)
            .field("custom_optimiser", &self.optimiser.is_some())
            .finish()
    }
}

impl Zabr {
    /// Create a factory using Levenberg-Marquardt.
    pub fn new(guess: ZabrGuess, config: ZabrCalibrationConfig) -> Self {
        Self {
            guess,
            config,
            optimiser: None,
        }
    }

    /// Use a custom optimiser for every interpolation built.
    pub fn with_optimiser(mut self, optimiser: Arc<dyn OptimizationMethod>) -> Self {
        self.optimiser = Some(optimiser);
        self
    }

    /// Build and calibrate an interpolation through `strikes` and `volatilities`.
    pub fn interpolate(
        &self,
        strikes: &[f64],
        volatilities: &[f64],
        context: MarketContext,
    ) -> Result<ZabrInterpolation, CalibrationError> {
        let points = market_points(strikes, volatilities)?;
        match &self.optimiser {
            Some(optimiser) => ZabrInterpolation::with_optimiser(
                points,
                context,
                self.guess,
                self.config.clone(),
                Arc::clone(optimiser),
            ),
            None => ZabrInterpolation::new(points, context, self.guess, self.config.clone()),
        }
    }
}
