//! Frozen ZABR smile for a single expiry.
//!
//! A section captures calibrated parameters, a market context snapshot and
//! the evaluation mode. `volatility` is a pure function of that state.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationError;
use crate::models::zabr::{zabr_volatility, MarketContext, ZabrEvaluation, ZabrParams};

/// Queryable ZABR smile section.
///
/// # Example
///
/// ```
/// use smile_models::models::zabr::{MarketContext, ZabrEvaluation, ZabrParams};
/// use smile_models::smile_section::ZabrSmileSection;
///
/// let section = ZabrSmileSection::new(
///     ZabrParams::new(0.02, 0.5, 0.3, -0.2, 1.0),
///     MarketContext::new(5.0, 0.04).unwrap(),
///     ZabrEvaluation::ShortMaturityLognormal,
/// )
/// .unwrap();
///
/// assert!(section.volatility(0.03).unwrap() > section.volatility(0.05).unwrap());
/// assert!(section.volatility(0.0).unwrap_err().is_domain_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZabrSmileSection {
    params: ZabrParams,
    context: MarketContext,
    evaluation: ZabrEvaluation,
}

impl ZabrSmileSection {
    /// Create a section from parameters and a market context.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidInput` when the context or a parameter is
    /// outside its domain.
    pub fn new(
        params: ZabrParams,
        context: MarketContext,
        evaluation: ZabrEvaluation,
    ) -> Result<Self, CalibrationError> {
        context.validate()?;
        params.validate()?;
        Ok(Self {
            params,
            context,
            evaluation,
        })
    }

    /// Model volatility at `strike`.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidDomain` unless `strike` is positive and finite.
    pub fn volatility(&self, strike: f64) -> Result<f64, CalibrationError> {
        check_strike(strike)?;
        Ok(zabr_volatility(
            &self.params,
            &self.context,
            strike,
            self.evaluation,
        ))
    }

    /// Total variance `σ(K)² T` at `strike`.
    pub fn variance(&self, strike: f64) -> Result<f64, CalibrationError> {
        let vol = self.volatility(strike)?;
        Ok(vol * vol * self.context.expiry)
    }

    /// Not provided by ZABR sections.
    pub fn primitive(&self, _strike: f64) -> Result<f64, CalibrationError> {
        Err(CalibrationError::unsupported_operation("primitive"))
    }

    /// Not provided by ZABR sections.
    pub fn derivative(&self, _strike: f64) -> Result<f64, CalibrationError> {
        Err(CalibrationError::unsupported_operation("derivative"))
    }

    /// Not provided by ZABR sections.
    pub fn second_derivative(&self, _strike: f64) -> Result<f64, CalibrationError> {
        Err(CalibrationError::unsupported_operation("second_derivative"))
    }

    /// Frozen parameters.
    pub fn params(&self) -> &ZabrParams {
        &self.params
    }

    /// Time to expiry in years.
    pub fn expiry(&self) -> f64 {
        self.context.expiry
    }

    /// Forward of the context snapshot.
    pub fn forward(&self) -> f64 {
        self.context.forward
    }

    /// Evaluation mode.
    pub fn evaluation(&self) -> ZabrEvaluation {
        self.evaluation
    }
}

fn check_strike(strike: f64) -> Result<(), CalibrationError> {
    if strike.is_finite() && strike > 0.0 {
        Ok(())
    } else {
        Err(CalibrationError::invalid_domain(format!(
            "strike must be positive, got {}",
            strike
        )))
    }
}
