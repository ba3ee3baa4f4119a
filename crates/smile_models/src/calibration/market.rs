//! Market smile observations.

use serde::{Deserialize, Serialize};

use super::CalibrationError;

/// A single strike/volatility observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketPoint {
    /// Strike (> 0).
    pub strike: f64,
    /// Market implied volatility (> 0).
    pub volatility: f64,
}

impl MarketPoint {
    /// Create a new market point.
    pub fn new(strike: f64, volatility: f64) -> Self {
        Self { strike, volatility }
    }
}

/// Validate a smile: non-empty, every strike and volatility positive and finite.
pub fn validate_points(points: &[MarketPoint]) -> Result<(), CalibrationError> {
    if points.is_empty() {
        return Err(CalibrationError::invalid_input("no market points supplied"));
    }
    for (i, point) in points.iter().enumerate() {
        if !(point.strike.is_finite() && point.strike > 0.0) {
            return Err(CalibrationError::invalid_input(format!(
                "strike of point {} must be positive, got {}",
                i, point.strike
            )));
        }
        if !(point.volatility.is_finite() && point.volatility > 0.0) {
            return Err(CalibrationError::invalid_input(format!(
                "volatility of point {} must be positive, got {}",
                i, point.volatility
            )));
        }
    }
    Ok(())
}

/// Pair strikes with volatilities.
///
/// # Errors
///
/// `CalibrationError::InvalidInput` when the two slices differ in length.
pub fn market_points(
    strikes: &[f64],
    volatilities: &[f64],
) -> Result<Vec<MarketPoint>, CalibrationError> {
    if strikes.len() != volatilities.len() {
        return Err(CalibrationError::invalid_input(format!(
            "{} strikes but {} volatilities",
            strikes.len(),
            volatilities.len()
        )));
    }
    Ok(strikes
        .iter()
        .zip(volatilities)
        .map(|(&strike, &volatility)| MarketPoint::new(strike, volatility))
        .collect())
}
