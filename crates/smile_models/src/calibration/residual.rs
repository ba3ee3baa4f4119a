//! Weighted volatility residuals and error metrics.
//!
//! For point `i` with weight `wᵢ`:
//!
//! ```text
//! rᵢ   = σ_model(Kᵢ) - σ_market(Kᵢ)
//! SSE  = Σ wᵢ rᵢ²
//! RMS  = sqrt(n · SSE / (n - 1))     (n ≥ 2; |r₀| for n = 1)
//! MAX  = maxᵢ |rᵢ|
//! ```
//!
//! The optimiser sees `rᵢ √wᵢ`, whose sum of squares is the SSE. A
//! non-finite model volatility enters the optimiser as a large finite
//! penalty, while RMS and MAX report it as infinite.

use super::market::MarketPoint;
use crate::analytical::{bachelier_std_dev_derivative, black_std_dev_derivative};
use crate::models::zabr::{zabr_volatility, MarketContext, ZabrEvaluation, ZabrParams};

/// Residual substituted for a non-finite model volatility.
pub const NON_FINITE_RESIDUAL: f64 = 1e6;

/// Model-minus-market residuals over a fixed smile and weight vector.
#[derive(Debug, Clone, Copy)]
pub struct WeightedResidual<'a> {
    points: &'a [MarketPoint],
    weights: &'a [f64],
    context: MarketContext,
    evaluation: ZabrEvaluation,
}

impl<'a> WeightedResidual<'a> {
    /// Create a residual over `points` with one weight per point.
    ///
    /// Lengths are checked by the calibrator before construction.
    pub fn new(
        points: &'a [MarketPoint],
        weights: &'a [f64],
        context: MarketContext,
        evaluation: ZabrEvaluation,
    ) -> Self {
        debug_assert_eq!(points.len(), weights.len());
        Self {
            points,
            weights,
            context,
            evaluation,
        }
    }

    /// Number of market points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the smile is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unscaled residuals `σ_model - σ_market`.
    ///
    /// A non-finite residual is replaced by [`NON_FINITE_RESIDUAL`].
    pub fn residuals(&self, params: &ZabrParams) -> Vec<f64> {
        self.raw_residuals(params)
            .map(|r| if r.is_finite() { r } else { NON_FINITE_RESIDUAL })
            .collect()
    }

    /// Residuals scaled by `√w`, as seen by the optimiser.
    pub fn scaled_residuals(&self, params: &ZabrParams) -> Vec<f64> {
        self.residuals(params)
            .into_iter()
            .zip(self.weights)
            .map(|(r, w)| r * w.sqrt())
            .collect()
    }

    /// Weighted sum of squared residuals, penalty included.
    pub fn squared_error(&self, params: &ZabrParams) -> f64 {
        self.residuals(params)
            .iter()
            .zip(self.weights)
            .map(|(r, w)| w * r * r)
            .sum()
    }

    /// Root-mean-square error with the `n / (n - 1)` correction.
    ///
    /// Infinite when any model volatility is not finite.
    pub fn rms_error(&self, params: &ZabrParams) -> f64 {
        let Some(residuals) = self.measured_residuals(params) else {
            return f64::INFINITY;
        };
        let n = residuals.len();
        if n == 1 {
            return residuals[0].abs();
        }
        let sse: f64 = residuals
            .iter()
            .zip(self.weights)
            .map(|(r, w)| w * r * r)
            .sum();
        let n = n as f64;
        (n * sse / (n - 1.0)).sqrt()
    }

    /// Largest absolute unscaled residual.
    ///
    /// Infinite when any model volatility is not finite.
    pub fn max_error(&self, params: &ZabrParams) -> f64 {
        match self.measured_residuals(params) {
            Some(residuals) => residuals.iter().fold(0.0_f64, |acc, r| acc.max(r.abs())),
            None => f64::INFINITY,
        }
    }

    fn raw_residuals<'b>(&'b self, params: &'b ZabrParams) -> impl Iterator<Item = f64> + 'b {
        self.points.iter().map(move |point| {
            let model = zabr_volatility(params, &self.context, point.strike, self.evaluation);
            model - point.volatility
        })
    }

    /// Residuals without the penalty; `None` if any is not finite.
    fn measured_residuals(&self, params: &ZabrParams) -> Option<Vec<f64>> {
        self.raw_residuals(params)
            .map(|r| r.is_finite().then_some(r))
            .collect()
    }
}

/// Equal weights `1/n`.
pub fn uniform_weights(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Vega-proportional weights normalised to sum to one.
///
/// Each point's weight is the derivative of the undiscounted option price
/// with respect to the standard deviation `σ√T`, taken at the market
/// volatility: Black for lognormal evaluation, Bachelier for
/// [`ZabrEvaluation::ShortMaturityNormal`]. Falls back to uniform weights
/// when every vega vanishes.
pub fn vega_weights(
    points: &[MarketPoint],
    context: &MarketContext,
    evaluation: ZabrEvaluation,
) -> Vec<f64> {
    let sqrt_t = context.expiry.sqrt();
    let vegas: Vec<f64> = points
        .iter()
        .map(|point| {
            let std_dev = point.volatility * sqrt_t;
            if evaluation.is_normal() {
                bachelier_std_dev_derivative(point.strike, context.forward, std_dev)
            } else {
                black_std_dev_derivative(point.strike, context.forward, std_dev)
            }
        })
        .collect();

    let total: f64 = vegas.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return uniform_weights(points.len());
    }
    vegas.into_iter().map(|v| v / total).collect()
}
