//! Restriction of the residual to the free-parameter subspace.
//!
//! The optimiser only sees free coordinates. Fixed slots are filled from
//! the caller's values, and after the transform the fixed parameters are
//! written back so they are returned bit-for-bit.

use super::parameters::ModelParameters;
use super::residual::WeightedResidual;
use super::transform::ParameterTransform;
use crate::models::zabr::ZabrParams;

/// Weighted residual as a function of the free unconstrained coordinates.
///
/// Evaluation is pure: the calibrator owns the current and best parameters.
#[derive(Debug, Clone, Copy)]
pub struct ProjectedObjective<'a> {
    residual: &'a WeightedResidual<'a>,
    parameters: ModelParameters,
    reference: [f64; 5],
}

impl<'a> ProjectedObjective<'a> {
    /// Project `residual` onto the parameters left free in `parameters`.
    pub fn new(residual: &'a WeightedResidual<'a>, parameters: ModelParameters) -> Self {
        Self {
            residual,
            reference: ParameterTransform::inverse(parameters.params()),
            parameters,
        }
    }

    /// Dimension of the free subspace.
    pub fn free_count(&self) -> usize {
        self.parameters.free_count()
    }

    /// Free coordinates of a full unconstrained vector.
    pub fn project(&self, full: &[f64; 5]) -> Vec<f64> {
        full.iter()
            .zip(self.parameters.fixed_flags())
            .filter(|(_, fixed)| !**fixed)
            .map(|(&x, _)| x)
            .collect()
    }

    /// Full unconstrained vector from free coordinates.
    ///
    /// Fixed slots take the caller's values in unconstrained form; surplus
    /// free coordinates are ignored.
    pub fn include(&self, free: &[f64]) -> [f64; 5] {
        let mut full = self.reference;
        let mut free_iter = free.iter();
        for (slot, &fixed) in full.iter_mut().zip(self.parameters.fixed_flags()) {
            if !fixed {
                if let Some(&x) = free_iter.next() {
                    *slot = x;
                }
            }
        }
        full
    }

    /// Model parameters at the free coordinates `free`.
    pub fn parameters_at(&self, free: &[f64]) -> ZabrParams {
        let params = ParameterTransform::direct(&self.include(free));
        self.parameters.restore_fixed(&params)
    }

    /// Free coordinates of the optimiser start for `start`.
    pub fn start_point(&self, start: &ZabrParams) -> Vec<f64> {
        self.project(&ParameterTransform::inverse(start))
    }

    /// Scaled residuals at `free`, as minimised by the optimiser.
    pub fn residuals(&self, free: &[f64]) -> Vec<f64> {
        self.residual.scaled_residuals(&self.parameters_at(free))
    }
}
