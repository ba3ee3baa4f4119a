//! Initial guesses and fixed/free parameter flags.
//!
//! # Parameter Indices
//!
//! - params[0] = alpha
//! - params[1] = beta
//! - params[2] = nu
//! - params[3] = rho
//! - params[4] = gamma

use serde::{Deserialize, Serialize};

use super::CalibrationError;
use crate::models::zabr::{check_parameter, ZabrParams};

/// Parameter index constants.
#[derive(Debug, Clone, Copy)]
pub struct ZabrParamIndex;

impl ZabrParamIndex {
    /// Alpha index.
    pub const ALPHA: usize = 0;
    /// Beta index.
    pub const BETA: usize = 1;
    /// Nu index.
    pub const NU: usize = 2;
    /// Rho index.
    pub const RHO: usize = 3;
    /// Gamma index.
    pub const GAMMA: usize = 4;
    /// Number of parameters.
    pub const COUNT: usize = ZabrParams::COUNT;

    /// Parameter names in index order.
    pub const NAMES: [&'static str; 5] = ["alpha", "beta", "nu", "rho", "gamma"];

    /// Name of the parameter at `index`.
    pub fn name(index: usize) -> &'static str {
        Self::NAMES.get(index).copied().unwrap_or("unknown")
    }
}

/// Caller-supplied guess for one parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterGuess {
    /// Starting value; `None` uses the model default.
    pub value: Option<f64>,
    /// Hold the value fixed during calibration (ignored without a value).
    pub fixed: bool,
}

impl ParameterGuess {
    /// A free parameter starting at `value`.
    pub fn free(value: f64) -> Self {
        Self {
            value: Some(value),
            fixed: false,
        }
    }

    /// A parameter held at `value`.
    pub fn fixed(value: f64) -> Self {
        Self {
            value: Some(value),
            fixed: true,
        }
    }
}

/// Initial guess for all five parameters.
///
/// # Example
///
/// ```
/// use smile_models::calibration::{ZabrGuess, ZabrParamIndex};
///
/// let guess = ZabrGuess::default().with_fixed_beta(0.5).with_free(ZabrParamIndex::RHO, -0.2);
/// let parameters = guess.resolve().unwrap();
///
/// assert!(parameters.is_fixed(ZabrParamIndex::BETA));
/// assert_eq!(parameters.free_count(), 4);
/// assert_eq!(parameters.params().rho, -0.2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZabrGuess {
    /// Alpha guess.
    pub alpha: ParameterGuess,
    /// Beta guess.
    pub beta: ParameterGuess,
    /// Nu guess.
    pub nu: ParameterGuess,
    /// Rho guess.
    pub rho: ParameterGuess,
    /// Gamma guess.
    pub gamma: ParameterGuess,
}

impl ZabrGuess {
    /// Guess with every parameter free, starting from `params`.
    pub fn from_params(params: &ZabrParams) -> Self {
        let mut guess = Self::default();
        for (i, value) in params.to_array().into_iter().enumerate() {
            guess = guess.with_free(i, value);
        }
        guess
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut ParameterGuess> {
        match index {
            ZabrParamIndex::ALPHA => Some(&mut self.alpha),
            ZabrParamIndex::BETA => Some(&mut self.beta),
            ZabrParamIndex::NU => Some(&mut self.nu),
            ZabrParamIndex::RHO => Some(&mut self.rho),
            ZabrParamIndex::GAMMA => Some(&mut self.gamma),
            _ => None,
        }
    }

    /// Guesses in index order.
    pub fn slots(&self) -> [ParameterGuess; 5] {
        [self.alpha, self.beta, self.nu, self.rho, self.gamma]
    }

    /// Set the guess for the parameter at `index` (out-of-range indices are ignored).
    pub fn with(mut self, index: usize, guess: ParameterGuess) -> Self {
        if let Some(slot) = self.slot_mut(index) {
            *slot = guess;
        }
        self
    }

    /// Start the parameter at `index` from `value`.
    pub fn with_free(self, index: usize, value: f64) -> Self {
        self.with(index, ParameterGuess::free(value))
    }

    /// Hold the parameter at `index` at `value`.
    pub fn with_fixed(self, index: usize, value: f64) -> Self {
        self.with(index, ParameterGuess::fixed(value))
    }

    /// Hold beta at `beta`.
    pub fn with_fixed_beta(self, beta: f64) -> Self {
        self.with_fixed(ZabrParamIndex::BETA, beta)
    }

    /// Hold gamma at `gamma` (gamma = 1 calibrates plain SABR).
    pub fn with_fixed_gamma(self, gamma: f64) -> Self {
        self.with_fixed(ZabrParamIndex::GAMMA, gamma)
    }

    /// Fill unset values with defaults and validate supplied ones.
    ///
    /// A fixed flag on a parameter without a value is dropped.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidInput` when a supplied value is outside its domain.
    pub fn resolve(&self) -> Result<ModelParameters, CalibrationError> {
        let mut values = ZabrParams::default().to_array();
        let mut fixed = [false; 5];

        for (i, slot) in self.slots().iter().enumerate() {
            if let Some(value) = slot.value {
                check_parameter(ZabrParamIndex::name(i), value)?;
                values[i] = value;
                fixed[i] = slot.fixed;
            }
        }

        Ok(ModelParameters {
            params: ZabrParams::from_array(values),
            fixed,
        })
    }
}

/// Resolved starting parameters with their fixed flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParameters {
    params: ZabrParams,
    fixed: [bool; 5],
}

impl ModelParameters {
    /// Starting parameters (fixed ones are final).
    pub fn params(&self) -> &ZabrParams {
        &self.params
    }

    /// Fixed flags in index order.
    pub fn fixed_flags(&self) -> &[bool; 5] {
        &self.fixed
    }

    /// Whether the parameter at `index` is held fixed.
    pub fn is_fixed(&self, index: usize) -> bool {
        self.fixed.get(index).copied().unwrap_or(false)
    }

    /// Number of free parameters.
    pub fn free_count(&self) -> usize {
        self.fixed.iter().filter(|&&f| !f).count()
    }

    /// Whether every parameter is fixed.
    pub fn all_fixed(&self) -> bool {
        self.free_count() == 0
    }

    /// Copy the fixed values of `self` over `params`.
    pub fn restore_fixed(&self, params: &ZabrParams) -> ZabrParams {
        let mut values = params.to_array();
        let reference = self.params.to_array();
        for i in 0..ZabrParamIndex::COUNT {
            if self.fixed[i] {
                values[i] = reference[i];
            }
        }
        ZabrParams::from_array(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_index() {
        assert_eq!(ZabrParamIndex::ALPHA, 0);
        assert_eq!(ZabrParamIndex::GAMMA, 4);
        assert_eq!(ZabrParamIndex::name(ZabrParamIndex::NU), "nu");
        assert_eq!(ZabrParamIndex::name(9), "unknown");
    }

    #[test]
    fn test_default_guess_resolves_to_defaults() {
        let parameters = ZabrGuess::default().resolve().unwrap();
        assert_eq!(*parameters.params(), ZabrParams::default());
        assert_eq!(parameters.free_count(), 5);
        assert!(!parameters.all_fixed());
    }

    #[test]
    fn test_fixed_without_value_is_free() {
        let guess = ZabrGuess::default().with(
            ZabrParamIndex::NU,
            ParameterGuess {
                value: None,
                fixed: true,
            },
        );
        let parameters = guess.resolve().unwrap();
        assert!(!parameters.is_fixed(ZabrParamIndex::NU));
        assert_eq!(parameters.params().nu, ZabrParams::default().nu);
    }

    #[test]
    fn test_supplied_values_validated() {
        let err = ZabrGuess::default()
            .with_fixed_gamma(-0.5)
            .resolve()
            .unwrap_err();
        assert!(err.is_input_error());
        assert!(format!("{}", err).contains("gamma"));

        assert!(ZabrGuess::default().with_free(ZabrParamIndex::RHO, 1.0).resolve().is_err());
        assert!(ZabrGuess::default().with_free(ZabrParamIndex::BETA, 0.0).resolve().is_err());
    }

    #[test]
    fn test_zero_alpha_rejected() {
        let err = ZabrGuess::default()
            .with_fixed(ZabrParamIndex::ALPHA, 0.0)
            .resolve()
            .unwrap_err();
        assert!(err.is_input_error());
        assert!(format!("{}", err).contains("alpha"));

        assert!(ZabrGuess::default()
            .with_free(ZabrParamIndex::ALPHA, 0.0)
            .resolve()
            .is_err());
        // nu and gamma may sit on their boundary
        assert!(ZabrGuess::default()
            .with_fixed(ZabrParamIndex::NU, 0.0)
            .with_fixed_gamma(0.0)
            .resolve()
            .is_ok());
    }

    #[test]
    fn test_all_fixed() {
        let params = ZabrParams::new(0.02, 0.5, 0.3, -0.1, 1.0);
        let mut guess = ZabrGuess::default();
        for (i, value) in params.to_array().into_iter().enumerate() {
            guess = guess.with_fixed(i, value);
        }
        let parameters = guess.resolve().unwrap();
        assert!(parameters.all_fixed());
        assert_eq!(*parameters.params(), params);
    }

    #[test]
    fn test_from_params_is_all_free() {
        let params = ZabrParams::new(0.02, 0.5, 0.3, -0.1, 1.2);
        let parameters = ZabrGuess::from_params(&params).resolve().unwrap();
        assert_eq!(parameters.free_count(), 5);
        assert_eq!(*parameters.params(), params);
    }

    #[test]
    fn test_restore_fixed() {
        let parameters = ZabrGuess::default()
            .with_fixed_beta(0.7)
            .resolve()
            .unwrap();
        let moved = ZabrParams::new(0.1, 0.3, 0.2, 0.5, 2.0);
        let restored = parameters.restore_fixed(&moved);
        assert_eq!(restored.beta, 0.7);
        assert_eq!(restored.alpha, 0.1);
        assert_eq!(restored.gamma, 2.0);
    }
}
