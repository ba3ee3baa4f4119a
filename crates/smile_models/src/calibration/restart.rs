//! Deterministic restart points for the multi-start search.
//!
//! Restart 0 is the caller's guess. Restart `k ≥ 1` takes the `k`-th point
//! of a randomly started Halton sequence over the free parameters (seed 42)
//! and maps each coordinate `s ∈ [0, 1)` into the parameter domain:
//!
//! | Parameter   | starting value            |
//! |-------------|---------------------------|
//! | alpha, beta | (1 - 2e-6) s + 1e-6       |
//! | nu, gamma   | 5 s + 1e-6                |
//! | rho         | (2 s - 1)(1 - 1e-6)       |
//!
//! Fixed parameters keep the caller's values.

use smile_core::math::sequences::{HaltonSequence, LowDiscrepancySequence};

use super::parameters::{ModelParameters, ZabrParamIndex};
use crate::models::zabr::ZabrParams;

/// Seed of the Halton random start offsets.
pub const RESTART_SEED: u64 = 42;

/// Iterator over restart points, starting with the caller's guess.
///
/// With every parameter fixed only the guess is produced.
///
/// # Example
///
/// ```
/// use smile_models::calibration::{RestartSequence, ZabrGuess};
///
/// let parameters = ZabrGuess::default().with_fixed_beta(0.5).resolve().unwrap();
/// let starts: Vec<_> = RestartSequence::new(&parameters).take(3).collect();
///
/// assert_eq!(starts[0], *parameters.params());
/// assert!(starts.iter().all(|p| p.beta == 0.5));
/// assert_ne!(starts[1], starts[2]);
/// ```
#[derive(Debug, Clone)]
pub struct RestartSequence {
    parameters: ModelParameters,
    halton: Option<HaltonSequence>,
    emitted_guess: bool,
}

impl RestartSequence {
    /// Restart sequence over the free parameters of `parameters`.
    pub fn new(parameters: &ModelParameters) -> Self {
        Self {
            parameters: *parameters,
            halton: HaltonSequence::new(parameters.free_count(), RESTART_SEED, true),
            emitted_guess: false,
        }
    }

    fn map_sample(&self, sample: &[f64]) -> ZabrParams {
        let mut values = self.parameters.params().to_array();
        let mut samples = sample.iter();
        for (i, value) in values.iter_mut().enumerate() {
            if self.parameters.is_fixed(i) {
                continue;
            }
            let Some(&s) = samples.next() else {
                break;
            };
            *value = match i {
                ZabrParamIndex::ALPHA | ZabrParamIndex::BETA => (1.0 - 2e-6) * s + 1e-6,
                ZabrParamIndex::NU | ZabrParamIndex::GAMMA => 5.0 * s + 1e-6,
                _ => (2.0 * s - 1.0) * (1.0 - 1e-6),
            };
        }
        ZabrParams::from_array(values)
    }
}

impl Iterator for RestartSequence {
    type Item = ZabrParams;

    fn next(&mut self) -> Option<ZabrParams> {
        if !self.emitted_guess {
            self.emitted_guess = true;
            return Some(*self.parameters.params());
        }
        let halton = self.halton.as_mut()?;
        let sample = halton.next_point().to_vec();
        Some(self.map_sample(&sample))
    }
}
