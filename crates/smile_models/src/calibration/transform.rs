//! Map between unconstrained optimiser coordinates and ZABR parameters.
//!
//! The optimiser works on all of ℝ⁵; [`ParameterTransform::direct`] folds
//! any point into the parameter domain, saturating large magnitudes:
//!
//! | Parameter | `direct(x)`                 | saturated value |
//! |-----------|-----------------------------|-----------------|
//! | alpha     | x0² + ε  (\|x0\| < 5)        | 25              |
//! | beta      | exp(-x1²) (\|x1\| < 1000)    | ε               |
//! | nu        | x2² + ε  (\|x2\| < 5)        | 25              |
//! | rho       | 0.9999 sin(x3) (\|x3\| < 10) | ε               |
//! | gamma     | x4² + ε  (\|x4\| < 5)        | 25              |
//!
//! with ε = 1e-7. A non-finite coordinate saturates as well, and beta is
//! kept above the smallest positive normal `f64` where `exp(-x1²)`
//! would underflow.

use crate::models::zabr::ZabrParams;

/// Floor added to squared coordinates.
pub const EPSILON_FLOOR: f64 = 1e-7;

/// Correlation saturation.
pub const RHO_SATURATION: f64 = 0.9999;

/// Value of a squared coordinate whose magnitude is 5 or more.
const SQUARE_CAP: f64 = 25.0;

/// Bijection (within working tolerance) between ℝ⁵ and the ZABR domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterTransform;

impl ParameterTransform {
    /// Unconstrained coordinates to in-domain parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use smile_models::calibration::ParameterTransform;
    ///
    /// let params = ParameterTransform::direct(&[1e6, -1e6, f64::NAN, 3.0, 0.0]);
    /// assert_eq!(params.alpha, 25.0);
    /// assert!(params.beta > 0.0 && params.beta <= 1.0);
    /// assert!(params.rho.abs() < 1.0);
    /// ```
    pub fn direct(x: &[f64; 5]) -> ZabrParams {
        ZabrParams {
            alpha: square_with_floor(x[0]),
            // exp(-x²) underflows for |x| > 27
            beta: if x[1].abs() < 1000.0 {
                (-x[1] * x[1]).exp().max(f64::MIN_POSITIVE)
            } else {
                EPSILON_FLOOR
            },
            nu: square_with_floor(x[2]),
            rho: if x[3].abs() < 10.0 {
                RHO_SATURATION * x[3].sin()
            } else {
                EPSILON_FLOOR
            },
            gamma: square_with_floor(x[4]),
        }
    }

    /// In-domain parameters to unconstrained coordinates.
    ///
    /// Accurate near the image of [`ParameterTransform::direct`]; inputs are
    /// clamped into the domain of each inverse function.
    pub fn inverse(params: &ZabrParams) -> [f64; 5] {
        [
            (params.alpha - EPSILON_FLOOR).max(0.0).sqrt(),
            (-params.beta.clamp(f64::MIN_POSITIVE, 1.0).ln()).sqrt(),
            (params.nu - EPSILON_FLOOR).max(0.0).sqrt(),
            (params.rho / RHO_SATURATION).clamp(-1.0, 1.0).asin(),
            (params.gamma - EPSILON_FLOOR).max(0.0).sqrt(),
        ]
    }
}

#[inline]
fn square_with_floor(x: f64) -> f64 {
    if x.abs() < 5.0 {
        x * x + EPSILON_FLOOR
    } else {
        SQUARE_CAP
    }
}
