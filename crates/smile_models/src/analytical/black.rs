//! Standard-deviation derivatives of the Black and Bachelier formulas.
//!
//! With `σ√T` written as the total standard deviation `s`:
//!
//! **Black**: ∂C/∂s = F·φ(d₁), d₁ = ln(F/K)/s + s/2
//! **Bachelier**: ∂C/∂s = φ(d), d = (F - K)/s
//!
//! Both are undiscounted and identical for calls and puts.

use smile_core::math::distributions::norm_pdf;

/// Derivative of the undiscounted Black price with respect to the
/// standard deviation `std_dev = σ√T`.
///
/// Returns zero for a zero standard deviation.
///
/// # Examples
/// ```
/// use smile_models::analytical::black_std_dev_derivative;
///
/// // ATM: F·φ(s/2)
/// let vega = black_std_dev_derivative(100.0, 100.0, 0.2);
/// assert!((vega - 100.0 * 0.396_952_547_477_011_8).abs() < 1e-10);
/// ```
pub fn black_std_dev_derivative(strike: f64, forward: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return 0.0;
    }
    let d1 = (forward / strike).ln() / std_dev + 0.5 * std_dev;
    forward * norm_pdf(d1)
}

/// Derivative of the undiscounted Bachelier price with respect to the
/// standard deviation `std_dev = σ_N√T`.
///
/// Returns zero for a zero standard deviation.
pub fn bachelier_std_dev_derivative(strike: f64, forward: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return 0.0;
    }
    norm_pdf((forward - strike) / std_dev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Undiscounted Black call price, for finite differences.
    fn black_call(strike: f64, forward: f64, std_dev: f64) -> f64 {
        use smile_core::math::distributions::norm_cdf;
        let d1 = (forward / strike).ln() / std_dev + 0.5 * std_dev;
        let d2 = d1 - std_dev;
        forward * norm_cdf(d1) - strike * norm_cdf(d2)
    }

    #[test]
    fn test_black_derivative_matches_finite_difference() {
        let (strike, forward, s) = (0.05, 0.04, 0.45);
        let h = 1e-4;
        let fd = (black_call(strike, forward, s + h) - black_call(strike, forward, s - h)) / (2.0 * h);
        // norm_cdf carries ~1e-7 absolute error, so the difference quotient is loose
        assert_relative_eq!(black_std_dev_derivative(strike, forward, s), fd, max_relative = 1e-2);
    }

    #[test]
    fn test_black_derivative_peaks_near_the_money() {
        let forward = 0.04;
        let s = 0.2;
        let atm = black_std_dev_derivative(forward, forward, s);
        assert!(atm > black_std_dev_derivative(0.02, forward, s));
        assert!(atm > black_std_dev_derivative(0.08, forward, s));
    }

    #[test]
    fn test_zero_std_dev() {
        assert_eq!(black_std_dev_derivative(1.0, 1.0, 0.0), 0.0);
        assert_eq!(bachelier_std_dev_derivative(1.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_bachelier_derivative_atm() {
        assert_relative_eq!(
            bachelier_std_dev_derivative(0.03, 0.03, 0.01),
            norm_pdf(0.0),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_bachelier_derivative_symmetric() {
        let up = bachelier_std_dev_derivative(0.05, 0.04, 0.008);
        let down = bachelier_std_dev_derivative(0.03, 0.04, 0.008);
        assert_relative_eq!(up, down, max_relative = 1e-12);
    }
}
