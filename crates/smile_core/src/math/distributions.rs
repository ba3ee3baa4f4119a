//! Standard normal distribution functions.
//!
//! - `norm_pdf`: probability density function
//! - `norm_cdf`: cumulative distribution function
//!
//! Generic over `T: Float` so that both `f32` and `f64` callers share the
//! same implementation.

use num_traits::Float;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

#[inline]
fn constant<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// Complementary error function, Abramowitz and Stegun 7.1.26.
///
/// Maximum absolute error 1.5e-7.
#[inline]
fn erfc_approx<T: Float>(x: T) -> T {
    let one = T::one();
    let abs_x = x.abs();

    let a1 = constant::<T>(0.254829592);
    let a2 = constant::<T>(-0.284496736);
    let a3 = constant::<T>(1.421413741);
    let a4 = constant::<T>(-1.453152027);
    let a5 = constant::<T>(1.061405429);
    let p = constant::<T>(0.3275911);

    let t = one / (one + p * abs_x);
    let poly = a1 + t * (a2 + t * (a3 + t * (a4 + t * a5)));
    let erfc_abs = t * poly * (-abs_x * abs_x).exp();

    // erfc(-x) = 2 - erfc(x)
    if x < T::zero() {
        constant::<T>(2.0) - erfc_abs
    } else {
        erfc_abs
    }
}

/// Standard normal cumulative distribution function.
///
/// Φ(x) = (1/2) * erfc(-x / sqrt(2)), accurate to about 1e-7.
///
/// # Examples
/// ```
/// use smile_core::math::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
/// assert!(norm_cdf(-3.0_f64) < 0.01);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    let arg = -x / constant::<T>(std::f64::consts::SQRT_2);
    constant::<T>(0.5) * erfc_approx(arg)
}

/// Standard normal probability density function.
///
/// # Mathematical Definition
/// φ(x) = (1 / sqrt(2π)) * exp(-x² / 2)
///
/// # Examples
/// ```
/// use smile_core::math::distributions::norm_pdf;
///
/// let pdf_0 = norm_pdf(0.0_f64);
/// assert!((pdf_0 - 0.3989422804).abs() < 1e-7);
///
/// let pdf_1 = norm_pdf(1.0_f64);
/// assert!((pdf_1 - 0.2419707245).abs() < 1e-7);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    constant::<T>(FRAC_1_SQRT_2PI) * (-constant::<T>(0.5) * x * x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_norm_pdf_peak() {
        assert_relative_eq!(norm_pdf(0.0_f64), FRAC_1_SQRT_2PI, epsilon = 1e-15);
    }

    #[test]
    fn test_norm_pdf_f32() {
        assert!((norm_pdf(1.0_f32) - 0.241_970_7).abs() < 1e-6);
    }

    #[test]
    fn test_norm_pdf_tails_vanish() {
        assert!(norm_pdf(40.0_f64) == 0.0);
        assert!(norm_pdf(-40.0_f64) == 0.0);
    }

    #[test]
    fn test_norm_pdf_integrates_to_one() {
        // Trapezoidal rule on [-10, 10]
        let n = 20_000;
        let h = 20.0 / n as f64;
        let integral: f64 = (0..=n)
            .map(|i| {
                let w = if i == 0 || i == n { 0.5 } else { 1.0 };
                w * norm_pdf(-10.0 + i as f64 * h)
            })
            .sum::<f64>()
            * h;
        assert_relative_eq!(integral, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_norm_cdf_known_values() {
        assert_relative_eq!(norm_cdf(0.0_f64), 0.5, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(1.0_f64), 0.841_344_746, epsilon = 1e-6);
        assert_relative_eq!(norm_cdf(-1.96_f64), 0.024_997_895, epsilon = 1e-6);
    }

    proptest! {
        #[test]
        fn prop_norm_cdf_symmetric(x in -8.0_f64..8.0) {
            prop_assert!((norm_cdf(x) + norm_cdf(-x) - 1.0).abs() < 1e-7);
        }

        #[test]
        fn prop_norm_pdf_symmetric(x in -20.0_f64..20.0) {
            prop_assert!((norm_pdf(x) - norm_pdf(-x)).abs() < 1e-15);
        }

        #[test]
        fn prop_norm_pdf_bounded(x in -50.0_f64..50.0) {
            let p = norm_pdf(x);
            prop_assert!(p >= 0.0 && p <= FRAC_1_SQRT_2PI);
        }
    }
}
