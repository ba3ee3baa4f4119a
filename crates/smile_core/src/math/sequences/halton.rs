//! Halton sequence.

use super::LowDiscrepancySequence;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// First primes, one base per dimension.
const PRIMES: [u64; 32] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131,
];

/// Halton low-discrepancy sequence.
///
/// Coordinate `i` of point `n` is the radical inverse of `n + start[i]` in
/// the `i`-th prime base. With a random start, `start[i]` is drawn once from
/// a generator seeded with `seed`; otherwise it is zero and the first point
/// is the radical inverse of 1.
///
/// # Example
///
/// ```
/// use smile_core::math::sequences::{HaltonSequence, LowDiscrepancySequence};
///
/// let mut halton = HaltonSequence::new(2, 0, false).unwrap();
/// assert_eq!(halton.next_point(), &[0.5, 1.0 / 3.0]);
/// assert_eq!(halton.next_point(), &[0.25, 2.0 / 3.0]);
/// ```
#[derive(Debug, Clone)]
pub struct HaltonSequence {
    start: Vec<u64>,
    counter: u64,
    point: Vec<f64>,
}

impl HaltonSequence {
    /// Largest supported dimension.
    pub const MAX_DIMENSION: usize = PRIMES.len();

    /// Create a sequence of the given dimension.
    ///
    /// Returns `None` when `dimension` is zero or exceeds
    /// [`HaltonSequence::MAX_DIMENSION`].
    pub fn new(dimension: usize, seed: u64, random_start: bool) -> Option<Self> {
        if dimension == 0 || dimension > Self::MAX_DIMENSION {
            return None;
        }

        let start = if random_start {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..dimension)
                .map(|_| u64::from(rng.gen::<u32>()))
                .collect()
        } else {
            vec![0; dimension]
        };

        Some(Self {
            start,
            counter: 0,
            point: vec![0.0; dimension],
        })
    }
}

impl LowDiscrepancySequence for HaltonSequence {
    fn dimension(&self) -> usize {
        self.point.len()
    }

    fn next_point(&mut self) -> &[f64] {
        self.counter += 1;
        for (i, x) in self.point.iter_mut().enumerate() {
            *x = radical_inverse(self.counter + self.start[i], PRIMES[i]);
        }
        &self.point
    }
}

/// Van der Corput radical inverse of `n` in `base`.
fn radical_inverse(mut n: u64, base: u64) -> f64 {
    let inv_base = 1.0 / base as f64;
    let mut factor = inv_base;
    let mut value = 0.0;
    while n > 0 {
        value += (n % base) as f64 * factor;
        n /= base;
        factor *= inv_base;
    }
    value
}
