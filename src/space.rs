//! Search space over which query points are selected.

use parking_lot::Mutex;

use crate::error::{Error, Result};

/// The domain an acquisition rule selects query points from.
///
/// The optimizer itself only carries the space through to its acquisition
/// rule; rules decide how (and whether) to sample from it.
pub trait SearchSpace: Send + Sync {
    /// Returns the number of coordinates in a point of this space.
    fn dimension(&self) -> usize;

    /// Draws `n` points from the space.
    fn sample(&self, n: usize) -> Vec<Vec<f64>>;

    /// Returns `true` if `point` lies within the space.
    fn contains(&self, point: &[f64]) -> bool;
}

/// An axis-aligned box `[lower, upper]` with uniform sampling.
///
/// # Examples
///
/// ```
/// use asktell::{BoxSpace, SearchSpace};
///
/// let space = BoxSpace::with_seed(vec![-1.0], vec![1.0], 42).unwrap();
/// let points = space.sample(10);
/// assert_eq!(points.len(), 10);
/// assert!(points.iter().all(|p| space.contains(p)));
/// ```
pub struct BoxSpace {
    lower: Vec<f64>,
    upper: Vec<f64>,
    rng: Mutex<fastrand::Rng>,
}

impl BoxSpace {
    /// Creates a box space with a default random seed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BoundsLengthMismatch`] if the bound vectors have
    /// different lengths, or [`Error::InvalidBounds`] if any lower bound
    /// exceeds its upper bound.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        Self::with_rng(lower, upper, fastrand::Rng::new())
    }

    /// Creates a box space with a fixed seed for reproducible sampling.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_seed(lower: Vec<f64>, upper: Vec<f64>, seed: u64) -> Result<Self> {
        Self::with_rng(lower, upper, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(lower: Vec<f64>, upper: Vec<f64>, rng: fastrand::Rng) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(Error::BoundsLengthMismatch {
                lower: lower.len(),
                upper: upper.len(),
            });
        }
        for (&low, &high) in lower.iter().zip(&upper) {
            if low > high {
                return Err(Error::InvalidBounds { low, high });
            }
        }
        Ok(Self {
            lower,
            upper,
            rng: Mutex::new(rng),
        })
    }

    /// Returns the lower bounds.
    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Returns the upper bounds.
    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }
}

impl SearchSpace for BoxSpace {
    fn dimension(&self) -> usize {
        self.lower.len()
    }

    fn sample(&self, n: usize) -> Vec<Vec<f64>> {
        let mut rng = self.rng.lock();
        (0..n)
            .map(|_| {
                self.lower
                    .iter()
                    .zip(&self.upper)
                    .map(|(&low, &high)| low + rng.f64() * (high - low))
                    .collect()
            })
            .collect()
    }

    fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.lower.len()
            && point
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(&x, (&low, &high))| x >= low && x <= high)
    }
}
