//! Expected Improvement acquisition over random candidates.
//!
//! The default rule used when an optimizer is constructed without one. It
//! assumes the single reserved [`OBJECTIVE`] tag: candidates are drawn
//! uniformly from the search space, scored by Expected Improvement under
//! the objective model's posterior, and the best candidate is returned as
//! a direct acquisition.
//!
//! `EI(x) = (f_best - mean) Φ(z) + std φ(z)` with `z = (f_best - mean) / std`,
//! where `f_best` is the lowest observed objective value, so the rule
//! minimizes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::model::TrainableProbabilisticModel;
use crate::rule::{Acquired, AcquisitionRule};
use crate::space::SearchSpace;
use crate::tag::{Tag, OBJECTIVE};

/// Random-candidate Expected Improvement rule.
///
/// A direct (stateless) rule: it works with any acquisition state type and
/// never produces a state of its own.
///
/// # Examples
///
/// ```
/// use asktell::rule::ei::ExpectedImprovement;
///
/// let rule = ExpectedImprovement::new().candidates(500);
/// ```
pub struct ExpectedImprovement {
    n_candidates: usize,
}

impl ExpectedImprovement {
    /// Creates the rule with the default candidate count of 1000.
    #[must_use]
    pub fn new() -> Self {
        Self { n_candidates: 1000 }
    }

    /// Sets the number of random candidates scored per `ask`.
    #[must_use]
    pub fn candidates(mut self, n_candidates: usize) -> Self {
        self.n_candidates = n_candidates.max(1);
        self
    }
}

impl Default for ExpectedImprovement {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> AcquisitionRule<S> for ExpectedImprovement {
    fn acquire(
        &self,
        space: &dyn SearchSpace,
        models: &HashMap<Tag, Arc<dyn TrainableProbabilisticModel>>,
        datasets: Option<&HashMap<Tag, Dataset>>,
    ) -> Result<Acquired<S>> {
        let model = models.get(&OBJECTIVE).ok_or(Error::UnknownTag(OBJECTIVE))?;
        let dataset = datasets
            .and_then(|datasets| datasets.get(&OBJECTIVE))
            .ok_or(Error::UnknownTag(OBJECTIVE))?;

        let candidates = space.sample(self.n_candidates);

        // With nothing observed yet there is no incumbent to improve on;
        // any candidate is as good as another.
        let Some(f_best) = best_observed(dataset) else {
            let first = candidates.into_iter().next().unwrap_or_default();
            return Ok(Acquired::Points(vec![first]));
        };

        let predictions = model.predict(&candidates)?;
        let best = candidates
            .into_iter()
            .zip(predictions)
            .map(|(candidate, prediction)| {
                let ei = expected_improvement(
                    prediction.mean,
                    prediction.variance.max(0.0).sqrt(),
                    f_best,
                );
                (candidate, ei)
            })
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(candidate, _)| candidate)
            .unwrap_or_default();

        Ok(Acquired::Points(vec![best]))
    }
}

/// The lowest observed objective value, taken over first observation columns.
fn best_observed(dataset: &Dataset) -> Option<f64> {
    dataset
        .observations()
        .iter()
        .filter_map(|row| row.first().copied())
        .min_by(f64::total_cmp)
}

/// Standard normal PDF.
fn norm_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF (Hart rational approximation).
fn norm_cdf(x: f64) -> f64 {
    if x < -8.0 {
        return 0.0;
    }
    if x > 8.0 {
        return 1.0;
    }

    let abs_x = x.abs();
    let t = 1.0 / (1.0 + 0.231_641_9 * abs_x);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let poly = 0.319_381_530 * t - 0.356_563_782 * t2 + 1.781_477_937 * t3 - 1.821_255_978 * t4
        + 1.330_274_429 * t5;
    let cdf = 1.0 - norm_pdf(abs_x) * poly;

    if x >= 0.0 {
        cdf
    } else {
        1.0 - cdf
    }
}

/// Expected Improvement at a point, for minimization.
fn expected_improvement(mean: f64, std: f64, f_best: f64) -> f64 {
    if std < 1e-12 {
        return (f_best - mean).max(0.0);
    }
    let z = (f_best - mean) / std;
    let improvement = (f_best - mean) * norm_cdf(z) + std * norm_pdf(z);
    improvement.max(0.0)
}
