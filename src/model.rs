//! Probabilistic surrogate model interfaces.
//!
//! The optimizer treats models as opaque strategies behind these traits.
//! Training and prediction machinery belongs to the implementations; the
//! core only drives the hooks at the right moments:
//!
//! | Hook | When the optimizer calls it |
//! |------|-----------------------------|
//! | [`update`](TrainableProbabilisticModel::update) | before every retrain, with the routed dataset |
//! | [`optimize`](TrainableProbabilisticModel::optimize) | on construction (when fitting is enabled) and after every `tell` |
//! | [`try_clone`](TrainableProbabilisticModel::try_clone) | when a snapshot requests copied state |
//!
//! Methods take `&self`; implementations with trainable state use interior
//! mutability (e.g. `parking_lot::Mutex`) so a single model value can be
//! shared between a live optimizer and the records it has produced.

use std::sync::Arc;

use crate::data::Dataset;
use crate::error::Result;

/// The posterior at a single query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    /// Posterior mean.
    pub mean: f64,
    /// Posterior variance.
    pub variance: f64,
}

/// A model that predicts a distribution over outcomes at query points.
pub trait ProbabilisticModel: Send + Sync {
    /// Returns the posterior mean and variance at each query point.
    ///
    /// # Errors
    ///
    /// Prediction failures propagate unchanged to the caller.
    fn predict(&self, query_points: &[Vec<f64>]) -> Result<Vec<Prediction>>;
}

/// A [`ProbabilisticModel`] the optimizer can retrain as data accumulates.
///
/// All methods have defaults, so an implementation opts into exactly the
/// capabilities it has: `update` and `optimize` default to no-ops, and
/// `try_clone` defaults to "copying unsupported".
pub trait TrainableProbabilisticModel: ProbabilisticModel {
    /// Incrementally folds a dataset into the model.
    ///
    /// Called with the routed dataset for this model's tag immediately
    /// before [`optimize`](Self::optimize).
    ///
    /// # Errors
    ///
    /// Training failures propagate unchanged to the caller.
    fn update(&self, dataset: &Dataset) -> Result<()> {
        let _ = dataset;
        Ok(())
    }

    /// Retrains the model on the full accumulated dataset.
    ///
    /// # Errors
    ///
    /// Training failures propagate unchanged to the caller.
    fn optimize(&self, dataset: &Dataset) -> Result<()> {
        let _ = dataset;
        Ok(())
    }

    /// Returns a deep copy of this model, or `None` if the model does not
    /// support copying.
    ///
    /// Snapshots taken with `copy = true` fail with
    /// [`Error::CopyUnsupported`](crate::Error::CopyUnsupported) for models
    /// that return `None`; snapshots taken with `copy = false` never call
    /// this method.
    fn try_clone(&self) -> Option<Arc<dyn TrainableProbabilisticModel>> {
        None
    }

    /// Returns `true` if this model consumes its base tag's full dataset
    /// even when keyed by a batch-local tag.
    fn uses_global_dataset(&self) -> bool {
        false
    }
}
