//! Immutable snapshots of optimizer state.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::model::TrainableProbabilisticModel;
use crate::tag::Tag;

/// Returns the sole value of a mapping, failing when the tag set is
/// anything but a singleton.
pub(crate) fn single_value<V>(map: &HashMap<Tag, V>) -> Result<&V> {
    let mut values = map.values();
    match (values.next(), values.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(Error::AmbiguousTag { count: map.len() }),
    }
}

/// An immutable snapshot of an optimizer's datasets, models, and
/// acquisition state.
///
/// A record is a raw snapshot: it places no constraints of its own on the
/// tag sets. The optimizer that produced it keeps dataset and model tags
/// synchronized per its invariants, and
/// [`AskTellOptimizer::from_record`](crate::AskTellOptimizer::from_record)
/// re-validates on reconstruction.
#[derive(Clone)]
pub struct Record<S> {
    /// Datasets at the moment of snapshotting.
    pub datasets: HashMap<Tag, Dataset>,
    /// Models at the moment of snapshotting.
    pub models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>>,
    /// Acquisition state at the moment of snapshotting, if any.
    pub acquisition_state: Option<S>,
}

impl<S> Record<S> {
    /// Creates a record from its parts.
    #[must_use]
    pub fn new(
        datasets: HashMap<Tag, Dataset>,
        models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>>,
        acquisition_state: Option<S>,
    ) -> Self {
        Self {
            datasets,
            models,
            acquisition_state,
        }
    }

    /// Returns the sole dataset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousTag`] unless exactly one dataset tag is
    /// present.
    pub fn dataset(&self) -> Result<&Dataset> {
        single_value(&self.datasets)
    }

    /// Returns the sole model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousTag`] unless exactly one model tag is
    /// present.
    pub fn model(&self) -> Result<&Arc<dyn TrainableProbabilisticModel>> {
        single_value(&self.models)
    }
}

impl<S> fmt::Debug for Record<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dataset_tags: Vec<&Tag> = self.datasets.keys().collect();
        dataset_tags.sort();
        let mut model_tags: Vec<&Tag> = self.models.keys().collect();
        model_tags.sort();
        f.debug_struct("Record")
            .field("dataset_tags", &dataset_tags)
            .field("model_tags", &model_tags)
            .field("has_acquisition_state", &self.acquisition_state.is_some())
            .finish()
    }
}

/// The outcome of an optimization: a history of records and either a final
/// record or the failure that ended the run.
pub struct OptimizationResult<S> {
    /// The final record, or the captured failure.
    pub final_result: core::result::Result<Record<S>, Error>,
    /// Earlier records, oldest first. The final record is not repeated here.
    pub history: Vec<Record<S>>,
}

impl<S> OptimizationResult<S> {
    /// Creates a successful result.
    #[must_use]
    pub fn ok(record: Record<S>, history: Vec<Record<S>>) -> Self {
        Self {
            final_result: Ok(record),
            history,
        }
    }

    /// Creates a failed result carrying the partial history.
    #[must_use]
    pub fn failed(error: Error, history: Vec<Record<S>>) -> Self {
        Self {
            final_result: Err(error),
            history,
        }
    }

    /// Returns `true` if the result holds a final record.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.final_result.is_ok()
    }

    /// Returns the final record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFinalRecord`] for a failed result.
    pub fn final_record(&self) -> Result<&Record<S>> {
        self.final_result.as_ref().map_err(|_| Error::NoFinalRecord)
    }

    /// Returns the final record's sole dataset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFinalRecord`] for a failed result, or
    /// [`Error::AmbiguousTag`] when more than one dataset tag is present.
    pub fn try_get_final_dataset(&self) -> Result<&Dataset> {
        self.final_record()?.dataset()
    }

    /// Returns the final record's sole model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFinalRecord`] for a failed result, or
    /// [`Error::AmbiguousTag`] when more than one model tag is present.
    pub fn try_get_final_model(&self) -> Result<&Arc<dyn TrainableProbabilisticModel>> {
        self.final_record()?.model()
    }
}

impl<S> fmt::Debug for OptimizationResult<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizationResult")
            .field("final_result", &self.final_result.as_ref().map(|_| "record"))
            .field("history_len", &self.history.len())
            .finish()
    }
}
