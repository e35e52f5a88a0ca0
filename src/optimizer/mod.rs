//! The ask/tell optimization core.
//!
//! [`AskTellOptimizer`] gives the caller full control over the optimization
//! loop: `ask` for the next batch of query points, evaluate them with any
//! external machinery, `tell` the observed outcomes back, repeat. The
//! optimizer owns the mapping from [`Tag`]s to datasets and models, keeps
//! the two in lockstep, drives the acquisition rule, and retrains models as
//! data accumulates.
//!
//! State can be exported at any point with [`to_record`] and an equivalent
//! optimizer rebuilt later with [`from_record`], which is how checkpointing
//! and distributed execution are layered on top of this core.
//!
//! [`to_record`]: AskTellOptimizer::to_record
//! [`from_record`]: AskTellOptimizer::from_record

#[cfg(feature = "serde")]
mod checkpoint;
mod record;

use core::fmt;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

#[cfg(feature = "serde")]
pub use checkpoint::{Checkpoint, CHECKPOINT_VERSION};
pub use record::{OptimizationResult, Record};

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::model::TrainableProbabilisticModel;
use crate::rule::ei::ExpectedImprovement;
use crate::rule::{Acquired, AcquisitionRule, QueryPoints};
use crate::space::SearchSpace;
use crate::tag::{LocalizedTag, Tag, OBJECTIVE};

/// Conversion into a tagged dataset mapping.
///
/// A bare [`Dataset`] is keyed under [`OBJECTIVE`]; a mapping passes
/// through unchanged.
pub trait IntoTaggedDatasets {
    /// Performs the conversion.
    fn into_tagged_datasets(self) -> HashMap<Tag, Dataset>;
}

impl IntoTaggedDatasets for Dataset {
    fn into_tagged_datasets(self) -> HashMap<Tag, Dataset> {
        HashMap::from([(OBJECTIVE, self)])
    }
}

impl IntoTaggedDatasets for HashMap<Tag, Dataset> {
    fn into_tagged_datasets(self) -> HashMap<Tag, Dataset> {
        self
    }
}

/// The stateful ask/tell optimizer.
///
/// `S` is the acquisition state type threaded across `ask` calls for
/// stateful rules; it defaults to `()` so optimizers over direct rules can
/// be annotated as plain `AskTellOptimizer`.
///
/// # Examples
///
/// ```
/// use asktell::rule::{Acquired, AcquisitionRule};
/// use asktell::{
///     AskTellOptimizer, BoxSpace, Dataset, Prediction, ProbabilisticModel, SearchSpace, Tag,
///     TrainableProbabilisticModel,
/// };
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// struct ConstantModel;
///
/// impl ProbabilisticModel for ConstantModel {
///     fn predict(&self, query_points: &[Vec<f64>]) -> asktell::Result<Vec<Prediction>> {
///         Ok(query_points
///             .iter()
///             .map(|_| Prediction { mean: 0.0, variance: 1.0 })
///             .collect())
///     }
/// }
///
/// impl TrainableProbabilisticModel for ConstantModel {}
///
/// struct Midpoint;
///
/// impl<S: 'static> AcquisitionRule<S> for Midpoint {
///     fn acquire(
///         &self,
///         _space: &dyn SearchSpace,
///         _models: &HashMap<Tag, Arc<dyn TrainableProbabilisticModel>>,
///         _datasets: Option<&HashMap<Tag, Dataset>>,
///     ) -> asktell::Result<Acquired<S>> {
///         Ok(Acquired::Points(vec![vec![0.0]]))
///     }
/// }
///
/// let space = BoxSpace::new(vec![-1.0], vec![1.0]).unwrap();
/// let init = Dataset::new(vec![vec![0.5]], vec![vec![0.25]]).unwrap();
///
/// let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(space)
///     .dataset(init)
///     .model(ConstantModel)
///     .rule(Midpoint)
///     .build()
///     .unwrap();
///
/// let points = ask_tell.ask().unwrap();
/// let observed = Dataset::new(points, vec![vec![0.0]]).unwrap();
/// ask_tell.tell(observed).unwrap();
/// assert_eq!(ask_tell.dataset().unwrap().len(), 2);
/// ```
pub struct AskTellOptimizer<S: 'static = ()> {
    search_space: Box<dyn SearchSpace>,
    datasets: HashMap<Tag, Dataset>,
    models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>>,
    rule: Box<dyn AcquisitionRule<S>>,
    acquisition_state: Option<S>,
}

impl<S: 'static> AskTellOptimizer<S> {
    /// Returns a builder for constructing an optimizer.
    ///
    /// A bare dataset or model set via [`dataset`] / [`model`] is tracked
    /// under [`OBJECTIVE`]. When no rule is supplied, the default
    /// [`ExpectedImprovement`] rule is used, which requires the tag set to
    /// be exactly `{OBJECTIVE}`.
    ///
    /// [`dataset`]: AskTellOptimizerBuilder::dataset
    /// [`model`]: AskTellOptimizerBuilder::model
    #[must_use]
    pub fn builder(search_space: impl SearchSpace + 'static) -> AskTellOptimizerBuilder<S> {
        AskTellOptimizerBuilder {
            search_space: Box::new(search_space),
            datasets: HashMap::new(),
            models: HashMap::new(),
            rule: None,
            acquisition_state: None,
            fit_model: true,
        }
    }

    /// Reconstructs an optimizer from a previously exported record.
    ///
    /// The restored optimizer shares the record's model values and carries
    /// its acquisition state. Models are assumed to be already trained and
    /// are **not** refitted; to refit after restoring, construct through
    /// [`builder`](Self::builder) with `fit_model(true)`.
    ///
    /// # Errors
    ///
    /// Fails with the same configuration errors as building an optimizer
    /// from the record's datasets and models directly.
    pub fn from_record(
        record: Record<S>,
        search_space: impl SearchSpace + 'static,
        rule: impl AcquisitionRule<S> + 'static,
    ) -> Result<Self> {
        let Record {
            datasets,
            models,
            acquisition_state,
        } = record;
        let mut builder = Self::builder(search_space)
            .datasets(datasets)
            .models(models)
            .rule(rule)
            .fit_model(false);
        if let Some(state) = acquisition_state {
            builder = builder.acquisition_state(state);
        }
        builder.build()
    }

    /// Requests the next batch of query points from the acquisition rule.
    ///
    /// For a direct rule the points are returned as-is and the acquisition
    /// state is untouched. For a stateful rule, the suspended computation
    /// is resumed with the currently held state (none on the very first
    /// call unless one was supplied at construction), and the state it
    /// yields replaces the held state before the points are returned.
    /// State is consumed and replaced exactly once per call.
    ///
    /// # Errors
    ///
    /// Rule failures propagate unchanged; the held acquisition state is
    /// left as it was.
    pub fn ask(&mut self) -> Result<QueryPoints> {
        let acquired =
            self.rule
                .acquire(self.search_space.as_ref(), &self.models, Some(&self.datasets))?;
        match acquired {
            Acquired::Points(points) => {
                trace_info!(num_points = points.len(), "acquired query points");
                Ok(points)
            }
            Acquired::Stateful(resume) => {
                let (state, points) = resume(self.acquisition_state.as_ref())?;
                self.acquisition_state = Some(state);
                trace_info!(num_points = points.len(), "acquired query points with new state");
                Ok(points)
            }
        }
    }

    /// Folds newly observed data into the tracked datasets and retrains
    /// every model on its routed dataset.
    ///
    /// Each supplied tag's dataset is replaced by the concatenation of the
    /// old dataset and the new data. For a rule operating over local
    /// datasets, a localized tag with no entry of its own extends its base
    /// tag's dataset instead. After the datasets are replaced, every model
    /// is retrained: `update` with the routed dataset, then `optimize`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTag`] if any supplied tag is not tracked,
    /// and shape errors if new data does not line up with the tracked
    /// data. All tags are validated and all concatenations staged before
    /// any tracked dataset is replaced, so a failed call leaves every
    /// dataset unchanged. Model training failures propagate unchanged.
    pub fn tell(&mut self, new_data: impl IntoTaggedDatasets) -> Result<()> {
        let local_rule = self.rule.num_local_datasets().is_some();

        let mut entries: Vec<(Tag, Dataset)> =
            new_data.into_tagged_datasets().into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut staged: HashMap<Tag, Dataset> = HashMap::new();
        for (tag, data) in entries {
            let target = if self.datasets.contains_key(&tag) {
                tag
            } else {
                let localized = LocalizedTag::from_tag(&tag);
                if local_rule
                    && localized.is_local()
                    && self.datasets.contains_key(&localized.global)
                {
                    localized.global
                } else {
                    return Err(Error::UnknownTag(tag));
                }
            };
            let base = match staged.get(&target) {
                Some(current) => current,
                None => self
                    .datasets
                    .get(&target)
                    .ok_or_else(|| Error::UnknownTag(target.clone()))?,
            };
            let merged = base.concat(&data)?;
            staged.insert(target, merged);
        }

        for (tag, merged) in staged {
            trace_debug!(tag = %tag, rows = merged.len(), "dataset extended");
            self.datasets.insert(tag, merged);
        }

        self.fit_models()
    }

    /// Builds a [`Record`] of the current state.
    ///
    /// With `copy = true` every model is deep-copied, so the record is
    /// fully independent of this optimizer's future mutation. With
    /// `copy = false` the record shares the live model values; no copy is
    /// attempted, so models without copy support never fail this path.
    /// Datasets are values and are captured as of the snapshot either way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CopyUnsupported`] if `copy` is `true` and a model
    /// does not support copying.
    pub fn to_record(&self, copy: bool) -> Result<Record<S>>
    where
        S: Clone,
    {
        let models = if copy {
            let mut copied: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>> =
                HashMap::with_capacity(self.models.len());
            for (tag, model) in &self.models {
                let clone = model
                    .try_clone()
                    .ok_or_else(|| Error::CopyUnsupported { tag: tag.clone() })?;
                copied.insert(tag.clone(), clone);
            }
            copied
        } else {
            self.models.clone()
        };
        Ok(Record {
            datasets: self.datasets.clone(),
            models,
            acquisition_state: self.acquisition_state.clone(),
        })
    }

    /// Builds a successful [`OptimizationResult`] of the current state.
    ///
    /// # Errors
    ///
    /// A copy failure from [`to_record`](Self::to_record) propagates
    /// directly rather than being captured in the result.
    pub fn to_result(&self, copy: bool) -> Result<OptimizationResult<S>>
    where
        S: Clone,
    {
        let record = self.to_record(copy)?;
        Ok(OptimizationResult::ok(record, Vec::new()))
    }

    /// Returns the tracked datasets.
    ///
    /// The returned mapping is a fresh copy; mutating it does not affect
    /// the optimizer.
    #[must_use]
    pub fn datasets(&self) -> HashMap<Tag, Dataset> {
        self.datasets.clone()
    }

    /// Returns the sole tracked dataset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousTag`] unless exactly one dataset tag is
    /// tracked.
    pub fn dataset(&self) -> Result<&Dataset> {
        record::single_value(&self.datasets)
    }

    /// Returns the tracked models.
    ///
    /// The returned mapping is a fresh copy whose values alias the live
    /// models; mutating the mapping does not affect the optimizer.
    #[must_use]
    pub fn models(&self) -> HashMap<Tag, Arc<dyn TrainableProbabilisticModel>> {
        self.models.clone()
    }

    /// Returns the sole tracked model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousTag`] unless exactly one model tag is
    /// tracked.
    pub fn model(&self) -> Result<&Arc<dyn TrainableProbabilisticModel>> {
        record::single_value(&self.models)
    }

    /// Replaces the tracked models wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyModels`] for an empty mapping and
    /// [`Error::TagSetChanged`] if the new mapping's tag set is not
    /// exactly the tracked tag set. Partial replacement is not possible
    /// through this path.
    pub fn set_models(
        &mut self,
        models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>>,
    ) -> Result<()> {
        if models.is_empty() {
            return Err(Error::EmptyModels);
        }
        let expected: BTreeSet<Tag> = self.models.keys().cloned().collect();
        let got: BTreeSet<Tag> = models.keys().cloned().collect();
        if expected != got {
            return Err(Error::TagSetChanged {
                expected: expected.into_iter().collect(),
                got: got.into_iter().collect(),
            });
        }
        self.models = models;
        Ok(())
    }

    /// Replaces the sole tracked model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TagSetChanged`] unless the tracked model tag set
    /// is exactly `{OBJECTIVE}`.
    pub fn set_model(&mut self, model: impl TrainableProbabilisticModel + 'static) -> Result<()> {
        if self.models.len() != 1 || !self.models.contains_key(&OBJECTIVE) {
            let mut expected: Vec<Tag> = self.models.keys().cloned().collect();
            expected.sort();
            return Err(Error::TagSetChanged {
                expected,
                got: vec![OBJECTIVE],
            });
        }
        self.models.insert(OBJECTIVE, Arc::new(model));
        Ok(())
    }

    /// Returns the current acquisition state, if any.
    #[must_use]
    pub fn acquisition_state(&self) -> Option<&S> {
        self.acquisition_state.as_ref()
    }

    /// Returns the search space.
    #[must_use]
    pub fn search_space(&self) -> &dyn SearchSpace {
        self.search_space.as_ref()
    }

    /// Retrains every model on its routed dataset: `update`, then
    /// `optimize`.
    fn fit_models(&self) -> Result<()> {
        for (tag, model) in &self.models {
            let dataset = self.routed_dataset(tag, model.uses_global_dataset())?;
            model.update(dataset)?;
            model.optimize(dataset)?;
            trace_debug!(tag = %tag, rows = dataset.len(), "model retrained");
        }
        Ok(())
    }

    /// Selects the dataset a model keyed by `tag` trains on.
    ///
    /// Global models train on their own tag's dataset. A model keyed by a
    /// localized tag trains on that tag's entry, falling back to the base
    /// tag's dataset when no local entry exists, unless the model opts
    /// into consuming the global dataset outright.
    fn routed_dataset(&self, tag: &Tag, uses_global: bool) -> Result<&Dataset> {
        let localized = LocalizedTag::from_tag(tag);
        let dataset = if localized.is_local() && uses_global {
            self.datasets.get(&localized.global)
        } else if localized.is_local() {
            self.datasets
                .get(tag)
                .or_else(|| self.datasets.get(&localized.global))
        } else {
            self.datasets.get(tag)
        };
        dataset.ok_or_else(|| Error::UnknownTag(tag.clone()))
    }
}

impl<S: 'static> fmt::Debug for AskTellOptimizer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&Tag> = self.datasets.keys().collect();
        tags.sort();
        f.debug_struct("AskTellOptimizer")
            .field("tags", &tags)
            .field("has_acquisition_state", &self.acquisition_state.is_some())
            .finish()
    }
}

/// Builder for [`AskTellOptimizer`], created by
/// [`AskTellOptimizer::builder`].
pub struct AskTellOptimizerBuilder<S: 'static = ()> {
    search_space: Box<dyn SearchSpace>,
    datasets: HashMap<Tag, Dataset>,
    models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>>,
    rule: Option<Box<dyn AcquisitionRule<S>>>,
    acquisition_state: Option<S>,
    fit_model: bool,
}

impl<S: 'static> AskTellOptimizerBuilder<S> {
    /// Tracks a single dataset under [`OBJECTIVE`].
    #[must_use]
    pub fn dataset(self, dataset: Dataset) -> Self {
        self.datasets(dataset.into_tagged_datasets())
    }

    /// Tracks a mapping of datasets, replacing any previously set.
    #[must_use]
    pub fn datasets(mut self, datasets: HashMap<Tag, Dataset>) -> Self {
        self.datasets = datasets;
        self
    }

    /// Tracks a single model under [`OBJECTIVE`].
    #[must_use]
    pub fn model(mut self, model: impl TrainableProbabilisticModel + 'static) -> Self {
        self.models = HashMap::from([(
            OBJECTIVE,
            Arc::new(model) as Arc<dyn TrainableProbabilisticModel>,
        )]);
        self
    }

    /// Tracks a mapping of models, replacing any previously set.
    #[must_use]
    pub fn models(mut self, models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>>) -> Self {
        self.models = models;
        self
    }

    /// Sets the acquisition rule.
    #[must_use]
    pub fn rule(mut self, rule: impl AcquisitionRule<S> + 'static) -> Self {
        self.rule = Some(Box::new(rule));
        self
    }

    /// Sets the initial acquisition state, treated identically to state
    /// produced by a prior `ask`.
    #[must_use]
    pub fn acquisition_state(mut self, state: S) -> Self {
        self.acquisition_state = Some(state);
        self
    }

    /// Controls whether models are fitted at construction (default `true`).
    #[must_use]
    pub fn fit_model(mut self, fit_model: bool) -> Self {
        self.fit_model = fit_model;
        self
    }

    /// Validates the configuration and constructs the optimizer.
    ///
    /// Dataset and model tag sets must cover the same objectives and
    /// constraints, compared by base tag so that batch-local entries line
    /// up with their global counterparts. For a rule operating over `n`
    /// local datasets, each global dataset entry is expanded with local
    /// entries `0..n` replicating it, keeping the global entry alongside.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDatasets`] / [`Error::EmptyModels`] for empty
    /// mappings, [`Error::DefaultRuleTags`] when no rule is supplied and
    /// the tag set is not exactly `{OBJECTIVE}`, and [`Error::TagMismatch`]
    /// when dataset and model tags diverge. Model training failures during
    /// the initial fit propagate unchanged.
    pub fn build(self) -> Result<AskTellOptimizer<S>> {
        let Self {
            search_space,
            mut datasets,
            models,
            rule,
            acquisition_state,
            fit_model,
        } = self;

        if datasets.is_empty() {
            return Err(Error::EmptyDatasets);
        }
        if models.is_empty() {
            return Err(Error::EmptyModels);
        }

        let dataset_tags = global_tags(&datasets);
        let model_tags = global_tags(&models);

        let rule: Box<dyn AcquisitionRule<S>> = match rule {
            Some(rule) => rule,
            None => {
                if dataset_tags.len() != 1 || !dataset_tags.contains(&OBJECTIVE) {
                    return Err(Error::DefaultRuleTags {
                        tags: dataset_tags.into_iter().collect(),
                    });
                }
                Box::new(ExpectedImprovement::new())
            }
        };

        if dataset_tags != model_tags {
            return Err(Error::TagMismatch {
                dataset_tags: dataset_tags.into_iter().collect(),
                model_tags: model_tags.into_iter().collect(),
            });
        }

        if let Some(num_local_datasets) = rule.num_local_datasets() {
            expand_local_datasets(&mut datasets, num_local_datasets);
        }

        let optimizer = AskTellOptimizer {
            search_space,
            datasets,
            models,
            rule,
            acquisition_state,
        };
        if fit_model {
            optimizer.fit_models()?;
            trace_info!(num_models = optimizer.models.len(), "initial models fitted");
        }
        Ok(optimizer)
    }
}

/// The set of base tags of a mapping, with localization stripped.
fn global_tags<V>(map: &HashMap<Tag, V>) -> BTreeSet<Tag> {
    map.keys()
        .map(|tag| LocalizedTag::from_tag(tag).global)
        .collect()
}

/// Adds `LocalizedTag(tag, 0..n)` entries replicating each global entry,
/// leaving existing local entries untouched.
fn expand_local_datasets(datasets: &mut HashMap<Tag, Dataset>, num_local_datasets: usize) {
    let global: Vec<(Tag, Dataset)> = datasets
        .iter()
        .filter(|(tag, _)| !LocalizedTag::from_tag(tag).is_local())
        .map(|(tag, dataset)| (tag.clone(), dataset.clone()))
        .collect();
    for (tag, dataset) in global {
        for index in 0..num_local_datasets {
            let local = LocalizedTag::new(tag.clone(), index).to_tag();
            datasets.entry(local).or_insert_with(|| dataset.clone());
        }
    }
}
