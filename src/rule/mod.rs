//! Acquisition rule contract and the built-in default rule.
//!
//! An acquisition rule is the pluggable strategy that selects the next
//! batch of query points from the current models, datasets, and search
//! space. Rules come in two shapes, made explicit by [`Acquired`]:
//!
//! - **Direct** rules return points immediately and carry no state.
//! - **Stateful** rules return a suspended computation; the optimizer
//!   resumes it with the previously held acquisition state and stores the
//!   new state it yields, exactly once per `ask`.

pub mod ei;

use std::collections::HashMap;
use std::sync::Arc;

use crate::data::Dataset;
use crate::error::Result;
use crate::model::TrainableProbabilisticModel;
use crate::space::SearchSpace;
use crate::tag::Tag;

/// A batch of query points. Row semantics (batch structure, ordering) are
/// defined by the rule that produced them and are opaque to the optimizer.
pub type QueryPoints = Vec<Vec<f64>>;

/// A suspended acquisition: resumed with the prior state (if any), it
/// yields the next state and the query points.
///
/// The closure owns everything it needs; a rule that wants to observe the
/// resumption (or share internals with it) captures clones of shared
/// handles such as `Arc<Mutex<…>>`.
pub type Resume<S> = Box<dyn FnOnce(Option<&S>) -> Result<(S, QueryPoints)>>;

/// The outcome of [`AcquisitionRule::acquire`].
pub enum Acquired<S: 'static> {
    /// Query points produced directly, with no acquisition state involved.
    Points(QueryPoints),
    /// A suspended computation to be resumed with the prior state.
    Stateful(Resume<S>),
}

/// Strategy for selecting the next batch of query points.
///
/// `S` is the rule's acquisition state type: an opaque value the optimizer
/// threads from one `ask` to the next on the rule's behalf. Direct rules
/// never produce one and can leave `S` fully generic.
pub trait AcquisitionRule<S: 'static>: Send + Sync {
    /// Selects the next batch of query points.
    ///
    /// `datasets` is present whenever the caller tracks data; rules that
    /// only need the models may ignore it.
    ///
    /// # Errors
    ///
    /// Rule failures propagate unchanged to the caller of `ask`.
    fn acquire(
        &self,
        space: &dyn SearchSpace,
        models: &HashMap<Tag, Arc<dyn TrainableProbabilisticModel>>,
        datasets: Option<&HashMap<Tag, Dataset>>,
    ) -> Result<Acquired<S>>;

    /// The number of batch-local datasets this rule operates over, or
    /// `None` for rules that only use global datasets.
    ///
    /// When `Some(n)`, the optimizer expands each global dataset entry with
    /// per-batch-element entries `0..n` at construction and routes local
    /// data accordingly on `tell`.
    fn num_local_datasets(&self) -> Option<usize> {
        None
    }
}
