#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]

//! Ask/tell control loop for Bayesian optimization. The caller alternates
//! between requesting new query points ("ask") and supplying observed
//! outcomes ("tell"), while the optimizer maintains named datasets and
//! probabilistic surrogate models, delegates point selection to a pluggable
//! acquisition rule, and supports exporting and restoring its full state
//! for checkpointing and distributed execution.
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`AskTellOptimizer`] | The stateful core: owns tagged datasets and models, drives the rule, retrains on `tell`. |
//! | [`Tag`] / [`LocalizedTag`] | Name objective/constraint streams; localized tags route per-batch-element data. |
//! | [`Dataset`] | Immutable (query points, observations) pairs; grows by concatenation, never in place. |
//! | [`TrainableProbabilisticModel`] | Surrogate model interface with optional update/optimize/copy capabilities. |
//! | [`AcquisitionRule`] | Strategy selecting the next query points, directly or via a resumable stateful computation. |
//! | [`Record`] / [`OptimizationResult`] | Immutable snapshots of optimizer state and their success/failure wrapper. |
//!
//! # Getting Started
//!
//! Drive the loop yourself: ask for points, evaluate them with whatever
//! machinery you have, tell the results back.
//!
//! ```
//! use asktell::prelude::*;
//!
//! struct Surrogate;
//!
//! impl ProbabilisticModel for Surrogate {
//!     fn predict(&self, query_points: &[Vec<f64>]) -> asktell::Result<Vec<Prediction>> {
//!         Ok(query_points
//!             .iter()
//!             .map(|p| Prediction { mean: p[0] * p[0], variance: 1.0 })
//!             .collect())
//!     }
//! }
//!
//! impl TrainableProbabilisticModel for Surrogate {}
//!
//! let space = BoxSpace::with_seed(vec![-1.0], vec![1.0], 42)?;
//! let init = Dataset::new(vec![vec![0.5]], vec![vec![0.25]])?;
//!
//! // No rule supplied: the ExpectedImprovement default requires the
//! // single OBJECTIVE tag.
//! let mut ask_tell: AskTellOptimizer = AskTellOptimizer::builder(space)
//!     .dataset(init)
//!     .model(Surrogate)
//!     .build()?;
//!
//! let points = ask_tell.ask()?;
//! let outcomes = points.iter().map(|p| vec![p[0] * p[0]]).collect();
//! ask_tell.tell(Dataset::new(points, outcomes)?)?;
//!
//! assert_eq!(ask_tell.dataset()?.len(), 2);
//! # Ok::<(), asktell::Error>(())
//! ```
//!
//! Constraints alongside the objective, batched acquisition with
//! per-batch-element datasets, and stateful rules (trust regions, batch
//! counters) all go through the same two calls; see [`AskTellOptimizer`].
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on data types, [`Checkpoint`] save/load | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at key optimization points | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod data;
mod error;
mod model;
mod optimizer;
pub mod rule;
mod space;
mod tag;

pub use data::Dataset;
pub use error::{Error, Result};
pub use model::{Prediction, ProbabilisticModel, TrainableProbabilisticModel};
#[cfg(feature = "serde")]
pub use optimizer::{Checkpoint, CHECKPOINT_VERSION};
pub use optimizer::{
    AskTellOptimizer, AskTellOptimizerBuilder, IntoTaggedDatasets, OptimizationResult, Record,
};
pub use rule::{Acquired, AcquisitionRule, QueryPoints, Resume};
pub use space::{BoxSpace, SearchSpace};
pub use tag::{LocalizedTag, Tag, OBJECTIVE};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use asktell::prelude::*;
/// ```
pub mod prelude {
    pub use crate::data::Dataset;
    pub use crate::error::{Error, Result};
    pub use crate::model::{Prediction, ProbabilisticModel, TrainableProbabilisticModel};
    #[cfg(feature = "serde")]
    pub use crate::optimizer::Checkpoint;
    pub use crate::optimizer::{
        AskTellOptimizer, AskTellOptimizerBuilder, IntoTaggedDatasets, OptimizationResult, Record,
    };
    pub use crate::rule::ei::ExpectedImprovement;
    pub use crate::rule::{Acquired, AcquisitionRule, QueryPoints};
    pub use crate::space::{BoxSpace, SearchSpace};
    pub use crate::tag::{LocalizedTag, Tag, OBJECTIVE};
}
