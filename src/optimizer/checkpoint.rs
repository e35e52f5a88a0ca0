//! Saving and restoring optimizer state across processes.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::data::Dataset;
use crate::error::Result;
use crate::model::TrainableProbabilisticModel;
use crate::optimizer::AskTellOptimizer;
use crate::rule::AcquisitionRule;
use crate::space::SearchSpace;
use crate::tag::Tag;

/// Current checkpoint schema version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// A serializable snapshot of an optimizer's data state.
///
/// Models are **not** included: surrogate model internals are opaque to
/// this core and generally not serializable. Restoring goes through
/// [`AskTellOptimizer::from_checkpoint`], which takes freshly constructed
/// models and retrains them on the restored datasets.
///
/// # Schema versioning
///
/// The `version` field enables future schema evolution without breaking
/// existing files. The current version is `1`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Checkpoint<S> {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// Datasets at the moment of saving.
    pub datasets: HashMap<Tag, Dataset>,
    /// Acquisition state at the moment of saving, if any.
    pub acquisition_state: Option<S>,
}

impl<S: serde::de::DeserializeOwned> Checkpoint<S> {
    /// Loads a checkpoint from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = std::fs::File::open(path)?;
        serde_json::from_reader(file)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl<S: Clone + serde::Serialize + 'static> AskTellOptimizer<S> {
    /// Saves the current datasets and acquisition state to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use asktell::{AskTellOptimizer, Checkpoint};
    ///
    /// fn checkpoint(ask_tell: &AskTellOptimizer<i64>) -> std::io::Result<()> {
    ///     ask_tell.save("state.json")?;
    ///     let restored: Checkpoint<i64> = Checkpoint::load("state.json")?;
    ///     assert_eq!(restored.version, asktell::CHECKPOINT_VERSION);
    ///     Ok(())
    /// }
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let checkpoint = Checkpoint {
            version: CHECKPOINT_VERSION,
            datasets: self.datasets(),
            acquisition_state: self.acquisition_state().cloned(),
        };

        // Atomic write: write to a temp file in the same directory, then
        // rename. This prevents corrupt files if the process crashes
        // mid-write.
        let parent = path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));
        let file = std::fs::File::create(&tmp_path)?;
        serde_json::to_writer_pretty(file, &checkpoint).map_err(io::Error::other)?;
        std::fs::rename(&tmp_path, path)
    }
}

impl<S: 'static> AskTellOptimizer<S> {
    /// Reconstructs an optimizer from a loaded checkpoint.
    ///
    /// The caller supplies freshly constructed models (one per tracked
    /// base tag); since model weights are not persisted, the models are
    /// retrained on the restored datasets during construction.
    ///
    /// # Errors
    ///
    /// Fails with the same configuration errors as building an optimizer
    /// from the checkpoint's datasets and the supplied models directly.
    /// Model training failures propagate unchanged.
    pub fn from_checkpoint(
        checkpoint: Checkpoint<S>,
        search_space: impl SearchSpace + 'static,
        models: HashMap<Tag, Arc<dyn TrainableProbabilisticModel>>,
        rule: impl AcquisitionRule<S> + 'static,
    ) -> Result<Self> {
        let Checkpoint {
            datasets,
            acquisition_state,
            ..
        } = checkpoint;
        let mut builder = Self::builder(search_space)
            .datasets(datasets)
            .models(models)
            .rule(rule)
            .fit_model(true);
        if let Some(state) = acquisition_state {
            builder = builder.acquisition_state(state);
        }
        builder.build()
    }
}
