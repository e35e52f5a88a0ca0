use crate::tag::Tag;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a lower bound is greater than the corresponding upper bound.
    #[error("invalid bounds: lower ({low}) must be less than or equal to upper ({high})")]
    InvalidBounds {
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when lower and upper bound vectors have different lengths.
    #[error("bounds length mismatch: {lower} lower bounds but {upper} upper bounds")]
    BoundsLengthMismatch {
        /// The number of lower bounds.
        lower: usize,
        /// The number of upper bounds.
        upper: usize,
    },

    /// Returned when a dataset's query point and observation counts differ.
    #[error("dataset length mismatch: {query_points} query points but {observations} observations")]
    DatasetLengthMismatch {
        /// The number of query points.
        query_points: usize,
        /// The number of observations.
        observations: usize,
    },

    /// Returned when dataset rows have inconsistent widths.
    #[error("dataset dimension mismatch: expected {expected} but row {row} has {got}")]
    DatasetDimensionMismatch {
        /// The expected row width.
        expected: usize,
        /// The actual row width.
        got: usize,
        /// The index of the offending row.
        row: usize,
    },

    /// Returned when an optimizer is constructed with no datasets.
    #[error("dataset mapping cannot be empty")]
    EmptyDatasets,

    /// Returned when an optimizer is constructed with no models.
    #[error("model mapping cannot be empty")]
    EmptyModels,

    /// Returned when dataset tags and model tags do not cover the same
    /// objectives and constraints.
    #[error("dataset tags {dataset_tags:?} do not match model tags {model_tags:?}")]
    TagMismatch {
        /// The dataset tags, sorted.
        dataset_tags: Vec<Tag>,
        /// The model tags, sorted.
        model_tags: Vec<Tag>,
    },

    /// Returned when the default acquisition rule is used with tags other
    /// than the single reserved `OBJECTIVE` tag.
    #[error("default acquisition rule requires the single tag `OBJECTIVE`, got {tags:?}")]
    DefaultRuleTags {
        /// The supplied tags, sorted.
        tags: Vec<Tag>,
    },

    /// Returned when a supplied tag is not among the tracked tags.
    #[error("unknown tag `{0}`")]
    UnknownTag(Tag),

    /// Returned when a single-value accessor is used while more than one
    /// tag is tracked.
    #[error("single-value accessor requires exactly one tracked tag, but {count} are tracked")]
    AmbiguousTag {
        /// The number of tracked tags.
        count: usize,
    },

    /// Returned when a setter would change the tracked tag set.
    #[error("tag set cannot change: expected {expected:?}, got {got:?}")]
    TagSetChanged {
        /// The tracked tags, sorted.
        expected: Vec<Tag>,
        /// The supplied tags, sorted.
        got: Vec<Tag>,
    },

    /// Returned when a snapshot requests a copy of a model that does not
    /// support copying.
    #[error("model for tag `{tag}` does not support copying")]
    CopyUnsupported {
        /// The tag of the offending model.
        tag: Tag,
    },

    /// Returned when accessing the final record of a failed optimization result.
    #[error("optimization result holds no successful record")]
    NoFinalRecord,

    /// A failure raised by an external collaborator (model training or an
    /// acquisition rule). Surfaces unchanged to the caller.
    #[error(transparent)]
    External(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps an arbitrary collaborator failure for propagation.
    pub fn external(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::External(Box::new(err))
    }
}

pub type Result<T> = core::result::Result<T, Error>;
