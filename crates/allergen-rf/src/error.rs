//! Error type for the forest crate.

/// Everything that can go wrong while growing, querying, or scoring a forest.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    #[error("a forest needs at least one tree (n_trees = {n_trees})")]
    InvalidTreeCount { n_trees: usize },

    #[error("max_depth of {max_depth} is invalid; use None for unlimited or a value >= 1")]
    InvalidMaxDepth { max_depth: usize },

    /// A node needs two samples before it can be divided.
    #[error("min_samples_split of {min_samples_split} is below 2")]
    InvalidMinSamplesSplit { min_samples_split: usize },

    #[error("min_samples_leaf of {min_samples_leaf} is below 1")]
    InvalidMinSamplesLeaf { min_samples_leaf: usize },

    /// The per-split feature budget resolved outside `[1, n_features]`.
    #[error("per-split feature budget {max_features} does not fit {n_features} features")]
    InvalidMaxFeatures { max_features: usize, n_features: usize },

    /// No rows were supplied for training or scoring.
    #[error("no samples supplied")]
    EmptyDataset,

    #[error("samples have no feature columns")]
    ZeroFeatures,

    /// A training row is narrower or wider than row 0.
    #[error("training row {sample_index} is {got} wide but row 0 is {expected} wide")]
    FeatureCountMismatch {
        expected: usize,
        got: usize,
        sample_index: usize,
    },

    #[error("got {n_labels} labels for {n_samples} rows")]
    LabelCountMismatch { n_samples: usize, n_labels: usize },

    /// A label does not fit the confusion matrix being built.
    #[error("class {label} does not exist in a {n_classes}-class problem")]
    LabelOutOfRange { label: usize, n_classes: usize },

    /// A query row does not match the width the forest was trained on.
    #[error("query has {got} features; the forest was trained on {expected}")]
    PredictionFeatureMismatch { expected: usize, got: usize },

    #[error("training value at row {sample_index}, column {feature_index} is NaN or infinite")]
    NonFiniteValue {
        sample_index: usize,
        feature_index: usize,
    },
}
