//! Preprocessing error types.

/// Errors from fitting or applying preprocessing transforms.
#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    /// Returned when a value was never seen while fitting the vocabulary.
    #[error("unknown category \"{value}\" for column {column}")]
    UnknownCategory {
        /// Column the vocabulary was fit on.
        column: String,
        /// The unseen value.
        value: String,
    },

    /// Returned when a vocabulary is fit on zero values.
    #[error("cannot fit vocabulary for column {column}: no values")]
    EmptyColumn {
        /// Column name.
        column: String,
    },

    /// Returned when a scaler is fit on zero rows or zero columns.
    #[error("cannot fit scaler on an empty matrix")]
    EmptyMatrix,

    /// Returned when a row's width differs from the fitted feature count.
    #[error("row {row_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// Fitted feature count.
        expected: usize,
        /// Width of the offending row.
        got: usize,
        /// Zero-based row index (0 for single-vector transforms).
        row_index: usize,
    },

    /// Returned when a matrix cell is NaN or infinite.
    #[error("non-finite value at row {row_index}, feature {feature_index}")]
    NonFiniteValue {
        /// Zero-based row index.
        row_index: usize,
        /// Zero-based feature index.
        feature_index: usize,
    },

    /// Returned when the test fraction is not strictly between 0 and 1.
    #[error("test fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTestFraction {
        /// The rejected fraction.
        fraction: f64,
    },

    /// Returned when a split would leave the train or test side empty.
    #[error("cannot split {n_samples} samples with test fraction {fraction}: a side would be empty")]
    SplitTooSmall {
        /// Number of samples to split.
        n_samples: usize,
        /// The requested test fraction.
        fraction: f64,
    },
}
