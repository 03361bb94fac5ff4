//! Pipeline error types.

use allergen_io::InvalidRange;
use allergen_prep::PrepError;
use allergen_rf::RfError;

/// Errors from training the pipeline or predicting a record.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Returned when a record has a numeric attribute outside its domain.
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),

    /// Returned for encoding, scaling, or splitting failures, including unseen categories.
    #[error(transparent)]
    Prep(#[from] PrepError),

    /// Returned when the forest cannot be trained or evaluated.
    #[error(transparent)]
    Rf(#[from] RfError),

    /// Returned when a training record fails range validation.
    #[error("training record {index} is invalid")]
    InvalidTrainingRecord {
        /// Zero-based position in the input slice.
        index: usize,
        /// The range violation.
        source: InvalidRange,
    },

    /// Returned when there is nothing to train on or nothing left to score.
    #[error("degenerate dataset: {reason}")]
    DegenerateDataset {
        /// What made the dataset unusable.
        reason: String,
    },
}

impl PipelineError {
    /// `true` for errors scoped to a single input record, after which other
    /// records can still be processed.
    #[must_use]
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange(_) | Self::Prep(PrepError::UnknownCategory { .. })
        )
    }
}
