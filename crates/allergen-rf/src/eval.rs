//! Held-out evaluation of a trained forest.

use serde::Serialize;
use tracing::{info, instrument};

use crate::confusion::{AverageMetrics, ClassMetrics, ConfusionMatrix};
use crate::error::RfError;
use crate::forest::TrainedForest;

/// Scores of a forest on a labeled test set.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Exact-match rate, in [0, 1].
    pub accuracy: f64,
    /// Per-class precision, recall, F1, and support.
    pub classes: Vec<ClassMetrics>,
    /// Unweighted mean over classes.
    pub macro_avg: AverageMetrics,
    /// Support-weighted mean over classes.
    pub weighted_avg: AverageMetrics,
    /// Counts of `[true][predicted]` pairs.
    pub confusion_matrix: ConfusionMatrix,
    /// Number of scored samples.
    pub n_samples: usize,
}

/// Predict every test row and score the predictions against `labels`.
///
/// The report covers every class the forest knows of and every class that
/// appears in `labels`, so a binary model always reports both classes.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`RfError::EmptyDataset`] | Zero test samples |
/// | [`RfError::LabelCountMismatch`] | `features` and `labels` differ in length |
/// | [`RfError::PredictionFeatureMismatch`] | A row has the wrong width |
#[instrument(skip_all, fields(n_samples = features.len()))]
pub fn evaluate(
    model: &TrainedForest,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<EvaluationReport, RfError> {
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    if features.len() != labels.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }

    let predictions = model.predict_batch(features)?;
    let n_classes = labels
        .iter()
        .map(|&l| l + 1)
        .max()
        .unwrap_or(0)
        .max(model.n_classes());
    let confusion_matrix = ConfusionMatrix::from_labels(labels, &predictions, n_classes)?;

    let report = EvaluationReport {
        accuracy: confusion_matrix.accuracy(),
        classes: confusion_matrix.class_metrics(),
        macro_avg: confusion_matrix.macro_average(),
        weighted_avg: confusion_matrix.weighted_average(),
        n_samples: confusion_matrix.total(),
        confusion_matrix,
    };
    info!(accuracy = report.accuracy, n_samples = report.n_samples, "evaluation complete");
    Ok(report)
}
