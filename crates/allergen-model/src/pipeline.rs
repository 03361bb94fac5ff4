//! The training pipeline: split, fit encoder and scaler, train, evaluate.

use allergen_io::{FeatureRecord, LabeledRecord};
use allergen_prep::{PrepError, ScalingParameters, TrainTestSplit};
use allergen_rf::{EvaluationReport, ForestConfig, TrainedForest, evaluate};
use tracing::{info, instrument, warn};

use crate::service::{self, Assessment, Verdict};
use crate::{FeatureEncoder, PipelineError};

/// Settings for a full training run.
///
/// # Defaults
///
/// | Parameter       | Default |
/// |-----------------|---------|
/// | `test_fraction` | 0.2     |
/// | `seed`          | 42      |
/// | `forest`        | [`ForestConfig::default`] (200 trees) |
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    split: TrainTestSplit,
    forest: ForestConfig,
}

impl PipelineConfig {
    /// Create a config holding out `test_fraction` of the records.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Prep`] unless `0.0 < test_fraction < 1.0`.
    pub fn new(test_fraction: f64) -> Result<Self, PipelineError> {
        Ok(Self {
            split: TrainTestSplit::new(test_fraction)?,
            forest: ForestConfig::default(),
        })
    }

    /// Seed both the split shuffle and the forest.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.split = self.split.with_seed(seed);
        self.forest = self.forest.with_seed(seed);
        self
    }

    /// Replace the forest hyperparameters.
    ///
    /// The forest is reseeded with the pipeline seed, so the call order of
    /// `with_seed` and `with_forest` does not matter.
    #[must_use]
    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest.with_seed(self.split.seed());
        self
    }

    /// Return the split settings.
    #[must_use]
    pub fn split(&self) -> &TrainTestSplit {
        &self.split
    }

    /// Return the forest settings.
    #[must_use]
    pub fn forest(&self) -> &ForestConfig {
        &self.forest
    }

    /// Run the pipeline on a labeled dataset.
    ///
    /// Records are split first; the encoder and scaler see training records
    /// only. Test records carrying a category absent from training are left
    /// out of scoring and counted in [`TrainingOutcome::n_test_rejected`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PipelineError::DegenerateDataset`] | Zero records, or no test record left to score |
    /// | [`PipelineError::InvalidTrainingRecord`] | A record fails range validation |
    /// | [`PipelineError::Prep`] | The split would leave a side empty |
    /// | [`PipelineError::Rf`] | Forest training or evaluation fails |
    #[instrument(skip_all, fields(n_records = records.len()))]
    pub fn train(&self, records: &[LabeledRecord]) -> Result<TrainingOutcome, PipelineError> {
        if records.is_empty() {
            return Err(PipelineError::DegenerateDataset {
                reason: "no records".to_string(),
            });
        }
        for (index, record) in records.iter().enumerate() {
            record
                .features
                .validate()
                .map_err(|source| PipelineError::InvalidTrainingRecord { index, source })?;
        }

        let (train, test) = self.split.split(records)?;
        let train_features: Vec<FeatureRecord> =
            train.iter().map(|r| r.features.clone()).collect();
        let train_labels: Vec<usize> = train.iter().map(LabeledRecord::label).collect();

        let encoder = FeatureEncoder::fit(&train_features)?;
        let encoded = train_features
            .iter()
            .map(|r| encoder.encode(r))
            .collect::<Result<Vec<_>, _>>()?;
        let scaler = ScalingParameters::fit(&encoded)?;
        let scaled = scaler.transform_batch(&encoded)?;
        let forest = self.forest.fit(&scaled, &train_labels)?;

        let mut test_features = Vec::with_capacity(test.len());
        let mut test_labels = Vec::with_capacity(test.len());
        let mut n_test_rejected = 0;
        for record in &test {
            match encoder.encode(&record.features) {
                Ok(encoded) => {
                    test_features.push(scaler.transform(&encoded)?);
                    test_labels.push(record.label());
                }
                Err(PrepError::UnknownCategory { column, value }) => {
                    warn!(%column, %value, "test record skipped: category unseen in training");
                    n_test_rejected += 1;
                }
                Err(other) => return Err(other.into()),
            }
        }
        if test_features.is_empty() {
            return Err(PipelineError::DegenerateDataset {
                reason: format!("all {} test records were rejected", test.len()),
            });
        }

        let report = evaluate(&forest, &test_features, &test_labels)?;
        info!(
            n_train = train.len(),
            n_test = test_features.len(),
            n_test_rejected,
            accuracy = report.accuracy,
            "pipeline trained"
        );

        Ok(TrainingOutcome {
            pipeline: FittedPipeline {
                encoder,
                scaler,
                forest,
            },
            report,
            n_train: train.len(),
            n_test: test_features.len(),
            n_test_rejected,
        })
    }
}

/// The result of [`PipelineConfig::train`].
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Fitted encoder, scaler, and forest, ready for prediction.
    pub pipeline: FittedPipeline,
    /// Scores on the scored test records.
    pub report: EvaluationReport,
    pub n_train: usize,
    /// Test records that were scored.
    pub n_test: usize,
    /// Test records skipped for carrying an unseen category.
    pub n_test_rejected: usize,
}

/// Everything fitted on the training split. Immutable and `Send + Sync`.
#[derive(Debug, Clone)]
pub struct FittedPipeline {
    encoder: FeatureEncoder,
    scaler: ScalingParameters,
    forest: TrainedForest,
}

impl FittedPipeline {
    /// Classify one record.
    ///
    /// # Errors
    ///
    /// See [`service::predict`].
    pub fn predict(&self, record: &FeatureRecord) -> Result<Verdict, PipelineError> {
        service::predict(record, &self.encoder, &self.scaler, &self.forest)
    }

    /// Classify one record and report the allergic vote share.
    ///
    /// # Errors
    ///
    /// See [`service::assess`].
    pub fn assess(&self, record: &FeatureRecord) -> Result<Assessment, PipelineError> {
        service::assess(record, &self.encoder, &self.scaler, &self.forest)
    }

    #[must_use]
    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    #[must_use]
    pub fn scaler(&self) -> &ScalingParameters {
        &self.scaler
    }

    #[must_use]
    pub fn forest(&self) -> &TrainedForest {
        &self.forest
    }
}
