//! Record to feature-vector encoding.

use allergen_io::{CategoricalField, FEATURE_COLUMNS, FeatureRecord};
use allergen_prep::{PrepError, Vocabulary};
use serde::Serialize;
use tracing::{debug, instrument};

/// One fitted vocabulary per categorical attribute.
///
/// Encodes a [`FeatureRecord`] into a vector whose positions follow
/// [`FEATURE_COLUMNS`]: numeric attributes pass through unchanged and
/// categorical attributes become their vocabulary code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureEncoder {
    vocabularies: Vec<Vocabulary>,
}

impl FeatureEncoder {
    /// Fit every categorical vocabulary on `records`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::EmptyColumn`] when `records` is empty.
    #[instrument(skip_all, fields(n_records = records.len()))]
    pub fn fit(records: &[FeatureRecord]) -> Result<Self, PrepError> {
        let vocabularies = CategoricalField::ALL
            .iter()
            .map(|&field| {
                Vocabulary::fit(
                    field.column_name(),
                    records.iter().map(|r| r.categorical(field)),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            n_codes = vocabularies.iter().map(Vocabulary::len).sum::<usize>(),
            "feature encoder fitted"
        );
        Ok(Self { vocabularies })
    }

    /// Encode one record.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::UnknownCategory`] for the first categorical value,
    /// in feature order, that was not seen during fitting.
    pub fn encode(&self, record: &FeatureRecord) -> Result<Vec<f64>, PrepError> {
        let code = |field: CategoricalField| -> Result<f64, PrepError> {
            Ok(f64::from(
                self.vocabulary(field).transform(record.categorical(field))?,
            ))
        };
        Ok(vec![
            f64::from(record.age),
            code(CategoricalField::Gender)?,
            code(CategoricalField::FamilyHistory)?,
            code(CategoricalField::PreviousReaction)?,
            code(CategoricalField::Symptoms)?,
            code(CategoricalField::FoodType)?,
            f64::from(record.food_frequency),
            code(CategoricalField::MedicalConditions)?,
            record.ige_levels,
            f64::from(record.severity_score),
        ])
    }

    /// Return the vocabulary fitted for `field`.
    #[must_use]
    pub fn vocabulary(&self, field: CategoricalField) -> &Vocabulary {
        // Declaration order of `CategoricalField` matches `CategoricalField::ALL`.
        &self.vocabularies[field as usize]
    }

    /// Width of an encoded vector.
    #[must_use]
    pub fn n_features(&self) -> usize {
        FEATURE_COLUMNS.len()
    }
}
