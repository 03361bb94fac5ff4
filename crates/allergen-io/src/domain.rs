//! Domain types for allergen-io.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{InvalidRange, IoError};

/// Feature columns in model input order.
pub const FEATURE_COLUMNS: [&str; 10] = [
    "Age",
    "Gender",
    "Family_History",
    "Previous_Reaction",
    "Symptoms",
    "Food_Type",
    "Food_Frequency",
    "Medical_Conditions",
    "IgE_Levels",
    "Severity_Score",
];

/// The binary target column: 1 for an allergic reaction, 0 otherwise.
pub const LABEL_COLUMN: &str = "Allergic";

const AGE_RANGE: (f64, f64) = (5.0, 80.0);
const SEVERITY_RANGE: (f64, f64) = (0.0, 10.0);

/// The attributes of one food exposure, as they appear in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Age in years, 5 to 80.
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Family_History")]
    pub family_history: String,
    #[serde(rename = "Previous_Reaction")]
    pub previous_reaction: String,
    #[serde(rename = "Symptoms")]
    pub symptoms: String,
    #[serde(rename = "Food_Type")]
    pub food_type: String,
    /// Exposures per period; a non-negative count.
    #[serde(rename = "Food_Frequency")]
    pub food_frequency: u32,
    #[serde(rename = "Medical_Conditions")]
    pub medical_conditions: String,
    /// Serum IgE concentration; finite and non-negative.
    #[serde(rename = "IgE_Levels")]
    pub ige_levels: f64,
    /// Clinician severity rating, 0 to 10.
    #[serde(rename = "Severity_Score")]
    pub severity_score: u32,
}

impl FeatureRecord {
    /// Check every numeric attribute against its accepted domain.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidRange`] found, in feature order.
    pub fn validate(&self) -> Result<(), InvalidRange> {
        check_range("Age", f64::from(self.age), AGE_RANGE)?;
        if !self.ige_levels.is_finite() || self.ige_levels < 0.0 {
            return Err(InvalidRange {
                field: "IgE_Levels",
                value: self.ige_levels,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        check_range("Severity_Score", f64::from(self.severity_score), SEVERITY_RANGE)
    }

    /// Return the raw string value of a categorical attribute.
    #[must_use]
    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Gender => &self.gender,
            CategoricalField::FamilyHistory => &self.family_history,
            CategoricalField::PreviousReaction => &self.previous_reaction,
            CategoricalField::Symptoms => &self.symptoms,
            CategoricalField::FoodType => &self.food_type,
            CategoricalField::MedicalConditions => &self.medical_conditions,
        }
    }
}

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), InvalidRange> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(InvalidRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// A training or test record: attributes plus the observed outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRecord {
    pub features: FeatureRecord,
    pub allergic: bool,
}

impl LabeledRecord {
    /// Class index for the classifier: 1 if allergic, else 0.
    #[must_use]
    pub fn label(&self) -> usize {
        usize::from(self.allergic)
    }
}

/// The categorical attributes, in feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoricalField {
    Gender,
    FamilyHistory,
    PreviousReaction,
    Symptoms,
    FoodType,
    MedicalConditions,
}

impl CategoricalField {
    /// Every categorical attribute, in feature order.
    pub const ALL: [Self; 6] = [
        Self::Gender,
        Self::FamilyHistory,
        Self::PreviousReaction,
        Self::Symptoms,
        Self::FoodType,
        Self::MedicalConditions,
    ];

    /// The dataset column holding this attribute.
    #[must_use]
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::FamilyHistory => "Family_History",
            Self::PreviousReaction => "Previous_Reaction",
            Self::Symptoms => "Symptoms",
            Self::FoodType => "Food_Type",
            Self::MedicalConditions => "Medical_Conditions",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A validated experiment name, used as the prefix of output files.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Return the experiment name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ExperimentName {
    type Err = IoError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let valid = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(IoError::InvalidExperimentName {
                name: name.to_string(),
            })
        }
    }
}

impl fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FeatureRecord {
        FeatureRecord {
            age: 34,
            gender: "Female".into(),
            family_history: "Yes".into(),
            previous_reaction: "Mild".into(),
            symptoms: "Swelling".into(),
            food_type: "Nuts".into(),
            food_frequency: 3,
            medical_conditions: "Asthma".into(),
            ige_levels: 120.5,
            severity_score: 6,
        }
    }

    #[test]
    fn in_range_record_validates() {
        assert!(record().validate().is_ok());
    }

    #[test]
    fn boundaries_are_inclusive() {
        let mut r = record();
        r.age = 5;
        r.severity_score = 10;
        r.ige_levels = 0.0;
        assert!(r.validate().is_ok());
        r.age = 80;
        r.severity_score = 0;
        assert!(r.validate().is_ok());
    }

    #[test]
    fn out_of_range_values_rejected() {
        let mut r = record();
        r.age = 4;
        assert_eq!(r.validate().unwrap_err().field, "Age");

        let mut r = record();
        r.severity_score = 11;
        let err = r.validate().unwrap_err();
        assert_eq!(err.field, "Severity_Score");
        assert_eq!(err.value, 11.0);

        for bad in [-0.5, f64::NAN, f64::INFINITY] {
            let mut r = record();
            r.ige_levels = bad;
            assert_eq!(r.validate().unwrap_err().field, "IgE_Levels");
        }
    }

    #[test]
    fn categorical_accessor_matches_columns() {
        let r = record();
        assert_eq!(r.categorical(CategoricalField::FoodType), "Nuts");
        assert_eq!(r.categorical(CategoricalField::MedicalConditions), "Asthma");
        for field in CategoricalField::ALL {
            assert!(FEATURE_COLUMNS.contains(&field.column_name()));
        }
    }

    #[test]
    fn experiment_name_parsing() {
        assert_eq!("run-01_a".parse::<ExperimentName>().unwrap().as_str(), "run-01_a");
        assert!(matches!(
            "".parse::<ExperimentName>(),
            Err(IoError::InvalidExperimentName { .. })
        ));
        assert!(matches!(
            "my run!".parse::<ExperimentName>(),
            Err(IoError::InvalidExperimentName { .. })
        ));
    }
}
