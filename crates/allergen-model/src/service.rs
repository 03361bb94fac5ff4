//! Single-record prediction over fitted, shared pipeline state.

use std::fmt;

use allergen_io::FeatureRecord;
use allergen_prep::ScalingParameters;
use allergen_rf::TrainedForest;
use serde::Serialize;

use crate::{FeatureEncoder, PipelineError};

/// The classifier's answer for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Allergic,
    NotAllergic,
}

impl Verdict {
    /// Map a class index to a verdict: 1 is allergic, anything else is not.
    #[must_use]
    pub fn from_class(class: usize) -> Self {
        if class == 1 {
            Self::Allergic
        } else {
            Self::NotAllergic
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allergic => f.write_str("likely allergic"),
            Self::NotAllergic => f.write_str("not allergic"),
        }
    }
}

/// A verdict together with the share of trees that voted allergic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    pub verdict: Verdict,
    /// Fraction of trees voting for the allergic class, in [0, 1].
    pub allergic_share: f64,
}

/// Validate, encode, and scale `record`, then classify it.
///
/// Reads the fitted state only; nothing is refit or extended.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PipelineError::InvalidRange`] | A numeric attribute is outside its domain |
/// | [`PipelineError::Prep`] | A categorical value was never seen in training |
/// | [`PipelineError::Rf`] | The encoded width does not match the model |
pub fn assess(
    record: &FeatureRecord,
    encoder: &FeatureEncoder,
    scaler: &ScalingParameters,
    model: &TrainedForest,
) -> Result<Assessment, PipelineError> {
    record.validate()?;
    let encoded = encoder.encode(record)?;
    let scaled = scaler.transform(&encoded)?;
    let votes = model.predict_votes(&scaled)?;
    Ok(Assessment {
        verdict: Verdict::from_class(votes.winner()),
        allergic_share: votes.share(1),
    })
}

/// Classify one record as [`Verdict::Allergic`] or [`Verdict::NotAllergic`].
///
/// # Errors
///
/// Same as [`assess`].
pub fn predict(
    record: &FeatureRecord,
    encoder: &FeatureEncoder,
    scaler: &ScalingParameters,
    model: &TrainedForest,
) -> Result<Verdict, PipelineError> {
    assess(record, encoder, scaler, model).map(|a| a.verdict)
}
