//! Dataset loading, record validation, and JSON artifacts for the allergen pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{
    CategoricalField, ExperimentName, FEATURE_COLUMNS, FeatureRecord, LABEL_COLUMN, LabeledRecord,
};
pub use error::{InvalidRange, IoError};
pub use reader::DatasetReader;
pub use writer::ResultWriter;
