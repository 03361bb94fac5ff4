//! The allergy classifier: record encoding, the training pipeline, and the
//! prediction service.
//!
//! Training splits raw records first, then fits the encoder and scaler on the
//! training side only. The fitted pieces are immutable and shared by reference
//! across any number of predictions.

mod error;
mod features;
mod pipeline;
mod service;

pub use error::PipelineError;
pub use features::FeatureEncoder;
pub use pipeline::{FittedPipeline, PipelineConfig, TrainingOutcome};
pub use service::{Assessment, Verdict, assess, predict};
