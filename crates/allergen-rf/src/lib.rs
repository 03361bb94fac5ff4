//! Random Forest classification: train, vote, evaluate.
//!
//! Hand-rolled CART decision trees grown on bootstrap resamples with a random
//! feature subset per split. Trees are trained in parallel via rayon from
//! per-tree seeds, so a forest is fully determined by its config and data.

mod config;
mod confusion;
mod error;
mod eval;
mod forest;
mod node;
mod predict;
mod split;
mod tree;

pub use config::{ForestConfig, MaxFeatures};
pub use confusion::{AverageMetrics, ClassMetrics, ConfusionMatrix};
pub use error::RfError;
pub use eval::{EvaluationReport, evaluate};
pub use forest::TrainedForest;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use predict::VoteTally;
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
