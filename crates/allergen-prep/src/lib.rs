//! Feature preprocessing: categorical vocabularies, standard scaling, and
//! seeded train/test splitting.
//!
//! Every transform here is fit once on training data and then applied
//! unchanged to test and inference data.

mod error;
mod scaler;
mod split;
mod vocabulary;

pub use error::PrepError;
pub use scaler::ScalingParameters;
pub use split::{DEFAULT_SEED, DEFAULT_TEST_FRACTION, SplitIndices, TrainTestSplit};
pub use vocabulary::Vocabulary;
