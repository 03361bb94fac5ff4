//! Configuration builder for Random Forest training.

use crate::error::RfError;
use crate::forest::TrainedForest;
use crate::split::SplitCriterion;

/// Per-split feature budget, resolved against the dataset width at fit time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// Square root of total features, rounded up.
    Sqrt,
    /// Log base 2 of total features, rounded up.
    Log2,
    /// A fraction of total features, in (0.0, 1.0].
    Fraction(f64),
    /// A fixed count.
    Fixed(usize),
    /// All features (plain bagging).
    All,
}

impl MaxFeatures {
    /// Resolve to a concrete count for a dataset with `n_features` columns.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidMaxFeatures`] when the count falls outside `[1, n_features]`.
    pub fn resolve(self, n_features: usize) -> Result<usize, RfError> {
        let n = n_features as f64;
        let resolved = match self {
            MaxFeatures::Sqrt => n.sqrt().ceil() as usize,
            MaxFeatures::Log2 => n.log2().ceil().max(1.0) as usize,
            MaxFeatures::Fraction(f) => (n * f).ceil() as usize,
            MaxFeatures::Fixed(count) => count,
            MaxFeatures::All => n_features,
        };
        if resolved == 0 || resolved > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features: resolved,
                n_features,
            });
        }
        Ok(resolved)
    }
}

/// Untrained forest settings; [`ForestConfig::fit`] turns them into an
/// immutable [`TrainedForest`].
///
/// # Defaults
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `n_trees`           | 200     |
/// | `max_features`      | `Sqrt`  |
/// | `max_depth`         | `None`  |
/// | `min_samples_split` | 2       |
/// | `min_samples_leaf`  | 1       |
/// | `criterion`         | `Gini`  |
/// | `seed`              | 42      |
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_features: MaxFeatures,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) seed: u64,
}

impl ForestConfig {
    /// Number of trees used by [`ForestConfig::default`].
    pub const DEFAULT_TREES: usize = 200;

    /// Start from the defaults with `n_trees` trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: SplitCriterion::Gini,
            seed: 42,
        })
    }

    /// How many features each split may evaluate.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Depth cap applied to every tree; `None` leaves trees unbounded.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Rows a node needs before it may split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Rows each child of a split must keep.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Gini or entropy, applied in every tree.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the master seed from which every tree's seed is derived.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Grow the forest on row-major `features` and zero-based `labels`.
    ///
    /// A training set holding a single class is valid and produces a forest
    /// that always predicts that class.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | `features` is empty |
    /// | [`RfError::LabelCountMismatch`] | `labels.len() != features.len()` |
    /// | [`RfError::ZeroFeatures`] | rows have zero feature columns |
    /// | [`RfError::FeatureCountMismatch`] | rows have inconsistent lengths |
    /// | [`RfError::NonFiniteValue`] | any value is NaN or infinite |
    /// | [`RfError::InvalidMaxFeatures`] | resolved max_features outside `[1, n_features]` |
    /// | tree config errors | invalid depth or sample limits |
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<TrainedForest, RfError> {
        crate::forest::train(self, features, labels)
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: Self::DEFAULT_TREES,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: SplitCriterion::Gini,
            seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_trees_rejected() {
        assert!(matches!(
            ForestConfig::new(0),
            Err(RfError::InvalidTreeCount { n_trees: 0 })
        ));
    }

    #[test]
    fn default_matches_documented_values() {
        let config = ForestConfig::default();
        assert_eq!(config.n_trees(), 200);
        assert_eq!(config.seed(), 42);
        assert_eq!(config.max_features(), MaxFeatures::Sqrt);
        assert_eq!(config.criterion(), SplitCriterion::Gini);
    }

    #[test]
    fn max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(10).unwrap(), 4);
        assert_eq!(MaxFeatures::Log2.resolve(10).unwrap(), 4);
        assert_eq!(MaxFeatures::Log2.resolve(1).unwrap(), 1);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(10).unwrap(), 5);
        assert_eq!(MaxFeatures::All.resolve(10).unwrap(), 10);
        assert!(MaxFeatures::Fixed(11).resolve(10).is_err());
        assert!(MaxFeatures::Fixed(0).resolve(10).is_err());
    }
}
