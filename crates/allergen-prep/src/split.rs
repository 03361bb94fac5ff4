//! Seeded random partition into training and test subsets.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::PrepError;

/// Default fraction of samples held out for testing.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Default shuffle seed.
pub const DEFAULT_SEED: u64 = 42;

/// Configuration for a shuffled train/test split.
///
/// The test side receives `ceil(test_fraction * n)` samples. The same seed and
/// the same `n` always produce the same partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainTestSplit {
    test_fraction: f64,
    seed: u64,
}

/// Disjoint train and test index sets whose union is `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    /// Indices of training samples, in shuffled order.
    pub train: Vec<usize>,
    /// Indices of test samples, in shuffled order.
    pub test: Vec<usize>,
}

impl TrainTestSplit {
    /// Create a split holding out `test_fraction` of the samples.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidTestFraction`] unless `0.0 < test_fraction < 1.0`.
    pub fn new(test_fraction: f64) -> Result<Self, PrepError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(PrepError::InvalidTestFraction {
                fraction: test_fraction,
            });
        }
        Ok(Self {
            test_fraction,
            seed: DEFAULT_SEED,
        })
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the held-out fraction.
    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    /// Return the shuffle seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of test samples for a dataset of `n_samples`.
    #[must_use]
    pub fn test_size(&self, n_samples: usize) -> usize {
        (self.test_fraction * n_samples as f64).ceil() as usize
    }

    /// Partition `0..n_samples` into shuffled train and test indices.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::SplitTooSmall`] when either side would be empty.
    pub fn split_indices(&self, n_samples: usize) -> Result<SplitIndices, PrepError> {
        let n_test = self.test_size(n_samples);
        if n_test == 0 || n_test >= n_samples {
            return Err(PrepError::SplitTooSmall {
                n_samples,
                fraction: self.test_fraction,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..n_samples).collect();
        order.shuffle(&mut rng);
        let train = order.split_off(n_test);

        debug!(n_samples, n_train = train.len(), n_test, seed = self.seed, "split computed");
        Ok(SplitIndices { train, test: order })
    }

    /// Partition `items` into cloned `(train, test)` subsets.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::SplitTooSmall`] when either side would be empty.
    pub fn split<T: Clone>(&self, items: &[T]) -> Result<(Vec<T>, Vec<T>), PrepError> {
        let SplitIndices { train, test } = self.split_indices(items.len())?;
        let pick = |indices: &[usize]| indices.iter().map(|&i| items[i].clone()).collect();
        Ok((pick(&train), pick(&test)))
    }
}

impl Default for TrainTestSplit {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}
