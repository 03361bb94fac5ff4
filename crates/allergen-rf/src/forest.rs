//! Random Forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::ForestConfig;
use crate::error::RfError;
use crate::tree::{DecisionTree, DecisionTreeConfig, validate_training_data};

/// A fitted Random Forest. Immutable; retraining yields a new value.
#[derive(Debug, Clone)]
pub struct TrainedForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) seed: u64,
}

/// Draw `n_samples` indices with replacement.
fn bootstrap_sample(n_samples: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Per-tree seeds, drawn in tree order from a master stream seeded by `seed`.
///
/// Tree `i` always receives the `i`-th draw, so the forest does not depend on
/// how rayon schedules the trees.
pub(crate) fn tree_seeds(seed: u64, n_trees: usize) -> Vec<u64> {
    let mut master = ChaCha8Rng::seed_from_u64(seed);
    (0..n_trees).map(|_| master.r#gen()).collect()
}

#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &ForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<TrainedForest, RfError> {
    let n_features = validate_training_data(features, labels)?;
    let n_samples = features.len();
    let max_features = config.max_features.resolve(n_features)?;
    let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;

    let distinct = {
        let mut seen = vec![false; n_classes];
        labels.iter().for_each(|&l| seen[l] = true);
        seen.iter().filter(|&&s| s).count()
    };
    if distinct == 1 {
        info!(label = labels[0], "training set holds a single class");
    }

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_classes,
        max_features,
        "training random forest"
    );

    let tree_template = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features));

    let trees = tree_seeds(config.seed, config.n_trees)
        .into_par_iter()
        .map(|tree_seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);
            let bootstrap = bootstrap_sample(n_samples, &mut rng);
            let boot_features: Vec<Vec<f64>> =
                bootstrap.iter().map(|&i| features[i].clone()).collect();
            let boot_labels: Vec<usize> = bootstrap.iter().map(|&i| labels[i]).collect();

            tree_template
                .clone()
                .with_seed(rng.r#gen())
                .fit(&boot_features, &boot_labels)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        total_nodes = trees.iter().map(DecisionTree::n_nodes).sum::<usize>(),
        "tree training complete"
    );

    Ok(TrainedForest {
        trees,
        n_features,
        n_classes,
        seed: config.seed,
    })
}

impl TrainedForest {
    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes (largest training label + 1).
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the master seed the forest was trained with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxFeatures;

    fn make_separable_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            features.push(vec![i as f64 * 0.15, 0.5]);
            labels.push(0);
        }
        for i in 0..20 {
            features.push(vec![10.0 + i as f64 * 0.15, 0.5]);
            labels.push(1);
        }
        (features, labels)
    }

    #[test]
    fn separable_training_accuracy() {
        let (features, labels) = make_separable_data();
        let forest = ForestConfig::new(25)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .fit(&features, &labels)
            .unwrap();
        let predictions = forest.predict_batch(&features).unwrap();
        let correct = predictions.iter().zip(&labels).filter(|(p, l)| p == l).count();
        assert!(correct as f64 / labels.len() as f64 > 0.95);
        assert_eq!(forest.n_trees(), 25);
        assert_eq!(forest.n_classes(), 2);
        assert_eq!(forest.seed(), 42);
    }

    #[test]
    fn tree_seeds_are_stable_per_index() {
        let short = tree_seeds(9, 3);
        let long = tree_seeds(9, 10);
        assert_eq!(short, long[..3]);
        assert_ne!(tree_seeds(9, 3), tree_seeds(10, 3));
    }

    #[test]
    fn bootstrap_has_training_set_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let sample = bootstrap_sample(17, &mut rng);
        assert_eq!(sample.len(), 17);
        assert!(sample.iter().all(|&i| i < 17));
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels) = make_separable_data();
        let config = ForestConfig::new(10).unwrap().with_seed(99);
        let a = config.fit(&features, &labels).unwrap();
        let b = config.fit(&features, &labels).unwrap();
        let probe: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64 * 0.5, 0.5]).collect();
        assert_eq!(a.predict_batch(&probe).unwrap(), b.predict_batch(&probe).unwrap());
    }

    #[test]
    fn single_class_forest_is_constant() {
        let features: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64, (i * i) as f64]).collect();
        let labels = vec![1; 12];
        let forest = ForestConfig::new(7).unwrap().fit(&features, &labels).unwrap();
        for probe in [[0.0, 0.0], [-1e6, 1e6], [55.5, -3.0]] {
            assert_eq!(forest.predict(&probe).unwrap(), 1);
        }
    }

    #[test]
    fn nearly_equal_features_train_without_runaway_recursion() {
        let a = f64::from_bits(1.0_f64.to_bits() + 1);
        let b = f64::from_bits(1.0_f64.to_bits() + 2);
        let forest = ForestConfig::new(1)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .fit(&[vec![a], vec![b]], &[0, 1])
            .unwrap();
        assert!(forest.trees()[0].depth() <= 1);
    }

    #[test]
    fn empty_dataset_error() {
        let err = ForestConfig::new(3).unwrap().fit(&[], &[]).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }
}
