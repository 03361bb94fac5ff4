use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::RfError;
use crate::node::{Impurity, Node, NodeIndex, majority_class};
use crate::split::{SplitContext, SplitCriterion, find_best_split};

/// Hyperparameters for growing one CART tree.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Defaults as in the table above.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    /// Impurity measure minimised by each split.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Depth cap counted from the root at 0; `None` grows until leaves are pure.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Nodes with fewer rows than this become leaves.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Smallest child a split may produce.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Usable features evaluated per split; `None` evaluates every column.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Seed for the per-node feature shuffle.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Grow a tree on row-major `features` with zero-based class `labels`.
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
    /// | [`RfError::InvalidMaxDepth`] | `max_depth` is `Some(0)` |
    /// | [`RfError::InvalidMinSamplesSplit`] | `min_samples_split < 2` |
    /// | [`RfError::InvalidMinSamplesLeaf`] | `min_samples_leaf < 1` |
    /// | [`RfError::InvalidMaxFeatures`] | `max_features` outside `[1, n_features]` |
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, RfError> {
        let n_features = validate_training_data(features, labels)?;

        if self.max_depth == Some(0) {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(RfError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
        let columns: Vec<Vec<f64>> = (0..n_features)
            .map(|f| features.iter().map(|row| row[f]).collect())
            .collect();
        let ctx = SplitContext {
            columns: &columns,
            labels,
            n_classes,
            criterion: self.criterion,
            max_features,
            min_samples_leaf: self.min_samples_leaf,
        };

        let mut builder = TreeBuilder {
            ctx,
            config: self,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };
        let all_samples: Vec<usize> = (0..features.len()).collect();
        builder.grow(&all_samples, 0);
        let nodes = builder.arena;

        debug!(n_nodes = nodes.len(), n_classes, max_features, "decision tree built");

        Ok(DecisionTree {
            nodes,
            n_features,
            n_classes,
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Check shape and finiteness of a training set; returns the feature count.
pub(crate) fn validate_training_data(
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<usize, RfError> {
    let first = features.first().ok_or(RfError::EmptyDataset)?;
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    let n_features = first.len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(n_features)
}

/// Depth-first grower that appends nodes to an arena.
struct TreeBuilder<'a> {
    ctx: SplitContext<'a>,
    config: &'a DecisionTreeConfig,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Returns the slot of the subtree root built from `sample_indices`.
    fn grow(&mut self, sample_indices: &[usize], depth: usize) -> NodeIndex {
        let mut class_counts = vec![0usize; self.ctx.n_classes];
        for &si in sample_indices {
            class_counts[self.ctx.labels[si]] += 1;
        }
        let n_samples = sample_indices.len();
        let impurity = self.ctx.criterion.impurity(&class_counts, n_samples);

        let stop = impurity.is_pure()
            || n_samples < self.config.min_samples_split
            || self.config.max_depth.is_some_and(|max| depth >= max);
        if stop {
            return self.push_leaf(class_counts, impurity);
        }

        let Some(split) = find_best_split(&self.ctx, sample_indices, &mut self.rng) else {
            return self.push_leaf(class_counts, impurity);
        };
        if split.left_indices.is_empty() || split.right_indices.is_empty() {
            return self.push_leaf(class_counts, impurity);
        }

        // Reserve the parent slot so the root stays at index 0.
        let node_idx = self.arena.len();
        self.arena.push(Node::Leaf {
            prediction: 0,
            class_counts: Vec::new(),
            impurity,
        });
        let left = self.grow(&split.left_indices, depth + 1);
        let right = self.grow(&split.right_indices, depth + 1);
        self.arena[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            n_samples,
        };
        NodeIndex::new(node_idx)
    }

    fn push_leaf(&mut self, class_counts: Vec<usize>, impurity: Impurity) -> NodeIndex {
        let idx = self.arena.len();
        self.arena.push(Node::Leaf {
            prediction: majority_class(&class_counts),
            class_counts,
            impurity,
        });
        NodeIndex::new(idx)
    }
}

/// A fitted tree. Nodes live in one flat `Vec`, root first.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Class of the leaf `sample` lands in.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(self.leaf_prediction(sample))
    }

    /// Walk from the root to a leaf; the caller has checked the sample width.
    pub(crate) fn leaf_prediction(&self, sample: &[f64]) -> usize {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { prediction, .. } => return *prediction,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }

    /// All nodes in arena order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Largest training label plus one.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path in edges; a lone root leaf is depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut queue = VecDeque::from([(0usize, 0usize)]);
        while let Some((idx, d)) = queue.pop_front() {
            match &self.nodes[idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    queue.push_back((left.index(), d + 1));
                    queue.push_back((right.index(), d + 1));
                }
            }
        }
        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let features = vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
            vec![12.0, 0.0],
        ];
        (features, vec![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let tree = DecisionTreeConfig::new().fit(&features, &[1, 1, 1]).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict(&[-100.0, 100.0]).unwrap(), 1);
    }

    #[test]
    fn linearly_separable_correct_split() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(tree.predict(&[2.0, 0.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[11.0, 0.0]).unwrap(), 1);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn xor_needs_depth_two_and_max_depth_caps_it() {
        let features = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        let labels = vec![0, 1, 1, 0];
        let full = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert!(full.depth() >= 2);

        let stump = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&features, &labels)
            .unwrap();
        assert!(stump.depth() <= 1);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels) = separable();
        let config = DecisionTreeConfig::new().with_max_features(Some(1)).with_seed(7);
        let a = config.fit(&features, &labels).unwrap();
        let b = config.fit(&features, &labels).unwrap();
        for sample in &features {
            assert_eq!(a.predict(sample).unwrap(), b.predict(sample).unwrap());
        }
    }

    #[test]
    fn invalid_inputs_rejected() {
        let err = DecisionTreeConfig::new().fit(&[], &[]).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));

        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0, 2.0], vec![3.0]], &[0, 1])
            .unwrap_err();
        assert!(matches!(err, RfError::FeatureCountMismatch { sample_index: 1, .. }));

        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0, f64::NAN]], &[0])
            .unwrap_err();
        assert!(matches!(err, RfError::NonFiniteValue { sample_index: 0, feature_index: 1 }));

        let err = DecisionTreeConfig::new().fit(&[vec![1.0]], &[0, 1]).unwrap_err();
        assert!(matches!(err, RfError::LabelCountMismatch { n_samples: 1, n_labels: 2 }));

        let err = DecisionTreeConfig::new()
            .with_max_features(Some(3))
            .fit(&[vec![1.0, 2.0]], &[0])
            .unwrap_err();
        assert!(matches!(err, RfError::InvalidMaxFeatures { max_features: 3, n_features: 2 }));
    }

    #[test]
    fn adjacent_float_values_grow_a_finite_tree() {
        let a = f64::from_bits(1.0_f64.to_bits() + 1);
        let b = f64::from_bits(1.0_f64.to_bits() + 2);
        let features = vec![vec![a], vec![b], vec![a], vec![b]];
        let tree = DecisionTreeConfig::new().fit(&features, &[0, 1, 0, 1]).unwrap();
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.predict(&[a]).unwrap(), 0);
        assert_eq!(tree.predict(&[b]).unwrap(), 1);
    }

    #[test]
    fn prediction_feature_mismatch() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let err = tree.predict(&[1.0]).unwrap_err();
        assert!(matches!(err, RfError::PredictionFeatureMismatch { expected: 2, got: 1 }));
    }
}
