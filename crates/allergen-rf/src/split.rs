use rand::Rng;
use rand::seq::SliceRandom;

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// An empty node is pure.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let n = n_samples as f64;
        let proportions = class_counts.iter().filter(|&&c| c > 0).map(|&c| c as f64 / n);
        let value = match self {
            SplitCriterion::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
            SplitCriterion::Entropy => -proportions.map(|p| p * p.ln()).sum::<f64>(),
        };
        Impurity::new(value.max(0.0))
    }
}

/// Best boundary found while scanning one feature column.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    feature: usize,
    threshold: f64,
    /// `n_left * impurity_left + n_right * impurity_right`; lower is better.
    weighted_impurity: f64,
}

/// A chosen split and the partition of the node's samples it induces.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    pub(crate) left_indices: Vec<usize>,
    pub(crate) right_indices: Vec<usize>,
}

/// Inputs shared by every split search within one tree.
pub(crate) struct SplitContext<'a> {
    /// Column-major features: `columns[feature_idx][sample_idx]`.
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

/// Scan one feature for the boundary with the lowest weighted child impurity.
///
/// Returns `None` when the feature is constant over `sample_indices` or no
/// boundary leaves `min_samples_leaf` samples on both sides.
fn scan_feature(
    ctx: &SplitContext<'_>,
    feature: usize,
    sample_indices: &[usize],
    parent_counts: &[usize],
) -> Option<Candidate> {
    let column = &ctx.columns[feature];
    let mut sorted: Vec<(f64, usize)> = sample_indices
        .iter()
        .map(|&si| (column[si], ctx.labels[si]))
        .collect();
    sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let n_samples = sorted.len();
    let mut left_counts = vec![0usize; ctx.n_classes];
    let mut right_counts = parent_counts.to_vec();
    let mut best: Option<Candidate> = None;

    for (i, window) in sorted.windows(2).enumerate() {
        let (value, label) = window[0];
        let next_value = window[1].0;
        left_counts[label] += 1;
        right_counts[label] -= 1;

        if value == next_value {
            continue;
        }
        let n_left = i + 1;
        let n_right = n_samples - n_left;
        if n_left < ctx.min_samples_leaf || n_right < ctx.min_samples_leaf {
            continue;
        }

        let weighted_impurity = n_left as f64 * ctx.criterion.impurity(&left_counts, n_left).value()
            + n_right as f64 * ctx.criterion.impurity(&right_counts, n_right).value();
        if best.is_none_or(|b| weighted_impurity < b.weighted_impurity) {
            best = Some(Candidate {
                feature,
                threshold: midpoint(value, next_value),
                weighted_impurity,
            });
        }
    }
    best
}

/// Threshold between two distinct sorted values, satisfying `lo <= t < hi`.
///
/// The plain midpoint of adjacent floats can round up to `hi`, which would
/// send every sample to the left child.
fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo + (hi - lo) / 2.0;
    if mid >= hi { lo } else { mid }
}

/// Find the best split over a random subset of features.
///
/// Features are visited in a random order until `max_features` of them have
/// produced a usable boundary; constant features do not count towards the
/// budget. Returns `None` when no feature can split the node.
pub(crate) fn find_best_split(
    ctx: &SplitContext<'_>,
    sample_indices: &[usize],
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    if sample_indices.len() < 2 {
        return None;
    }

    let mut parent_counts = vec![0usize; ctx.n_classes];
    for &si in sample_indices {
        parent_counts[ctx.labels[si]] += 1;
    }

    let mut feature_order: Vec<usize> = (0..ctx.columns.len()).collect();
    feature_order.shuffle(rng);

    let mut best: Option<Candidate> = None;
    let mut evaluated = 0usize;
    for feature in feature_order {
        if evaluated >= ctx.max_features {
            break;
        }
        let Some(candidate) = scan_feature(ctx, feature, sample_indices, &parent_counts) else {
            continue;
        };
        evaluated += 1;
        if best.is_none_or(|b| candidate.weighted_impurity < b.weighted_impurity) {
            best = Some(candidate);
        }
    }

    let best = best?;
    let column = &ctx.columns[best.feature];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| column[si] <= best.threshold);

    Some(SplitResult {
        feature: FeatureIndex::new(best.feature),
        threshold: best.threshold,
        left_indices,
        right_indices,
    })
}
