//! Majority-vote prediction for the Random Forest ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::TrainedForest;
use crate::node::majority_class;

/// Per-class vote counts cast by the trees of a forest for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
    votes: Vec<usize>,
}

impl VoteTally {
    /// Return the winning class; ties go to the lowest label.
    #[must_use]
    pub fn winner(&self) -> usize {
        majority_class(&self.votes)
    }

    /// Return the fraction of trees that voted for `class`.
    #[must_use]
    pub fn share(&self, class: usize) -> f64 {
        let total: usize = self.votes.iter().sum();
        match self.votes.get(class) {
            Some(&count) if total > 0 => count as f64 / total as f64,
            _ => 0.0,
        }
    }

    /// Return the raw vote counts, indexed by class.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.votes
    }
}

impl TrainedForest {
    /// Predict the class label for a single sample by majority vote.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        Ok(self.predict_votes(sample)?.winner())
    }

    /// Collect one vote per tree for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_votes(&self, sample: &[f64]) -> Result<VoteTally, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[tree.leaf_prediction(sample)] += 1;
        }
        Ok(VoteTally { votes })
    }

    /// Predict class labels for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong width.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;

    #[test]
    fn tied_votes_go_to_lowest_label() {
        let tally = VoteTally { votes: vec![2, 2] };
        assert_eq!(tally.winner(), 0);
        assert!((tally.share(1) - 0.5).abs() < f64::EPSILON);
        assert_eq!(tally.share(5), 0.0);
    }

    #[test]
    fn votes_sum_to_tree_count() {
        let features = vec![vec![0.0], vec![1.0], vec![10.0], vec![11.0]];
        let labels = vec![0, 0, 1, 1];
        let forest = ForestConfig::new(9).unwrap().fit(&features, &labels).unwrap();
        let tally = forest.predict_votes(&[0.5]).unwrap();
        assert_eq!(tally.as_slice().iter().sum::<usize>(), 9);
        assert_eq!(tally.as_slice().len(), 2);
    }

    #[test]
    fn wrong_width_rejected() {
        let forest = ForestConfig::new(2)
            .unwrap()
            .fit(&[vec![0.0, 1.0], vec![1.0, 0.0]], &[0, 1])
            .unwrap();
        let err = forest.predict(&[1.0]).unwrap_err();
        assert!(matches!(err, RfError::PredictionFeatureMismatch { expected: 2, got: 1 }));
    }
}
