use std::fmt;

macro_rules! arena_index {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(usize);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index)
            }

            #[must_use]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

arena_index!(
    /// Column of the feature matrix a split tests.
    FeatureIndex
);
arena_index!(
    /// Slot of a node in its tree's `Vec<Node>`.
    NodeIndex
);

/// Gini or entropy impurity of the samples at a node.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Zero impurity: every sample shares one class.
    #[must_use]
    pub fn is_pure(self) -> bool {
        self.0 <= 0.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// Index of the largest count; ties go to the lowest index.
///
/// Returns 0 for an empty slice.
#[must_use]
pub(crate) fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0usize;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

/// One node of a tree. The root is slot 0; children are arena slots.
#[derive(Debug, Clone)]
pub enum Node {
    Split {
        feature: FeatureIndex,
        /// Rows with `x[feature] <= threshold` descend left.
        threshold: f64,
        left: NodeIndex,
        right: NodeIndex,
        /// Impurity before the split.
        impurity: Impurity,
        n_samples: usize,
    },
    Leaf {
        /// Most frequent training class here; ties resolve to the lower class.
        prediction: usize,
        /// Training rows per class that ended in this leaf.
        class_counts: Vec<usize>,
        impurity: Impurity,
    },
}

impl Node {
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        match self {
            Node::Split { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    /// Training rows that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } => *n_samples,
            Node::Leaf { class_counts, .. } => class_counts.iter().sum(),
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_prefers_largest_count() {
        assert_eq!(majority_class(&[1, 5, 2]), 1);
    }

    #[test]
    fn majority_tie_goes_to_lowest_label() {
        assert_eq!(majority_class(&[3, 3]), 0);
        assert_eq!(majority_class(&[0, 4, 4]), 1);
    }

    #[test]
    fn majority_of_empty_is_zero() {
        assert_eq!(majority_class(&[]), 0);
    }

    #[test]
    fn leaf_sample_count_sums_classes() {
        let leaf = Node::Leaf {
            prediction: 1,
            class_counts: vec![2, 8],
            impurity: Impurity::new(0.32),
        };
        assert_eq!(leaf.n_samples(), 10);
        assert!(leaf.is_leaf());
    }

    #[test]
    fn impurity_display_and_purity() {
        assert_eq!(format!("{}", Impurity::new(0.333333)), "0.333333");
        assert!(Impurity::new(0.0).is_pure());
        assert!(!Impurity::new(0.5).is_pure());
    }

    #[test]
    fn split_reports_its_sample_count() {
        let split = Node::Split {
            feature: FeatureIndex::new(2),
            threshold: 3.5,
            left: NodeIndex::new(1),
            right: NodeIndex::new(2),
            impurity: Impurity::new(0.48),
            n_samples: 20,
        };
        assert!(!split.is_leaf());
        assert_eq!(split.n_samples(), 20);
        assert_eq!(format!("{}", FeatureIndex::new(2)), "2");
    }
}
