use std::fmt;

use crate::config::DistributionMode;
use crate::split::SplitRule;

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in a decision tree arena.
///
/// Trees are stored as `Vec<Node>` where children are referenced by
/// [`NodeIndex`]. A child always sits at a higher index than its parent.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// An interior node testing one attribute.
    Decision {
        /// Attribute test routing records to children.
        rule: SplitRule,
        /// One child per branch, in branch order.
        children: Vec<NodeIndex>,
        /// Training records per class that reached this node.
        class_counts: Vec<usize>,
    },
    /// A terminal node.
    Leaf {
        /// Majority class, or `None` when no training record reached the leaf.
        label: Option<usize>,
        /// Training records per class that reached this leaf.
        class_counts: Vec<usize>,
        /// Class counts, or their frequencies, depending on [`DistributionMode`].
        distribution: Vec<f64>,
        /// `true` when this leaf replaced a subtree during pruning.
        pruned: bool,
    },
}

impl Node {
    /// Build a leaf from its class counts.
    pub(crate) fn leaf(class_counts: Vec<usize>, mode: DistributionMode, pruned: bool) -> Self {
        let total: usize = class_counts.iter().sum();
        let distribution = match mode {
            DistributionMode::Counts => class_counts.iter().map(|&c| c as f64).collect(),
            DistributionMode::Frequencies if total > 0 => {
                let n = total as f64;
                class_counts.iter().map(|&c| c as f64 / n).collect()
            }
            DistributionMode::Frequencies => vec![0.0; class_counts.len()],
        };
        Node::Leaf {
            label: majority_class(&class_counts),
            class_counts,
            distribution,
            pruned,
        }
    }

    /// Return the per-class training counts at this node.
    #[must_use]
    pub fn class_counts(&self) -> &[usize] {
        match self {
            Node::Decision { class_counts, .. } | Node::Leaf { class_counts, .. } => class_counts,
        }
    }

    /// Return the number of training records that reached this node.
    #[must_use]
    pub fn n_records(&self) -> usize {
        self.class_counts().iter().sum()
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// Index of the largest count; ties go to the lowest index. `None` when all
/// counts are zero.
#[must_use]
pub fn majority_class(counts: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (class, &n) in counts.iter().enumerate() {
        if n > 0 && best.is_none_or(|(_, m)| n > m) {
            best = Some((class, n));
        }
    }
    best.map(|(class, _)| class)
}
