//! Bottom-up error-based pruning.
//!
//! A decision node is replaced by a leaf when its static error estimate does
//! not exceed the record-weighted error of its children.

use tracing::{debug, info, instrument};

use crate::node::{Node, NodeIndex};
use crate::tree::DecisionTree;

/// Laplace-style error estimate of a node: `(N - n + k - 1) / (N + k)`.
///
/// `n_total` is the number of records at the node (`N`), `n_majority` the
/// count of its most frequent class (`n`), `n_classes` the number of class
/// values (`k`).
#[must_use]
pub fn static_error_estimate(n_total: usize, n_majority: usize, n_classes: usize) -> f64 {
    let big_n = n_total as f64;
    let n = n_majority as f64;
    let k = n_classes as f64;
    (big_n - n + k - 1.0) / (big_n + k)
}

/// Outcome of a pruning pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PruneSummary {
    /// Node count before pruning.
    pub nodes_before: usize,
    /// Node count after pruning.
    pub nodes_after: usize,
    /// Decision nodes turned into leaves.
    pub collapsed: usize,
    /// Estimated error of the root after pruning.
    pub root_error: f64,
}

fn node_static_error(node: &Node, n_classes: usize) -> f64 {
    let counts = node.class_counts();
    let majority = counts.iter().copied().max().unwrap_or(0);
    static_error_estimate(node.n_records(), majority, n_classes)
}

impl DecisionTree {
    /// Prune the tree in place, children before parents.
    ///
    /// A leaf's error is its static estimate. A decision node's backed-up
    /// error is the sum over children of `(child records / node records) ·
    /// child error`. When the static estimate is less than or equal to the
    /// backed-up error the node becomes a pruned leaf carrying its own class
    /// counts; otherwise it keeps its children and takes the backed-up
    /// error. Pruning an already pruned tree changes nothing.
    #[instrument(skip(self), fields(n_nodes = self.nodes.len()))]
    pub fn prune(&mut self) -> PruneSummary {
        let nodes_before = self.nodes.len();
        let n_classes = self.schema.n_classes();
        let mut error = vec![0.0f64; nodes_before];
        let mut collapsed_at = Vec::new();

        // Children always sit at higher indices, so a reverse sweep visits
        // them before their parent.
        for idx in (0..nodes_before).rev() {
            let static_error = node_static_error(&self.nodes[idx], n_classes);
            let Node::Decision {
                children,
                class_counts,
                ..
            } = &self.nodes[idx]
            else {
                error[idx] = static_error;
                continue;
            };

            let total: usize = class_counts.iter().sum();
            let backed_up: f64 = if total == 0 {
                0.0
            } else {
                children
                    .iter()
                    .map(|c| {
                        let share = self.nodes[c.index()].n_records() as f64 / total as f64;
                        share * error[c.index()]
                    })
                    .sum()
            };

            if static_error <= backed_up {
                let counts = class_counts.clone();
                self.nodes[idx] = Node::leaf(counts, self.distribution, true);
                error[idx] = static_error;
                collapsed_at.push(idx);
            } else {
                error[idx] = backed_up;
            }
        }

        let root_error = error[0];
        let kept = self.compact();
        let collapsed = collapsed_at.into_iter().filter(|&i| kept[i]).count();
        self.pruned = true;

        let summary = PruneSummary {
            nodes_before,
            nodes_after: self.nodes.len(),
            collapsed,
            root_error,
        };
        debug!(collapsed, root_error, "pruning pass finished");
        info!(
            nodes_before = summary.nodes_before,
            nodes_after = summary.nodes_after,
            "pruned decision tree"
        );
        summary
    }

    /// Drop nodes no longer reachable from the root and renumber the rest in
    /// depth-first pre-order, which keeps every child after its parent.
    ///
    /// Returns, for each old index, whether the node was kept.
    fn compact(&mut self) -> Vec<bool> {
        let n = self.nodes.len();
        let mut remap = vec![None; n];
        let mut order = Vec::with_capacity(n);
        let mut stack = vec![0usize];
        while let Some(idx) = stack.pop() {
            remap[idx] = Some(order.len());
            order.push(idx);
            if let Node::Decision { children, .. } = &self.nodes[idx] {
                stack.extend(children.iter().rev().map(|c| c.index()));
            }
        }

        let mut old: Vec<Option<Node>> = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(Some)
            .collect();
        self.nodes = order
            .iter()
            .filter_map(|&idx| old[idx].take())
            .map(|mut node| {
                if let Node::Decision { children, .. } = &mut node {
                    for child in children.iter_mut() {
                        if let Some(new) = remap[child.index()] {
                            *child = NodeIndex::new(new);
                        }
                    }
                }
                node
            })
            .collect();

        remap.iter().map(Option::is_some).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DistributionMode, MissingValuePolicy};
    use crate::dataset::{Attribute, Schema};
    use crate::gain::SplitCriterion;
    use crate::split::SplitRule;

    fn tree_from(nodes: Vec<Node>) -> DecisionTree {
        let schema = Schema::new(
            vec![
                Attribute::categorical("a", ["0", "1"]),
                Attribute::categorical("b", ["0", "1"]),
                Attribute::categorical("y", ["f", "t"]),
            ],
            2,
        )
        .unwrap();
        DecisionTree {
            nodes,
            input_schema: schema.clone(),
            schema,
            discretization: None,
            criterion: SplitCriterion::GainRatio,
            missing_values: MissingValuePolicy::ImputeModal,
            distribution: DistributionMode::Counts,
            pruned: false,
        }
    }

    fn leaf(counts: Vec<usize>) -> Node {
        Node::leaf(counts, DistributionMode::Counts, false)
    }

    fn decision(attribute: usize, children: &[usize], counts: Vec<usize>) -> Node {
        Node::Decision {
            rule: SplitRule::Multiway { attribute },
            children: children.iter().copied().map(NodeIndex::new).collect(),
            class_counts: counts,
        }
    }

    #[test]
    fn static_estimate_matches_formula() {
        // N = 4, n = 3, k = 2: (4 - 3 + 1) / 6
        assert!((static_error_estimate(4, 3, 2) - 1.0 / 3.0).abs() < 1e-12);
        // N = 10, n = 9, k = 2: 2 / 12
        assert!((static_error_estimate(10, 9, 2) - 0.166_666_666_7).abs() < 1e-9);
        // Empty node: (k - 1) / k
        assert!((static_error_estimate(0, 0, 3) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn weak_split_is_collapsed() {
        // Root [3,1] split into [2,0] and [1,1].
        let mut tree = tree_from(vec![
            decision(0, &[1, 2], vec![3, 1]),
            leaf(vec![2, 0]),
            leaf(vec![1, 1]),
        ]);
        // static root = 2/6 = 0.333; backed up = 0.5·(1/4) + 0.5·(2/4) = 0.375
        let summary = tree.prune();
        assert_eq!(summary.nodes_before, 3);
        assert_eq!(summary.nodes_after, 1);
        assert_eq!(summary.collapsed, 1);
        assert!((summary.root_error - 1.0 / 3.0).abs() < 1e-12);
        assert!(matches!(
            tree.root(),
            Node::Leaf {
                label: Some(0),
                pruned: true,
                ..
            }
        ));
        assert_eq!(tree.root().class_counts(), &[3, 1]);
        assert!(tree.is_pruned());
    }

    #[test]
    fn strong_split_is_kept() {
        let mut tree = tree_from(vec![
            decision(0, &[1, 2], vec![10, 10]),
            leaf(vec![10, 0]),
            leaf(vec![0, 10]),
        ]);
        // static root = 11/22 = 0.5; backed up = 1/12
        let summary = tree.prune();
        assert_eq!(summary.nodes_after, 3);
        assert_eq!(summary.collapsed, 0);
        assert!((summary.root_error - 1.0 / 12.0).abs() < 1e-12);
        assert!(!tree.root().is_leaf());
    }

    #[test]
    fn equal_errors_collapse() {
        // Children reproduce the parent's split exactly: static == backed up.
        let mut tree = tree_from(vec![
            decision(0, &[1], vec![3, 1]),
            leaf(vec![3, 1]),
        ]);
        tree.prune();
        assert!(tree.root().is_leaf());
    }

    #[test]
    fn nested_collapse_compacts_arena() {
        // Root keeps its split; the inner node on the right collapses.
        let mut tree = tree_from(vec![
            decision(0, &[1, 2], vec![10, 12]),
            leaf(vec![10, 0]),
            decision(1, &[3, 4], vec![0, 12]),
            leaf(vec![0, 6]),
            leaf(vec![0, 6]),
        ]);
        let summary = tree.prune();
        assert_eq!(summary.nodes_after, 3);
        assert_eq!(summary.collapsed, 1);
        let Node::Decision { children, .. } = tree.root() else {
            panic!("root should survive");
        };
        let right = tree.node(children[1]).unwrap();
        assert!(matches!(right, Node::Leaf { pruned: true, .. }));
        assert!(children.iter().all(|c| c.index() < tree.n_nodes()));
    }

    #[test]
    fn pruning_is_idempotent() {
        let mut tree = tree_from(vec![
            decision(0, &[1, 2], vec![10, 12]),
            decision(1, &[3, 4], vec![10, 2]),
            decision(1, &[5, 6], vec![0, 10]),
            leaf(vec![9, 0]),
            leaf(vec![1, 2]),
            leaf(vec![0, 4]),
            leaf(vec![0, 6]),
        ]);
        tree.prune();
        let once = tree.clone();
        let summary = tree.prune();
        assert_eq!(tree, once);
        assert_eq!(summary.collapsed, 0);
        assert_eq!(summary.nodes_before, summary.nodes_after);
    }
}
