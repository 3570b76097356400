use std::collections::VecDeque;

use tracing::{debug, info, trace};

use crate::{
    TreeError,
    config::{DistributionMode, MissingValuePolicy, NumericSplit, Pruning, TreeConfig},
    dataset::{Dataset, Record, Schema},
    discretize::Discretization,
    gain::{SplitCriterion, is_negligible},
    impute::impute_modal,
    node::{Node, NodeIndex},
    split::{Candidate, SplitRule, score_attribute},
};

/// Validate `dataset` against `config` and grow (then optionally prune) a tree.
pub(crate) fn induce(config: &TreeConfig, dataset: &Dataset) -> Result<DecisionTree, TreeError> {
    // --- Validate config ---
    if let Some(d) = config.max_depth
        && d == 0
    {
        return Err(TreeError::InvalidMaxDepth { max_depth: 0 });
    }

    let schema = dataset.schema();
    let class_index = schema.class_index();

    // --- Validate inputs ---
    if config.numeric_split == NumericSplit::CategoricalOnly
        && let Some(attribute) = schema
            .feature_indices()
            .filter_map(|i| schema.attribute(i))
            .find(|a| !a.is_categorical())
    {
        return Err(TreeError::UnsupportedContinuous {
            attribute: attribute.name().to_string(),
        });
    }

    if config.missing_values == MissingValuePolicy::RejectAtQuery {
        for (record_index, record) in dataset.records().iter().enumerate() {
            if record.value(class_index).is_missing() {
                continue;
            }
            if let Some(attribute) = schema
                .feature_indices()
                .find(|&i| record.value(i).is_missing())
                .and_then(|i| schema.attribute(i))
            {
                return Err(TreeError::MissingTrainingValue {
                    record_index,
                    attribute: attribute.name().to_string(),
                });
            }
        }
    }

    let mut data = dataset.clone();
    let dropped = data.remove_missing_class();
    if dropped > 0 {
        debug!(dropped, "ignoring records with a missing class value");
    }
    let (input_schema, records) = data.into_parts();

    let has_continuous = input_schema
        .feature_indices()
        .filter_map(|i| input_schema.attribute(i))
        .any(|a| !a.is_categorical());

    let (discretization, schema, records) =
        if config.numeric_split == NumericSplit::GlobalDiscretization && has_continuous {
            let (discretization, schema) =
                Discretization::fit(&input_schema, &records, config.criterion);
            let records = discretization.apply_all(records);
            (Some(discretization), schema, records)
        } else {
            (None, input_schema.clone(), records)
        };

    debug!(
        n_records = records.len(),
        n_attributes = schema.n_attributes(),
        n_classes = schema.n_classes(),
        criterion = %config.criterion,
        "fitting decision tree"
    );

    let nodes = grow(config, &schema, records);

    let mut tree = DecisionTree {
        nodes,
        input_schema,
        schema,
        discretization,
        criterion: config.criterion,
        missing_values: config.missing_values,
        distribution: config.distribution,
        pruned: false,
    };

    if config.pruning == Pruning::ReducedError {
        tree.prune();
    }

    info!(
        n_nodes = tree.n_nodes(),
        n_leaves = tree.n_leaves(),
        depth = tree.depth(),
        "decision tree built"
    );

    Ok(tree)
}

/// A node still to be grown: its records, depth, and reserved arena slot.
struct Pending {
    records: Vec<Record>,
    depth: usize,
    slot: usize,
}

/// Grow the arena with an explicit work stack.
///
/// Slots for all children of a node are reserved when the node is split, so
/// every child index is greater than its parent's.
fn grow(config: &TreeConfig, schema: &Schema, records: Vec<Record>) -> Vec<Node> {
    let n_classes = schema.n_classes();
    let placeholder = || Node::leaf(vec![0; n_classes], config.distribution, false);

    let mut nodes = vec![placeholder()];
    let mut stack = vec![Pending {
        records,
        depth: 0,
        slot: 0,
    }];

    while let Some(Pending {
        mut records,
        depth,
        slot,
    }) = stack.pop()
    {
        let class_counts = schema.class_counts(&records);
        let may_split = !records.is_empty() && config.max_depth.is_none_or(|d| depth < d);
        let chosen = if may_split {
            select_split(schema, &records, config.criterion)
        } else {
            None
        };

        let Some(rule) = chosen else {
            nodes[slot] = Node::leaf(class_counts, config.distribution, false);
            continue;
        };

        if config.missing_values == MissingValuePolicy::ImputeModal
            && let Some(attribute) = schema.attribute(rule.attribute())
        {
            let filled = impute_modal(&mut records, attribute);
            if filled > 0 {
                trace!(attribute = attribute.name(), filled, "imputed missing values");
            }
        }

        let arity = rule.arity(schema);
        let first_child = nodes.len();
        nodes.extend((0..arity).map(|_| placeholder()));

        // Reverse so the first branch is grown first.
        for (offset, branch) in rule.partition(records, arity).into_iter().enumerate().rev() {
            stack.push(Pending {
                records: branch,
                depth: depth + 1,
                slot: first_child + offset,
            });
        }

        nodes[slot] = Node::Decision {
            rule,
            children: (first_child..first_child + arity).map(NodeIndex::new).collect(),
            class_counts,
        };
    }

    nodes
}

/// Pick the highest-scoring attribute; the first one wins ties.
///
/// Returns `None` when no attribute scores above the gain tolerance.
fn select_split(schema: &Schema, records: &[Record], criterion: SplitCriterion) -> Option<SplitRule> {
    let mut best: Option<Candidate> = None;
    for attribute in schema.feature_indices() {
        let Some(candidate) = score_attribute(schema, records, attribute, criterion) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }

    let best = best?;
    if best.score <= 0.0 || is_negligible(best.score) {
        trace!(n_records = records.len(), score = best.score, "no informative split");
        return None;
    }
    trace!(
        n_records = records.len(),
        attribute = best.rule.attribute(),
        score = best.score,
        "split selected"
    );
    Some(best.rule)
}

/// A fitted decision tree.
///
/// Stored as an arena-based `Vec<Node>` with the root at index 0. Nodes refer
/// to attributes of [`DecisionTree::schema`], which differs from the training
/// schema only when continuous attributes were globally discretized.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) input_schema: Schema,
    pub(crate) schema: Schema,
    pub(crate) discretization: Option<Discretization>,
    pub(crate) criterion: SplitCriterion,
    pub(crate) missing_values: MissingValuePolicy,
    pub(crate) distribution: DistributionMode,
    pub(crate) pruned: bool,
}

impl DecisionTree {
    /// Return the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Return the node at `index`.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.index())
    }

    /// Return all nodes in arena order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the schema query records must match.
    #[must_use]
    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    /// Return the schema the nodes' attribute indices refer to.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Return the global discretization, if one was applied.
    #[must_use]
    pub fn discretization(&self) -> Option<&Discretization> {
        self.discretization.as_ref()
    }

    /// Return the criterion the tree was grown with.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the missing-value policy applied to query records.
    #[must_use]
    pub fn missing_values(&self) -> MissingValuePolicy {
        self.missing_values
    }

    /// Return `true` once the tree has been through a pruning pass.
    #[must_use]
    pub fn is_pruned(&self) -> bool {
        self.pruned
    }

    /// Return the number of class values.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.schema.n_classes()
    }

    /// Return the total number of nodes in the tree (decisions and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        // BFS: (node_index, current_depth)
        let mut max_depth = 0usize;
        let mut queue = VecDeque::new();
        queue.push_back((0usize, 0usize));

        while let Some((node_idx, d)) = queue.pop_front() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Decision { children, .. } => {
                    queue.extend(children.iter().map(|c| (c.index(), d + 1)));
                }
            }
        }

        max_depth
    }
}
