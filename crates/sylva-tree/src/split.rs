use tracing::debug;

use crate::dataset::{AttributeKind, Record, Schema, Value};
use crate::error::TreeError;
use crate::gain::SplitCriterion;
use crate::impute::modal_value;

/// How a decision node routes records to its children.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SplitRule {
    /// One child per domain value of a categorical attribute, in domain order.
    Multiway {
        /// Attribute tested at the node.
        attribute: usize,
    },
    /// Two children: `value <= threshold` goes left (0), the rest right (1).
    Threshold {
        /// Continuous attribute tested at the node.
        attribute: usize,
        /// Cut point. Always one of the observed training values.
        threshold: f64,
    },
}

impl SplitRule {
    /// Return the attribute tested by this rule.
    #[must_use]
    pub fn attribute(&self) -> usize {
        match *self {
            SplitRule::Multiway { attribute } | SplitRule::Threshold { attribute, .. } => attribute,
        }
    }

    /// Return the threshold of a binary numeric rule.
    #[must_use]
    pub fn threshold(&self) -> Option<f64> {
        match *self {
            SplitRule::Multiway { .. } => None,
            SplitRule::Threshold { threshold, .. } => Some(threshold),
        }
    }

    /// Number of children a node with this rule has under `schema`.
    pub(crate) fn arity(&self, schema: &Schema) -> usize {
        match *self {
            SplitRule::Multiway { attribute } => schema
                .attribute(attribute)
                .map_or(0, |a| a.domain_size()),
            SplitRule::Threshold { .. } => 2,
        }
    }

    /// Branch taken by `value`, or `None` when the value is missing or of
    /// the wrong kind.
    #[must_use]
    pub fn branch(&self, value: Value) -> Option<usize> {
        match (*self, value) {
            (SplitRule::Multiway { .. }, Value::Category(c)) => Some(c),
            (SplitRule::Threshold { threshold, .. }, Value::Number(x)) => {
                Some(if x <= threshold { 0 } else { 1 })
            }
            _ => None,
        }
    }

    /// Distribute `records` over `arity` branches.
    ///
    /// A record whose tested value is still missing goes to branch 0.
    pub(crate) fn partition(&self, records: Vec<Record>, arity: usize) -> Vec<Vec<Record>> {
        let mut branches: Vec<Vec<Record>> = (0..arity).map(|_| Vec::new()).collect();
        let attribute = self.attribute();
        for record in records {
            let b = self
                .branch(record.value(attribute))
                .filter(|&b| b < arity)
                .unwrap_or(0);
            branches[b].push(record);
        }
        branches
    }
}

/// Best binary cut of a continuous attribute.
#[derive(Debug, Clone)]
pub(crate) struct ThresholdSplit {
    /// Observed value used as the cut point.
    pub(crate) threshold: f64,
    /// Criterion score of the cut.
    pub(crate) score: f64,
    /// Class counts of the `<=` branch and the `>` branch.
    pub(crate) branch_counts: Vec<Vec<usize>>,
}

/// A scored candidate split at a node.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) rule: SplitRule,
    pub(crate) score: f64,
}

/// Per-value class counts of a categorical attribute over labeled records.
///
/// A missing value is counted under `fill`; with no fill it is counted
/// under value 0, matching where [`SplitRule::partition`] sends it.
pub(crate) fn categorical_branch_counts(
    schema: &Schema,
    records: &[Record],
    attribute: usize,
    fill: Option<usize>,
) -> Vec<Vec<usize>> {
    let domain_size = schema.attribute(attribute).map_or(0, |a| a.domain_size());
    let n_classes = schema.n_classes();
    let mut counts = vec![vec![0usize; n_classes]; domain_size];
    for record in records {
        let Some(class) = schema.class_of(record) else {
            continue;
        };
        let value = record.value(attribute).category().or(fill).unwrap_or(0);
        if let Some(row) = counts.get_mut(value) {
            row[class] += 1;
        }
    }
    counts
}

/// Find the best `<=` cut of a continuous attribute.
///
/// Candidate thresholds are the distinct observed values except the largest.
/// Missing values take `fill`; with no fill they are ignored. Ties keep the
/// smallest threshold.
///
/// # Errors
///
/// Returns [`TreeError::DegenerateSplit`] when fewer than two distinct values
/// are observed, and [`TreeError::UnknownAttribute`] for a bad index.
pub(crate) fn best_threshold(
    schema: &Schema,
    records: &[Record],
    attribute: usize,
    criterion: SplitCriterion,
    fill: Option<f64>,
) -> Result<ThresholdSplit, TreeError> {
    let attr = schema
        .attribute(attribute)
        .ok_or(TreeError::UnknownAttribute { index: attribute })?;
    let n_classes = schema.n_classes();

    let mut sorted: Vec<(f64, usize)> = records
        .iter()
        .filter_map(|record| {
            let class = schema.class_of(record)?;
            let value = record.value(attribute).number().or(fill)?;
            Some((value, class))
        })
        .collect();
    sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let distinct = 1 + sorted.windows(2).filter(|w| w[0].0 != w[1].0).count();
    if sorted.is_empty() || distinct < 2 {
        return Err(TreeError::DegenerateSplit {
            attribute: attr.name().to_string(),
            distinct: if sorted.is_empty() { 0 } else { distinct },
        });
    }

    let mut parent = vec![0usize; n_classes];
    for &(_, class) in &sorted {
        parent[class] += 1;
    }

    // Incremental scan: left grows from empty, right shrinks from full.
    let mut left = vec![0usize; n_classes];
    let mut right = parent.clone();
    let mut best: Option<(f64, f64)> = None;

    for i in 0..sorted.len() - 1 {
        let (value, class) = sorted[i];
        left[class] += 1;
        right[class] -= 1;
        if value == sorted[i + 1].0 {
            continue;
        }
        let score = criterion.score(&parent, &[&left[..], &right[..]]);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((value, score));
        }
    }

    let Some((threshold, score)) = best else {
        return Err(TreeError::DegenerateSplit {
            attribute: attr.name().to_string(),
            distinct,
        });
    };

    let mut branch_counts = vec![vec![0usize; n_classes]; 2];
    for &(value, class) in &sorted {
        branch_counts[usize::from(value > threshold)][class] += 1;
    }

    Ok(ThresholdSplit {
        threshold,
        score,
        branch_counts,
    })
}

/// Score splitting `records` on `attribute`.
///
/// Missing values are counted under the attribute's modal value at this
/// node. Returns `None` for a continuous attribute that cannot be cut here.
pub(crate) fn score_attribute(
    schema: &Schema,
    records: &[Record],
    attribute: usize,
    criterion: SplitCriterion,
) -> Option<Candidate> {
    let attr = schema.attribute(attribute)?;
    let fill = modal_value(records, attr);
    match attr.kind() {
        AttributeKind::Categorical { .. } => {
            let parent = schema.class_counts(records);
            let branches =
                categorical_branch_counts(schema, records, attribute, fill.and_then(Value::category));
            Some(Candidate {
                rule: SplitRule::Multiway { attribute },
                score: criterion.score(&parent, &branches),
            })
        }
        AttributeKind::Continuous => {
            match best_threshold(schema, records, attribute, criterion, fill.and_then(Value::number)) {
                Ok(split) => Some(Candidate {
                    rule: SplitRule::Threshold {
                        attribute,
                        threshold: split.threshold,
                    },
                    score: split.score,
                }),
                Err(e) => {
                    debug!(%e, "attribute scored as zero");
                    None
                }
            }
        }
    }
}
