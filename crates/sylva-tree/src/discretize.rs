//! Global binary discretization of continuous attributes.
//!
//! Each continuous attribute is cut once over the whole training set and
//! replaced by a two-valued categorical attribute `{<=t, >t}`. The same cut
//! is applied to records before classification.

use tracing::debug;

use crate::dataset::{Attribute, AttributeKind, Record, Schema, Value};
use crate::gain::SplitCriterion;
use crate::impute::modal_value;
use crate::split::best_threshold;

/// Domain labels of a discretized attribute cut at `threshold`.
#[must_use]
pub fn bin_labels(threshold: f64) -> [String; 2] {
    [format!("<={threshold}"), format!(">{threshold}")]
}

/// Per-attribute thresholds learned from training data.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Discretization {
    /// `Some(t)` for each discretized attribute, `None` otherwise.
    thresholds: Vec<Option<f64>>,
}

impl Discretization {
    /// Learn a cut for every continuous non-class attribute.
    ///
    /// The cut maximizes `criterion` over `records`. An attribute with fewer
    /// than two distinct observed values is cut at its largest observed value,
    /// or at 0 when none is observed. Returns the thresholds and the
    /// all-categorical schema they produce.
    pub(crate) fn fit(
        schema: &Schema,
        records: &[Record],
        criterion: SplitCriterion,
    ) -> (Self, Schema) {
        let mut thresholds = vec![None; schema.n_attributes()];
        let mut discretized = schema.clone();
        for index in schema.feature_indices() {
            let Some(attribute) = schema.attribute(index) else {
                continue;
            };
            if !matches!(attribute.kind(), AttributeKind::Continuous) {
                continue;
            }
            let fill = modal_value(records, attribute).and_then(Value::number);
            let threshold = match best_threshold(schema, records, index, criterion, fill) {
                Ok(split) => split.threshold,
                Err(e) => {
                    let fallback = records
                        .iter()
                        .filter_map(|r| r.value(index).number())
                        .max_by(f64::total_cmp)
                        .unwrap_or(0.0);
                    debug!(%e, threshold = fallback, "falling back to largest observed value");
                    fallback
                }
            };
            debug!(attribute = attribute.name(), threshold, "discretized");
            thresholds[index] = Some(threshold);
            discretized = discretized.with_attribute(
                index,
                Attribute::categorical(attribute.name(), bin_labels(threshold)),
            );
        }
        (Self { thresholds }, discretized)
    }

    /// Return the cut of `attribute`, if it was discretized.
    #[must_use]
    pub fn threshold(&self, attribute: usize) -> Option<f64> {
        self.thresholds.get(attribute).copied().flatten()
    }

    /// Map continuous values to their bin; other values pass through.
    #[must_use]
    pub fn apply(&self, values: &[Value]) -> Vec<Value> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| match (self.threshold(i), value) {
                (Some(t), Value::Number(x)) => Value::Category(usize::from(x > t)),
                _ => value,
            })
            .collect()
    }

    pub(crate) fn apply_all(&self, records: Vec<Record>) -> Vec<Record> {
        records
            .into_iter()
            .map(|r| Record::new(self.apply(r.values())))
            .collect()
    }
}
