//! Modal-value imputation of missing attribute values.

use tracing::warn;

use crate::dataset::{Attribute, AttributeKind, Record, Value};
use crate::node::majority_class;

/// Most frequent observed value of `attribute` among `records`.
///
/// Categorical ties go to the lowest domain index; continuous ties go to the
/// smallest number. Returns `None` when every value is missing.
#[must_use]
pub fn modal_value(records: &[Record], attribute: &Attribute) -> Option<Value> {
    let index = attribute.index();
    match attribute.kind() {
        AttributeKind::Categorical { values } => {
            let mut counts = vec![0usize; values.len()];
            for record in records {
                if let Some(c) = record.value(index).category()
                    && c < counts.len()
                {
                    counts[c] += 1;
                }
            }
            majority_class(&counts).map(Value::Category)
        }
        AttributeKind::Continuous => {
            let mut numbers: Vec<f64> = records
                .iter()
                .filter_map(|r| r.value(index).number())
                .collect();
            numbers.sort_unstable_by(f64::total_cmp);
            let mut best: Option<(f64, usize)> = None;
            for run in numbers.chunk_by(|a, b| a == b) {
                if best.is_none_or(|(_, m)| run.len() > m) {
                    best = Some((run[0], run.len()));
                }
            }
            best.map(|(x, _)| Value::Number(x))
        }
    }
}

/// Replace missing values of `attribute` in `records` with its modal value.
///
/// Returns the number of values replaced. When no value is observed the
/// records are left untouched.
pub fn impute_modal(records: &mut [Record], attribute: &Attribute) -> usize {
    let index = attribute.index();
    let n_missing = records
        .iter()
        .filter(|r| r.value(index).is_missing())
        .count();
    if n_missing == 0 {
        return 0;
    }
    let Some(fill) = modal_value(records, attribute) else {
        warn!(
            attribute = attribute.name(),
            n_missing, "no observed value to impute from"
        );
        return 0;
    };
    for record in records.iter_mut() {
        if record.value(index).is_missing() && index < record.len() {
            record.set(index, fill);
        }
    }
    n_missing
}
