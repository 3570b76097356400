//! Entropy, information gain, split information and gain ratio.

use std::fmt;

use crate::dataset::{AttributeKind, Dataset};
use crate::error::TreeError;
use crate::impute::modal_value;
use crate::split::{best_threshold, categorical_branch_counts};

/// Absolute tolerance under which a gain is treated as zero.
pub const GAIN_TOLERANCE: f64 = 1e-6;

/// Criterion used to rank candidate splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SplitCriterion {
    /// Information gain: `H(parent) - Σ (|b|/|D|)·H(b)`.
    InformationGain,
    /// Information gain divided by split information.
    GainRatio,
}

impl SplitCriterion {
    /// Score a partition given the parent class counts and per-branch class counts.
    #[must_use]
    pub fn score<B: AsRef<[usize]>>(&self, parent: &[usize], branches: &[B]) -> f64 {
        let gain = information_gain(parent, branches);
        match self {
            SplitCriterion::InformationGain => gain,
            SplitCriterion::GainRatio => {
                let sizes: Vec<usize> = branches
                    .iter()
                    .map(|b| b.as_ref().iter().sum())
                    .collect();
                gain_ratio(gain, split_information(&sizes))
            }
        }
    }
}

impl fmt::Display for SplitCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplitCriterion::InformationGain => "information gain",
            SplitCriterion::GainRatio => "gain ratio",
        };
        f.write_str(name)
    }
}

fn log2(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x.log2() }
}

/// Shannon entropy (base 2) of a class-count vector.
///
/// Classes with zero count contribute nothing; an empty vector or an
/// all-zero vector has entropy 0.
#[must_use]
pub fn entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    -counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * log2(p)
        })
        .sum::<f64>()
}

/// Information gain of splitting `parent` into `branches`.
///
/// Each branch is a class-count vector; empty branches contribute 0.
#[must_use]
pub fn information_gain<B: AsRef<[usize]>>(parent: &[usize], branches: &[B]) -> f64 {
    let total: usize = parent.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    let remainder: f64 = branches
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|counts| {
            let size: usize = counts.iter().sum();
            (size > 0).then(|| size as f64 / n * entropy(counts))
        })
        .sum();
    entropy(parent) - remainder
}

/// Split information of a partition with the given branch sizes.
#[must_use]
pub fn split_information(branch_sizes: &[usize]) -> f64 {
    let total: usize = branch_sizes.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    -branch_sizes
        .iter()
        .filter(|&&s| s > 0)
        .map(|&s| {
            let p = s as f64 / n;
            p * log2(p)
        })
        .sum::<f64>()
}

/// Gain ratio: `gain / split_info` when the gain is positive, else `gain` unchanged.
///
/// A positive gain over a zero split information cannot occur for a real
/// partition; it is also returned unchanged.
#[must_use]
pub fn gain_ratio(gain: f64, split_info: f64) -> f64 {
    if gain > 0.0 && split_info > 0.0 {
        gain / split_info
    } else {
        gain
    }
}

/// Return `true` when `value` is within [`GAIN_TOLERANCE`] of zero.
#[must_use]
pub fn is_negligible(value: f64) -> bool {
    value.abs() < GAIN_TOLERANCE
}

/// Per-branch class counts of `attribute` over the dataset's labeled records.
///
/// Continuous attributes are split at the best threshold under `criterion`;
/// `None` means the attribute has no usable threshold.
fn branch_counts(
    dataset: &Dataset,
    attribute: usize,
    criterion: SplitCriterion,
) -> Result<Option<Vec<Vec<usize>>>, TreeError> {
    let schema = dataset.schema();
    let attr = match schema.attribute(attribute) {
        Some(a) if attribute != schema.class_index() => a,
        _ => return Err(TreeError::UnknownAttribute { index: attribute }),
    };
    let records = dataset.records();
    let counts = match attr.kind() {
        AttributeKind::Categorical { .. } => {
            let fill = modal_value(records, attr).and_then(|v| v.category());
            Some(categorical_branch_counts(schema, records, attribute, fill))
        }
        AttributeKind::Continuous => {
            let fill = modal_value(records, attr).and_then(|v| v.number());
            best_threshold(schema, records, attribute, criterion, fill)
                .ok()
                .map(|split| split.branch_counts)
        }
    };
    Ok(counts)
}

impl Dataset {
    /// Class entropy of the labeled records.
    #[must_use]
    pub fn entropy(&self) -> f64 {
        entropy(&self.class_counts())
    }

    /// Information gain of splitting on `attribute`.
    ///
    /// Missing values are counted in the modal value's branch. A continuous
    /// attribute is evaluated at its best threshold by information gain; a
    /// continuous attribute with fewer than two distinct values has gain 0.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownAttribute`] when `attribute` is out of
    /// range or is the class attribute.
    pub fn information_gain(&self, attribute: usize) -> Result<f64, TreeError> {
        let parent = self.class_counts();
        Ok(branch_counts(self, attribute, SplitCriterion::InformationGain)?
            .map_or(0.0, |branches| information_gain(&parent, &branches)))
    }

    /// Split information of partitioning on `attribute`.
    ///
    /// A continuous attribute is evaluated at its best threshold by gain ratio.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownAttribute`] when `attribute` is out of
    /// range or is the class attribute.
    pub fn split_information(&self, attribute: usize) -> Result<f64, TreeError> {
        Ok(branch_counts(self, attribute, SplitCriterion::GainRatio)?.map_or(0.0, |branches| {
            let sizes: Vec<usize> = branches.iter().map(|b| b.iter().sum()).collect();
            split_information(&sizes)
        }))
    }

    /// Gain ratio of splitting on `attribute`.
    ///
    /// A continuous attribute is evaluated at its best threshold by gain ratio.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownAttribute`] when `attribute` is out of
    /// range or is the class attribute.
    pub fn gain_ratio(&self, attribute: usize) -> Result<f64, TreeError> {
        let parent = self.class_counts();
        Ok(branch_counts(self, attribute, SplitCriterion::GainRatio)?
            .map_or(0.0, |branches| SplitCriterion::GainRatio.score(&parent, &branches)))
    }
}
