//! Classification of query records with a fitted tree.

use std::borrow::Cow;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::config::MissingValuePolicy;
use crate::dataset::{Record, Value};
use crate::error::TreeError;
use crate::node::Node;
use crate::tree::DecisionTree;

impl DecisionTree {
    /// Predict the class of a single record.
    ///
    /// `record` holds one value per attribute of [`DecisionTree::input_schema`],
    /// class included; the class value is ignored. Returns `None` when the
    /// record lands in a leaf no training record reached.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                                    |
    /// |--------------------------------------|---------------------------------------------------------|
    /// | [`TreeError::RecordLengthMismatch`]  | wrong number of values                                  |
    /// | [`TreeError::ValueKindMismatch`]     | a value's kind does not match its attribute             |
    /// | [`TreeError::CategoryOutOfRange`]    | a category index is outside its domain                  |
    /// | [`TreeError::NonFiniteValue`]        | a number is NaN or infinite                             |
    /// | [`TreeError::MissingValue`]          | a tested value is missing, or any non-class value is missing under [`MissingValuePolicy::RejectAtQuery`] |
    pub fn classify(&self, record: &[Value]) -> Result<Option<usize>, TreeError> {
        self.leaf_for(record).map(|(label, _)| label)
    }

    /// Return the class distribution of the leaf `record` lands in.
    ///
    /// The vector has one entry per class value and holds counts or
    /// frequencies depending on the tree's distribution mode.
    ///
    /// # Errors
    ///
    /// Same as [`DecisionTree::classify`].
    pub fn class_distribution(&self, record: &[Value]) -> Result<Vec<f64>, TreeError> {
        self.leaf_for(record).map(|(_, distribution)| distribution.to_vec())
    }

    /// Classify a batch of records in parallel, one result per record.
    #[must_use]
    pub fn classify_batch(&self, records: &[Record]) -> Vec<Result<Option<usize>, TreeError>> {
        records
            .par_iter()
            .map(|record| self.classify(record.values()))
            .collect()
    }

    /// Return class distributions for a batch of records in parallel.
    #[must_use]
    pub fn class_distribution_batch(&self, records: &[Record]) -> Vec<Result<Vec<f64>, TreeError>> {
        records
            .par_iter()
            .map(|record| self.class_distribution(record.values()))
            .collect()
    }

    /// Return the label text of class `label`.
    #[must_use]
    pub fn class_name(&self, label: usize) -> Option<&str> {
        self.schema.class_attribute().category(label)
    }

    /// Validate `record`, walk from the root to its leaf and return the
    /// leaf's label and distribution.
    fn leaf_for(&self, record: &[Value]) -> Result<(Option<usize>, &[f64]), TreeError> {
        self.input_schema.validate(record, 0)?;

        if self.missing_values == MissingValuePolicy::RejectAtQuery
            && let Some(attribute) = self
                .input_schema
                .feature_indices()
                .find(|&i| record[i].is_missing())
                .and_then(|i| self.input_schema.attribute(i))
        {
            return Err(TreeError::MissingValue {
                attribute: attribute.name().to_string(),
            });
        }

        let values: Cow<'_, [Value]> = match &self.discretization {
            Some(discretization) => Cow::Owned(discretization.apply(record)),
            None => Cow::Borrowed(record),
        };

        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf {
                    label,
                    distribution,
                    ..
                } => return Ok((*label, distribution.as_slice())),
                Node::Decision { rule, children, .. } => {
                    let attribute = rule.attribute();
                    let name = || {
                        self.schema
                            .attribute(attribute)
                            .map_or_else(String::new, |a| a.name().to_string())
                    };
                    let value = values[attribute];
                    let branch = rule
                        .branch(value)
                        .ok_or_else(|| TreeError::MissingValue { attribute: name() })?;
                    let child = children.get(branch).ok_or_else(|| TreeError::CategoryOutOfRange {
                        attribute: name(),
                        index: branch,
                        domain_size: children.len(),
                    })?;
                    idx = child.index();
                }
            }
        }
    }
}
