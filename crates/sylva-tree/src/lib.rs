//! Decision-tree induction: build, prune, classify.
//!
//! Provides ID3 / C4.5-style decision trees over typed tabular data:
//! information gain and gain ratio criteria, multiway categorical splits,
//! binary threshold splits or global discretization for continuous
//! attributes, modal imputation of missing values, pessimistic-error pruning,
//! and parallel batch classification via rayon.
//!
//! ```
//! use sylva_tree::{Attribute, Dataset, Schema, TreeConfig};
//!
//! let schema = Schema::new(
//!     vec![
//!         Attribute::categorical("outlook", ["sunny", "overcast", "rainy"]),
//!         Attribute::continuous("humidity"),
//!         Attribute::categorical("play", ["yes", "no"]),
//!     ],
//!     2,
//! )?;
//! let mut data = Dataset::new(schema);
//! data.push_fields(&["sunny", "85", "no"])?;
//! data.push_fields(&["overcast", "86", "yes"])?;
//! data.push_fields(&["rainy", "96", "yes"])?;
//!
//! let tree = TreeConfig::j48().fit(&data)?;
//! let query = data.schema().encode(&["overcast", "90", "?"])?;
//! let label = tree.classify(query.values())?;
//! assert_eq!(label.and_then(|l| tree.class_name(l)), Some("yes"));
//! # Ok::<(), sylva_tree::TreeError>(())
//! ```

mod config;
mod dataset;
mod discretize;
mod error;
mod gain;
mod impute;
mod node;
mod predict;
mod prune;
mod render;
mod split;
mod tree;

pub use config::{DistributionMode, MissingValuePolicy, NumericSplit, Pruning, TreeConfig};
pub use dataset::{Attribute, AttributeKind, Dataset, MISSING_FIELD, Record, Schema, Value};
pub use discretize::{Discretization, bin_labels};
pub use error::TreeError;
pub use gain::{
    GAIN_TOLERANCE, SplitCriterion, entropy, gain_ratio, information_gain, is_negligible,
    split_information,
};
pub use impute::{impute_modal, modal_value};
pub use node::{Node, NodeIndex, majority_class};
pub use prune::{PruneSummary, static_error_estimate};
pub use split::SplitRule;
pub use tree::DecisionTree;
