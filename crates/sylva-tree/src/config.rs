//! Configuration builder for decision-tree induction.

use tracing::instrument;

use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::gain::SplitCriterion;
use crate::tree::DecisionTree;

/// How continuous attributes are split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NumericSplit {
    /// Search a fresh `<=` threshold at every node.
    PerNodeThreshold,
    /// Cut each continuous attribute once over the training set, then treat
    /// it as a two-valued categorical attribute.
    GlobalDiscretization,
    /// Reject datasets with continuous attributes.
    CategoricalOnly,
}

/// How missing attribute values are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MissingValuePolicy {
    /// Fill missing values with the modal value at each split node during
    /// training. A query record missing a tested value is rejected.
    ImputeModal,
    /// Reject missing values in training data and in query records.
    RejectAtQuery,
}

/// Post-induction pruning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Pruning {
    /// Keep the fully grown tree.
    None,
    /// Bottom-up error-based pruning with the static error estimate.
    ReducedError,
}

/// What a leaf's class distribution holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DistributionMode {
    /// Raw training counts per class.
    Counts,
    /// Counts divided by the leaf's record count.
    Frequencies,
}

/// Configuration for a single decision tree.
///
/// Construct via one of the profiles ([`TreeConfig::id3`],
/// [`TreeConfig::categorical_id3`], [`TreeConfig::discretized_j48`],
/// [`TreeConfig::j48`]) or [`TreeConfig::new`], then chain `with_*` methods.
///
/// # Profiles
///
/// | Profile            | Criterion   | Numeric split          | Missing values  | Pruning        | Distribution  |
/// |--------------------|-------------|------------------------|-----------------|----------------|---------------|
/// | `id3`              | gain        | global discretization  | reject          | none           | frequencies   |
/// | `categorical_id3`  | gain        | categorical only       | reject          | none           | frequencies   |
/// | `discretized_j48`  | gain ratio  | global discretization  | impute modal    | reduced error  | counts        |
/// | `j48` (default)    | gain ratio  | per-node threshold     | impute modal    | reduced error  | counts        |
///
/// `max_depth` defaults to `None` (unlimited) in every profile.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) numeric_split: NumericSplit,
    pub(crate) missing_values: MissingValuePolicy,
    pub(crate) pruning: Pruning,
    pub(crate) distribution: DistributionMode,
    pub(crate) max_depth: Option<usize>,
}

impl TreeConfig {
    /// Create a config with the C4.5 defaults; same as [`TreeConfig::j48`].
    #[must_use]
    pub fn new() -> Self {
        Self::j48()
    }

    /// Information gain over globally discretized attributes, no missing values.
    #[must_use]
    pub fn id3() -> Self {
        Self {
            criterion: SplitCriterion::InformationGain,
            numeric_split: NumericSplit::GlobalDiscretization,
            missing_values: MissingValuePolicy::RejectAtQuery,
            pruning: Pruning::None,
            distribution: DistributionMode::Frequencies,
            max_depth: None,
        }
    }

    /// Plain ID3 over categorical attributes only.
    #[must_use]
    pub fn categorical_id3() -> Self {
        Self {
            numeric_split: NumericSplit::CategoricalOnly,
            ..Self::id3()
        }
    }

    /// Gain ratio over globally discretized attributes, with modal imputation
    /// and pruning.
    #[must_use]
    pub fn discretized_j48() -> Self {
        Self {
            numeric_split: NumericSplit::GlobalDiscretization,
            ..Self::j48()
        }
    }

    /// C4.5-style tree: gain ratio, per-node thresholds, modal imputation and
    /// pruning.
    #[must_use]
    pub fn j48() -> Self {
        Self {
            criterion: SplitCriterion::GainRatio,
            numeric_split: NumericSplit::PerNodeThreshold,
            missing_values: MissingValuePolicy::ImputeModal,
            pruning: Pruning::ReducedError,
            distribution: DistributionMode::Counts,
            max_depth: None,
        }
    }

    // --- Setters ---

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set how continuous attributes are split.
    #[must_use]
    pub fn with_numeric_split(mut self, numeric_split: NumericSplit) -> Self {
        self.numeric_split = numeric_split;
        self
    }

    /// Set the missing-value policy.
    #[must_use]
    pub fn with_missing_values(mut self, missing_values: MissingValuePolicy) -> Self {
        self.missing_values = missing_values;
        self
    }

    /// Set the pruning strategy.
    #[must_use]
    pub fn with_pruning(mut self, pruning: Pruning) -> Self {
        self.pruning = pruning;
        self
    }

    /// Set what leaf distributions hold.
    #[must_use]
    pub fn with_distribution(mut self, distribution: DistributionMode) -> Self {
        self.distribution = distribution;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// `None` means grow until no attribute has positive gain. `Some(d)`
    /// limits depth to `d` levels (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    // --- Getters ---

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return how continuous attributes are split.
    #[must_use]
    pub fn numeric_split(&self) -> NumericSplit {
        self.numeric_split
    }

    /// Return the missing-value policy.
    #[must_use]
    pub fn missing_values(&self) -> MissingValuePolicy {
        self.missing_values
    }

    /// Return the pruning strategy.
    #[must_use]
    pub fn pruning(&self) -> Pruning {
        self.pruning
    }

    /// Return what leaf distributions hold.
    #[must_use]
    pub fn distribution(&self) -> DistributionMode {
        self.distribution
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Induce a decision tree from `dataset`.
    ///
    /// Records with a missing class value are ignored. An empty dataset
    /// yields a single leaf with no label.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                                   |
    /// |---------------------------------------|--------------------------------------------------------|
    /// | [`TreeError::InvalidMaxDepth`]        | `max_depth` is `Some(0)`                               |
    /// | [`TreeError::UnsupportedContinuous`]  | `CategoricalOnly` and a non-class attribute is continuous |
    /// | [`TreeError::MissingTrainingValue`]   | `RejectAtQuery` and a non-class value is missing       |
    #[instrument(skip(self, dataset), fields(n_records = dataset.n_records()))]
    pub fn fit(&self, dataset: &Dataset) -> Result<DecisionTree, TreeError> {
        crate::tree::induce(self, dataset)
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}
