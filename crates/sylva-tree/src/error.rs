/// Errors from schema construction, tree induction, and classification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// Returned when a categorical attribute (or the class) has no values.
    #[error("attribute \"{attribute}\" has an empty value domain")]
    EmptyDomain {
        /// Name of the attribute with the empty domain.
        attribute: String,
    },

    /// Returned when a query record lacks a value the classifier must test.
    #[error("record has a missing value for attribute \"{attribute}\"")]
    MissingValue {
        /// Name of the attribute whose value is missing.
        attribute: String,
    },

    /// Returned internally when a continuous attribute has fewer than two
    /// distinct values at a node. Recovered by scoring the attribute as zero.
    #[error("attribute \"{attribute}\" has {distinct} distinct value(s), need at least 2 to split")]
    DegenerateSplit {
        /// Name of the attribute that cannot be split.
        attribute: String,
        /// Number of distinct observed values.
        distinct: usize,
    },

    /// Returned when the designated class attribute is continuous.
    #[error("class attribute \"{attribute}\" must be categorical")]
    ClassNotCategorical {
        /// Name of the class attribute.
        attribute: String,
    },

    /// Returned when the class index does not address an attribute.
    #[error("class index {class_index} out of range for {n_attributes} attributes")]
    ClassIndexOutOfRange {
        /// The invalid class index.
        class_index: usize,
        /// Number of attributes in the schema.
        n_attributes: usize,
    },

    /// Returned when two attributes share a name.
    #[error("duplicate attribute name \"{attribute}\"")]
    DuplicateAttribute {
        /// The duplicated name.
        attribute: String,
    },

    /// Returned when a categorical domain lists the same label twice.
    #[error("attribute \"{attribute}\" lists category \"{category}\" more than once")]
    DuplicateCategory {
        /// Name of the attribute.
        attribute: String,
        /// The duplicated label.
        category: String,
    },

    /// Returned when a record does not have one value per attribute.
    #[error("record {record_index} has {got} values, expected {expected}")]
    RecordLengthMismatch {
        /// Number of attributes in the schema.
        expected: usize,
        /// Number of values in the record.
        got: usize,
        /// Zero-based index of the offending record (0 for query records).
        record_index: usize,
    },

    /// Returned when a value's kind does not match its attribute's kind.
    #[error("attribute \"{attribute}\" expects a {expected} value")]
    ValueKindMismatch {
        /// Name of the attribute.
        attribute: String,
        /// Kind the attribute expects ("categorical" or "continuous").
        expected: &'static str,
    },

    /// Returned when a category index does not address the attribute's domain.
    #[error("category index {index} out of range for attribute \"{attribute}\" with {domain_size} values")]
    CategoryOutOfRange {
        /// Name of the attribute.
        attribute: String,
        /// The invalid index.
        index: usize,
        /// Size of the attribute's domain.
        domain_size: usize,
    },

    /// Returned when a continuous value is NaN or infinite.
    #[error("non-finite value for continuous attribute \"{attribute}\"")]
    NonFiniteValue {
        /// Name of the attribute.
        attribute: String,
    },

    /// Returned when a textual field names a category outside the domain.
    #[error("unknown category \"{category}\" for attribute \"{attribute}\"")]
    UnknownCategory {
        /// Name of the attribute.
        attribute: String,
        /// The unrecognized label.
        category: String,
    },

    /// Returned when a textual field for a continuous attribute is not a number.
    #[error("invalid number \"{raw}\" for attribute \"{attribute}\"")]
    InvalidNumber {
        /// Name of the attribute.
        attribute: String,
        /// The raw field text.
        raw: String,
    },

    /// Returned when an attribute index is out of range or names the class.
    #[error("attribute index {index} is not a splittable attribute")]
    UnknownAttribute {
        /// The offending attribute index.
        index: usize,
    },

    /// Returned when a categorical-only configuration meets a continuous attribute.
    #[error("continuous attribute \"{attribute}\" is not supported by a categorical-only configuration")]
    UnsupportedContinuous {
        /// Name of the continuous attribute.
        attribute: String,
    },

    /// Returned when training data has a missing value and the configuration
    /// does not accept missing values.
    #[error("training record {record_index} has a missing value for attribute \"{attribute}\"")]
    MissingTrainingValue {
        /// Zero-based index of the offending record.
        record_index: usize,
        /// Name of the attribute whose value is missing.
        attribute: String,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },
}
