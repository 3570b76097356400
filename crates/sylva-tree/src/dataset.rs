//! Typed tabular data: attributes, values, records, schema and dataset.

use std::collections::HashSet;
use std::fmt;

use crate::error::TreeError;

/// Field text that marks a missing value in [`Schema::encode`].
pub const MISSING_FIELD: &str = "?";

/// The value type of an attribute column.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AttributeKind {
    /// Finite, ordered set of labels. Values are indices into `values`.
    Categorical {
        /// Domain labels in declaration order.
        values: Vec<String>,
    },
    /// Real-valued column.
    Continuous,
}

/// A named column of the schema.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Attribute {
    name: String,
    kind: AttributeKind,
    index: usize,
}

impl Attribute {
    /// Create a categorical attribute with the given domain labels.
    ///
    /// The index is assigned when the attribute is placed in a [`Schema`].
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Categorical {
                values: values.into_iter().map(Into::into).collect(),
            },
            index: 0,
        }
    }

    /// Create a continuous attribute.
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Continuous,
            index: 0,
        }
    }

    /// Return the attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the attribute kind.
    #[must_use]
    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    /// Return the zero-based position of this attribute in its schema.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return `true` for categorical attributes.
    #[must_use]
    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, AttributeKind::Categorical { .. })
    }

    /// Return the domain labels, or `None` for a continuous attribute.
    #[must_use]
    pub fn domain(&self) -> Option<&[String]> {
        match &self.kind {
            AttributeKind::Categorical { values } => Some(values),
            AttributeKind::Continuous => None,
        }
    }

    /// Number of domain labels; zero for a continuous attribute.
    #[must_use]
    pub fn domain_size(&self) -> usize {
        self.domain().map_or(0, <[String]>::len)
    }

    /// Return the label at `index` in the domain.
    #[must_use]
    pub fn category(&self, index: usize) -> Option<&str> {
        self.domain()
            .and_then(|values| values.get(index))
            .map(String::as_str)
    }

    /// Return the domain index of `label`.
    #[must_use]
    pub fn category_index(&self, label: &str) -> Option<usize> {
        self.domain()
            .and_then(|values| values.iter().position(|v| v == label))
    }

    fn kind_name(&self) -> &'static str {
        if self.is_categorical() {
            "categorical"
        } else {
            "continuous"
        }
    }
}

/// One cell of a record.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    /// No observation.
    Missing,
    /// Index into a categorical attribute's domain.
    Category(usize),
    /// Finite real number for a continuous attribute.
    Number(f64),
}

impl Value {
    /// Return `true` if the value is [`Value::Missing`].
    #[must_use]
    pub fn is_missing(self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Return the category index, if this is a categorical value.
    #[must_use]
    pub fn category(self) -> Option<usize> {
        match self {
            Value::Category(c) => Some(c),
            _ => None,
        }
    }

    /// Return the number, if this is a continuous value.
    #[must_use]
    pub fn number(self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(x),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => f.write_str(MISSING_FIELD),
            Value::Category(c) => write!(f, "#{c}"),
            Value::Number(x) => write!(f, "{x}"),
        }
    }
}

/// A row of values aligned with a [`Schema`], class value included.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    /// Create a record from its values in schema order.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Return the values in schema order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Return the value at `attribute`, or [`Value::Missing`] when out of range.
    #[must_use]
    pub fn value(&self, attribute: usize) -> Value {
        self.values.get(attribute).copied().unwrap_or(Value::Missing)
    }

    /// Return the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return `true` if the record holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn set(&mut self, attribute: usize, value: Value) {
        self.values[attribute] = value;
    }
}

impl From<Vec<Value>> for Record {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl AsRef<[Value]> for Record {
    fn as_ref(&self) -> &[Value] {
        &self.values
    }
}

/// Ordered attribute list with a designated categorical class attribute.
///
/// Deserialization goes through [`Schema::new`], so a decoded schema is as
/// valid as a constructed one.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "SchemaParts")]
pub struct Schema {
    attributes: Vec<Attribute>,
    class_index: usize,
}

#[derive(serde::Deserialize)]
struct SchemaParts {
    attributes: Vec<Attribute>,
    class_index: usize,
}

impl TryFrom<SchemaParts> for Schema {
    type Error = TreeError;

    fn try_from(parts: SchemaParts) -> Result<Self, TreeError> {
        Schema::new(parts.attributes, parts.class_index)
    }
}

impl Schema {
    /// Build a schema, assigning each attribute its position as index.
    ///
    /// # Errors
    ///
    /// | Variant                                 | When                                      |
    /// |-----------------------------------------|-------------------------------------------|
    /// | [`TreeError::ClassIndexOutOfRange`]     | `class_index >= attributes.len()`         |
    /// | [`TreeError::ClassNotCategorical`]      | the class attribute is continuous         |
    /// | [`TreeError::EmptyDomain`]              | a categorical attribute has no labels     |
    /// | [`TreeError::DuplicateAttribute`]       | two attributes share a name               |
    /// | [`TreeError::DuplicateCategory`]        | a domain repeats a label                  |
    pub fn new(mut attributes: Vec<Attribute>, class_index: usize) -> Result<Self, TreeError> {
        if class_index >= attributes.len() {
            return Err(TreeError::ClassIndexOutOfRange {
                class_index,
                n_attributes: attributes.len(),
            });
        }
        if !attributes[class_index].is_categorical() {
            return Err(TreeError::ClassNotCategorical {
                attribute: attributes[class_index].name.clone(),
            });
        }

        let mut names = HashSet::new();
        for (index, attribute) in attributes.iter_mut().enumerate() {
            if !names.insert(attribute.name.clone()) {
                return Err(TreeError::DuplicateAttribute {
                    attribute: attribute.name.clone(),
                });
            }
            if let AttributeKind::Categorical { values } = &attribute.kind {
                if values.is_empty() {
                    return Err(TreeError::EmptyDomain {
                        attribute: attribute.name.clone(),
                    });
                }
                let mut seen = HashSet::new();
                for value in values {
                    if !seen.insert(value.as_str()) {
                        return Err(TreeError::DuplicateCategory {
                            attribute: attribute.name.clone(),
                            category: value.clone(),
                        });
                    }
                }
            }
            attribute.index = index;
        }

        Ok(Self {
            attributes,
            class_index,
        })
    }

    /// Return all attributes, class included, in schema order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Return the attribute at `index`.
    #[must_use]
    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Return the class attribute position.
    #[must_use]
    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// Return the class attribute.
    #[must_use]
    pub fn class_attribute(&self) -> &Attribute {
        &self.attributes[self.class_index]
    }

    /// Return the number of attributes, class included.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Return the number of class values.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.class_attribute().domain_size()
    }

    /// Iterate over the indices of the non-class attributes.
    pub fn feature_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.attributes.len()).filter(move |&i| i != self.class_index)
    }

    /// Check that `values` is a valid record for this schema.
    ///
    /// Missing values are accepted everywhere, the class included.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                        |
    /// |---------------------------------------|---------------------------------------------|
    /// | [`TreeError::RecordLengthMismatch`]   | wrong number of values                      |
    /// | [`TreeError::ValueKindMismatch`]      | number for a categorical attribute, or the reverse |
    /// | [`TreeError::CategoryOutOfRange`]     | category index outside the domain           |
    /// | [`TreeError::NonFiniteValue`]         | NaN or infinite number                      |
    pub fn validate(&self, values: &[Value], record_index: usize) -> Result<(), TreeError> {
        if values.len() != self.attributes.len() {
            return Err(TreeError::RecordLengthMismatch {
                expected: self.attributes.len(),
                got: values.len(),
                record_index,
            });
        }
        for (attribute, value) in self.attributes.iter().zip(values) {
            match (&attribute.kind, *value) {
                (_, Value::Missing) => {}
                (AttributeKind::Categorical { values }, Value::Category(c)) => {
                    if c >= values.len() {
                        return Err(TreeError::CategoryOutOfRange {
                            attribute: attribute.name.clone(),
                            index: c,
                            domain_size: values.len(),
                        });
                    }
                }
                (AttributeKind::Continuous, Value::Number(x)) => {
                    if !x.is_finite() {
                        return Err(TreeError::NonFiniteValue {
                            attribute: attribute.name.clone(),
                        });
                    }
                }
                _ => {
                    return Err(TreeError::ValueKindMismatch {
                        attribute: attribute.name.clone(),
                        expected: attribute.kind_name(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Turn textual fields into a record.
    ///
    /// `"?"` is a missing value; continuous fields are parsed as `f64`;
    /// categorical fields must be domain labels. Surrounding whitespace is
    /// ignored.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                  |
    /// |---------------------------------------|---------------------------------------|
    /// | [`TreeError::RecordLengthMismatch`]   | wrong number of fields                |
    /// | [`TreeError::UnknownCategory`]        | label not in the domain               |
    /// | [`TreeError::InvalidNumber`]          | field does not parse as a number      |
    /// | [`TreeError::NonFiniteValue`]         | field parses to NaN or infinity       |
    pub fn encode(&self, fields: &[&str]) -> Result<Record, TreeError> {
        if fields.len() != self.attributes.len() {
            return Err(TreeError::RecordLengthMismatch {
                expected: self.attributes.len(),
                got: fields.len(),
                record_index: 0,
            });
        }
        let values = self
            .attributes
            .iter()
            .zip(fields)
            .map(|(attribute, raw)| {
                let field = raw.trim();
                if field == MISSING_FIELD {
                    return Ok(Value::Missing);
                }
                match &attribute.kind {
                    AttributeKind::Categorical { .. } => attribute
                        .category_index(field)
                        .map(Value::Category)
                        .ok_or_else(|| TreeError::UnknownCategory {
                            attribute: attribute.name.clone(),
                            category: field.to_string(),
                        }),
                    AttributeKind::Continuous => {
                        let x: f64 = field.parse().map_err(|_| TreeError::InvalidNumber {
                            attribute: attribute.name.clone(),
                            raw: field.to_string(),
                        })?;
                        if x.is_finite() {
                            Ok(Value::Number(x))
                        } else {
                            Err(TreeError::NonFiniteValue {
                                attribute: attribute.name.clone(),
                            })
                        }
                    }
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Record::new(values))
    }

    /// Return the class index of `record`, or `None` if the class is missing.
    pub(crate) fn class_of(&self, record: &Record) -> Option<usize> {
        record.value(self.class_index).category()
    }

    /// Count records per class value; records with a missing class are skipped.
    pub(crate) fn class_counts(&self, records: &[Record]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes()];
        for record in records {
            if let Some(c) = self.class_of(record) {
                counts[c] += 1;
            }
        }
        counts
    }

    /// Return a copy of this schema with the attribute at `index` replaced.
    pub(crate) fn with_attribute(&self, index: usize, mut attribute: Attribute) -> Self {
        let mut attributes = self.attributes.clone();
        attribute.index = index;
        attributes[index] = attribute;
        Self {
            attributes,
            class_index: self.class_index,
        }
    }
}

/// A schema plus its records.
///
/// Every record is validated against the schema on insertion and on
/// deserialization.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "DatasetParts")]
pub struct Dataset {
    schema: Schema,
    records: Vec<Record>,
}

#[derive(serde::Deserialize)]
struct DatasetParts {
    schema: Schema,
    records: Vec<Record>,
}

impl TryFrom<DatasetParts> for Dataset {
    type Error = TreeError;

    fn try_from(parts: DatasetParts) -> Result<Self, TreeError> {
        Dataset::from_records(parts.schema, parts.records)
    }
}

impl Dataset {
    /// Create an empty dataset.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    /// Create a dataset from pre-built records, validating each one.
    ///
    /// # Errors
    ///
    /// Any error of [`Schema::validate`], reported with the record's index.
    pub fn from_records(schema: Schema, records: Vec<Record>) -> Result<Self, TreeError> {
        for (record_index, record) in records.iter().enumerate() {
            schema.validate(record.values(), record_index)?;
        }
        Ok(Self { schema, records })
    }

    /// Append a record after validating it.
    ///
    /// # Errors
    ///
    /// Any error of [`Schema::validate`].
    pub fn push(&mut self, record: impl Into<Record>) -> Result<(), TreeError> {
        let record = record.into();
        self.schema.validate(record.values(), self.records.len())?;
        self.records.push(record);
        Ok(())
    }

    /// Encode textual fields with [`Schema::encode`] and append the record.
    ///
    /// # Errors
    ///
    /// Any error of [`Schema::encode`].
    pub fn push_fields(&mut self, fields: &[&str]) -> Result<(), TreeError> {
        let record = self.schema.encode(fields).map_err(|e| match e {
            TreeError::RecordLengthMismatch { expected, got, .. } => {
                TreeError::RecordLengthMismatch {
                    expected,
                    got,
                    record_index: self.records.len(),
                }
            }
            other => other,
        })?;
        self.records.push(record);
        Ok(())
    }

    /// Return the schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Return the records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Return the number of records.
    #[must_use]
    pub fn n_records(&self) -> usize {
        self.records.len()
    }

    /// Return `true` if the dataset holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count records per class value, skipping records with a missing class.
    #[must_use]
    pub fn class_counts(&self) -> Vec<usize> {
        self.schema.class_counts(&self.records)
    }

    /// Drop records whose class value is missing; return how many were dropped.
    pub fn remove_missing_class(&mut self) -> usize {
        let before = self.records.len();
        let class_index = self.schema.class_index;
        self.records
            .retain(|record| !record.value(class_index).is_missing());
        before - self.records.len()
    }

    pub(crate) fn into_parts(self) -> (Schema, Vec<Record>) {
        (self.schema, self.records)
    }
}
