//! Model definitions loaded from YAML.
//!
//! A model is an ordered list of fields. Each field has a kind and either
//! generator options (random fields) or rule text (computed fields).
//!
//! ## Example
//!
//! ```yaml
//! version: 1
//! name: customers
//! seed: 42
//! fields:
//!   - name: age
//!     type: integer
//!     min: 18
//!     max: 90
//!   - name: segment
//!     type: string
//!     conditionals:
//!       "$age<30": young
//!       default: adult
//! ```

use crate::types::{FieldKind, FieldTypes};
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Error Types
// ============================================================================

/// Error type for model loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading model file
    #[error("Failed to read model file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Model declares no fields
    #[error("Model '{0}' declares no fields")]
    NoFields(String),

    /// A field has an empty name
    #[error("Field at position {0} has an empty name")]
    EmptyFieldName(usize),

    /// Two fields share a name
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// Field not found in model
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// `min` is greater than `max`
    #[error("Field '{field}' has min greater than max")]
    InvalidRange { field: String },

    /// A kind-specific option is missing
    #[error("Field '{field}' of type {kind} requires option '{option}'")]
    MissingOption {
        field: String,
        kind: FieldKind,
        option: &'static str,
    },
}

// ============================================================================
// Field Definitions
// ============================================================================

/// Numeric bound written as either an integer or a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericBound {
    Integer(i64),
    Float(f64),
}

impl NumericBound {
    /// The bound as an integer, truncating floats.
    pub fn as_i64(self) -> i64 {
        match self {
            NumericBound::Integer(v) => v,
            NumericBound::Float(v) => v as i64,
        }
    }

    /// The bound as a float.
    pub fn as_f64(self) -> f64 {
        match self {
            NumericBound::Integer(v) => v as f64,
            NumericBound::Float(v) => v,
        }
    }
}

/// The textual rule lines of a computed field, in evaluation order.
///
/// Each entry pairs the condition text with the output text.
pub type RuleLines<'a> = Vec<(&'a str, &'a str)>;

/// A single field of a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,

    /// Field kind
    #[serde(rename = "type")]
    pub kind: FieldKind,

    /// Generated but omitted from output
    #[serde(default)]
    pub ghost: bool,

    /// String length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,

    /// Lower bound (inclusive); start value for increment kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<NumericBound>,

    /// Upper bound (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<NumericBound>,

    /// Uniform choice among these values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible_values: Vec<String>,

    /// Weighted choice among these values
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub possible_values_weighted: IndexMap<String, u32>,

    /// Dictionary filters (countries, or `column=value` for CSV fields)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,

    /// External CSV file for `csv` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// CSV delimiter, `;` by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<char>,

    /// Display column for `csv` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Lower bound for `birthdate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<NaiveDate>,

    /// Upper bound for `birthdate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<NaiveDate>,

    /// Lower bound for `date` and `date_as_string`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date_time: Option<NaiveDateTime>,

    /// Upper bound for `date` and `date_as_string`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date_time: Option<NaiveDateTime>,

    /// `date` and `date_as_string` take the current time instead of a random one
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub use_now: bool,

    /// strftime pattern for `date_as_string`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Template for `string_regex`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    /// Ordered condition lines: condition text to output text
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub conditionals: IndexMap<String, String>,

    /// Expression computed from other columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,

    /// Template with `${column}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection: Option<String>,

    /// `$target.attribute` path into a structured field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl FieldDefinition {
    /// Create a random field of the given kind with default options.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ghost: false,
            length: None,
            min: None,
            max: None,
            possible_values: Vec::new(),
            possible_values_weighted: IndexMap::new(),
            filters: Vec::new(),
            file: None,
            separator: None,
            field: None,
            min_date: None,
            max_date: None,
            min_date_time: None,
            max_date_time: None,
            use_now: false,
            pattern: None,
            regex: None,
            conditionals: IndexMap::new(),
            formula: None,
            injection: None,
            link: None,
        }
    }

    /// Whether the value is derived by rules rather than drawn at random.
    pub fn is_computed(&self) -> bool {
        !self.conditionals.is_empty()
            || self.formula.is_some()
            || self.injection.is_some()
            || self.link.is_some()
    }

    /// The rule lines of a computed field.
    ///
    /// `conditionals` take precedence over `formula`, `injection` and `link`,
    /// which are shorthands for a single special line.
    pub fn rule_lines(&self) -> Option<RuleLines<'_>> {
        if !self.conditionals.is_empty() {
            return Some(
                self.conditionals
                    .iter()
                    .map(|(condition, output)| (condition.as_str(), output.as_str()))
                    .collect(),
            );
        }
        if let Some(formula) = &self.formula {
            return Some(vec![("formula", formula.as_str())]);
        }
        if let Some(injection) = &self.injection {
            return Some(vec![("injection", injection.as_str())]);
        }
        if let Some(link) = &self.link {
            return Some(vec![("link", link.as_str())]);
        }
        None
    }

    fn validate(&self, position: usize) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyFieldName(position));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min.as_f64() > max.as_f64() {
                return Err(SchemaError::InvalidRange {
                    field: self.name.clone(),
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_date, self.max_date) {
            if min > max {
                return Err(SchemaError::InvalidRange {
                    field: self.name.clone(),
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_date_time, self.max_date_time) {
            if min > max {
                return Err(SchemaError::InvalidRange {
                    field: self.name.clone(),
                });
            }
        }
        if self.kind == FieldKind::StringRegex && !self.is_computed() && self.regex.is_none() {
            return Err(self.missing("regex"));
        }
        if self.kind == FieldKind::Csv && !self.is_computed() {
            if self.file.is_none() {
                return Err(self.missing("file"));
            }
            if self.field.is_none() {
                return Err(self.missing("field"));
            }
        }
        Ok(())
    }

    fn missing(&self, option: &'static str) -> SchemaError {
        SchemaError::MissingOption {
            field: self.name.clone(),
            kind: self.kind,
            option,
        }
    }
}

// ============================================================================
// Model Definition
// ============================================================================

fn default_version() -> u32 {
    1
}

fn default_model_name() -> String {
    "model".to_string()
}

/// A complete model: ordered fields plus an optional seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Model format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Model name (used in logs)
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Random seed for reproducibility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Field definitions in declared order
    pub fields: Vec<FieldDefinition>,

    /// Cached field lookup (not serialized)
    #[serde(skip)]
    field_map: HashMap<String, usize>,
}

impl ModelDefinition {
    /// Create a model from field definitions, validating it.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<FieldDefinition>,
    ) -> Result<Self, SchemaError> {
        let mut model = Self {
            version: default_version(),
            name: name.into(),
            seed: None,
            fields,
            field_map: HashMap::new(),
        };
        model.build_field_map()?;
        Ok(model)
    }

    /// Load a model from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a model from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let mut model: ModelDefinition = serde_yaml::from_str(yaml)?;
        model.build_field_map()?;
        Ok(model)
    }

    /// Validate the fields and build the internal lookup map.
    fn build_field_map(&mut self) -> Result<(), SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::NoFields(self.name.clone()));
        }
        self.field_map.clear();
        for (idx, field) in self.fields.iter().enumerate() {
            field.validate(idx)?;
            if self.field_map.insert(field.name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        Ok(())
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.field_map
            .get(name)
            .and_then(|&idx| self.fields.get(idx))
    }

    /// Declared position of a field.
    pub fn field_position(&self, name: &str) -> Option<usize> {
        self.field_map.get(name).copied()
    }

    /// Get the kind of a field by name.
    pub fn get_field_kind(&self, name: &str) -> Result<FieldKind, SchemaError> {
        self.get_field(name)
            .map(|f| f.kind)
            .ok_or_else(|| SchemaError::FieldNotFound(name.to_string()))
    }

    /// Names of all fields in declared order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Names of fields that appear in output (ghost fields excluded).
    pub fn output_field_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| !f.ghost)
            .map(|f| f.name.as_str())
            .collect()
    }
}

impl FieldTypes for ModelDefinition {
    fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.get_field(name).map(|f| f.kind)
    }
}
