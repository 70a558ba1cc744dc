//! Error types for model binding and row generation.

use datagen_core::{FieldKind, SchemaError};
use std::path::PathBuf;

/// Error type for generator operations.
///
/// All variants are raised while binding a model. Once a model is bound,
/// row generation never fails; degraded values are logged instead.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Model definition error
    #[error("Model error: {0}")]
    SchemaError(#[from] SchemaError),

    /// A built-in dictionary could not be parsed
    #[error("Failed to load dictionary '{name}': {source}")]
    Dictionary {
        name: &'static str,
        #[source]
        source: csv::Error,
    },

    /// An external CSV file could not be read
    #[error("Failed to read CSV file {path}: {source}")]
    CsvFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The display column of a `csv` field is not in the file header
    #[error("CSV file {path} has no column '{column}'")]
    UnknownCsvColumn { path: PathBuf, column: String },

    /// A filter is not of the expected form
    #[error("Field '{field}': invalid filter '{filter}'")]
    InvalidFilter { field: String, filter: String },

    /// Nothing to draw values from
    #[error("Field '{field}' has no values to choose from")]
    EmptyPool { field: String },

    /// `possible_values_weighted` cannot be sampled
    #[error("Field '{field}' has invalid weights: {reason}")]
    InvalidWeights { field: String, reason: String },

    /// A possible value does not parse as the field kind
    #[error("Field '{field}': possible value '{value}' is not a valid {kind}")]
    InvalidPossibleValue {
        field: String,
        value: String,
        kind: FieldKind,
    },

    /// A `string_regex` template cannot be read
    #[error("Field '{field}': invalid regex template '{template}': {reason}")]
    InvalidTemplate {
        field: String,
        template: String,
        reason: String,
    },

    /// A `date_as_string` pattern is not a valid strftime pattern
    #[error("Field '{field}': invalid date pattern '{pattern}'")]
    InvalidDatePattern { field: String, pattern: String },

    /// A batch worker panicked
    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),
}
