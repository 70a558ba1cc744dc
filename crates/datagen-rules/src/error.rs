//! Rule errors.
//!
//! Parse and bind errors never abort model loading: the offending line is
//! kept as an unsatisfiable line and the error is reported as a diagnostic.
//! Evaluation errors never leave the evaluator; they are logged and turned
//! into `false`, `""` or `"0"`.

use datagen_core::ValueKind;
use thiserror::Error;

/// Malformed rule text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty condition line")]
    EmptyLine,

    #[error("no comparison operator in '{0}'")]
    MissingOperator(String),

    #[error("empty column name in '{0}'")]
    EmptyColumn(String),

    #[error("link '{0}' must have the form target.attribute")]
    MalformedLink(String),

    #[error("empty {0} expression")]
    EmptyBody(&'static str),
}

/// A parsed rule that does not fit the model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("literal '{literal}' is not a valid {kind}")]
    InvalidLiteral { literal: String, kind: ValueKind },

    #[error("link target '{target}' of type {kind} has no attribute '{attribute}'")]
    UnknownAttribute {
        target: String,
        kind: datagen_core::FieldKind,
        attribute: String,
    },

    #[error("link target '{0}' is not a city, name or csv field")]
    NotLinkable(String),
}

/// Failure while evaluating one line against one row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("column '{0}' is not set in this row")]
    MissingColumn(String),

    #[error("'{value}' is not a valid {kind}")]
    InvalidNumber { value: String, kind: ValueKind },

    #[error("link target '{0}' does not hold a structured value")]
    NotStructured(String),

    #[error(transparent)]
    Expression(#[from] crate::expr::ExprError),
}

/// Any diagnostic produced while building a rule set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("field '{field}', line '{line}': {source}")]
    Parse {
        field: String,
        line: String,
        #[source]
        source: ParseError,
    },

    #[error("field '{field}', line '{line}': {source}")]
    Bind {
        field: String,
        line: String,
        #[source]
        source: BindError,
    },
}

impl RuleError {
    /// The line text this diagnostic refers to.
    pub fn line(&self) -> &str {
        match self {
            RuleError::Parse { line, .. } | RuleError::Bind { line, .. } => line,
        }
    }
}
