//! Bound condition atoms and their evaluation.

use crate::error::{BindError, EvalError};
use crate::operators::CompareOp;
use crate::parser::{Atom, Operand};
use datagen_core::{FieldTypes, Row, ValueKind};
use std::cmp::Ordering;
use std::fmt;
use tracing::warn;

/// A number parsed to the kind of the compared column.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Number {
    Integer(i32),
    Long(i64),
    Float(f64),
}

impl Number {
    /// Parse `text` as `kind`; `None` for [`ValueKind::String`] or bad input.
    pub fn parse(text: &str, kind: ValueKind) -> Option<Number> {
        let text = text.trim();
        match kind {
            ValueKind::Integer => text.parse().ok().map(Number::Integer),
            ValueKind::Long => text.parse().ok().map(Number::Long),
            ValueKind::Float => text.parse().ok().map(Number::Float),
            ValueKind::String => None,
        }
    }
}

/// Right-hand side of a bound condition.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundOperand {
    Column(String),
    /// Literal text, pre-parsed when the condition compares numerically
    Literal { text: String, number: Option<Number> },
}

/// A comparison between a column and another column or a literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    left: String,
    op: CompareOp,
    right: BoundOperand,
    kind: ValueKind,
}

impl Condition {
    /// Resolve an atom against the model.
    ///
    /// The value kind comes from the left column. For `<` and `>` on a
    /// numeric column the literal must parse as that kind.
    pub fn bind(atom: Atom, types: &impl FieldTypes) -> Result<Condition, BindError> {
        let kind = types
            .field_kind(&atom.left)
            .ok_or_else(|| BindError::UnknownColumn(atom.left.clone()))?
            .value_kind();

        let right = match atom.right {
            Operand::Column(column) => {
                if types.field_kind(&column).is_none() {
                    return Err(BindError::UnknownColumn(column));
                }
                BoundOperand::Column(column)
            }
            Operand::Literal(text) => {
                let number = Number::parse(&text, kind);
                let ordered = matches!(atom.op, CompareOp::Lt | CompareOp::Gt);
                if ordered && kind.is_numeric() && number.is_none() {
                    return Err(BindError::InvalidLiteral {
                        literal: text,
                        kind,
                    });
                }
                BoundOperand::Literal { text, number }
            }
        };

        Ok(Condition {
            left: atom.left,
            op: atom.op,
            right,
            kind,
        })
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn right(&self) -> &BoundOperand {
        &self.right
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Evaluate against a row. Errors are logged and read as `false`.
    pub fn evaluate(&self, row: &Row) -> bool {
        match self.try_evaluate(row) {
            Ok(result) => result,
            Err(e) => {
                warn!(row = row.index(), "Condition '{self}' is false: {e}");
                false
            }
        }
    }

    fn try_evaluate(&self, row: &Row) -> Result<bool, EvalError> {
        let left = row
            .get_string(&self.left)
            .ok_or_else(|| EvalError::MissingColumn(self.left.clone()))?;
        match &self.right {
            BoundOperand::Column(column) => {
                let right = row
                    .get_string(column)
                    .ok_or_else(|| EvalError::MissingColumn(column.clone()))?;
                self.compare(left.trim(), right.trim(), None)
            }
            BoundOperand::Literal { text, number } => {
                self.compare(left.trim(), text.trim(), *number)
            }
        }
    }

    fn compare(&self, left: &str, right: &str, right_number: Option<Number>) -> Result<bool, EvalError> {
        let ordering = match self.op {
            CompareOp::Eq => return Ok(eq_ignore_case(left, right)),
            CompareOp::Ne => return Ok(!eq_ignore_case(left, right)),
            CompareOp::Lt | CompareOp::Gt if self.kind.is_numeric() => {
                let l = self.parse_number(left)?;
                let r = match right_number {
                    Some(n) => n,
                    None => self.parse_number(right)?,
                };
                l.partial_cmp(&r)
            }
            CompareOp::Lt | CompareOp::Gt => Some(left.cmp(right)),
        };
        let expected = if self.op == CompareOp::Lt {
            Ordering::Less
        } else {
            Ordering::Greater
        };
        Ok(ordering == Some(expected))
    }

    fn parse_number(&self, text: &str) -> Result<Number, EvalError> {
        Number::parse(text, self.kind).ok_or_else(|| EvalError::InvalidNumber {
            value: text.to_string(),
            kind: self.kind,
        })
    }
}

/// Case-insensitive equality without allocating.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.right {
            BoundOperand::Column(column) => {
                write!(f, "${}{}${}", self.left, self.op.symbol(), column)
            }
            BoundOperand::Literal { text, .. } => {
                write!(f, "${}{}{}", self.left, self.op.symbol(), text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagen_core::FieldKind;
    use indexmap::IndexMap;

    fn types() -> IndexMap<String, FieldKind> {
        [
            ("n", FieldKind::Integer),
            ("m", FieldKind::Integer),
            ("big", FieldKind::Long),
            ("ratio", FieldKind::Float),
            ("s", FieldKind::String),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn cond(text: &str) -> Condition {
        Condition::bind(Atom::parse(text).unwrap(), &types()).unwrap()
    }

    #[test]
    fn test_numeric_vs_lexical() {
        let row = Row::builder(0)
            .field("n", 10)
            .field("m", 9)
            .field("s", "10")
            .build();
        assert!(cond("$n>9").evaluate(&row));
        assert!(cond("$n>$m").evaluate(&row));
        assert!(!cond("$n<9").evaluate(&row));
        // Lexically "10" < "9"
        assert!(cond("$s<9").evaluate(&row));
        assert!(!cond("$s>9").evaluate(&row));
    }

    #[test]
    fn test_five_three() {
        let five = Row::builder(0).field("n", 5).build();
        let three = Row::builder(0).field("n", 3).build();
        assert!(cond("$n>3").evaluate(&five));
        assert!(!cond("$n>5").evaluate(&three));
        assert!(!cond("$n>3").evaluate(&three));
    }

    #[test]
    fn test_equality_ignores_case_and_whitespace() {
        let row = Row::builder(0).field("s", "  Paris ").build();
        assert!(cond("$s=paris").evaluate(&row));
        assert!(cond("$s=PARIS").evaluate(&row));
        assert!(!cond("$s!paris").evaluate(&row));
        assert!(cond("$s!Lyon").evaluate(&row));
    }

    #[test]
    fn test_long_and_float_kinds() {
        let row = Row::builder(0)
            .field("big", 5_000_000_000_i64)
            .field("ratio", 0.75)
            .build();
        assert!(cond("$big>4999999999").evaluate(&row));
        assert!(cond("$ratio<0.8").evaluate(&row));
        assert!(cond("$ratio>0.5").evaluate(&row));
        assert_eq!(cond("$ratio>0.5").kind(), ValueKind::Float);
    }

    #[test]
    fn test_literal_is_preparsed() {
        let c = cond("$n<42");
        assert_eq!(
            c.right(),
            &BoundOperand::Literal {
                text: "42".to_string(),
                number: Some(Number::Integer(42))
            }
        );
    }

    #[test]
    fn test_missing_column_is_false() {
        let row = Row::builder(0).field("m", 1).build();
        assert!(!cond("$n=1").evaluate(&row));
        assert!(!cond("$n!1").evaluate(&row));
        assert!(!cond("$m<$n").evaluate(&row));
    }

    #[test]
    fn test_unparsable_row_value_is_false() {
        let row = Row::builder(0).field("n", "abc").build();
        assert!(!cond("$n>1").evaluate(&row));
        assert!(!cond("$n<1").evaluate(&row));
    }

    #[test]
    fn test_bind_errors() {
        let unknown = Condition::bind(Atom::parse("$zz=1").unwrap(), &types());
        assert_eq!(unknown, Err(BindError::UnknownColumn("zz".to_string())));

        let unknown_right = Condition::bind(Atom::parse("$n=$zz").unwrap(), &types());
        assert_eq!(unknown_right, Err(BindError::UnknownColumn("zz".to_string())));

        let bad_literal = Condition::bind(Atom::parse("$n>abc").unwrap(), &types());
        assert!(matches!(bad_literal, Err(BindError::InvalidLiteral { .. })));

        // Equality with a non-numeric literal is a plain string compare
        assert!(Condition::bind(Atom::parse("$n=abc").unwrap(), &types()).is_ok());
    }
}
