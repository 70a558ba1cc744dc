//! Formula lines: expressions over other columns.
//!
//! A column is referenced as `$name` (name = ASCII alphanumerics and `_`) or
//! `${name}`. At evaluation time each reference is replaced by the column's
//! current value, then the text runs through [`expr::evaluate`].
//! References are substituted at their own positions only, so a column name
//! that also occurs inside a longer identifier or a string literal is never
//! touched.

use crate::error::EvalError;
use crate::expr;
use crate::injection::{is_name_char, match_placeholder, push_literal, Fragment};
use datagen_core::Row;
use tracing::warn;

/// Output of a formula that could not be evaluated.
pub const FORMULA_FALLBACK: &str = "0";

/// A parsed formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaTemplate {
    /// Referenced columns, in order of first appearance, without duplicates
    referenced_columns: Vec<String>,
    /// The expression with `$` sigils removed
    expression_template: String,
    fragments: Vec<Fragment>,
}

impl FormulaTemplate {
    /// Extract the referenced columns of an expression.
    ///
    /// A `$` inside a quoted string literal is plain text.
    pub fn parse(expression: &str) -> Self {
        let mut fragments = Vec::new();
        let mut literal_start = 0;
        let mut cursor = 0;
        let mut quote: Option<char> = None;
        let mut escaped = false;

        while let Some(c) = expression[cursor..].chars().next() {
            let start = cursor;
            cursor += c.len_utf8();
            match quote {
                Some(_) if escaped => escaped = false,
                Some(_) if c == '\\' => escaped = true,
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '"' || c == '\'' => quote = Some(c),
                None if c == '$' => {
                    push_literal(&mut fragments, &expression[literal_start..start]);

                    let rest = &expression[start..];
                    let (name, consumed) = match match_placeholder(rest) {
                        Some(found) => found,
                        None => {
                            let len = rest[1..]
                                .find(|c: char| !is_name_char(c))
                                .unwrap_or(rest.len() - 1);
                            (&rest[1..1 + len], 1 + len)
                        }
                    };
                    if !name.is_empty() {
                        fragments.push(Fragment::Column(name.to_string()));
                    }
                    cursor = start + consumed;
                    literal_start = cursor;
                }
                None => {}
            }
        }
        push_literal(&mut fragments, &expression[literal_start..]);

        let mut referenced_columns: Vec<String> = Vec::new();
        let mut expression_template = String::with_capacity(expression.len());
        for fragment in &fragments {
            match fragment {
                Fragment::Literal(text) => expression_template.push_str(text),
                Fragment::Column(name) => {
                    expression_template.push_str(name);
                    if !referenced_columns.contains(name) {
                        referenced_columns.push(name.clone());
                    }
                }
            }
        }

        Self {
            referenced_columns,
            expression_template,
            fragments,
        }
    }

    pub fn referenced_columns(&self) -> &[String] {
        &self.referenced_columns
    }

    pub fn expression_template(&self) -> &str {
        &self.expression_template
    }

    /// Build the expression text for a row.
    fn substitute(&self, row: &Row) -> Result<String, EvalError> {
        let mut expression = String::with_capacity(self.expression_template.len() + 16);
        for fragment in &self.fragments {
            match fragment {
                Fragment::Literal(text) => expression.push_str(text),
                Fragment::Column(name) => {
                    let value = row
                        .get_string(name)
                        .ok_or_else(|| EvalError::MissingColumn(name.clone()))?;
                    expr::push_literal(&mut expression, &value);
                }
            }
        }
        Ok(expression)
    }

    fn try_evaluate(&self, row: &Row) -> Result<String, EvalError> {
        let expression = self.substitute(row)?;
        let value = expr::evaluate(&expression)?;
        Ok(value.to_string())
    }

    /// Evaluate against a row; any failure yields [`FORMULA_FALLBACK`].
    pub fn evaluate(&self, row: &Row) -> String {
        match self.try_evaluate(row) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    row = row.index(),
                    "Could not evaluate formula '{}': {e}", self.expression_template
                );
                FORMULA_FALLBACK.to_string()
            }
        }
    }
}
