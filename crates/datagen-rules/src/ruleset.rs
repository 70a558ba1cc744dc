//! Rule sets: the ordered lines of one computed field.
//!
//! Building a rule set takes two steps. [`UnboundRuleSet::parse`] reads the
//! rule text and records names only. [`UnboundRuleSet::bind`] resolves every
//! name against the complete model and returns an immutable [`RuleSet`].
//! Because binding consumes the unbound form, a rule set that can be
//! evaluated is always fully bound.

use crate::condition::Condition;
use crate::error::{BindError, RuleError};
use crate::line::{Line, LineBody, LineKind};
use crate::parser::{parse_line, UnboundLine};
use datagen_core::{FieldTypes, Row};
use tracing::{debug, warn};

/// A parsed rule line together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct UnboundEntry {
    pub source: String,
    pub line: UnboundLine,
}

/// Parsed rule lines of one field, before binding.
#[derive(Debug, Clone, PartialEq)]
pub struct UnboundRuleSet {
    field: String,
    entries: Vec<UnboundEntry>,
    diagnostics: Vec<RuleError>,
}

impl UnboundRuleSet {
    /// Parse `(condition, output)` pairs in declared order.
    pub fn parse<'a>(
        field: impl Into<String>,
        lines: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let field = field.into();
        let mut diagnostics = Vec::new();
        let entries = lines
            .into_iter()
            .map(|(condition, output)| {
                let line = parse_line(condition, output);
                if let UnboundLine::Broken(error) = &line {
                    diagnostics.push(RuleError::Parse {
                        field: field.clone(),
                        line: condition.to_string(),
                        source: error.clone(),
                    });
                }
                UnboundEntry {
                    source: condition.to_string(),
                    line,
                }
            })
            .collect();
        Self {
            field,
            entries,
            diagnostics,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn entries(&self) -> &[UnboundEntry] {
        &self.entries
    }

    /// Resolve all names against the model.
    ///
    /// Default lines move behind every other line, keeping their relative
    /// order. Lines that fail to bind become unsatisfiable, except links,
    /// which stay in place and evaluate to an empty string.
    pub fn bind(self, types: &impl FieldTypes) -> RuleSet {
        let Self {
            field,
            entries,
            mut diagnostics,
        } = self;

        let mut lines: Vec<Line> = Vec::with_capacity(entries.len());
        for UnboundEntry { source, line } in entries {
            let mut report = |error: BindError| {
                warn!("Rule for field '{field}', line '{source}': {error}");
                diagnostics.push(RuleError::Bind {
                    field: field.clone(),
                    line: source.clone(),
                    source: error,
                });
            };
            let body = match line {
                UnboundLine::Conditions {
                    atoms,
                    operators,
                    output,
                } => match atoms
                    .into_iter()
                    .map(|atom| Condition::bind(atom, types))
                    .collect::<Result<Vec<_>, _>>()
                {
                    Ok(conditions) => LineBody::Conditions {
                        conditions,
                        operators,
                        output,
                    },
                    Err(error) => {
                        report(error);
                        LineBody::Unsatisfiable
                    }
                },
                UnboundLine::Formula(formula) => {
                    for column in formula.referenced_columns() {
                        if types.field_kind(column).is_none() {
                            report(BindError::UnknownColumn(column.clone()));
                        }
                    }
                    LineBody::Formula(formula)
                }
                UnboundLine::Link(path) => {
                    let (link, error) = path.bind(types);
                    if let Some(error) = error {
                        report(error);
                    }
                    LineBody::Link(link)
                }
                UnboundLine::Injection(injection) => {
                    for column in injection.columns() {
                        if types.field_kind(column).is_none() {
                            report(BindError::UnknownColumn(column.to_string()));
                        }
                    }
                    LineBody::Injection(injection)
                }
                UnboundLine::Default(output) => LineBody::Default(output),
                UnboundLine::Broken(_) => LineBody::Unsatisfiable,
            };
            lines.push(Line::new(source, body));
        }

        // Stable: non-default lines first, then defaults
        lines.sort_by_key(|line| line.kind() == LineKind::Default);

        debug!(
            "Bound {} rule line(s) for field '{field}' ({} diagnostic(s))",
            lines.len(),
            diagnostics.len()
        );

        RuleSet {
            field,
            lines,
            diagnostics,
        }
    }
}

/// The immutable, bound lines of one computed field.
///
/// Safe to share between worker threads.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    field: String,
    lines: Vec<Line>,
    diagnostics: Vec<RuleError>,
}

impl RuleSet {
    /// Parse and bind in one step.
    pub fn build<'a>(
        field: impl Into<String>,
        lines: impl IntoIterator<Item = (&'a str, &'a str)>,
        types: &impl FieldTypes,
    ) -> Self {
        UnboundRuleSet::parse(field, lines).bind(types)
    }

    /// Field this rule set computes.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Lines in evaluation order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Problems found while parsing and binding.
    pub fn diagnostics(&self) -> &[RuleError] {
        &self.diagnostics
    }

    /// Output of the first satisfied line, or `""` if none is satisfied.
    pub fn evaluate(&self, row: &Row) -> String {
        self.lines
            .iter()
            .find_map(|line| line.evaluate(row))
            .unwrap_or_default()
    }

    /// Index (in evaluation order) of the first satisfied line.
    pub fn first_match(&self, row: &Row) -> Option<usize> {
        self.lines.iter().position(|line| line.is_satisfied(row))
    }
}
