//! Bound rule lines and the AND/OR evaluation of combined conditions.

use crate::condition::Condition;
use crate::formula::FormulaTemplate;
use crate::injection::Injection;
use crate::link::Link;
use crate::operators::LogicalOp;
use std::fmt;

use datagen_core::Row;

/// What a line does, fixed when it is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    SingleCondition,
    CombinedCondition,
    Formula,
    Link,
    Injection,
    Default,
    /// Failed to parse or bind; never satisfied
    Unsatisfiable,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LineBody {
    Conditions {
        conditions: Vec<Condition>,
        operators: Vec<LogicalOp>,
        output: String,
    },
    Formula(FormulaTemplate),
    Link(Link),
    Injection(Injection),
    Default(String),
    Unsatisfiable,
}

/// One bound line of a rule set.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Condition text as written in the model
    source: String,
    body: LineBody,
}

impl Line {
    pub(crate) fn new(source: impl Into<String>, body: LineBody) -> Self {
        Self {
            source: source.into(),
            body,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> LineKind {
        match &self.body {
            LineBody::Conditions { conditions, .. } if conditions.len() == 1 => {
                LineKind::SingleCondition
            }
            LineBody::Conditions { .. } => LineKind::CombinedCondition,
            LineBody::Formula(_) => LineKind::Formula,
            LineBody::Link(_) => LineKind::Link,
            LineBody::Injection(_) => LineKind::Injection,
            LineBody::Default(_) => LineKind::Default,
            LineBody::Unsatisfiable => LineKind::Unsatisfiable,
        }
    }

    /// The conditions of a condition line, empty otherwise.
    pub fn conditions(&self) -> &[Condition] {
        match &self.body {
            LineBody::Conditions { conditions, .. } => conditions,
            _ => &[],
        }
    }

    /// Check the line against a row without computing its output.
    pub fn is_satisfied(&self, row: &Row) -> bool {
        self.satisfied_with(row, &mut |_| {})
    }

    /// Like [`is_satisfied`](Self::is_satisfied), also returning the indices
    /// of the conditions that were actually evaluated.
    pub fn trace(&self, row: &Row) -> (bool, Vec<usize>) {
        let mut evaluated = Vec::new();
        let satisfied = self.satisfied_with(row, &mut |i| evaluated.push(i));
        (satisfied, evaluated)
    }

    /// The line's output if it is satisfied by the row.
    ///
    /// Formula, link and injection lines are always satisfied and compute
    /// their output here.
    pub fn evaluate(&self, row: &Row) -> Option<String> {
        match &self.body {
            LineBody::Conditions { output, .. } => {
                self.is_satisfied(row).then(|| output.clone())
            }
            LineBody::Formula(formula) => Some(formula.evaluate(row)),
            LineBody::Link(link) => Some(link.evaluate(row)),
            LineBody::Injection(injection) => Some(injection.evaluate(row)),
            LineBody::Default(output) => Some(output.clone()),
            LineBody::Unsatisfiable => None,
        }
    }

    fn satisfied_with(&self, row: &Row, on_evaluate: &mut dyn FnMut(usize)) -> bool {
        match &self.body {
            LineBody::Conditions {
                conditions,
                operators,
                ..
            } => conditions_satisfied(conditions, operators, row, on_evaluate),
            LineBody::Unsatisfiable => false,
            _ => true,
        }
    }
}

/// Evaluate conditions joined by AND/OR, AND binding tighter.
///
/// The flat list is read as AND-runs separated by OR. A false condition
/// skips the rest of its AND-run; a true AND-run ends the evaluation.
/// The result is the value of the last AND-run that was reached.
fn conditions_satisfied(
    conditions: &[Condition],
    operators: &[LogicalOp],
    row: &Row,
    on_evaluate: &mut dyn FnMut(usize),
) -> bool {
    let Some(first) = conditions.first() else {
        return false;
    };
    on_evaluate(0);
    let mut previous = first.evaluate(row);

    for (i, (op, condition)) in operators.iter().zip(&conditions[1..]).enumerate() {
        let index = i + 1;
        match op {
            LogicalOp::And => {
                if previous {
                    on_evaluate(index);
                    previous = condition.evaluate(row);
                }
            }
            LogicalOp::Or => {
                if previous {
                    return true;
                }
                on_evaluate(index);
                previous = condition.evaluate(row);
            }
        }
    }
    previous
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
