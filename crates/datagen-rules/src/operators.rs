//! Comparison and logical operators.

use std::fmt;

/// Comparison operator of a condition atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
}

impl CompareOp {
    /// Detection order: the first of these characters present in an atom wins.
    pub const DETECTION_ORDER: [CompareOp; 4] =
        [CompareOp::Eq, CompareOp::Ne, CompareOp::Lt, CompareOp::Gt];

    /// The character that spells this operator in rule text.
    pub fn symbol(self) -> char {
        match self {
            CompareOp::Eq => '=',
            CompareOp::Ne => '!',
            CompareOp::Lt => '<',
            CompareOp::Gt => '>',
        }
    }

    /// Find the operator of an atom.
    ///
    /// `$a!=5` contains `=` and therefore detects as `Eq`.
    pub fn detect(atom: &str) -> Option<CompareOp> {
        Self::DETECTION_ORDER
            .into_iter()
            .find(|op| atom.contains(op.symbol()))
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Gt => "gt",
        };
        write!(f, "{}", s)
    }
}

/// Operator joining two atoms of a combined line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// `&` and `|`; anything else is not an operator token.
    pub fn from_token(token: &str) -> Option<LogicalOp> {
        match token {
            "&" => Some(LogicalOp::And),
            "|" => Some(LogicalOp::Or),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}
